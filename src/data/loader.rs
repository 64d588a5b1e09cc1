use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Float32Type, Float64Type, Int32Type, Int64Type,
};
use arrow::record_batch::RecordBatch;
use chrono::{NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::error::LoadError;
use super::model::{Dimension, Record, RecordFields, SalesDataset, SOURCE_COLUMNS};

// ---------------------------------------------------------------------------
// Source encoding
// ---------------------------------------------------------------------------

/// Character encoding of a CSV source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceEncoding {
    Utf8,
    /// ISO-8859-1, the encoding the classic Superstore extract ships in.
    #[default]
    Latin1,
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceEncoding::Utf8 => f.write_str("UTF-8"),
            SourceEncoding::Latin1 => f.write_str("ISO-8859-1"),
        }
    }
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decode raw file bytes to text.
///
/// A leading UTF-8 BOM is stripped and forces UTF-8 decoding regardless of
/// `encoding`, so CSV exports reload unchanged under the Latin-1 default.
pub fn decode(bytes: &[u8], encoding: SourceEncoding) -> Result<String, LoadError> {
    let (bytes, encoding) = match bytes.strip_prefix(UTF8_BOM) {
        Some(rest) => (rest, SourceEncoding::Utf8),
        None => (bytes, encoding),
    };
    match encoding {
        SourceEncoding::Utf8 => std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| LoadError::InvalidEncoding {
                encoding,
                offset: e.valid_up_to(),
            }),
        // Latin-1 maps every byte to the code point of the same value.
        SourceEncoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sales table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the columns in [`SOURCE_COLUMNS`] (extra columns ignored)
/// * `.parquet` – the same columns; `Order Date` as Date32/Date64 or text
pub fn load_file(path: &Path, encoding: SourceEncoding) -> Result<SalesDataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => {
            let file = File::open(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            read_csv(file, encoding)
        }
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string())),
    }?;

    log::info!(
        "Loaded {} records from {} ({} regions, {} categories, {} segments)",
        dataset.len(),
        path.display(),
        dataset.values(Dimension::Region).map_or(0, BTreeSet::len),
        dataset.values(Dimension::Category).map_or(0, BTreeSet::len),
        dataset.values(Dimension::Segment).map_or(0, BTreeSet::len),
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// One CSV row as it appears in the source, before date parsing.
#[derive(Debug, Deserialize)]
struct SourceRow {
    #[serde(rename = "Region")]
    region: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Segment")]
    segment: String,
    #[serde(rename = "Sub-Category")]
    sub_category: String,
    #[serde(rename = "Product Name")]
    product_name: String,
    #[serde(rename = "Order Date")]
    order_date: String,
    #[serde(rename = "Sales")]
    sales: f64,
    #[serde(rename = "Profit")]
    profit: f64,
}

/// Read a CSV sales table from any reader.
pub fn read_csv<R: Read>(mut reader: R, encoding: SourceEncoding) -> Result<SalesDataset, LoadError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|source| LoadError::Io {
            path: "<reader>".into(),
            source,
        })?;
    let text = decode(&bytes, encoding)?;
    let records = parse_csv(&text)?;
    Ok(SalesDataset::from_records(records))
}

/// Parse decoded CSV text into records. Row numbers in errors are 1-based
/// and count data rows only.
pub fn parse_csv(text: &str) -> Result<Vec<Record>, LoadError> {
    // Headers and values are trimmed; padded exports compare equal to clean ones.
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    for column in SOURCE_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(LoadError::MissingColumn(column.to_string()));
        }
    }

    let mut records = Vec::new();
    for (idx, result) in reader.deserialize::<SourceRow>().enumerate() {
        let row = result?;
        let order_date = parse_order_date(&row.order_date).ok_or_else(|| LoadError::InvalidDate {
            row: idx + 1,
            value: row.order_date.clone(),
        })?;
        records.push(Record::new(RecordFields {
            region: row.region,
            category: row.category,
            sub_category: row.sub_category,
            segment: row.segment,
            product_name: row.product_name,
            order_date,
            sales: row.sales,
            profit: row.profit,
        }));
    }
    Ok(records)
}

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];

/// Parse an order date. Month-first for slash and dash forms; time of day is dropped.
pub fn parse_order_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding the sales table.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`): text columns may be Utf8 or LargeUtf8,
/// numbers any of Float64/Float32/Int64/Int32.
fn load_parquet(path: &Path) -> Result<SalesDataset, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let offset = records.len();
        read_batch(&batch, offset, &mut records)?;
    }

    Ok(SalesDataset::from_records(records))
}

fn read_batch(batch: &RecordBatch, offset: usize, out: &mut Vec<Record>) -> Result<(), LoadError> {
    let region = column(batch, "Region")?;
    let category = column(batch, "Category")?;
    let segment = column(batch, "Segment")?;
    let sub_category = column(batch, "Sub-Category")?;
    let product_name = column(batch, "Product Name")?;
    let order_date = column(batch, "Order Date")?;
    let sales = column(batch, "Sales")?;
    let profit = column(batch, "Profit")?;

    for row in 0..batch.num_rows() {
        let row_no = offset + row + 1;
        out.push(Record::new(RecordFields {
            region: string_at(region, row, row_no, "Region")?,
            category: string_at(category, row, row_no, "Category")?,
            segment: string_at(segment, row, row_no, "Segment")?,
            sub_category: string_at(sub_category, row, row_no, "Sub-Category")?,
            product_name: string_at(product_name, row, row_no, "Product Name")?,
            order_date: date_at(order_date, row, row_no)?,
            sales: f64_at(sales, row, row_no, "Sales")?,
            profit: f64_at(profit, row, row_no, "Profit")?,
        }));
    }
    Ok(())
}

// -- Arrow helpers --

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef, LoadError> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| LoadError::MissingColumn(name.to_string()))?;
    Ok(batch.column(idx))
}

fn ensure_present(col: &ArrayRef, row: usize, row_no: usize, name: &str) -> Result<(), LoadError> {
    if col.is_null(row) {
        return Err(LoadError::MissingValue {
            row: row_no,
            column: name.to_string(),
        });
    }
    Ok(())
}

fn unsupported(col: &ArrayRef, name: &str) -> LoadError {
    LoadError::ColumnType {
        column: name.to_string(),
        found: format!("{:?}", col.data_type()),
    }
}

fn text_at<'a>(col: &'a ArrayRef, row: usize) -> Option<&'a str> {
    match col.data_type() {
        DataType::Utf8 => Some(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => Some(col.as_string::<i64>().value(row)),
        _ => None,
    }
}

fn string_at(col: &ArrayRef, row: usize, row_no: usize, name: &str) -> Result<String, LoadError> {
    ensure_present(col, row, row_no, name)?;
    text_at(col, row)
        .map(str::to_string)
        .ok_or_else(|| unsupported(col, name))
}

fn f64_at(col: &ArrayRef, row: usize, row_no: usize, name: &str) -> Result<f64, LoadError> {
    ensure_present(col, row, row_no, name)?;
    match col.data_type() {
        DataType::Float64 => Ok(col.as_primitive::<Float64Type>().value(row)),
        DataType::Float32 => Ok(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Int64 => Ok(col.as_primitive::<Int64Type>().value(row) as f64),
        DataType::Int32 => Ok(col.as_primitive::<Int32Type>().value(row) as f64),
        DataType::Utf8 | DataType::LargeUtf8 => {
            let text = text_at(col, row).unwrap_or_default();
            text.trim().parse::<f64>().map_err(|_| LoadError::InvalidNumber {
                row: row_no,
                column: name.to_string(),
                value: text.to_string(),
            })
        }
        _ => Err(unsupported(col, name)),
    }
}

fn date_at(col: &ArrayRef, row: usize, row_no: usize) -> Result<NaiveDate, LoadError> {
    const NAME: &str = "Order Date";
    ensure_present(col, row, row_no, NAME)?;
    let invalid = |value: String| LoadError::InvalidDate { row: row_no, value };
    match col.data_type() {
        DataType::Date32 => {
            let arr = col.as_primitive::<Date32Type>();
            arr.value_as_date(row)
                .ok_or_else(|| invalid(arr.value(row).to_string()))
        }
        DataType::Date64 => {
            let arr = col.as_primitive::<Date64Type>();
            arr.value_as_date(row)
                .ok_or_else(|| invalid(arr.value(row).to_string()))
        }
        DataType::Utf8 | DataType::LargeUtf8 => {
            let text = text_at(col, row).unwrap_or_default();
            parse_order_date(text).ok_or_else(|| invalid(text.to_string()))
        }
        _ => Err(unsupported(col, NAME)),
    }
}
