//! Export of the working set (CSV) and of the aggregate summary (JSON).

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::aggregate::AggregateResult;
use crate::data::{WorkingSet, SOURCE_COLUMNS};

/// MIME type of the CSV export.
pub const CSV_MIME: &str = "text/csv";
/// MIME type of the JSON summary.
pub const JSON_MIME: &str = "application/json";

/// Date format written to the `Order Date` column.
const EXPORT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A named, typed blob ready to be saved or handed to a download mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub fn write_to(&self, path: &Path) -> Result<(), ExportError> {
        fs::write(path, &self.bytes)?;
        log::info!("Wrote {} bytes to {}", self.bytes.len(), path.display());
        Ok(())
    }
}

/// One exported row: the source columns only, no index and no derived columns.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    region: &'a str,
    category: &'a str,
    segment: &'a str,
    sub_category: &'a str,
    product_name: &'a str,
    order_date: String,
    sales: f64,
    profit: f64,
}

fn source_stem(source: &Path) -> &str {
    source
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("data")
}

/// `filtered_<source stem>.csv`
pub fn export_file_name(source: &Path) -> String {
    format!("filtered_{}.csv", source_stem(source))
}

/// `summary_<source stem>.json`
pub fn summary_file_name(source: &Path) -> String {
    format!("summary_{}.json", source_stem(source))
}

/// Written ahead of the header so the loader recognizes the file as UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write the working set as UTF-8 CSV with a leading BOM. The header is always
/// written, so an empty working set yields a header-only file. Returns the
/// number of rows.
pub fn write_csv<W: Write>(ws: &WorkingSet<'_>, mut writer: W) -> Result<usize, ExportError> {
    writer.write_all(UTF8_BOM)?;
    let mut out = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    out.write_record(SOURCE_COLUMNS)?;
    for r in ws.iter() {
        out.serialize(ExportRow {
            region: &r.region,
            category: &r.category,
            segment: &r.segment,
            sub_category: &r.sub_category,
            product_name: &r.product_name,
            order_date: r.order_date.format(EXPORT_DATE_FORMAT).to_string(),
            sales: r.sales,
            profit: r.profit,
        })?;
    }
    out.flush()?;
    Ok(ws.len())
}

/// Build the downloadable CSV for the current working set.
pub fn csv_artifact(source: &Path, ws: &WorkingSet<'_>) -> Result<ExportArtifact, ExportError> {
    let mut bytes = Vec::new();
    let rows = write_csv(ws, &mut bytes)?;
    log::info!("Exported {rows} filtered rows from {}", source.display());
    Ok(ExportArtifact {
        file_name: export_file_name(source),
        mime: CSV_MIME,
        bytes,
    })
}

/// Build the pretty-printed JSON summary of the current aggregates.
pub fn summary_artifact(source: &Path, result: &AggregateResult) -> Result<ExportArtifact, ExportError> {
    let bytes = serde_json::to_vec_pretty(result)?;
    Ok(ExportArtifact {
        file_name: summary_file_name(source),
        mime: JSON_MIME,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{aggregate, DEFAULT_TOP_N};
    use crate::data::model::tests::record;
    use crate::data::{FilterSelection, SalesDataset};

    #[test]
    fn file_names_follow_source_stem() {
        assert_eq!(export_file_name(Path::new("/tmp/superstore.csv")), "filtered_superstore.csv");
        assert_eq!(summary_file_name(Path::new("sales.parquet")), "summary_sales.json");
        assert_eq!(export_file_name(Path::new("")), "filtered_data.csv");
    }

    #[test]
    fn empty_working_set_exports_header_only() {
        let ws = WorkingSet::from_records(Vec::new());
        let mut out = Vec::new();
        assert_eq!(write_csv(&ws, &mut out).unwrap(), 0);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\u{feff}Region,Category,Segment,Sub-Category,Product Name,Order Date,Sales,Profit\n"
        );
    }

    #[test]
    fn rows_are_quoted_and_dates_iso() {
        let ds = SalesDataset::from_records(vec![record(
            "East",
            "Furniture",
            "Consumer",
            "Table, Oak",
            (2016, 11, 8),
            261.96,
            -3.5,
        )]);
        let ws = WorkingSet::apply(&ds, &FilterSelection::all(&ds));
        let artifact = csv_artifact(Path::new("superstore.csv"), &ws).unwrap();
        assert_eq!(artifact.mime, "text/csv");
        assert_eq!(artifact.file_name, "filtered_superstore.csv");
        let text = String::from_utf8(artifact.bytes).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert_eq!(row, "East,Furniture,Consumer,Furniture Sub,\"Table, Oak\",2016-11-08,261.96,-3.5");
    }

    #[test]
    fn summary_json_marks_undefined_margin_as_null() {
        let ds = SalesDataset::from_records(vec![record(
            "East", "Furniture", "Consumer", "Chair", (2016, 1, 1), 0.0, 5.0,
        )]);
        let ws = WorkingSet::apply(&ds, &FilterSelection::all(&ds));
        let artifact = summary_artifact(Path::new("s.csv"), &aggregate(&ws, DEFAULT_TOP_N)).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&artifact.bytes).unwrap();
        assert!(value["avg_profit_margin"].is_null());
        assert_eq!(value["row_count"], 1);
        assert_eq!(value["top_products"][0]["product_name"], "Chair");
        assert_eq!(value["pivot"]["regions"][0], "East");
    }
}
