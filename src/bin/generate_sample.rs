//! Writes a deterministic synthetic sales table as `<stem>.csv` and
//! `<stem>.parquet` (default stem `superstore_sample`).

use std::fs::File;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Date32Array, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;

use sales_dashboard::data::{Record, RecordFields, WorkingSet, SOURCE_COLUMNS};
use sales_dashboard::present::write_csv;

const ROWS: usize = 2_000;

const REGIONS: [&str; 4] = ["Central", "East", "South", "West"];
const SEGMENTS: [&str; 3] = ["Consumer", "Corporate", "Home Office"];

/// (category, sub-category, products, typical unit price)
const CATALOG: [(&str, &str, &[&str], f64); 6] = [
    ("Furniture", "Chairs", &["Hon Deluxe Fabric Task Chair", "Global Leather Executive Chair"], 320.0),
    ("Furniture", "Tables", &["Bretford Rectangular Conference Table", "Barricks Round Table"], 650.0),
    ("Office Supplies", "Binders", &["Avery Durable Binder", "Wilson Jones Easy Open Binder"], 18.0),
    ("Office Supplies", "Paper", &["Xerox Copy Paper 500 Sheets", "Easy-staple Paper"], 12.0),
    ("Technology", "Phones", &["Cisco IP Phone 7945G", "Samsung Galaxy Mega"], 480.0),
    ("Technology", "Machines", &["Canon imageCLASS Copier", "HP Designjet Printer"], 1_900.0),
];

/// SplitMix64: small, deterministic, good enough for fake data.
struct SplitMix64(u64);

impl SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }
}

fn generate(rng: &mut SplitMix64, start: NaiveDate, days: i64) -> Vec<Record> {
    (0..ROWS)
        .map(|_| {
            let (category, sub_category, products, unit_price) = *rng.pick(&CATALOG);
            let quantity = 1.0 + rng.below(6) as f64;
            let discount = [0.0, 0.0, 0.1, 0.2, 0.5][rng.below(5)];
            let price = unit_price * (0.6 + 0.8 * rng.next_f64());
            // Roughly 1 in 200 rows is a free replacement with zero sales.
            let sales = if rng.below(200) == 0 {
                0.0
            } else {
                (price * quantity * (1.0 - discount) * 100.0).round() / 100.0
            };
            let margin = 0.35 - discount * 1.2 + 0.1 * (rng.next_f64() - 0.5);
            let profit = if sales == 0.0 {
                -(price * 0.3 * 100.0).round() / 100.0
            } else {
                (sales * margin * 10_000.0).round() / 10_000.0
            };

            Record::new(RecordFields {
                region: rng.pick(&REGIONS).to_string(),
                category: category.to_string(),
                sub_category: sub_category.to_string(),
                segment: rng.pick(&SEGMENTS).to_string(),
                product_name: rng.pick(products).to_string(),
                order_date: start + Duration::days(rng.below(days as usize) as i64),
                sales,
                profit,
            })
        })
        .collect()
}

fn write_parquet(path: &str, records: &[Record]) -> Result<()> {
    let text = |f: fn(&Record) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(records.iter().map(f).collect::<Vec<_>>()))
    };
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("epoch date")?;
    let dates = Date32Array::from(
        records
            .iter()
            .map(|r| (r.order_date - epoch).num_days() as i32)
            .collect::<Vec<_>>(),
    );
    let sales = Float64Array::from(records.iter().map(|r| r.sales).collect::<Vec<_>>());
    let profit = Float64Array::from(records.iter().map(|r| r.profit).collect::<Vec<_>>());

    let fields = SOURCE_COLUMNS
        .iter()
        .map(|name| {
            let data_type = match *name {
                "Order Date" => DataType::Date32,
                "Sales" | "Profit" => DataType::Float64,
                _ => DataType::Utf8,
            };
            Field::new(*name, data_type, false)
        })
        .collect::<Vec<_>>();
    let schema = Arc::new(Schema::new(fields));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            text(|r| &r.region),
            text(|r| &r.category),
            text(|r| &r.segment),
            text(|r| &r.sub_category),
            text(|r| &r.product_name),
            Arc::new(dates),
            Arc::new(sales),
            Arc::new(profit),
        ],
    )
    .context("building record batch")?;

    let file = File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let stem = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "superstore_sample".to_string());
    let start = NaiveDate::from_ymd_opt(2014, 1, 1).context("start date")?;
    let end = NaiveDate::from_ymd_opt(2017, 12, 31).context("end date")?;

    let mut rng = SplitMix64(42);
    let records = generate(&mut rng, start, (end - start).num_days() + 1);

    let csv_path = format!("{stem}.csv");
    let file = File::create(&csv_path).with_context(|| format!("creating {csv_path}"))?;
    write_csv(&WorkingSet::from_records(records.iter().collect()), file)?;

    let parquet_path = format!("{stem}.parquet");
    write_parquet(&parquet_path, &records)?;

    println!("Wrote {} orders to {csv_path} and {parquet_path}", records.len());
    Ok(())
}
