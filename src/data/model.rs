use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{Datelike, NaiveDate};

/// Header names every source table must carry, in export order.
pub const SOURCE_COLUMNS: [&str; 8] = [
    "Region",
    "Category",
    "Segment",
    "Sub-Category",
    "Product Name",
    "Order Date",
    "Sales",
    "Profit",
];

// ---------------------------------------------------------------------------
// Dimension – the categorical fields a user can filter on
// ---------------------------------------------------------------------------

/// A filterable categorical column of the sales table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    Region,
    Category,
    Segment,
}

impl Dimension {
    /// All filterable dimensions, in sidebar order.
    pub const ALL: [Dimension; 3] = [Dimension::Region, Dimension::Category, Dimension::Segment];

    /// Column name as it appears in the source header.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::Region => "Region",
            Dimension::Category => "Category",
            Dimension::Segment => "Segment",
        }
    }

    /// The record's value for this dimension.
    pub fn value_of(self, record: &Record) -> &str {
        match self {
            Dimension::Region => &record.region,
            Dimension::Category => &record.category,
            Dimension::Segment => &record.segment,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the sales table
// ---------------------------------------------------------------------------

/// A single sales transaction plus the columns derived from it at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub region: String,
    pub category: String,
    pub sub_category: String,
    pub segment: String,
    pub product_name: String,
    pub order_date: NaiveDate,
    pub sales: f64,
    pub profit: f64,
    /// `profit / sales`, or `None` when sales is zero.
    pub profit_margin: Option<f64>,
    /// Calendar month of `order_date` as `YYYY-MM`.
    pub order_month: String,
}

/// The source columns of a record, before derivation.
#[derive(Debug, Clone)]
pub struct RecordFields {
    pub region: String,
    pub category: String,
    pub sub_category: String,
    pub segment: String,
    pub product_name: String,
    pub order_date: NaiveDate,
    pub sales: f64,
    pub profit: f64,
}

impl Record {
    /// Build a record and compute its derived columns.
    pub fn new(fields: RecordFields) -> Self {
        let profit_margin = profit_margin(fields.profit, fields.sales);
        let order_month = order_month(fields.order_date);
        Record {
            region: fields.region,
            category: fields.category,
            sub_category: fields.sub_category,
            segment: fields.segment,
            product_name: fields.product_name,
            order_date: fields.order_date,
            sales: fields.sales,
            profit: fields.profit,
            profit_margin,
            order_month,
        }
    }
}

/// Profit over sales. Undefined (`None`) for zero sales or a non-finite quotient.
pub fn profit_margin(profit: f64, sales: f64) -> Option<f64> {
    if sales == 0.0 {
        return None;
    }
    let margin = profit / sales;
    margin.is_finite().then_some(margin)
}

/// Truncate a date to its month key, `YYYY-MM`.
pub fn order_month(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

// ---------------------------------------------------------------------------
// SalesDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with the distinct values of each filter dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesDataset {
    /// All records, in source order.
    pub records: Vec<Record>,
    /// For each dimension the sorted set of observed values.
    pub unique_values: BTreeMap<Dimension, BTreeSet<String>>,
}

impl SalesDataset {
    /// Build dimension indices from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut unique_values: BTreeMap<Dimension, BTreeSet<String>> = Dimension::ALL
            .iter()
            .map(|dim| (*dim, BTreeSet::new()))
            .collect();

        for record in &records {
            for dim in Dimension::ALL {
                if let Some(values) = unique_values.get_mut(&dim) {
                    values.insert(dim.value_of(record).to_string());
                }
            }
        }

        SalesDataset {
            records,
            unique_values,
        }
    }

    /// Observed values for one dimension.
    pub fn values(&self, dim: Dimension) -> Option<&BTreeSet<String>> {
        self.unique_values.get(&dim)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
