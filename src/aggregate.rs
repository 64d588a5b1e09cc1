//! KPIs and grouped summaries over a [`WorkingSet`].
//!
//! Everything here is a pure function of its input: the same working set
//! always yields the same [`AggregateResult`], including ordering.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::{FilterSelection, SalesDataset, WorkingSet};

/// Number of products shown in the top-products table unless configured otherwise.
pub const DEFAULT_TOP_N: usize = 10;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Total sales for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySales {
    /// `YYYY-MM`
    pub month: String,
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubCategoryPerformance {
    pub sub_category: String,
    pub sales: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSales {
    pub product_name: String,
    pub sales: f64,
}

/// Sales summed per (Region, Category).
///
/// Combinations absent from the working set have no cell; [`SalesPivot::get`]
/// returns `None` for them rather than zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SalesPivot {
    /// Row keys, sorted.
    pub regions: Vec<String>,
    /// Column keys, sorted.
    pub categories: Vec<String>,
    /// region → category → sales
    cells: BTreeMap<String, BTreeMap<String, f64>>,
}

impl SalesPivot {
    pub fn get(&self, region: &str, category: &str) -> Option<f64> {
        self.cells.get(region)?.get(category).copied()
    }

    /// Largest cell value, for scaling a colour ramp.
    pub fn max_value(&self) -> Option<f64> {
        self.cells
            .values()
            .flat_map(|row| row.values().copied())
            .reduce(f64::max)
    }

    /// Smallest cell value.
    pub fn min_value(&self) -> Option<f64> {
        self.cells
            .values()
            .flat_map(|row| row.values().copied())
            .reduce(f64::min)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Everything the dashboard shows for one filter state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    /// Rows in the working set.
    pub row_count: usize,
    pub total_sales: f64,
    pub total_profit: f64,
    /// Mean of the defined per-row margins; `None` when no row has one.
    pub avg_profit_margin: Option<f64>,
    /// Ascending by month.
    pub monthly_sales: Vec<MonthlySales>,
    /// Ascending by sub-category name.
    pub sub_categories: Vec<SubCategoryPerformance>,
    pub pivot: SalesPivot,
    /// Descending by sales, ties by product name ascending.
    pub top_products: Vec<ProductSales>,
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Filter `dataset` with `selection` and aggregate the result.
pub fn compute(dataset: &SalesDataset, selection: &FilterSelection, top_n: usize) -> AggregateResult {
    let working_set = WorkingSet::apply(dataset, selection);
    log::debug!(
        "Recomputing aggregates: {} of {} rows in view",
        working_set.len(),
        dataset.len()
    );
    aggregate(&working_set, top_n)
}

/// Aggregate an already filtered working set.
pub fn aggregate(ws: &WorkingSet<'_>, top_n: usize) -> AggregateResult {
    AggregateResult {
        row_count: ws.len(),
        total_sales: total_sales(ws),
        total_profit: total_profit(ws),
        avg_profit_margin: average_profit_margin(ws),
        monthly_sales: monthly_sales(ws),
        sub_categories: sub_category_performance(ws),
        pivot: region_category_pivot(ws),
        top_products: top_products(ws, top_n),
    }
}

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

pub fn total_sales(ws: &WorkingSet<'_>) -> f64 {
    ws.iter().map(|r| r.sales).sum()
}

pub fn total_profit(ws: &WorkingSet<'_>) -> f64 {
    ws.iter().map(|r| r.profit).sum()
}

/// Mean profit margin, skipping rows whose margin is undefined.
pub fn average_profit_margin(ws: &WorkingSet<'_>) -> Option<f64> {
    let (sum, count) = ws
        .iter()
        .filter_map(|r| r.profit_margin)
        .fold((0.0, 0usize), |(sum, count), m| (sum + m, count + 1));
    (count > 0).then(|| sum / count as f64)
}

// ---------------------------------------------------------------------------
// Grouped summaries
// ---------------------------------------------------------------------------

pub fn monthly_sales(ws: &WorkingSet<'_>) -> Vec<MonthlySales> {
    let mut by_month: BTreeMap<&str, f64> = BTreeMap::new();
    for r in ws.iter() {
        *by_month.entry(r.order_month.as_str()).or_default() += r.sales;
    }
    by_month
        .into_iter()
        .map(|(month, sales)| MonthlySales {
            month: month.to_string(),
            sales,
        })
        .collect()
}

pub fn sub_category_performance(ws: &WorkingSet<'_>) -> Vec<SubCategoryPerformance> {
    let mut groups: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for r in ws.iter() {
        let entry = groups.entry(r.sub_category.as_str()).or_default();
        entry.0 += r.sales;
        entry.1 += r.profit;
    }
    groups
        .into_iter()
        .map(|(name, (sales, profit))| SubCategoryPerformance {
            sub_category: name.to_string(),
            sales,
            profit,
        })
        .collect()
}

pub fn region_category_pivot(ws: &WorkingSet<'_>) -> SalesPivot {
    let mut cells: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    for r in ws.iter() {
        *cells
            .entry(r.region.clone())
            .or_default()
            .entry(r.category.clone())
            .or_default() += r.sales;
    }

    let regions: Vec<String> = cells.keys().cloned().collect();
    let mut categories: Vec<String> = cells
        .values()
        .flat_map(|row| row.keys().cloned())
        .collect();
    categories.sort();
    categories.dedup();

    SalesPivot {
        regions,
        categories,
        cells,
    }
}

/// The `n` best-selling products by summed sales.
pub fn top_products(ws: &WorkingSet<'_>, n: usize) -> Vec<ProductSales> {
    let mut by_product: BTreeMap<&str, f64> = BTreeMap::new();
    for r in ws.iter() {
        *by_product.entry(r.product_name.as_str()).or_default() += r.sales;
    }

    // BTreeMap iteration is name-ascending and the sort is stable, so equal
    // sales keep name order.
    let mut ranked: Vec<ProductSales> = by_product
        .into_iter()
        .map(|(name, sales)| ProductSales {
            product_name: name.to_string(),
            sales,
        })
        .collect();
    ranked.sort_by(|a, b| b.sales.total_cmp(&a.sales));
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;
    use crate::data::Dimension;
    use approx::assert_relative_eq;

    fn dataset() -> SalesDataset {
        SalesDataset::from_records(vec![
            record("East", "Furniture", "Consumer", "Chair", (2016, 1, 10), 100.0, 20.0),
            record("West", "Furniture", "Corporate", "Desk", (2016, 1, 20), 250.0, -50.0),
            record("East", "Technology", "Corporate", "Phone", (2016, 3, 1), 300.0, 60.0),
            record("East", "Technology", "Consumer", "Chair", (2016, 2, 14), 50.0, 5.0),
            record("West", "Office Supplies", "Consumer", "Pen", (2016, 2, 2), 0.0, 5.0),
        ])
    }

    #[test]
    fn kpis_over_everything() {
        let ds = dataset();
        let result = compute(&ds, &FilterSelection::all(&ds), DEFAULT_TOP_N);
        assert_eq!(result.row_count, 5);
        assert_relative_eq!(result.total_sales, 700.0);
        assert_relative_eq!(result.total_profit, 40.0);
        // margins: 0.2, -0.2, 0.2, 0.1; the zero-sales row is skipped
        assert_relative_eq!(result.avg_profit_margin.unwrap(), 0.075, epsilon = 1e-12);
    }

    #[test]
    fn zero_sales_row_still_counts_toward_sums() {
        let ds = dataset();
        let sel = FilterSelection::new(["West"], ["Office Supplies"], ["Consumer"]);
        let result = compute(&ds, &sel, DEFAULT_TOP_N);
        assert_eq!(result.row_count, 1);
        assert_relative_eq!(result.total_profit, 5.0);
        assert_eq!(result.avg_profit_margin, None);
    }

    #[test]
    fn monthly_series_is_sorted_and_sums_to_total() {
        let ds = dataset();
        let result = compute(&ds, &FilterSelection::all(&ds), DEFAULT_TOP_N);
        let months: Vec<_> = result.monthly_sales.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["2016-01", "2016-02", "2016-03"]);
        assert_relative_eq!(result.monthly_sales[0].sales, 350.0);
        let series_total: f64 = result.monthly_sales.iter().map(|m| m.sales).sum();
        assert_relative_eq!(series_total, result.total_sales);
    }

    #[test]
    fn sub_categories_sum_sales_and_profit() {
        let ds = dataset();
        let result = compute(&ds, &FilterSelection::all(&ds), DEFAULT_TOP_N);
        let tech = result
            .sub_categories
            .iter()
            .find(|s| s.sub_category == "Technology Sub")
            .unwrap();
        assert_relative_eq!(tech.sales, 350.0);
        assert_relative_eq!(tech.profit, 65.0);
        assert_eq!(result.sub_categories.len(), 3);
    }

    #[test]
    fn pivot_leaves_missing_combinations_empty() {
        let ds = dataset();
        let result = compute(&ds, &FilterSelection::all(&ds), DEFAULT_TOP_N);
        let pivot = &result.pivot;
        assert_eq!(pivot.regions, vec!["East", "West"]);
        assert_eq!(pivot.categories, vec!["Furniture", "Office Supplies", "Technology"]);
        assert_eq!(pivot.get("East", "Technology"), Some(350.0));
        assert_eq!(pivot.get("West", "Office Supplies"), Some(0.0));
        assert_eq!(pivot.get("East", "Office Supplies"), None);
        assert_eq!(pivot.cell_count(), 4);
        assert_eq!(pivot.max_value(), Some(350.0));
        assert_eq!(pivot.min_value(), Some(0.0));
    }

    #[test]
    fn top_products_merge_by_name_and_rank_descending() {
        let ds = dataset();
        let result = compute(&ds, &FilterSelection::all(&ds), DEFAULT_TOP_N);
        let names: Vec<_> = result.top_products.iter().map(|p| p.product_name.as_str()).collect();
        assert_eq!(names, vec!["Phone", "Desk", "Chair", "Pen"]);
        assert_relative_eq!(result.top_products[2].sales, 150.0);
    }

    #[test]
    fn top_products_ties_break_by_name() {
        let ds = SalesDataset::from_records(vec![
            record("East", "Furniture", "Consumer", "Zebra Lamp", (2016, 1, 1), 10.0, 1.0),
            record("East", "Furniture", "Consumer", "Apple Stand", (2016, 1, 1), 10.0, 1.0),
            record("East", "Furniture", "Consumer", "Mango Shelf", (2016, 1, 1), 10.0, 1.0),
        ]);
        let ws = WorkingSet::apply(&ds, &FilterSelection::all(&ds));
        let names: Vec<_> = top_products(&ws, 2).into_iter().map(|p| p.product_name).collect();
        assert_eq!(names, vec!["Apple Stand", "Mango Shelf"]);
    }

    #[test]
    fn top_products_truncate_to_n() {
        let records = (0..25)
            .map(|i| record("East", "Furniture", "Consumer", &format!("P{i:02}"), (2016, 1, 1), i as f64, 0.0))
            .collect();
        let ds = SalesDataset::from_records(records);
        let result = compute(&ds, &FilterSelection::all(&ds), DEFAULT_TOP_N);
        assert_eq!(result.top_products.len(), 10);
        assert_eq!(result.top_products[0].product_name, "P24");
        assert!(result.top_products.windows(2).all(|w| w[0].sales >= w[1].sales));
    }

    #[test]
    fn empty_working_set_degrades_gracefully() {
        let ds = dataset();
        let mut sel = FilterSelection::all(&ds);
        sel.select_none(Dimension::Category);
        let result = compute(&ds, &sel, DEFAULT_TOP_N);
        assert_eq!(result.row_count, 0);
        assert_eq!(result.total_sales, 0.0);
        assert_eq!(result.total_profit, 0.0);
        assert_eq!(result.avg_profit_margin, None);
        assert!(result.monthly_sales.is_empty());
        assert!(result.sub_categories.is_empty());
        assert!(result.pivot.is_empty());
        assert_eq!(result.pivot.max_value(), None);
        assert!(result.top_products.is_empty());
    }
}
