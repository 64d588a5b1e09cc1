use std::collections::{BTreeMap, BTreeSet};

use super::model::{Dimension, Record, SalesDataset};

// ---------------------------------------------------------------------------
// Filter predicate: which values are allowed per dimension
// ---------------------------------------------------------------------------

/// Per-dimension selection state: maps dimension → set of allowed values.
///
/// A dimension that is absent or has an empty set allows nothing, so the
/// working set is empty. Dimensions are combined with logical AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    allowed: BTreeMap<Dimension, BTreeSet<String>>,
}

impl FilterSelection {
    /// A selection that allows every value observed in `dataset` (no filtering).
    pub fn all(dataset: &SalesDataset) -> Self {
        FilterSelection {
            allowed: dataset.unique_values.clone(),
        }
    }

    /// Build a selection from explicit allowed values for each dimension.
    pub fn new<R, C, S>(regions: R, categories: C, segments: S) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        let mut allowed: BTreeMap<Dimension, BTreeSet<String>> = BTreeMap::new();
        allowed.insert(Dimension::Region, regions.into_iter().map(Into::<String>::into).collect());
        allowed.insert(Dimension::Category, categories.into_iter().map(Into::<String>::into).collect());
        allowed.insert(Dimension::Segment, segments.into_iter().map(Into::<String>::into).collect());
        FilterSelection { allowed }
    }

    /// Number of allowed values for one dimension.
    pub fn selected_count(&self, dim: Dimension) -> usize {
        self.allowed.get(&dim).map_or(0, BTreeSet::len)
    }

    pub fn is_selected(&self, dim: Dimension, value: &str) -> bool {
        self.allowed.get(&dim).is_some_and(|set| set.contains(value))
    }

    /// Whether `record` passes every dimension's predicate.
    pub fn matches(&self, record: &Record) -> bool {
        Dimension::ALL
            .iter()
            .all(|dim| self.is_selected(*dim, dim.value_of(record)))
    }

    /// Add or remove a single value.
    pub fn set(&mut self, dim: Dimension, value: &str, selected: bool) {
        let set = self.allowed.entry(dim).or_default();
        if selected {
            set.insert(value.to_string());
        } else {
            set.remove(value);
        }
    }

    /// Flip a single value.
    pub fn toggle(&mut self, dim: Dimension, value: &str) {
        let selected = self.is_selected(dim, value);
        self.set(dim, value, !selected);
    }

    /// Allow every observed value for a dimension.
    pub fn select_all(&mut self, dim: Dimension, dataset: &SalesDataset) {
        let values = dataset.values(dim).cloned().unwrap_or_default();
        self.allowed.insert(dim, values);
    }

    /// Allow nothing for a dimension.
    pub fn select_none(&mut self, dim: Dimension) {
        self.allowed.insert(dim, BTreeSet::new());
    }
}

// ---------------------------------------------------------------------------
// WorkingSet: the rows currently in view
// ---------------------------------------------------------------------------

/// Records passing the current filters, borrowed from the dataset in source order.
#[derive(Debug, Clone)]
pub struct WorkingSet<'a> {
    records: Vec<&'a Record>,
}

impl<'a> WorkingSet<'a> {
    /// Apply `selection` to `dataset`.
    pub fn apply(dataset: &'a SalesDataset, selection: &FilterSelection) -> Self {
        let records = dataset
            .records
            .iter()
            .filter(|record| selection.matches(record))
            .collect();
        WorkingSet { records }
    }

    /// Wrap a list of records that has already been filtered.
    pub fn from_records(records: Vec<&'a Record>) -> Self {
        WorkingSet { records }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.records.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    fn dataset() -> SalesDataset {
        SalesDataset::from_records(vec![
            record("East", "Furniture", "Consumer", "Chair", (2016, 1, 1), 100.0, 10.0),
            record("West", "Furniture", "Corporate", "Desk", (2016, 1, 5), 200.0, 20.0),
            record("East", "Technology", "Corporate", "Phone", (2016, 2, 1), 300.0, 30.0),
            record("West", "Technology", "Consumer", "Laptop", (2016, 3, 1), 400.0, 40.0),
        ])
    }

    #[test]
    fn default_selection_keeps_everything() {
        let ds = dataset();
        let ws = WorkingSet::apply(&ds, &FilterSelection::all(&ds));
        assert_eq!(ws.len(), ds.len());
    }

    #[test]
    fn dimensions_combine_conjunctively() {
        let ds = dataset();
        let sel = FilterSelection::new(["East"], ["Furniture", "Technology"], ["Corporate"]);
        let ws = WorkingSet::apply(&ds, &sel);
        let products: Vec<_> = ws.iter().map(|r| r.product_name.as_str()).collect();
        assert_eq!(products, vec!["Phone"]);
    }

    #[test]
    fn included_and_excluded_partition_the_dataset() {
        let ds = dataset();
        let sel = FilterSelection::new(["West"], ["Furniture", "Technology"], ["Consumer", "Corporate"]);
        let ws = WorkingSet::apply(&ds, &sel);
        for r in &ds.records {
            let included = ws.iter().any(|w| std::ptr::eq(w, r));
            assert_eq!(included, sel.matches(r));
            assert_eq!(included, r.region == "West");
        }
    }

    #[test]
    fn empty_dimension_selects_nothing() {
        let ds = dataset();
        let mut sel = FilterSelection::all(&ds);
        sel.select_none(Dimension::Category);
        assert!(WorkingSet::apply(&ds, &sel).is_empty());

        assert!(WorkingSet::apply(&ds, &FilterSelection::default()).is_empty());
    }

    #[test]
    fn toggle_and_select_all_round_trip() {
        let ds = dataset();
        let mut sel = FilterSelection::all(&ds);
        sel.toggle(Dimension::Region, "West");
        assert!(!sel.is_selected(Dimension::Region, "West"));
        assert_eq!(WorkingSet::apply(&ds, &sel).len(), 2);

        sel.toggle(Dimension::Region, "West");
        assert_eq!(sel.selected_count(Dimension::Region), 2);

        sel.select_none(Dimension::Segment);
        sel.select_all(Dimension::Segment, &ds);
        assert_eq!(sel, FilterSelection::all(&ds));
    }

    #[test]
    fn working_set_preserves_source_order() {
        let ds = dataset();
        let sel = FilterSelection::new(["East", "West"], ["Technology"], ["Consumer", "Corporate"]);
        let dates: Vec<_> = WorkingSet::apply(&ds, &sel).iter().map(|r| r.order_month.clone()).collect();
        assert_eq!(dates, vec!["2016-02", "2016-03"]);
    }
}
