use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::aggregate::{compute, AggregateResult};
use crate::config::DashboardConfig;
use crate::data::{DatasetCache, Dimension, FilterSelection, SalesDataset, WorkingSet};
use crate::present::{csv_artifact, summary_artifact, ExportArtifact};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Memoized source table.
    cache: DatasetCache,

    /// Path of the loaded source (None until a file loads).
    pub source: Option<PathBuf>,

    /// Loaded dataset, shared with the cache.
    pub dataset: Option<Arc<SalesDataset>>,

    /// Per-dimension filter selections.
    pub filters: FilterSelection,

    /// Aggregates for the current filters (recomputed on every change).
    pub result: Option<AggregateResult>,

    /// Whether the chart section is rendered.
    pub show_charts: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            show_charts: config.show_charts,
            config,
            cache: DatasetCache::new(),
            source: None,
            dataset: None,
            filters: FilterSelection::default(),
            result: None,
            status_message: None,
        }
    }

    /// Load `path` (through the cache) and make it the active dataset.
    /// On failure the previous dataset stays in place.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let dataset = self
            .cache
            .get_or_load(path, self.config.encoding)
            .with_context(|| format!("loading {}", path.display()))?;
        self.set_dataset(path.to_path_buf(), dataset);
        Ok(())
    }

    /// Drop the cached table and read the current source again.
    pub fn reload(&mut self) -> Result<()> {
        let path = self.source.clone().context("no source loaded")?;
        self.cache.invalidate();
        self.open(&path)
    }

    /// Ingest a newly loaded dataset and recompute. Filters reset to
    /// "everything" unless the same source came back with the same values
    /// in every dimension.
    pub fn set_dataset(&mut self, source: PathBuf, dataset: Arc<SalesDataset>) {
        let same_source = self.source.as_deref() == Some(source.as_path());
        let unchanged = same_source
            && self.dataset.as_ref().is_some_and(|current| {
                Arc::ptr_eq(current, &dataset) || current.unique_values == dataset.unique_values
            });
        if !unchanged {
            self.filters = FilterSelection::all(&dataset);
        }
        self.source = Some(source);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.recompute();
    }

    /// Recompute aggregates after a filter change.
    pub fn recompute(&mut self) {
        self.result = self
            .dataset
            .as_ref()
            .map(|ds| compute(ds, &self.filters, self.config.top_n));
    }

    /// Set a single value in a dimension's filter.
    pub fn set_filter_value(&mut self, dim: Dimension, value: &str, selected: bool) {
        self.filters.set(dim, value, selected);
        self.recompute();
    }

    /// Toggle a single value in a dimension's filter.
    pub fn toggle_filter_value(&mut self, dim: Dimension, value: &str) {
        self.filters.toggle(dim, value);
        self.recompute();
    }

    /// Select all values in a dimension.
    pub fn select_all(&mut self, dim: Dimension) {
        if let Some(ds) = &self.dataset {
            self.filters.select_all(dim, ds);
            self.recompute();
        }
    }

    /// Deselect all values in a dimension.
    pub fn select_none(&mut self, dim: Dimension) {
        self.filters.select_none(dim);
        self.recompute();
    }

    /// CSV of the rows currently in view.
    pub fn csv_export(&self) -> Result<ExportArtifact> {
        let (source, dataset) = self.loaded()?;
        let ws = WorkingSet::apply(dataset, &self.filters);
        Ok(csv_artifact(source, &ws)?)
    }

    /// JSON of the aggregates currently shown.
    pub fn summary_export(&self) -> Result<ExportArtifact> {
        let (source, _) = self.loaded()?;
        let result = self.result.as_ref().context("no aggregates computed")?;
        Ok(summary_artifact(source, result)?)
    }

    /// Record a failure for the status line.
    pub fn report_error(&mut self, err: &anyhow::Error) {
        log::error!("{err:#}");
        self.status_message = Some(format!("Error: {err:#}"));
    }

    fn loaded(&self) -> Result<(&Path, &SalesDataset)> {
        match (&self.source, &self.dataset) {
            (Some(source), Some(dataset)) => Ok((source.as_path(), dataset.as_ref())),
            _ => anyhow::bail!("no dataset loaded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SourceEncoding;
    use std::fs;

    const CSV: &str = "Region,Category,Segment,Sub-Category,Product Name,Order Date,Sales,Profit\n\
                       East,Furniture,Consumer,Chairs,Chair,2016-01-01,100,10\n\
                       West,Technology,Corporate,Phones,Phone,2016-02-01,200,-20\n";

    fn state_with(dir: &Path) -> (AppState, PathBuf) {
        let path = dir.join("superstore.csv");
        fs::write(&path, CSV).unwrap();
        let config = DashboardConfig {
            encoding: SourceEncoding::Utf8,
            ..DashboardConfig::default()
        };
        (AppState::new(config), path)
    }

    #[test]
    fn open_selects_everything_and_computes() {
        let dir = tempfile::tempdir().unwrap();
        let (mut state, path) = state_with(dir.path());
        state.open(&path).unwrap();

        let result = state.result.as_ref().unwrap();
        assert_eq!(result.row_count, 2);
        assert_eq!(result.total_sales, 300.0);
        assert_eq!(state.filters.selected_count(Dimension::Region), 2);
    }

    #[test]
    fn filter_edits_recompute() {
        let dir = tempfile::tempdir().unwrap();
        let (mut state, path) = state_with(dir.path());
        state.open(&path).unwrap();

        state.toggle_filter_value(Dimension::Region, "West");
        assert_eq!(state.result.as_ref().unwrap().total_sales, 100.0);

        state.select_none(Dimension::Segment);
        assert_eq!(state.result.as_ref().unwrap().row_count, 0);

        state.select_all(Dimension::Segment);
        state.set_filter_value(Dimension::Region, "West", true);
        assert_eq!(state.result.as_ref().unwrap().row_count, 2);
    }

    #[test]
    fn reload_keeps_source_and_failed_open_keeps_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let (mut state, path) = state_with(dir.path());
        state.open(&path).unwrap();
        state.reload().unwrap();
        assert_eq!(state.source.as_deref(), Some(path.as_path()));

        let bad = dir.path().join("bad.csv");
        fs::write(&bad, "Region\nEast\n").unwrap();
        assert!(state.open(&bad).is_err());
        assert_eq!(state.source.as_deref(), Some(path.as_path()));
        assert!(state.dataset.is_some());
    }

    #[test]
    fn reload_keeps_filters_unless_values_change() {
        let dir = tempfile::tempdir().unwrap();
        let (mut state, path) = state_with(dir.path());
        state.open(&path).unwrap();
        state.toggle_filter_value(Dimension::Region, "West");

        state.reload().unwrap();
        assert!(!state.filters.is_selected(Dimension::Region, "West"));
        assert_eq!(state.result.as_ref().unwrap().row_count, 1);

        fs::write(&path, format!("{CSV}South,Furniture,Consumer,Chairs,Stool,2016-03-01,50,5\n")).unwrap();
        state.reload().unwrap();
        assert!(state.filters.is_selected(Dimension::Region, "West"));
        assert_eq!(state.filters.selected_count(Dimension::Region), 3);
        assert_eq!(state.result.as_ref().unwrap().row_count, 3);
    }

    #[test]
    fn exported_csv_reopens_unchanged_with_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("superstore.csv");
        let mut bytes = CSV.lines().next().unwrap().as_bytes().to_vec();
        bytes.extend_from_slice(b"\nEast,Furniture,Consumer,Chairs,Chaise \xe9l\xe9gante,2016-01-01,100,10\n");
        fs::write(&source, bytes).unwrap();

        let mut state = AppState::new(DashboardConfig::default());
        state.open(&source).unwrap();
        let before = state.dataset.clone().unwrap();
        assert_eq!(before.records[0].product_name, "Chaise élégante");

        let exported = dir.path().join("filtered_superstore.csv");
        state.csv_export().unwrap().write_to(&exported).unwrap();
        state.open(&exported).unwrap();

        let after = state.dataset.clone().unwrap();
        assert_eq!(after.records, before.records);
    }

    #[test]
    fn exports_follow_current_filters() {
        let dir = tempfile::tempdir().unwrap();
        let (mut state, path) = state_with(dir.path());
        assert!(state.csv_export().is_err());

        state.open(&path).unwrap();
        state.select_none(Dimension::Category);
        let artifact = state.csv_export().unwrap();
        assert_eq!(artifact.file_name, "filtered_superstore.csv");
        assert_eq!(String::from_utf8(artifact.bytes).unwrap().lines().count(), 1);

        let summary = state.summary_export().unwrap();
        assert_eq!(summary.file_name, "summary_superstore.json");
    }
}
