//! Display formatting and export artifacts. UI-independent, so the same
//! output can be produced headless.

pub mod export;
pub mod format;

pub use export::{csv_artifact, summary_artifact, write_csv, ExportArtifact, ExportError};
pub use format::{format_compact, format_currency, format_percent};
