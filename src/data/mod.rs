//! Data layer: core types, loading, caching and filtering.
//!
//! Architecture:
//! ```text
//!   .csv / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → SalesDataset (derives margin + month)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  cache    │  memoize by path + encoding + mtime
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────────┐
//!   │ SalesDataset │  Vec<Record>, distinct values per dimension
//!   └──────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  FilterSelection → WorkingSet
//!   └──────────┘
//! ```

pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;

pub use cache::DatasetCache;
pub use error::LoadError;
pub use filter::{FilterSelection, WorkingSet};
pub use loader::{load_file, read_csv, SourceEncoding};
pub use model::{Dimension, Record, RecordFields, SalesDataset, SOURCE_COLUMNS};
