//! Retail sales dashboard: load a sales table, filter it by Region, Category
//! and Segment, and show KPIs, charts and a top-products table.
//!
//! The pipeline is usable without the UI:
//!
//! ```no_run
//! use std::path::Path;
//! use sales_dashboard::aggregate::{compute, DEFAULT_TOP_N};
//! use sales_dashboard::data::{load_file, FilterSelection, SourceEncoding};
//!
//! let dataset = load_file(Path::new("superstore.csv"), SourceEncoding::Latin1)?;
//! let result = compute(&dataset, &FilterSelection::all(&dataset), DEFAULT_TOP_N);
//! println!("total sales: {}", result.total_sales);
//! # Ok::<(), sales_dashboard::data::LoadError>(())
//! ```

pub mod aggregate;
pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod present;
pub mod state;
pub mod ui;
