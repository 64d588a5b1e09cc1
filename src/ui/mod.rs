//! egui rendering. Every function takes `&mut AppState` (or a borrowed
//! result) and draws; no aggregation happens here.

pub mod dashboard;
pub mod panels;
pub mod plot;
