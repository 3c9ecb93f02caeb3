//! Provides input/output for plate-reader exports and processed result tables.
//!
//! Plates are read through the [`traits::PlateFile`] interface, one file per plate in
//! ingestion order. Results are written as CSV, either in the long per-well form or in
//! the wide per-sample form consumed by curve-fitting software.

pub mod export;
pub mod plate_csv;
pub mod schema;
pub mod traits;
