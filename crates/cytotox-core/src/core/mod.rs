//! # Core Module
//!
//! Fundamental building blocks shared by every processing stage.
//!
//! - **Well data** ([`models`]) - Well records, the ordered record table, the plate
//!   layout convention and dilution series descriptors
//! - **File I/O** ([`io`]) - Reading plate-reader exports and writing result tables
//!
//! The record table is ordered, and that order is load-bearing: rows of one sample
//! form a contiguous run whose positions map onto `(step, replicate)` pairs through
//! [`models::layout::PlateLayout`].

pub mod io;
pub mod models;
