//! # Cytotox Core Library
//!
//! Turns raw multi-well plate absorbance readings from cytotoxicity assays into
//! dose-response tables ready for curve-fitting software.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout:
//!
//! - **[`core`]: The Foundation.** Plain data models (`WellRecord`, `RecordTable`),
//!   the plate layout convention, dilution series generation, and plate file I/O.
//!
//! - **[`engine`]: The Logic Core.** The table transforms: background correction,
//!   concentration assignment, control normalization and the wide reshape. Every
//!   transform borrows a `RecordTable` and returns a new one, so a failed call never
//!   leaves a half-updated table behind.
//!
//! - **[`workflows`]: The Public API.** Chains the engine stages into one validated
//!   analysis run with progress reporting.

pub mod core;
pub mod engine;
pub mod workflows;
