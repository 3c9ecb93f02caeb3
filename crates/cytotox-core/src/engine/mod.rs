//! # Engine Module
//!
//! The processing stages that turn a raw record table into normalized dose-response
//! data.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Assay parameters: steps, layout, dilution series,
//!   exclusions, control mapping and rounding
//! - **Background Correction** ([`background`]) - Positional subtraction of a reference
//!   wavelength or a reference plate set
//! - **Concentration Assignment** ([`concentration`]) - Binds dilution series onto each
//!   drug's rows
//! - **Normalization** ([`normalization`]) - Percent-of-control rescaling against
//!   per-step control means
//! - **Reshaping** ([`reshape`]) - Steps x replicates matrices and the joined wide table
//! - **Progress Monitoring** ([`progress`]) - Stage reporting for front-ends
//! - **Error Handling** ([`error`]) - The assay error taxonomy
//!
//! All stages are synchronous and single-threaded. Each one validates its inputs
//! completely before building its output table.

pub mod background;
pub mod concentration;
pub mod config;
pub mod error;
pub mod normalization;
pub mod progress;
pub mod reshape;
