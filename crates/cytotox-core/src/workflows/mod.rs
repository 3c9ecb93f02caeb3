//! # Workflows Module
//!
//! High-level entry points that run the complete processing pipeline.
//!
//! - **Analysis Workflow** ([`analyze`]) - Eager validation, background correction,
//!   concentration assignment, normalization, optional control removal and the final
//!   wide reshape.

pub mod analyze;
