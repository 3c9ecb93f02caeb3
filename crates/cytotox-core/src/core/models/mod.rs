//! Data models for plate measurements.

pub mod layout;
pub mod record;
pub mod series;
pub mod table;
