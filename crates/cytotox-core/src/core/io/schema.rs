//! Literal column and role names of the plate-reader export.
//!
//! Headers are matched exactly, so spelling and case must agree with the instrument.

use crate::core::models::record::SampleRole;

pub const ROLE_COLUMN: &str = "Тип";
pub const SAMPLE_COLUMN: &str = "Образец";
pub const WAVELENGTH_COLUMN: &str = "Длина волны";
pub const ABSORBANCE_COLUMN: &str = "Погл.";

pub const CONTROL_ROLE: &str = "Контр. образец";
pub const BLANK_ROLE: &str = "blank";

/// Row holding the experiment name in its first cell.
pub const TITLE_ROW: usize = 0;
/// Row holding the column headers.
pub const HEADER_ROW: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlateSchema {
    pub role_column: String,
    pub sample_column: String,
    pub wavelength_column: String,
    pub absorbance_column: String,
    pub control_role: String,
    pub blank_role: String,
    pub title_row: usize,
    pub header_row: usize,
    pub delimiter: u8,
}

impl Default for PlateSchema {
    fn default() -> Self {
        Self {
            role_column: ROLE_COLUMN.to_string(),
            sample_column: SAMPLE_COLUMN.to_string(),
            wavelength_column: WAVELENGTH_COLUMN.to_string(),
            absorbance_column: ABSORBANCE_COLUMN.to_string(),
            control_role: CONTROL_ROLE.to_string(),
            blank_role: BLANK_ROLE.to_string(),
            title_row: TITLE_ROW,
            header_row: HEADER_ROW,
            delimiter: b',',
        }
    }
}

impl PlateSchema {
    /// Classifies a well from its role cell and sample name.
    ///
    /// A well is blank when either its role or its sample name equals the blank literal.
    pub fn role_of(&self, role: &str, sample: &str) -> SampleRole {
        let role = role.trim();
        if role == self.control_role {
            SampleRole::Control
        } else if role == self.blank_role || sample.trim() == self.blank_role {
            SampleRole::Blank
        } else {
            SampleRole::Regular
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_literals_are_matched_exactly() {
        let schema = PlateSchema::default();
        assert_eq!(schema.role_of("Контр. образец", "DMSO"), SampleRole::Control);
        assert_eq!(schema.role_of("контр. образец", "DMSO"), SampleRole::Regular);
        assert_eq!(schema.role_of("blank", "Medium"), SampleRole::Blank);
        assert_eq!(schema.role_of("Образец", "blank"), SampleRole::Blank);
        assert_eq!(schema.role_of("Образец", "MS309"), SampleRole::Regular);
    }
}
