use super::schema::PlateSchema;
use super::traits::{PlateFile, PlateReading};
use crate::core::models::record::{PlateId, WellRecord};
use csv::StringRecord;
use std::collections::HashMap;
use std::io::{self, BufRead};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PlateReadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Missing required column: '{0}'")]
    MissingColumn(String),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: PlateParseErrorKind,
    },
    #[error("Plate file is empty: {0}")]
    Empty(&'static str),
}

#[derive(Debug, Error, PartialEq)]
pub enum PlateParseErrorKind {
    #[error("Required field '{column}' is empty")]
    MissingField { column: String },
    #[error("Invalid number in '{column}' (value: '{value}')")]
    InvalidNumber { column: String, value: String },
    #[error("Wavelength must be a positive whole number of nanometres (value: '{value}')")]
    InvalidWavelength { value: String },
}

/// Plate-reader CSV export: a title row, a header row, then one row per well.
#[derive(Debug, Clone, Default)]
pub struct PlateCsvFile {
    schema: PlateSchema,
}

struct ColumnIndices {
    role: usize,
    sample: usize,
    wavelength: usize,
    absorbance: usize,
}

impl PlateCsvFile {
    pub fn new(schema: PlateSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &PlateSchema {
        &self.schema
    }

    fn split_line(&self, text: &str) -> Result<StringRecord, csv::Error> {
        let mut record = StringRecord::new();
        csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .delimiter(self.schema.delimiter)
            .from_reader(text.as_bytes())
            .read_record(&mut record)?;
        Ok(record)
    }

    fn locate_columns(&self, header: &StringRecord) -> Result<ColumnIndices, PlateReadError> {
        let positions: HashMap<&str, usize> = header
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.trim_start_matches('\u{feff}').trim(), idx))
            .collect();
        let find = |name: &String| {
            positions
                .get(name.as_str())
                .copied()
                .ok_or_else(|| PlateReadError::MissingColumn(name.clone()))
        };
        Ok(ColumnIndices {
            role: find(&self.schema.role_column)?,
            sample: find(&self.schema.sample_column)?,
            wavelength: find(&self.schema.wavelength_column)?,
            absorbance: find(&self.schema.absorbance_column)?,
        })
    }

    fn parse_well(
        &self,
        record: &StringRecord,
        columns: &ColumnIndices,
        line: usize,
        plate: PlateId,
    ) -> Result<WellRecord, PlateReadError> {
        let role = record.get(columns.role).unwrap_or("");
        let sample = required_field(record, columns.sample, &self.schema.sample_column, line)?;
        let wavelength_str =
            required_field(record, columns.wavelength, &self.schema.wavelength_column, line)?;
        let absorbance_str =
            required_field(record, columns.absorbance, &self.schema.absorbance_column, line)?;

        let wavelength = parse_wavelength(wavelength_str).ok_or_else(|| PlateReadError::Parse {
            line,
            kind: PlateParseErrorKind::InvalidWavelength {
                value: wavelength_str.to_string(),
            },
        })?;
        let absorbance = parse_decimal(absorbance_str).ok_or_else(|| PlateReadError::Parse {
            line,
            kind: PlateParseErrorKind::InvalidNumber {
                column: self.schema.absorbance_column.clone(),
                value: absorbance_str.to_string(),
            },
        })?;

        Ok(WellRecord::new(
            sample,
            self.schema.role_of(role, sample),
            wavelength,
            absorbance,
            plate,
        ))
    }
}

impl PlateFile for PlateCsvFile {
    type Error = PlateReadError;

    fn read_from(
        &self,
        reader: &mut impl BufRead,
        plate: PlateId,
    ) -> Result<PlateReading, Self::Error> {
        let mut experiment_name = None;
        let mut columns: Option<ColumnIndices> = None;
        let mut records = Vec::new();

        // Counted here because the csv reader skips blank lines without reporting them.
        for (idx, text) in reader.lines().enumerate() {
            let text = text?;
            let line = idx + 1;
            if text.trim().is_empty() {
                continue;
            }
            let record = self.split_line(&text)?;

            if idx == self.schema.title_row {
                experiment_name = record
                    .get(0)
                    .map(|cell| cell.trim_start_matches('\u{feff}').trim().to_string())
                    .filter(|name| !name.is_empty());
            }
            if idx < self.schema.header_row {
                continue;
            }
            if idx == self.schema.header_row {
                columns = Some(self.locate_columns(&record)?);
                continue;
            }
            if record.iter().all(|cell| cell.is_empty()) {
                continue;
            }
            let Some(columns) = columns.as_ref() else {
                return Err(PlateReadError::Empty("header row not found"));
            };
            records.push(self.parse_well(&record, columns, line, plate)?);
        }

        if columns.is_none() {
            return Err(PlateReadError::Empty("header row not found"));
        }
        if records.is_empty() {
            return Err(PlateReadError::Empty("no well rows after the header"));
        }
        debug!(%plate, wells = records.len(), "Parsed plate.");
        Ok(PlateReading {
            experiment_name,
            records,
        })
    }
}

fn required_field<'r>(
    record: &'r StringRecord,
    idx: usize,
    column: &str,
    line: usize,
) -> Result<&'r str, PlateReadError> {
    match record.get(idx) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(PlateReadError::Parse {
            line,
            kind: PlateParseErrorKind::MissingField {
                column: column.to_string(),
            },
        }),
    }
}

/// Parses a number that may use a decimal comma.
fn parse_decimal(value: &str) -> Option<f64> {
    value
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn parse_wavelength(value: &str) -> Option<u32> {
    let number = parse_decimal(value)?;
    if number <= 0.0 || number.fract() != 0.0 || number > u32::MAX as f64 {
        return None;
    }
    Some(number as u32)
}
