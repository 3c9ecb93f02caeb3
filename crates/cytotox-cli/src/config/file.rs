use crate::error::{CliError, Result};
use cytotox::core::models::layout::PlateLayout;
use cytotox::core::models::series::DilutionSeries;
use cytotox::engine::config::DrugDilution;
use cytotox::engine::error::AssayError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileAssayConfig {
    pub steps: Option<usize>,
    pub layout: Option<PlateLayout>,
    pub log_scale: Option<bool>,
    pub round_digits: Option<u32>,
    pub exclude: Option<Vec<String>>,
    pub drop_controls: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileBackgroundConfig {
    pub signal_wavelength: Option<u32>,
    pub reference_wavelength: Option<u32>,
    pub reference_files: Option<Vec<PathBuf>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileColumnsConfig {
    pub role: Option<String>,
    pub sample: Option<String>,
    pub wavelength: Option<String>,
    pub absorbance: Option<String>,
    pub control_role: Option<String>,
    pub blank_role: Option<String>,
    pub delimiter: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub assay: Option<FileAssayConfig>,
    /// `NAME = [start, factor]` or `NAME = { start, factor, steps }`, checked by
    /// [`drug_dilution`].
    pub drugs: Option<BTreeMap<String, toml::Value>>,
    pub controls: Option<BTreeMap<String, String>>,
    pub background: Option<FileBackgroundConfig>,
    pub columns: Option<FileColumnsConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}

fn as_number(value: &toml::Value) -> Option<f64> {
    match value {
        toml::Value::Integer(i) => Some(*i as f64),
        toml::Value::Float(f) => Some(*f),
        _ => None,
    }
}

/// Converts one `[drugs]` entry into a dilution plan.
///
/// # Errors
///
/// Returns [`AssayError::InvalidValue`] for entries that are neither a numeric
/// `[start, factor]` pair nor a table with numeric `start` and `factor`.
pub fn drug_dilution(name: &str, value: &toml::Value) -> std::result::Result<DrugDilution, AssayError> {
    let invalid = |reason: String| AssayError::InvalidValue {
        field: format!("drugs.{name}"),
        reason,
    };
    let number = |entry: Option<&toml::Value>, what: &str| {
        entry
            .and_then(as_number)
            .ok_or_else(|| invalid(format!("{what} must be a number")))
    };

    let (start, factor, steps) = match value {
        toml::Value::Array(items) if items.len() == 2 => {
            (number(items.first(), "start")?, number(items.get(1), "factor")?, None)
        }
        toml::Value::Array(items) => {
            return Err(invalid(format!(
                "expected [start, factor], got {} values",
                items.len()
            )));
        }
        toml::Value::Table(table) => {
            let steps = match table.get("steps") {
                None => None,
                Some(toml::Value::Integer(n)) if *n > 0 => Some(*n as usize),
                Some(other) => {
                    return Err(invalid(format!(
                        "steps must be a positive integer, got {other}"
                    )));
                }
            };
            if let Some(key) = table
                .keys()
                .find(|key| !matches!(key.as_str(), "start" | "factor" | "steps"))
            {
                return Err(invalid(format!("unknown key '{key}'")));
            }
            (
                number(table.get("start"), "start")?,
                number(table.get("factor"), "factor")?,
                steps,
            )
        }
        other => {
            return Err(invalid(format!(
                "expected [start, factor] or a table, got {}",
                other.type_str()
            )));
        }
    };

    let series = DilutionSeries::new(start, factor).map_err(|err| match err {
        AssayError::InvalidValue { reason, .. } => invalid(reason),
        other => other,
    })?;
    Ok(DrugDilution { series, steps })
}
