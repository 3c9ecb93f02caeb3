use crate::core::models::layout::PlateLayout;
use crate::core::models::series::DilutionSeries;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Largest decimal rounding that still fits within f64 precision.
pub const MAX_ROUND_DIGITS: u32 = 15;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },
}

/// Dilution plan of one drug.
#[derive(Debug, Clone, PartialEq)]
pub struct DrugDilution {
    pub series: DilutionSeries,
    /// Overrides the assay-wide step count for this drug.
    pub steps: Option<usize>,
}

impl From<DilutionSeries> for DrugDilution {
    fn from(series: DilutionSeries) -> Self {
        Self {
            series,
            steps: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssayConfig {
    pub steps: usize,
    pub layout: PlateLayout,
    pub drugs: BTreeMap<String, DrugDilution>,
    pub log_scale: bool,
    pub exclude: BTreeSet<String>,
    /// `drug -> control`. When absent, the single control-role sample is used for all.
    pub control_mapping: Option<BTreeMap<String, String>>,
    pub round_digits: Option<u32>,
}

impl AssayConfig {
    /// Step count used for `sample`: its own override, or the assay-wide value.
    pub fn steps_for(&self, sample: &str) -> usize {
        self.drugs
            .get(sample)
            .and_then(|drug| drug.steps)
            .unwrap_or(self.steps)
    }
}

#[derive(Default)]
pub struct AssayConfigBuilder {
    steps: Option<usize>,
    layout: Option<PlateLayout>,
    drugs: BTreeMap<String, DrugDilution>,
    log_scale: Option<bool>,
    exclude: BTreeSet<String>,
    control_mapping: Option<BTreeMap<String, String>>,
    round_digits: Option<u32>,
}

impl AssayConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(mut self, steps: usize) -> Self {
        self.steps = Some(steps);
        self
    }
    pub fn layout(mut self, layout: PlateLayout) -> Self {
        self.layout = Some(layout);
        self
    }
    pub fn drug(mut self, name: impl Into<String>, dilution: impl Into<DrugDilution>) -> Self {
        self.drugs.insert(name.into(), dilution.into());
        self
    }
    pub fn drugs(mut self, drugs: BTreeMap<String, DrugDilution>) -> Self {
        self.drugs.extend(drugs);
        self
    }
    pub fn log_scale(mut self, enabled: bool) -> Self {
        self.log_scale = Some(enabled);
        self
    }
    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.exclude.insert(name.into());
        self
    }
    pub fn control(mut self, drug: impl Into<String>, control: impl Into<String>) -> Self {
        self.control_mapping
            .get_or_insert_with(BTreeMap::new)
            .insert(drug.into(), control.into());
        self
    }
    pub fn round_digits(mut self, digits: Option<u32>) -> Self {
        self.round_digits = digits;
        self
    }

    pub fn build(self) -> Result<AssayConfig, ConfigError> {
        let steps = self.steps.ok_or(ConfigError::MissingParameter("steps"))?;
        if steps == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "steps".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if let Some((name, _)) = self.drugs.iter().find(|(_, d)| d.steps == Some(0)) {
            return Err(ConfigError::InvalidParameter {
                name: format!("drugs.{name}.steps"),
                reason: "must be at least 1".to_string(),
            });
        }
        if let Some(digits) = self.round_digits.filter(|d| *d > MAX_ROUND_DIGITS) {
            return Err(ConfigError::InvalidParameter {
                name: "round_digits".to_string(),
                reason: format!("{digits} exceeds the maximum of {MAX_ROUND_DIGITS}"),
            });
        }
        Ok(AssayConfig {
            steps,
            layout: self.layout.unwrap_or_default(),
            drugs: self.drugs,
            log_scale: self.log_scale.unwrap_or(true),
            exclude: self.exclude,
            control_mapping: self.control_mapping.filter(|m| !m.is_empty()),
            round_digits: self.round_digits,
        })
    }
}
