use super::record::{PlateId, SampleRole, WellRecord};
use crate::engine::error::AssayError;
use std::collections::HashSet;

/// Ordered collection of well records from one or more plates.
///
/// Row order is significant: the rows of each sample form a run whose positions map
/// onto `(step, replicate)` pairs through a [`super::layout::PlateLayout`]. The table
/// never re-sorts its rows; every filter keeps the relative order of the rows it keeps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordTable {
    records: Vec<WellRecord>,
    experiment_names: Vec<Option<String>>,
}

impl RecordTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table from records already in physical well order.
    pub fn from_records(records: Vec<WellRecord>) -> Self {
        Self {
            records,
            experiment_names: Vec::new(),
        }
    }

    /// Appends one plate's records and its experiment name, keeping ingestion order.
    pub fn append_plate(&mut self, records: Vec<WellRecord>, experiment_name: Option<String>) {
        self.records.extend(records);
        self.experiment_names.push(experiment_name);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[WellRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &WellRecord> {
        self.records.iter()
    }

    /// Experiment names, one per ingested plate file; `None` where the title cell was empty.
    pub fn experiment_names(&self) -> &[Option<String>] {
        &self.experiment_names
    }

    /// Plates in ingestion order.
    pub fn plates(&self) -> Vec<PlateId> {
        unique_in_order(self.records.iter().map(|r| r.plate))
    }

    /// Observed wavelengths in order of first appearance.
    pub fn wavelengths(&self) -> Vec<u32> {
        unique_in_order(self.records.iter().map(|r| r.wavelength))
    }

    /// All sample names in order of first appearance, controls included.
    pub fn samples(&self) -> Vec<&str> {
        unique_in_order(self.records.iter().map(|r| r.sample.as_str()))
    }

    /// Names of samples carrying the control role.
    pub fn controls(&self) -> Vec<&str> {
        unique_in_order(
            self.records
                .iter()
                .filter(|r| r.role == SampleRole::Control)
                .map(|r| r.sample.as_str()),
        )
    }

    /// Sample names, optionally leaving out the controls.
    pub fn drugs(&self, include_controls: bool) -> Vec<&str> {
        let samples = self.samples();
        if include_controls {
            return samples;
        }
        let controls: HashSet<&str> = self.controls().into_iter().collect();
        samples
            .into_iter()
            .filter(|name| !controls.contains(name))
            .collect()
    }

    pub fn contains_sample(&self, sample: &str) -> bool {
        self.records.iter().any(|r| r.sample == sample)
    }

    /// Rows of one sample, in table order.
    pub fn sample_rows<'a>(&'a self, sample: &'a str) -> impl Iterator<Item = &'a WellRecord> + 'a {
        self.records.iter().filter(move |r| r.sample == sample)
    }

    pub fn sample_count(&self, sample: &str) -> usize {
        self.sample_rows(sample).count()
    }

    /// Number of replicates of `sample` in a series of `steps` dilution steps.
    ///
    /// # Errors
    ///
    /// Returns [`AssayError::ShapeMismatch`] if the sample has no rows, `steps` is zero,
    /// or the row count is not a multiple of `steps`.
    pub fn replicates(&self, sample: &str, steps: usize) -> Result<usize, AssayError> {
        let rows = self.sample_count(sample);
        if steps == 0 {
            return Err(AssayError::shape_mismatch(sample, "step count must be positive"));
        }
        if rows == 0 {
            return Err(AssayError::shape_mismatch(sample, "sample has no rows"));
        }
        if rows % steps != 0 {
            return Err(AssayError::shape_mismatch(
                sample,
                format!("{rows} rows do not divide into {steps} dilution steps"),
            ));
        }
        Ok(rows / steps)
    }

    /// Keeps only rows whose role is not listed.
    pub fn without_roles(&self, roles: &[SampleRole]) -> RecordTable {
        self.filtered(|r| !roles.contains(&r.role))
    }

    /// Keeps only rows whose sample is not listed.
    pub fn without_samples<S: AsRef<str>>(&self, names: &[S]) -> RecordTable {
        self.filtered(|r| !names.iter().any(|n| n.as_ref() == r.sample))
    }

    /// Keeps only rows read at `wavelength`.
    pub fn at_wavelength(&self, wavelength: u32) -> RecordTable {
        self.filtered(|r| r.wavelength == wavelength)
    }

    /// Removes control samples: the named ones, or every control-role sample.
    ///
    /// # Errors
    ///
    /// Returns [`AssayError::ConfigurationMismatch`] when no names are given and the
    /// table holds no control-role sample.
    pub fn drop_controls(&self, names: Option<&[String]>) -> Result<RecordTable, AssayError> {
        match names {
            Some(names) if !names.is_empty() => Ok(self.without_samples(names)),
            _ => {
                let controls: Vec<String> =
                    self.controls().into_iter().map(str::to_string).collect();
                if controls.is_empty() {
                    return Err(AssayError::ConfigurationMismatch {
                        context: "control removal",
                        detail: "there are no control samples to remove".to_string(),
                    });
                }
                Ok(self.without_samples(&controls))
            }
        }
    }

    pub fn has_concentrations(&self) -> bool {
        self.records.iter().any(|r| r.concentration.is_some())
    }

    pub fn has_normalized(&self) -> bool {
        self.records.iter().any(|r| r.normalized_absorbance.is_some())
    }

    /// Same rows and metadata, new record values.
    pub(crate) fn with_records(&self, records: Vec<WellRecord>) -> RecordTable {
        RecordTable {
            records,
            experiment_names: self.experiment_names.clone(),
        }
    }

    fn filtered(&self, keep: impl Fn(&WellRecord) -> bool) -> RecordTable {
        self.with_records(self.records.iter().filter(|&r| keep(r)).cloned().collect())
    }
}

fn unique_in_order<T: Eq + std::hash::Hash + Copy>(items: impl Iterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items.filter(|item| seen.insert(*item)).collect()
}
