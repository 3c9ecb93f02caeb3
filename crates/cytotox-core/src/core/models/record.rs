use std::fmt;

const SAMPLE_SUFFIX_SEPARATOR: char = '_';

/// Identifier of one physical plate, assigned 1, 2, ... in file ingestion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlateId(pub usize);

impl fmt::Display for PlateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Plate {}", self.0)
    }
}

/// The role a well plays in the assay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleRole {
    /// A tested drug dilution.
    Regular,
    /// Baseline signal used as the normalization denominator.
    Control,
    /// Medium-only well, removed right after ingestion.
    Blank,
}

impl fmt::Display for SampleRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SampleRole::Regular => "regular",
            SampleRole::Control => "control",
            SampleRole::Blank => "blank",
        };
        f.write_str(label)
    }
}

/// One well measurement together with the columns derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct WellRecord {
    /// Canonical sample name (batch suffix already stripped).
    pub sample: String,
    pub role: SampleRole,
    /// Read wavelength in nanometres.
    pub wavelength: u32,
    pub absorbance: f64,
    pub plate: PlateId,
    /// Set by concentration assignment.
    pub concentration: Option<f64>,
    /// Set by normalization.
    pub normalized_absorbance: Option<f64>,
}

impl WellRecord {
    /// Creates a raw measurement. The sample name is reduced to its canonical form.
    pub fn new(
        sample: &str,
        role: SampleRole,
        wavelength: u32,
        absorbance: f64,
        plate: PlateId,
    ) -> Self {
        Self {
            sample: canonical_sample_name(sample).to_string(),
            role,
            wavelength,
            absorbance,
            plate,
            concentration: None,
            normalized_absorbance: None,
        }
    }

    /// The value exported for this well: normalized absorbance once available,
    /// raw absorbance otherwise.
    pub fn response(&self) -> f64 {
        self.normalized_absorbance.unwrap_or(self.absorbance)
    }
}

/// Strips everything from the first `_` on, e.g. `"DrugA_rep1"` becomes `"DrugA"`.
pub fn canonical_sample_name(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .split_once(SAMPLE_SUFFIX_SEPARATOR)
        .map_or(trimmed, |(name, _)| name)
}
