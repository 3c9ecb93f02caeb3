use serde::Deserialize;
use std::fmt;

/// How a sample's contiguous run of rows maps onto `(step, replicate)` pairs.
///
/// Every stage that needs this mapping (concentration assignment, normalization,
/// reshaping) goes through the same [`PlateLayout`] value so the three can never
/// disagree about which row belongs to which dilution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlateLayout {
    /// Whole dilution series per replicate: `r1s1, r1s2, .., r1sS, r2s1, ..`.
    ///
    /// This is the row order a plate reader exports for drugs diluted down a column.
    #[default]
    ReplicateMajor,
    /// All replicates per step: `s1r1, s1r2, .., s1rR, s2r1, ..`.
    StepMajor,
}

impl PlateLayout {
    /// Position within the sample run of the well at `(step, replicate)`.
    pub fn position(self, step: usize, replicate: usize, steps: usize, replicates: usize) -> usize {
        match self {
            PlateLayout::ReplicateMajor => replicate * steps + step,
            PlateLayout::StepMajor => step * replicates + replicate,
        }
    }

    /// Dilution step of the well at `position` within the sample run.
    pub fn step_of(self, position: usize, steps: usize, replicates: usize) -> usize {
        match self {
            PlateLayout::ReplicateMajor => position % steps,
            PlateLayout::StepMajor => position / replicates,
        }
    }

    /// Expands one value per step into one value per well, in run order.
    pub fn tile<T: Copy>(self, per_step: &[T], replicates: usize) -> Vec<T> {
        match self {
            PlateLayout::ReplicateMajor => per_step
                .iter()
                .copied()
                .cycle()
                .take(per_step.len() * replicates)
                .collect(),
            PlateLayout::StepMajor => per_step
                .iter()
                .flat_map(|&value| std::iter::repeat_n(value, replicates))
                .collect(),
        }
    }
}

impl fmt::Display for PlateLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlateLayout::ReplicateMajor => f.write_str("replicate-major"),
            PlateLayout::StepMajor => f.write_str("step-major"),
        }
    }
}

impl std::str::FromStr for PlateLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replicate-major" | "vertical" => Ok(PlateLayout::ReplicateMajor),
            "step-major" | "horizontal" => Ok(PlateLayout::StepMajor),
            other => Err(format!(
                "unknown plate layout '{other}', expected 'replicate-major' or 'step-major'"
            )),
        }
    }
}
