use super::config::AssayConfig;
use super::error::AssayError;
use crate::core::models::layout::PlateLayout;
use crate::core::models::record::WellRecord;
use crate::core::models::table::RecordTable;
use tracing::debug;

/// One sample's responses arranged as dilution steps x replicates.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleMatrix {
    pub sample: String,
    /// Concentration of each step, if concentrations were assigned.
    pub concentrations: Vec<Option<f64>>,
    /// `values[step][replicate]`.
    pub values: Vec<Vec<f64>>,
}

impl SampleMatrix {
    pub fn steps(&self) -> usize {
        self.values.len()
    }

    pub fn replicates(&self) -> usize {
        self.values.first().map_or(0, Vec::len)
    }
}

/// Reshapes one sample into a steps x replicates matrix.
///
/// Values are normalized absorbances where present and raw absorbances otherwise.
/// An unknown sample is not an error: it yields `Ok(None)`.
///
/// # Errors
///
/// Returns [`AssayError::ShapeMismatch`] if the sample's rows do not divide into
/// `steps`.
pub fn subset(
    table: &RecordTable,
    sample: &str,
    steps: usize,
    layout: PlateLayout,
) -> Result<Option<SampleMatrix>, AssayError> {
    if !table.contains_sample(sample) {
        return Ok(None);
    }
    let replicates = table.replicates(sample, steps)?;
    let rows: Vec<&WellRecord> = table.sample_rows(sample).collect();

    let concentrations = (0..steps)
        .map(|step| rows[layout.position(step, 0, steps, replicates)].concentration)
        .collect();
    let values = (0..steps)
        .map(|step| {
            (0..replicates)
                .map(|replicate| rows[layout.position(step, replicate, steps, replicates)].response())
                .collect()
        })
        .collect();

    Ok(Some(SampleMatrix {
        sample: sample.to_string(),
        concentrations,
        values,
    }))
}

/// Sample matrices laid side by side over a shared step axis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WideTable {
    blocks: Vec<SampleMatrix>,
}

impl WideTable {
    /// Joins sample blocks column-wise.
    ///
    /// # Errors
    ///
    /// Returns [`AssayError::ShapeMismatch`] if the blocks do not share one step count.
    pub fn join(blocks: Vec<SampleMatrix>) -> Result<Self, AssayError> {
        if let Some(first) = blocks.first() {
            if let Some(other) = blocks.iter().find(|b| b.steps() != first.steps()) {
                return Err(AssayError::shape_mismatch(
                    format!("'{}' and '{}'", first.sample, other.sample),
                    format!(
                        "cannot join {} dilution steps with {}",
                        first.steps(),
                        other.steps()
                    ),
                ));
            }
        }
        Ok(Self { blocks })
    }

    pub fn blocks(&self) -> &[SampleMatrix] {
        &self.blocks
    }

    pub fn block(&self, sample: &str) -> Option<&SampleMatrix> {
        self.blocks.iter().find(|b| b.sample == sample)
    }

    pub fn steps(&self) -> usize {
        self.blocks.first().map_or(0, SampleMatrix::steps)
    }

    /// Column count: one concentration column plus one column per replicate, per block.
    pub fn width(&self) -> usize {
        self.blocks.iter().map(|b| 1 + b.replicates()).sum()
    }

    /// One row per step, each block contributing `[concentration, replicates..]`.
    pub fn rows(&self) -> Vec<Vec<Option<f64>>> {
        (0..self.steps())
            .map(|step| {
                self.blocks
                    .iter()
                    .flat_map(|block| {
                        std::iter::once(block.concentrations[step])
                            .chain(block.values[step].iter().copied().map(Some))
                    })
                    .collect()
            })
            .collect()
    }
}

/// Reshapes the requested samples, or every sample in the table, into one wide table.
///
/// Each sample uses its own configured step count, so samples with different step
/// counts cannot be joined.
///
/// # Errors
///
/// Returns [`AssayError::ShapeMismatch`] if a requested sample is absent, a sample does
/// not divide into its steps, or the samples' step counts differ.
pub fn reshape<S: AsRef<str>>(
    table: &RecordTable,
    samples: Option<&[S]>,
    config: &AssayConfig,
) -> Result<WideTable, AssayError> {
    let names: Vec<&str> = match samples {
        Some(requested) if !requested.is_empty() => requested.iter().map(|s| s.as_ref()).collect(),
        _ => table.samples(),
    };

    let mut blocks = Vec::with_capacity(names.len());
    for name in names {
        let block = subset(table, name, config.steps_for(name), config.layout)?
            .ok_or_else(|| AssayError::shape_mismatch(name, "sample is absent from the table"))?;
        blocks.push(block);
    }
    debug!(blocks = blocks.len(), "Joining sample blocks.");
    WideTable::join(blocks)
}
