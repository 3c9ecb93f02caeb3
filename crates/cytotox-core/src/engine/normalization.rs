use super::config::{AssayConfig, MAX_ROUND_DIGITS};
use super::error::AssayError;
use super::progress::{Progress, ProgressReporter};
use crate::core::models::layout::PlateLayout;
use crate::core::models::record::WellRecord;
use crate::core::models::table::RecordTable;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info};

/// Resolves which control normalizes each drug.
///
/// An explicit mapping from the configuration is used as given. Without one, the table
/// must hold exactly one control-role sample, which then normalizes every other sample.
/// Either way, drugs and controls together must cover every sample in the table.
///
/// # Errors
///
/// Returns [`AssayError::ConfigurationMismatch`] if no single control can be inferred,
/// or if the mapping and the table disagree about the sample set.
pub fn resolve_control_mapping(
    table: &RecordTable,
    config: &AssayConfig,
) -> Result<BTreeMap<String, String>, AssayError> {
    let mapping = match &config.control_mapping {
        Some(mapping) => mapping.clone(),
        None => {
            let controls = table.controls();
            let control = match controls.as_slice() {
                [only] => *only,
                [] => {
                    return Err(AssayError::ConfigurationMismatch {
                        context: "control mapping",
                        detail: "there is no control sample for normalization".to_string(),
                    });
                }
                many => {
                    return Err(AssayError::ConfigurationMismatch {
                        context: "control mapping",
                        detail: format!(
                            "found {} control samples [{}], an explicit mapping is required",
                            many.len(),
                            many.join(", ")
                        ),
                    });
                }
            };
            table
                .samples()
                .into_iter()
                .filter(|&name| name != control)
                .map(|name| (name.to_string(), control.to_string()))
                .collect()
        }
    };

    let in_data: BTreeSet<&str> = table.samples().into_iter().collect();
    let in_mapping: BTreeSet<&str> = mapping
        .iter()
        .flat_map(|(drug, control)| [drug.as_str(), control.as_str()])
        .collect();
    let only_in_data: Vec<&str> = in_data.difference(&in_mapping).copied().collect();
    let only_in_mapping: Vec<&str> = in_mapping.difference(&in_data).copied().collect();
    if let Some(err) = AssayError::set_mismatch("control mapping", &only_in_data, &only_in_mapping) {
        return Err(err);
    }
    Ok(mapping)
}

/// Mean of each step over the replicates of one run laid out by `layout`.
///
/// # Errors
///
/// Returns [`AssayError::ShapeMismatch`] if the values do not divide into `steps`.
pub fn step_means(
    values: &[f64],
    steps: usize,
    layout: PlateLayout,
) -> Result<Vec<f64>, AssayError> {
    if steps == 0 || values.is_empty() || values.len() % steps != 0 {
        return Err(AssayError::shape_mismatch(
            "control run",
            format!("{} values do not divide into {steps} dilution steps", values.len()),
        ));
    }
    let replicates = values.len() / steps;
    Ok((0..steps)
        .map(|step| {
            let total: f64 = (0..replicates)
                .map(|replicate| values[layout.position(step, replicate, steps, replicates)])
                .sum();
            total / replicates as f64
        })
        .collect())
}

/// Rounds to `digits` decimal places.
///
/// Digit counts past [`MAX_ROUND_DIGITS`] exceed f64 precision and leave the value as is.
pub fn round_to(value: f64, digits: u32) -> f64 {
    if digits > MAX_ROUND_DIGITS {
        return value;
    }
    let scale = 10f64.powi(digits as i32);
    (value * scale).round() / scale
}

/// Rescales every drug to percent of its control's mean at the same dilution step.
///
/// `normalized = 100 * absorbance / mean(control replicates at step)`. Control rows
/// normalize to themselves (`normalized = absorbance`). Optional rounding is applied
/// last, to every normalized value.
///
/// # Errors
///
/// - [`AssayError::ConfigurationMismatch`] if the control mapping cannot be resolved.
/// - [`AssayError::ShapeMismatch`] if a drug or its control does not divide into the
///   drug's step count.
/// - [`AssayError::InvalidValue`] if a control mean is zero.
pub fn normalize(
    table: &RecordTable,
    config: &AssayConfig,
    reporter: &ProgressReporter,
) -> Result<RecordTable, AssayError> {
    let mapping = resolve_control_mapping(table, config)?;
    let controls: BTreeSet<&str> = mapping.values().map(String::as_str).collect();
    let pending: Vec<_> = mapping
        .iter()
        .filter(|(drug, _)| !controls.contains(drug.as_str()))
        .collect();
    reporter.report(Progress::SamplesStart {
        samples: pending.len() as u64,
    });

    let mut per_row: HashMap<&str, Vec<f64>> = HashMap::new();
    for (drug, control) in pending {
        let steps = config.steps_for(drug);
        let replicates = table.replicates(drug, steps)?;
        let control_values: Vec<f64> = table.sample_rows(control).map(|r| r.absorbance).collect();
        let means = step_means(&control_values, steps, config.layout).map_err(|_| {
            AssayError::shape_mismatch(
                control.as_str(),
                format!(
                    "{} control rows do not divide into the {steps} steps of '{drug}'",
                    control_values.len()
                ),
            )
        })?;
        if let Some(step) = means.iter().position(|&mean| mean == 0.0) {
            return Err(AssayError::invalid_value(
                format!("control '{control}'"),
                format!("mean absorbance at step {} is zero", step + 1),
            ));
        }

        let normalized = table
            .sample_rows(drug)
            .enumerate()
            .map(|(position, record)| {
                let step = config.layout.step_of(position, steps, replicates);
                100.0 * record.absorbance / means[step]
            })
            .collect();
        debug!(drug = %drug, control = %control, steps, replicates, "Normalized against control.");
        per_row.insert(drug.as_str(), normalized);
        reporter.report(Progress::SampleDone {
            sample: drug.clone(),
        });
    }
    reporter.report(Progress::SamplesFinish);

    let mut cursors: HashMap<&str, usize> = HashMap::new();
    let records = table
        .iter()
        .map(|record| {
            let normalized = match per_row.get(record.sample.as_str()) {
                Some(values) => {
                    let cursor = cursors.entry(record.sample.as_str()).or_insert(0);
                    let value = values[*cursor];
                    *cursor += 1;
                    value
                }
                None => record.absorbance,
            };
            WellRecord {
                normalized_absorbance: Some(match config.round_digits {
                    Some(digits) => round_to(normalized, digits),
                    None => normalized,
                }),
                ..record.clone()
            }
        })
        .collect();

    info!(
        drugs = per_row.len(),
        controls = controls.len(),
        "Normalization complete."
    );
    Ok(table.with_records(records))
}
