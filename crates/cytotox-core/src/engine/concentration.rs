use super::config::AssayConfig;
use super::error::AssayError;
use super::progress::{Progress, ProgressReporter};
use crate::core::models::record::WellRecord;
use crate::core::models::table::RecordTable;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// Checks that the drugs found in the table and the configured dilution series name
/// the same set of samples, ignoring excluded names on both sides.
///
/// # Errors
///
/// Returns [`AssayError::ConfigurationMismatch`] listing the names found on only one
/// side.
pub fn validate_drug_set(table: &RecordTable, config: &AssayConfig) -> Result<(), AssayError> {
    let in_data: BTreeSet<&str> = table.drugs(false).into_iter().collect();
    let in_config: BTreeSet<&str> = config.drugs.keys().map(String::as_str).collect();
    let not_excluded = |name: &&str| !config.exclude.contains(*name);

    let only_in_data: Vec<&str> = in_data.difference(&in_config).copied().filter(not_excluded).collect();
    let only_in_config: Vec<&str> = in_config.difference(&in_data).copied().filter(not_excluded).collect();

    match AssayError::set_mismatch("dilution series", &only_in_data, &only_in_config) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Assigns each configured drug's dilution series onto its rows.
///
/// For a drug with `S` steps and `R = rows / S` replicates, the per-step sequence is
/// expanded to one value per row according to the configured layout and written in
/// table order. Excluded drugs and controls keep an unset concentration.
///
/// # Errors
///
/// - [`AssayError::ConfigurationMismatch`] if the drug sets disagree.
/// - [`AssayError::ShapeMismatch`] if a drug's row count is not a multiple of its steps.
/// - [`AssayError::InvalidValue`] if a series cannot be log-transformed.
pub fn assign_concentrations(
    table: &RecordTable,
    config: &AssayConfig,
    reporter: &ProgressReporter,
) -> Result<RecordTable, AssayError> {
    validate_drug_set(table, config)?;

    let active: Vec<_> = config
        .drugs
        .iter()
        .filter(|(name, _)| !config.exclude.contains(*name) && table.contains_sample(name))
        .collect();
    reporter.report(Progress::SamplesStart {
        samples: active.len() as u64,
    });

    let mut per_row: HashMap<&str, Vec<f64>> = HashMap::new();
    for (name, drug) in active {
        let steps = config.steps_for(name);
        let replicates = table.replicates(name, steps)?;
        let per_step = drug
            .series
            .concentrations(steps, config.log_scale)
            .map_err(|err| match err {
                AssayError::InvalidValue { reason, .. } => {
                    AssayError::invalid_value(format!("dilution series of '{name}'"), reason)
                }
                other => other,
            })?;
        debug!(drug = %name, steps, replicates, "Tiling dilution series.");
        per_row.insert(name.as_str(), config.layout.tile(&per_step, replicates));
        reporter.report(Progress::SampleDone {
            sample: name.clone(),
        });
    }
    reporter.report(Progress::SamplesFinish);

    let mut cursors: HashMap<&str, usize> = HashMap::new();
    let records = table
        .iter()
        .map(|record| {
            let concentration = per_row.get(record.sample.as_str()).map(|values| {
                let cursor = cursors.entry(record.sample.as_str()).or_insert(0);
                let value = values[*cursor];
                *cursor += 1;
                value
            });
            WellRecord {
                concentration: concentration.or(record.concentration),
                ..record.clone()
            }
        })
        .collect();

    info!(
        drugs = per_row.len(),
        log_scale = config.log_scale,
        layout = %config.layout,
        "Concentrations assigned."
    );
    Ok(table.with_records(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::layout::PlateLayout;
    use crate::core::models::record::{PlateId, SampleRole};
    use crate::core::models::series::DilutionSeries;
    use crate::engine::config::{AssayConfigBuilder, DrugDilution};

    fn wells(sample: &str, role: SampleRole, count: usize) -> Vec<WellRecord> {
        (0..count)
            .map(|i| WellRecord::new(sample, role, 490, i as f64, PlateId(1)))
            .collect()
    }

    fn table() -> RecordTable {
        let mut records = wells("A", SampleRole::Regular, 6);
        records.extend(wells("DMSO", SampleRole::Control, 6));
        records.extend(wells("B", SampleRole::Regular, 3));
        RecordTable::from_records(records)
    }

    fn concentrations(table: &RecordTable, sample: &str) -> Vec<Option<f64>> {
        table.sample_rows(sample).map(|r| r.concentration).collect()
    }

    #[test]
    fn tiles_series_replicate_major_by_default() {
        let config = AssayConfigBuilder::new()
            .steps(3)
            .log_scale(false)
            .drug("A", DilutionSeries::new(90.0, 3.0).unwrap())
            .drug("B", DilutionSeries::new(1.0, 2.0).unwrap())
            .build()
            .unwrap();
        let assigned = assign_concentrations(&table(), &config, &ProgressReporter::new()).unwrap();

        let a = concentrations(&assigned, "A");
        assert_eq!(
            a,
            vec![Some(90.0), Some(30.0), Some(10.0), Some(90.0), Some(30.0), Some(10.0)]
        );
        assert_eq!(concentrations(&assigned, "B"), vec![Some(1.0), Some(0.5), Some(0.25)]);
        assert!(concentrations(&assigned, "DMSO").iter().all(Option::is_none));
    }

    #[test]
    fn excluded_drugs_are_not_reported() {
        let config = AssayConfigBuilder::new()
            .steps(3)
            .log_scale(false)
            .drug("A", DilutionSeries::new(90.0, 3.0).unwrap())
            .exclude("B")
            .build()
            .unwrap();
        let events = std::sync::Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event: Progress| {
            events.lock().unwrap().push(event);
        }));
        assign_concentrations(&table(), &config, &reporter).unwrap();
        drop(reporter);

        assert_eq!(
            events.into_inner().unwrap(),
            vec![
                Progress::SamplesStart { samples: 1 },
                Progress::SampleDone {
                    sample: "A".to_string()
                },
                Progress::SamplesFinish,
            ]
        );
    }

    #[test]
    fn step_major_layout_repeats_each_step() {
        let config = AssayConfigBuilder::new()
            .steps(3)
            .layout(PlateLayout::StepMajor)
            .log_scale(false)
            .drug("A", DilutionSeries::new(90.0, 3.0).unwrap())
            .exclude("B")
            .build()
            .unwrap();
        let assigned = assign_concentrations(&table(), &config, &ProgressReporter::new()).unwrap();
        assert_eq!(
            concentrations(&assigned, "A"),
            vec![Some(90.0), Some(90.0), Some(30.0), Some(30.0), Some(10.0), Some(10.0)]
        );
        assert!(concentrations(&assigned, "B").iter().all(Option::is_none));
    }

    #[test]
    fn log_scale_is_applied_per_value() {
        let config = AssayConfigBuilder::new()
            .steps(3)
            .drug("A", DilutionSeries::new(100.0, 10.0).unwrap())
            .exclude("B")
            .build()
            .unwrap();
        let assigned = assign_concentrations(&table(), &config, &ProgressReporter::new()).unwrap();
        let logs: Vec<f64> = concentrations(&assigned, "A").into_iter().flatten().collect();
        let expected = [2.0, 1.0, 0.0, 2.0, 1.0, 0.0];
        for (got, want) in logs.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn missing_descriptor_is_configuration_mismatch() {
        let config = AssayConfigBuilder::new()
            .steps(3)
            .drug("A", DilutionSeries::new(90.0, 3.0).unwrap())
            .build()
            .unwrap();
        let err = assign_concentrations(&table(), &config, &ProgressReporter::new()).unwrap_err();
        assert!(matches!(err, AssayError::ConfigurationMismatch { .. }));
        assert!(err.to_string().contains("[B]"));
    }

    #[test]
    fn descriptor_for_absent_drug_is_configuration_mismatch() {
        let config = AssayConfigBuilder::new()
            .steps(3)
            .drug("A", DilutionSeries::new(90.0, 3.0).unwrap())
            .drug("B", DilutionSeries::new(90.0, 3.0).unwrap())
            .drug("C", DilutionSeries::new(90.0, 3.0).unwrap())
            .build()
            .unwrap();
        assert!(matches!(
            validate_drug_set(&table(), &config),
            Err(AssayError::ConfigurationMismatch { .. })
        ));
    }

    #[test]
    fn inexact_replicate_division_is_shape_mismatch() {
        let config = AssayConfigBuilder::new()
            .steps(4)
            .drug("A", DilutionSeries::new(90.0, 3.0).unwrap())
            .drug("B", DilutionSeries::new(1.0, 10.0).unwrap())
            .build()
            .unwrap();
        assert!(matches!(
            assign_concentrations(&table(), &config, &ProgressReporter::new()),
            Err(AssayError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn per_drug_step_override_is_honoured() {
        let config = AssayConfigBuilder::new()
            .steps(3)
            .log_scale(false)
            .drug(
                "A",
                DrugDilution {
                    series: DilutionSeries::new(8.0, 2.0).unwrap(),
                    steps: Some(6),
                },
            )
            .drug("B", DilutionSeries::new(1.0, 10.0).unwrap())
            .build()
            .unwrap();
        let assigned = assign_concentrations(&table(), &config, &ProgressReporter::new()).unwrap();
        assert_eq!(
            concentrations(&assigned, "A"),
            vec![Some(8.0), Some(4.0), Some(2.0), Some(1.0), Some(0.5), Some(0.25)]
        );
    }

    #[test]
    fn failed_assignment_returns_no_partial_table() {
        let original = table();
        let config = AssayConfigBuilder::new()
            .steps(3)
            .drug("A", DilutionSeries::new(90.0, 3.0).unwrap())
            .drug("B", DilutionSeries::new(-1.0, 10.0).unwrap())
            .build()
            .unwrap();
        let err = assign_concentrations(&original, &config, &ProgressReporter::new()).unwrap_err();
        assert!(matches!(err, AssayError::InvalidValue { ref field, .. } if field.contains("'B'")));
        assert!(!original.has_concentrations());
    }
}
