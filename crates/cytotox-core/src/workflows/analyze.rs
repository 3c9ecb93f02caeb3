use crate::core::models::table::RecordTable;
use crate::engine::background::{subtract_reference, subtract_wavelength};
use crate::engine::concentration::{assign_concentrations, validate_drug_set};
use crate::engine::config::AssayConfig;
use crate::engine::error::AssayError;
use crate::engine::normalization::{normalize, resolve_control_mapping};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::reshape::{WideTable, reshape};
use tracing::{info, instrument};

/// Where the background absorbance comes from.
#[derive(Debug, Clone, Copy, Default)]
pub enum BackgroundSource<'a> {
    /// Absorbances are used as read.
    #[default]
    None,
    /// Signal and reference reads live in the same table.
    Wavelengths { signal: u32, reference: u32 },
    /// A separately read plate set, aligned row by row with the live table.
    ReferencePlates(&'a RecordTable),
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    /// Remove the control samples before reshaping.
    pub drop_controls: bool,
    /// Samples to reshape, in column order. `None` reshapes every remaining sample.
    pub samples: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// The long table after normalization (and control removal, if requested).
    pub records: RecordTable,
    pub wide: WideTable,
}

/// Runs the full analysis on an ingested, blank-free table.
///
/// Configuration problems are reported before any stage runs; the stages themselves are
/// all-or-nothing, so an error never leaves partial results behind.
#[instrument(skip_all, name = "analysis_workflow")]
pub fn run(
    table: &RecordTable,
    background: BackgroundSource<'_>,
    request: &AnalysisRequest,
    config: &AssayConfig,
    reporter: &ProgressReporter,
) -> Result<AnalysisResult, AssayError> {
    // === Phase 0: Validation ===
    reporter.report(Progress::PhaseStart { name: "Validation" });
    info!(
        rows = table.len(),
        plates = table.plates().len(),
        samples = table.samples().len(),
        "Starting analysis."
    );
    validate_drug_set(table, config)?;
    let mapping = resolve_control_mapping(table, config)?;
    reporter.report(Progress::PhaseFinish);

    // === Phase 1: Background correction ===
    reporter.report(Progress::PhaseStart {
        name: "Background correction",
    });
    let corrected = match background {
        BackgroundSource::None => {
            reporter.message("No background source; using raw absorbances.");
            table.clone()
        }
        BackgroundSource::Wavelengths { signal, reference } => {
            subtract_wavelength(table, signal, reference)?
        }
        BackgroundSource::ReferencePlates(reference) => subtract_reference(table, reference)?,
    };
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Concentrations ===
    reporter.report(Progress::PhaseStart {
        name: "Concentration assignment",
    });
    let with_concentrations = assign_concentrations(&corrected, config, reporter)?;
    reporter.report(Progress::PhaseFinish);

    // === Phase 3: Normalization ===
    reporter.report(Progress::PhaseStart {
        name: "Normalization",
    });
    let normalized = normalize(&with_concentrations, config, reporter)?;
    reporter.report(Progress::PhaseFinish);

    // === Phase 4: Reshape ===
    reporter.report(Progress::PhaseStart { name: "Reshape" });
    let records = if request.drop_controls {
        let mut controls: Vec<String> = mapping.into_values().collect();
        controls.sort();
        controls.dedup();
        info!(controls = ?controls, "Dropping control samples.");
        normalized.drop_controls(Some(&controls))?
    } else {
        normalized
    };
    let wide = reshape(&records, request.samples.as_deref(), config)?;
    reporter.report(Progress::PhaseFinish);

    info!(
        blocks = wide.blocks().len(),
        steps = wide.steps(),
        "Analysis complete."
    );
    Ok(AnalysisResult { records, wide })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::record::{PlateId, SampleRole, WellRecord};
    use crate::core::models::series::DilutionSeries;
    use crate::engine::config::AssayConfigBuilder;
    use std::sync::Mutex;

    fn run_of(sample: &str, role: SampleRole, wavelength: u32, values: &[f64]) -> Vec<WellRecord> {
        values
            .iter()
            .map(|&v| WellRecord::new(sample, role, wavelength, v, PlateId(1)))
            .collect()
    }

    fn dual_read_table() -> RecordTable {
        let mut records = run_of("Drug_1", SampleRole::Regular, 490, &[1.1, 1.1, 3.1, 3.1]);
        records.extend(run_of("DMSO", SampleRole::Control, 490, &[2.1, 2.1, 2.1, 2.1]));
        records.extend(run_of("Drug_1", SampleRole::Regular, 700, &[0.1; 4]));
        records.extend(run_of("DMSO", SampleRole::Control, 700, &[0.1; 4]));
        RecordTable::from_records(records)
    }

    fn config() -> AssayConfig {
        AssayConfigBuilder::new()
            .steps(2)
            .log_scale(false)
            .drug("Drug", DilutionSeries::new(10.0, 10.0).unwrap())
            .round_digits(Some(6))
            .build()
            .unwrap()
    }

    #[test]
    fn full_run_corrects_normalizes_and_reshapes() {
        let request = AnalysisRequest {
            drop_controls: true,
            samples: None,
        };
        let result = run(
            &dual_read_table(),
            BackgroundSource::Wavelengths {
                signal: 490,
                reference: 700,
            },
            &request,
            &config(),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(result.records.samples(), vec!["Drug"]);
        let block = result.wide.block("Drug").unwrap();
        assert_eq!(block.concentrations, vec![Some(10.0), Some(1.0)]);
        assert_eq!(block.values, vec![vec![50.0, 150.0], vec![50.0, 150.0]]);
    }

    #[test]
    fn controls_are_kept_when_requested() {
        let result = run(
            &dual_read_table(),
            BackgroundSource::Wavelengths {
                signal: 490,
                reference: 700,
            },
            &AnalysisRequest::default(),
            &config(),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(result.wide.blocks().len(), 2);
        let control = result.wide.block("DMSO").unwrap();
        assert_eq!(control.concentrations, vec![None, None]);
    }

    #[test]
    fn configuration_errors_surface_before_any_stage_runs() {
        let reporter_events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event: Progress| {
            reporter_events.lock().unwrap().push(event);
        }));
        let config = AssayConfigBuilder::new()
            .steps(2)
            .drug("Other", DilutionSeries::new(10.0, 10.0).unwrap())
            .build()
            .unwrap();

        let err = run(
            &dual_read_table(),
            BackgroundSource::None,
            &AnalysisRequest::default(),
            &config,
            &reporter,
        )
        .unwrap_err();
        assert!(matches!(err, AssayError::ConfigurationMismatch { .. }));
        drop(reporter);
        assert_eq!(
            reporter_events.into_inner().unwrap(),
            vec![Progress::PhaseStart { name: "Validation" }]
        );
    }

    #[test]
    fn per_sample_stages_report_each_drug() {
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event: Progress| {
            events.lock().unwrap().push(event);
        }));
        run(
            &dual_read_table(),
            BackgroundSource::Wavelengths {
                signal: 490,
                reference: 700,
            },
            &AnalysisRequest::default(),
            &config(),
            &reporter,
        )
        .unwrap();
        drop(reporter);

        let per_sample = |phase: &'static str| {
            vec![
                Progress::PhaseStart { name: phase },
                Progress::SamplesStart { samples: 1 },
                Progress::SampleDone {
                    sample: "Drug".to_string(),
                },
                Progress::SamplesFinish,
                Progress::PhaseFinish,
            ]
        };
        let mut expected = vec![
            Progress::PhaseStart { name: "Validation" },
            Progress::PhaseFinish,
            Progress::PhaseStart {
                name: "Background correction",
            },
            Progress::PhaseFinish,
        ];
        expected.extend(per_sample("Concentration assignment"));
        expected.extend(per_sample("Normalization"));
        expected.extend([Progress::PhaseStart { name: "Reshape" }, Progress::PhaseFinish]);
        assert_eq!(events.into_inner().unwrap(), expected);
    }

    #[test]
    fn reference_plate_background_is_subtracted() {
        let live = RecordTable::from_records(
            run_of("Drug", SampleRole::Regular, 490, &[1.5, 1.5, 3.5, 3.5])
                .into_iter()
                .chain(run_of("DMSO", SampleRole::Control, 490, &[2.5; 4]))
                .collect(),
        );
        let reference = RecordTable::from_records(
            run_of("Drug", SampleRole::Regular, 490, &[0.5; 4])
                .into_iter()
                .chain(run_of("DMSO", SampleRole::Control, 490, &[0.5; 4]))
                .collect(),
        );
        let request = AnalysisRequest {
            drop_controls: true,
            samples: Some(vec!["Drug".to_string()]),
        };
        let result = run(
            &live,
            BackgroundSource::ReferencePlates(&reference),
            &request,
            &config(),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(
            result.wide.rows(),
            vec![
                vec![Some(10.0), Some(50.0), Some(150.0)],
                vec![Some(1.0), Some(50.0), Some(150.0)],
            ]
        );
    }
}
