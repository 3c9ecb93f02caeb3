use super::load_plates;
use crate::cli::ProcessArgs;
use crate::config::builder::build_config;
use crate::config::models::{AppConfig, BackgroundPlan};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use cytotox::core::io::export::{write_records_csv_to_path, write_wide_csv_to_path};
use cytotox::core::models::record::SampleRole;
use cytotox::engine::progress::ProgressReporter;
use cytotox::workflows::analyze::{self, AnalysisResult, BackgroundSource};
use tracing::{info, warn};

pub fn run(args: ProcessArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let app = build_config(&args)?;
    let progress_handler = CliProgressHandler::new();
    let result = analyze_plates(&app, &progress_handler)?;
    info!(
        "{} analysis phase(s) completed, writing outputs.",
        progress_handler.phases_done()
    );
    write_outputs(&app, &result)
}

fn analyze_plates(app: &AppConfig, progress: &CliProgressHandler) -> Result<AnalysisResult> {
    info!("Loading {} plate file(s)...", app.inputs.len());
    let table = load_plates(&app.inputs, &app.schema)?;
    let blanks = table.iter().filter(|r| r.role == SampleRole::Blank).count();
    let live = table.without_roles(&[SampleRole::Blank]);
    info!(
        rows = live.len(),
        blanks_dropped = blanks,
        "Plates loaded."
    );
    for name in live.experiment_names().iter().flatten() {
        println!("Experiment: {name}");
    }

    let reference_table;
    let background = match &app.background {
        BackgroundPlan::None => BackgroundSource::None,
        BackgroundPlan::Wavelengths { signal, reference } => BackgroundSource::Wavelengths {
            signal: *signal,
            reference: *reference,
        },
        BackgroundPlan::ReferenceFiles(paths) => {
            if paths.len() != app.inputs.len() {
                warn!(
                    "{} background file(s) given for {} plate file(s).",
                    paths.len(),
                    app.inputs.len()
                );
            }
            reference_table = load_plates(paths, &app.schema)?.without_roles(&[SampleRole::Blank]);
            BackgroundSource::ReferencePlates(&reference_table)
        }
    };

    let reporter = ProgressReporter::with_callback(progress.get_callback());
    println!("Starting analysis...");
    let result = analyze::run(&live, background, &app.request, &app.core_config, &reporter)?;
    info!(
        "Analysis finished with {} sample block(s) over {} step(s).",
        result.wide.blocks().len(),
        result.wide.steps()
    );
    Ok(result)
}

fn write_outputs(app: &AppConfig, result: &AnalysisResult) -> Result<()> {
    write_wide_csv_to_path(&result.wide, &app.output).map_err(|e| CliError::FileParsing {
        path: app.output.clone(),
        source: e.into(),
    })?;
    println!(
        "✓ Wide table ({} samples) written to: {}",
        result.wide.blocks().len(),
        app.output.display()
    );

    if let Some(path) = &app.records_output {
        write_records_csv_to_path(&result.records, &app.schema, path).map_err(|e| {
            CliError::FileParsing {
                path: path.clone(),
                source: e.into(),
            }
        })?;
        println!(
            "✓ Per-well table ({} rows) written to: {}",
            result.records.len(),
            path.display()
        );
    }
    Ok(())
}
