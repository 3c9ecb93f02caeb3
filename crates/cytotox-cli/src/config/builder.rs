use super::defaults::DefaultsConfig;
use super::file::{FileBackgroundConfig, FileColumnsConfig, FileConfig, drug_dilution};
use super::models::{AppConfig, BackgroundPlan};
use crate::cli::{InspectArgs, ProcessArgs};
use crate::error::{CliError, Result};
use crate::utils::parser;
use cytotox::core::io::schema::PlateSchema;
use cytotox::core::models::series::DilutionSeries;
use cytotox::engine::config::AssayConfigBuilder;
use cytotox::workflows::analyze::AnalysisRequest;
use std::path::Path;
use std::str::FromStr;

pub fn build_config(args: &ProcessArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = load_file_config(args.config.as_deref())?;
    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let assay_file = file_config.assay.take().unwrap_or_default();
    let steps = args.steps.or(assay_file.steps).unwrap_or(defaults.steps);
    let layout = args.layout.or(assay_file.layout).unwrap_or(defaults.layout);
    let log_scale = match (args.scale.log_scale, args.scale.linear) {
        (true, false) => true,
        (false, true) => false,
        _ => assay_file.log_scale.unwrap_or(defaults.log_scale),
    };
    let round_digits = args
        .digits
        .or(assay_file.round_digits)
        .or(defaults.round_digits);
    let drop_controls =
        !args.keep_controls && assay_file.drop_controls.unwrap_or(defaults.drop_controls);

    let mut builder = AssayConfigBuilder::new()
        .steps(steps)
        .layout(layout)
        .log_scale(log_scale)
        .round_digits(round_digits);

    for (name, value) in file_config.drugs.take().unwrap_or_default() {
        let dilution = drug_dilution(&name, &value)?;
        builder = builder.drug(name, dilution);
    }
    for raw in &args.drugs {
        let spec = parser::parse_drug(raw).map_err(|e| CliError::Argument(e.to_string()))?;
        builder = builder.drug(spec.name, DilutionSeries::new(spec.start, spec.factor)?);
    }

    for (drug, control) in file_config.controls.take().unwrap_or_default() {
        builder = builder.control(drug, control);
    }
    for raw in &args.controls {
        let (drug, control) =
            parser::parse_control(raw).map_err(|e| CliError::Argument(e.to_string()))?;
        builder = builder.control(drug, control);
    }

    for name in assay_file
        .exclude
        .unwrap_or_default()
        .into_iter()
        .chain(args.exclude.iter().cloned())
    {
        builder = builder.exclude(name);
    }

    let core_config = builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let schema = build_schema(file_config.columns.take())?;
    let background = resolve_background(args, file_config.background.take())?;
    let samples = (!args.samples.is_empty()).then(|| args.samples.clone());

    Ok(AppConfig {
        inputs: args.input.clone(),
        output: args.output.clone(),
        records_output: args.records.clone(),
        schema,
        background,
        request: AnalysisRequest {
            drop_controls,
            samples,
        },
        core_config,
    })
}

/// The plate schema for `inspect`, which only needs the `[columns]` section.
pub fn build_inspect_schema(args: &InspectArgs) -> Result<PlateSchema> {
    let mut file_config = load_file_config(args.config.as_deref())?;
    build_schema(file_config.columns.take())
}

fn load_file_config(path: Option<&Path>) -> Result<FileConfig> {
    match path {
        Some(path) => FileConfig::from_file(path),
        None => Ok(FileConfig::default()),
    }
}

fn build_schema(columns: Option<FileColumnsConfig>) -> Result<PlateSchema> {
    let columns = columns.unwrap_or_default();
    let defaults = PlateSchema::default();

    let delimiter = match columns.delimiter.as_deref() {
        None => defaults.delimiter,
        Some(d) => match d.as_bytes() {
            [byte] => *byte,
            _ => {
                return Err(CliError::Config(format!(
                    "`columns.delimiter` must be a single ASCII character, got '{d}'"
                )));
            }
        },
    };

    Ok(PlateSchema {
        role_column: columns.role.unwrap_or(defaults.role_column),
        sample_column: columns.sample.unwrap_or(defaults.sample_column),
        wavelength_column: columns.wavelength.unwrap_or(defaults.wavelength_column),
        absorbance_column: columns.absorbance.unwrap_or(defaults.absorbance_column),
        control_role: columns.control_role.unwrap_or(defaults.control_role),
        blank_role: columns.blank_role.unwrap_or(defaults.blank_role),
        delimiter,
        ..defaults
    })
}

fn resolve_background(
    args: &ProcessArgs,
    file_val: Option<FileBackgroundConfig>,
) -> Result<BackgroundPlan> {
    if !args.background.is_empty() {
        return Ok(BackgroundPlan::ReferenceFiles(args.background.clone()));
    }
    if let (Some(signal), Some(reference)) = (args.signal_wavelength, args.reference_wavelength) {
        return Ok(BackgroundPlan::Wavelengths { signal, reference });
    }

    let file_val = file_val.unwrap_or_default();
    let files = file_val.reference_files.unwrap_or_default();
    match (
        file_val.signal_wavelength,
        file_val.reference_wavelength,
        files.is_empty(),
    ) {
        (None, None, true) => Ok(BackgroundPlan::None),
        (None, None, false) => Ok(BackgroundPlan::ReferenceFiles(files)),
        (Some(signal), Some(reference), true) => {
            Ok(BackgroundPlan::Wavelengths { signal, reference })
        }
        (Some(_), Some(_), false) => Err(CliError::Config(
            "`background` takes either a wavelength pair or `reference-files`, not both"
                .to_string(),
        )),
        _ => Err(CliError::Config(
            "`background` requires both `signal-wavelength` and `reference-wavelength`"
                .to_string(),
        )),
    }
}

fn parse_set_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {kind} value for {key}: {value}")))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let key = key.trim();

        if let Some(name) = key.strip_prefix("drugs.") {
            let spec = parser::parse_drug(&format!("{name}={value_str}"))
                .map_err(|e| CliError::Config(e.to_string()))?;
            config.drugs.get_or_insert_with(Default::default).insert(
                spec.name,
                toml::Value::Array(vec![
                    toml::Value::Float(spec.start),
                    toml::Value::Float(spec.factor),
                ]),
            );
            continue;
        }
        if let Some(drug) = key.strip_prefix("controls.") {
            config
                .controls
                .get_or_insert_with(Default::default)
                .insert(drug.to_string(), value_str.trim().to_string());
            continue;
        }

        match key {
            "assay.steps" => {
                config.assay.get_or_insert_with(Default::default).steps =
                    Some(parse_set_value(key, value_str, "integer")?);
            }
            "assay.layout" => {
                config.assay.get_or_insert_with(Default::default).layout =
                    Some(value_str.parse().map_err(CliError::Config)?);
            }
            "assay.log-scale" => {
                config.assay.get_or_insert_with(Default::default).log_scale =
                    Some(parse_set_value(key, value_str, "boolean")?);
            }
            "assay.round-digits" => {
                config.assay.get_or_insert_with(Default::default).round_digits =
                    Some(parse_set_value(key, value_str, "integer")?);
            }
            "assay.drop-controls" => {
                config.assay.get_or_insert_with(Default::default).drop_controls =
                    Some(parse_set_value(key, value_str, "boolean")?);
            }
            "assay.exclude" => {
                config.assay.get_or_insert_with(Default::default).exclude = Some(
                    value_str
                        .split(',')
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(str::to_string)
                        .collect(),
                );
            }
            "background.signal-wavelength" => {
                config
                    .background
                    .get_or_insert_with(Default::default)
                    .signal_wavelength = Some(parse_set_value(key, value_str, "integer")?);
            }
            "background.reference-wavelength" => {
                config
                    .background
                    .get_or_insert_with(Default::default)
                    .reference_wavelength = Some(parse_set_value(key, value_str, "integer")?);
            }
            "columns.delimiter" => {
                config.columns.get_or_insert_with(Default::default).delimiter =
                    Some(value_str.to_string());
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
