use clap::{Args, Parser, Subcommand};
use cytotox::core::models::layout::PlateLayout;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Cytotox CLI - turns plate-reader absorbance exports from cytotoxicity assays into dose-response tables.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assign concentrations, normalize against controls and write the wide table.
    Process(ProcessArgs),
    /// Summarize plate files: experiments, plates, samples and wavelengths.
    Inspect(InspectArgs),
}

/// Arguments for the `process` subcommand.
#[derive(Args, Debug)]
pub struct ProcessArgs {
    // --- Core Arguments ---
    /// Plate-reader CSV exports, one per plate, in plate order.
    #[arg(short, long, required = true, num_args(1..), value_name = "PATH")]
    pub input: Vec<PathBuf>,

    /// Path for the wide dose-response table (CSV).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Path to the assay configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Also write the long per-well table to this path.
    #[arg(long, value_name = "PATH")]
    pub records: Option<PathBuf>,

    // --- Assay Overrides ---
    /// Override the number of dilution steps per drug.
    #[arg(short = 'n', long, value_name = "INT")]
    pub steps: Option<usize>,

    /// Override the plate layout: 'replicate-major' or 'step-major'.
    #[arg(long, value_name = "LAYOUT")]
    pub layout: Option<PlateLayout>,

    /// Override `assay.log-scale` from the config file.
    #[command(flatten)]
    pub scale: ConcentrationScale,

    /// Round normalized values to this many decimal digits.
    #[arg(short, long, value_name = "INT")]
    pub digits: Option<u32>,

    /// Add or replace a dilution series. Can be used multiple times.
    /// Example: --drug MS309=100:3
    #[arg(long = "drug", value_name = "NAME=START:FACTOR")]
    pub drugs: Vec<String>,

    /// Normalize a drug against a specific control. Can be used multiple times.
    /// Example: --control MS309=DMSO
    #[arg(long = "control", value_name = "DRUG=CONTROL")]
    pub controls: Vec<String>,

    /// Leave a sample out of concentration assignment. Can be used multiple times.
    #[arg(long = "exclude", value_name = "NAME")]
    pub exclude: Vec<String>,

    // --- Background Overrides ---
    /// Wavelength (nm) carrying the assay signal.
    #[arg(long, value_name = "NM", requires = "reference_wavelength")]
    pub signal_wavelength: Option<u32>,

    /// Wavelength (nm) read as background in the same plates.
    #[arg(long, value_name = "NM", requires = "signal_wavelength")]
    pub reference_wavelength: Option<u32>,

    /// Background plate exports, aligned one-to-one with the inputs.
    #[arg(long = "background", value_name = "PATH", conflicts_with = "signal_wavelength")]
    pub background: Vec<PathBuf>,

    // --- Output Overrides ---
    /// Keep control samples in the wide table.
    #[arg(long)]
    pub keep_controls: bool,

    /// Restrict the wide table to these samples, in this order. Can be used multiple times.
    #[arg(long = "sample", value_name = "NAME")]
    pub samples: Vec<String>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S assay.steps=6
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// A group to handle mutually exclusive flags for the concentration scale.
#[derive(Args, Debug, Clone, Copy, Default)]
#[group(required = false, multiple = false)]
pub struct ConcentrationScale {
    /// Report concentrations as log10 values.
    #[arg(long)]
    pub log_scale: bool,
    /// Report concentrations as plain values.
    #[arg(long)]
    pub linear: bool,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Plate-reader CSV exports, one per plate, in plate order.
    #[arg(short, long, required = true, num_args(1..), value_name = "PATH")]
    pub input: Vec<PathBuf>,

    /// Configuration file whose `[columns]` section describes the export.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn process_accepts_several_inputs_and_overrides() {
        let cli = Cli::parse_from([
            "cytotox", "-vv", "process", "-i", "p1.csv", "p2.csv", "-o", "wide.csv", "--steps",
            "6", "--layout", "step-major", "--linear", "--drug", "A=10:2", "--drug", "B=1:3",
        ]);
        assert_eq!(cli.verbose, 2);
        let Commands::Process(args) = cli.command else {
            panic!("Expected 'process' subcommand");
        };
        assert_eq!(args.input.len(), 2);
        assert_eq!(args.steps, Some(6));
        assert_eq!(args.layout, Some(PlateLayout::StepMajor));
        assert!(args.scale.linear && !args.scale.log_scale);
        assert_eq!(args.drugs, vec!["A=10:2", "B=1:3"]);
    }

    #[test]
    fn scale_flags_are_mutually_exclusive() {
        let result = Cli::try_parse_from([
            "cytotox", "process", "-i", "p.csv", "-o", "w.csv", "--linear", "--log-scale",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn wavelength_pair_must_be_complete() {
        let result = Cli::try_parse_from([
            "cytotox", "process", "-i", "p.csv", "-o", "w.csv", "--signal-wavelength", "490",
        ]);
        assert!(result.is_err());
    }
}
