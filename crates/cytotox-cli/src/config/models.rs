use cytotox::core::io::schema::PlateSchema;
use cytotox::engine::config::AssayConfig;
use cytotox::workflows::analyze::AnalysisRequest;
use std::path::PathBuf;

/// Background correction as configured, before any reference file is read.
#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundPlan {
    None,
    Wavelengths { signal: u32, reference: u32 },
    ReferenceFiles(Vec<PathBuf>),
}

pub struct AppConfig {
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub records_output: Option<PathBuf>,
    pub schema: PlateSchema,
    pub background: BackgroundPlan,
    pub request: AnalysisRequest,
    pub core_config: AssayConfig,
}
