pub mod api_key;
pub mod toml_config;

use crate::core::orchestrator::FailurePolicy;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_image_size, validate_non_empty_string, validate_path, validate_range, validate_url,
    Validate,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/staticmap";

/// Static-map request settings shared by every location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub endpoint: String,
    pub size: String,
    pub maptype: String,
    /// Marker style; the coordinates are appended after a `|`.
    pub marker: String,
    pub timeout_seconds: Option<u64>,
    pub key_variable: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            size: "600x300".to_string(),
            maptype: "hybrid".to_string(),
            marker: "color:red|label:S".to_string(),
            timeout_seconds: None,
            key_variable: api_key::DEFAULT_KEY_VARIABLE.to_string(),
        }
    }
}

/// Everything one run needs, resolved from defaults, the optional TOML file and the CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchSettings {
    pub registry_path: PathBuf,
    pub reference_dir: PathBuf,
    pub candidate_dir: PathBuf,
    pub env_file: PathBuf,
    pub report_path: PathBuf,
    pub failure_policy: FailurePolicy,
    pub api: ApiSettings,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            registry_path: PathBuf::from("images.json"),
            reference_dir: PathBuf::from("old_images"),
            candidate_dir: PathBuf::from("new_images"),
            env_file: PathBuf::from(".env"),
            report_path: PathBuf::from("image_comparison.html"),
            failure_policy: FailurePolicy::default(),
            api: ApiSettings::default(),
        }
    }
}

impl Validate for WatchSettings {
    fn validate(&self) -> Result<()> {
        validate_url("api.endpoint", &self.api.endpoint)?;
        validate_image_size("api.size", &self.api.size)?;
        validate_non_empty_string("api.maptype", &self.api.maptype)?;
        validate_non_empty_string("api.key_variable", &self.api.key_variable)?;
        if let Some(timeout) = self.api.timeout_seconds {
            validate_range("api.timeout_seconds", timeout, 1, 600)?;
        }

        for (field, path) in [
            ("paths.registry", &self.registry_path),
            ("paths.reference_dir", &self.reference_dir),
            ("paths.candidate_dir", &self.candidate_dir),
            ("paths.env_file", &self.env_file),
            ("paths.report", &self.report_path),
        ] {
            validate_path(field, &path.to_string_lossy())?;
        }

        if self.reference_dir == self.candidate_dir {
            return Err(crate::utils::error::WatchError::ConfigValidationError {
                field: "paths.candidate_dir".to_string(),
                message: "reference and candidate images must live in different directories"
                    .to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "map-watch")]
#[command(about = "Track changes in satellite imagery for a list of coordinates")]
pub struct CliConfig {
    /// Path to the JSON location registry
    #[arg(long)]
    pub registry: Option<PathBuf>,

    /// File holding the API key as KEY=value
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    /// Directory of accepted reference images
    #[arg(long)]
    pub reference_dir: Option<PathBuf>,

    /// Directory of freshly fetched candidate images
    #[arg(long)]
    pub candidate_dir: Option<PathBuf>,

    /// Where to write the HTML comparison page
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Optional TOML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Abort the whole run on the first failing location
    #[arg(long)]
    pub fail_fast: bool,

    /// Skip writing the HTML report
    #[arg(long)]
    pub no_report: bool,

    /// Write the HTML report but do not open it
    #[arg(long)]
    pub no_open: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 依序套用預設值、TOML 設定檔與命令列參數
    pub fn to_settings(&self) -> Result<WatchSettings> {
        let mut settings = WatchSettings::default();

        if let Some(path) = &self.config {
            tracing::info!("📁 Loading settings from: {}", path.display());
            toml_config::TomlConfig::from_file(path)?.apply(&mut settings);
        }

        if let Some(path) = &self.registry {
            settings.registry_path = path.clone();
        }
        if let Some(path) = &self.env_file {
            settings.env_file = path.clone();
        }
        if let Some(path) = &self.reference_dir {
            settings.reference_dir = path.clone();
        }
        if let Some(path) = &self.candidate_dir {
            settings.candidate_dir = path.clone();
        }
        if let Some(path) = &self.report {
            settings.report_path = path.clone();
        }
        if self.fail_fast {
            settings.failure_policy = FailurePolicy::Abort;
        }

        settings.validate()?;
        Ok(settings)
    }
}
