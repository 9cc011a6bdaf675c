use crate::config::WatchSettings;
use crate::utils::error::{Result, WatchError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub api: Option<ApiConfig>,
    pub paths: Option<PathsConfig>,
    pub run: Option<RunConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    pub endpoint: Option<String>,
    pub size: Option<String>,
    pub maptype: Option<String>,
    pub marker: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub key_variable: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    pub registry: Option<PathBuf>,
    pub reference_dir: Option<PathBuf>,
    pub candidate_dir: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    pub report: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    pub fail_fast: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(WatchError::Io)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| WatchError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MAP_ENDPOINT})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| WatchError::config(format!("invalid substitution pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 把有設定的欄位覆蓋到 settings 上
    pub fn apply(self, settings: &mut WatchSettings) {
        if let Some(api) = self.api {
            let target = &mut settings.api;
            if let Some(endpoint) = api.endpoint {
                target.endpoint = endpoint;
            }
            if let Some(size) = api.size {
                target.size = size;
            }
            if let Some(maptype) = api.maptype {
                target.maptype = maptype;
            }
            if let Some(marker) = api.marker {
                target.marker = marker;
            }
            if api.timeout_seconds.is_some() {
                target.timeout_seconds = api.timeout_seconds;
            }
            if let Some(key_variable) = api.key_variable {
                target.key_variable = key_variable;
            }
        }

        if let Some(paths) = self.paths {
            if let Some(path) = paths.registry {
                settings.registry_path = path;
            }
            if let Some(path) = paths.reference_dir {
                settings.reference_dir = path;
            }
            if let Some(path) = paths.candidate_dir {
                settings.candidate_dir = path;
            }
            if let Some(path) = paths.env_file {
                settings.env_file = path;
            }
            if let Some(path) = paths.report {
                settings.report_path = path;
            }
        }

        if let Some(true) = self.run.and_then(|r| r.fail_fast) {
            settings.failure_policy = crate::core::orchestrator::FailurePolicy::Abort;
        }
    }
}
