use crate::utils::error::{Result, WatchError};
use regex::Regex;
use std::fmt;
use std::path::PathBuf;
use tokio::fs;

pub const DEFAULT_KEY_VARIABLE: &str = "GOOGLE_MAPS_API_KEY";
pub const KEY_PLACEHOLDER: &str = "<your_key_here>";
const KEY_PATTERN: &str = r"^[A-Za-z0-9_-]{35,40}$";

#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a key obtained elsewhere, without format checks.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Resolves the API key from the process environment or a `KEY=value` file.
#[derive(Debug, Clone)]
pub struct ApiKeySource {
    env_file: PathBuf,
    variable: String,
}

impl ApiKeySource {
    pub fn new(env_file: impl Into<PathBuf>, variable: impl Into<String>) -> Self {
        Self {
            env_file: env_file.into(),
            variable: variable.into(),
        }
    }

    /// Environment variable wins over the file. A missing key writes a
    /// placeholder line to the file and fails with [`WatchError::MissingApiKey`].
    pub async fn load(&self) -> Result<ApiKey> {
        let from_env = std::env::var(&self.variable)
            .ok()
            .filter(|v| !v.trim().is_empty());
        let value = match from_env {
            Some(value) => Some(value),
            None => self.read_env_file().await?,
        };

        let Some(value) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) else {
            self.write_placeholder().await?;
            tracing::warn!(
                "🔑 No {} found, placeholder written to {}",
                self.variable,
                self.env_file.display()
            );
            return Err(WatchError::MissingApiKey {
                variable: self.variable.clone(),
                path: self.env_file.clone(),
            });
        };

        let pattern = Regex::new(KEY_PATTERN)
            .map_err(|e| WatchError::config(format!("invalid key pattern: {}", e)))?;
        if !pattern.is_match(&value) {
            tracing::warn!("🔑 {} does not look like a valid API key", self.variable);
            return Err(WatchError::InvalidApiKey {
                variable: self.variable.clone(),
                path: self.env_file.clone(),
            });
        }

        tracing::debug!("API key loaded ({} characters)", value.len());
        Ok(ApiKey(value))
    }

    async fn read_env_file(&self) -> Result<Option<String>> {
        if !fs::try_exists(&self.env_file).await? {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.env_file).await?;
        Ok(lookup(&content, &self.variable))
    }

    async fn write_placeholder(&self) -> Result<()> {
        let line = format!("{}={}\n", self.variable, KEY_PLACEHOLDER);

        let content = if fs::try_exists(&self.env_file).await? {
            let mut existing = fs::read_to_string(&self.env_file).await?;
            if !existing.is_empty() && !existing.ends_with('\n') {
                existing.push('\n');
            }
            existing.push_str(&line);
            existing
        } else {
            line
        };

        if let Some(parent) = self.env_file.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.env_file, content).await?;
        Ok(())
    }
}

/// 取出最後一個符合的 `KEY=value`，支援 `export` 前綴與引號
fn lookup(content: &str, variable: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            (key.trim() == variable).then(|| unquote(value.trim()).to_string())
        })
        .last()
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}
