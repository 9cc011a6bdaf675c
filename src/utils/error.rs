use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Network request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Map API responded with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Image decoding failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("No {variable} found; a placeholder was written to {}", .path.display())]
    MissingApiKey { variable: String, path: PathBuf },

    #[error("Invalid {variable} in {}", .path.display())]
    InvalidApiKey { variable: String, path: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    RemoteApi,
    Data,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl WatchError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(_) => ErrorCategory::Network,
            Self::Api { .. } => ErrorCategory::RemoteApi,
            Self::Decode(_) | Self::Serialization(_) => ErrorCategory::Data,
            Self::Io(_) => ErrorCategory::Storage,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingApiKey { .. }
            | Self::InvalidApiKey { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Data => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::RemoteApi => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::Fetch(_) => "Check your network connection and try again".to_string(),
            Self::Api { status, .. } if *status == 401 || *status == 403 => {
                "Check that the API key is valid and has the Static Maps API enabled".to_string()
            }
            Self::Api { status, .. } if *status == 429 => {
                "The API quota is exhausted; wait before running again".to_string()
            }
            Self::Api { .. } => "Check the map API endpoint and request parameters".to_string(),
            Self::Decode(_) => "The stored image is corrupt; it will be replaced on the next change".to_string(),
            Self::Io(_) => "Check disk space and write permissions for the image and registry paths".to_string(),
            Self::Serialization(_) => "Fix the JSON syntax in the location registry file".to_string(),
            Self::ConfigError { .. } | Self::ConfigValidationError { .. } => {
                "Review the configuration file and command line arguments".to_string()
            }
            Self::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of '{}'", field)
            }
            Self::MissingApiKey { path, .. } => {
                format!("Open {} and enter your API key", path.display())
            }
            Self::InvalidApiKey { path, .. } => {
                format!("Check {} and enter a valid API key", path.display())
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Fetch(_) => "Could not reach the map API".to_string(),
            Self::Api { status, .. } => format!("The map API rejected the request (HTTP {})", status),
            Self::Decode(_) => "An image could not be decoded".to_string(),
            Self::Io(e) => format!("File system error: {}", e),
            Self::Serialization(e) => format!("The location registry is not valid JSON: {}", e),
            Self::MissingApiKey { variable, path } => format!(
                "No {} found. Open the {} file and enter your API key.",
                variable,
                path.display()
            ),
            Self::InvalidApiKey { variable, path } => format!(
                "Invalid {}. Check the {} file and enter a valid API key.",
                variable,
                path.display()
            ),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WatchError>;
