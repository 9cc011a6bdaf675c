use crate::utils::error::{Result, WatchError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(WatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(WatchError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(WatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(WatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(WatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(WatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(WatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 驗證 `WIDTHxHEIGHT` 格式的影像尺寸
pub fn validate_image_size(field_name: &str, size: &str) -> Result<()> {
    let parsed = size
        .split_once('x')
        .and_then(|(w, h)| Some((w.parse::<u32>().ok()?, h.parse::<u32>().ok()?)));

    match parsed {
        Some((w, h)) if w > 0 && h > 0 => Ok(()),
        _ => Err(WatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: size.to_string(),
            reason: "Expected WIDTHxHEIGHT, e.g. 600x300".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("api.endpoint", "https://maps.googleapis.com/maps/api/staticmap").is_ok());
        assert!(validate_url("api.endpoint", "http://127.0.0.1:8080/staticmap").is_ok());
        assert!(validate_url("api.endpoint", "").is_err());
        assert!(validate_url("api.endpoint", "not a url").is_err());
        assert!(validate_url("api.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("lat", 59.33, -90.0, 90.0).is_ok());
        assert!(validate_range("lat", 91.0, -90.0, 90.0).is_err());
        assert!(validate_range("zoom", 22u32, 0, 21).is_err());
    }

    #[test]
    fn test_validate_image_size() {
        assert!(validate_image_size("api.size", "600x300").is_ok());
        assert!(validate_image_size("api.size", "600").is_err());
        assert!(validate_image_size("api.size", "0x300").is_err());
        assert!(validate_image_size("api.size", "axb").is_err());
    }
}
