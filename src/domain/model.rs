use crate::utils::error::{Result, WatchError};
use crate::utils::validation::{validate_range, Validate};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_ZOOM: u32 = 17;
pub const MAX_ZOOM: u32 = 21;

/// 經緯度值，保留使用者在 registry 中的原始寫法（字串或數字）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinate {
    Number(serde_json::Number),
    Text(String),
}

impl Coordinate {
    pub fn value(&self) -> Option<f64> {
        let value = match self {
            Self::Number(n) => n.as_f64(),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
        };
        value.filter(|v| v.is_finite())
    }
}

impl From<&str> for Coordinate {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<f64> for Coordinate {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map(Self::Number)
            .unwrap_or_else(|| Self::Text(value.to_string()))
    }
}

/// Text coordinates are written without surrounding whitespace, so `" 59.33"`
/// and `"59.33"` map to the same image key and request.
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s.trim()),
        }
    }
}

/// Filename-safe key addressing the stored images of one coordinate pair.
///
/// Built from the trimmed coordinate text: `.` becomes `_`, `-` becomes `n`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageKey(String);

impl ImageKey {
    pub fn from_coordinates(lat: &Coordinate, long: &Coordinate) -> Self {
        let stem = format!("{}_{}", lat, long).replace('.', "_").replace('-', "n");
        Self(format!("{}.jpg", stem))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: Coordinate,
    pub long: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<u32>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_pulled: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_changed: Option<NaiveDateTime>,
    /// 使用者手動加入的其他欄位，存檔時原樣寫回
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Location {
    pub fn new(name: impl Into<String>, lat: impl Into<Coordinate>, long: impl Into<Coordinate>) -> Self {
        Self {
            lat: lat.into(),
            long: long.into(),
            zoom: None,
            name: name.into(),
            last_pulled: None,
            last_changed: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_zoom(mut self, zoom: u32) -> Self {
        self.zoom = Some(zoom);
        self
    }

    /// Zoom level used for the request; absent or zero falls back to 17.
    pub fn effective_zoom(&self) -> u32 {
        match self.zoom {
            Some(zoom) if zoom > 0 => zoom,
            _ => DEFAULT_ZOOM,
        }
    }

    pub fn image_key(&self) -> ImageKey {
        ImageKey::from_coordinates(&self.lat, &self.long)
    }

    pub fn display_location(&self) -> String {
        format!("{}, {}", self.lat, self.long)
    }

    /// Placeholder registry written when no registry file exists yet.
    pub fn template() -> Vec<Location> {
        vec![
            Location::new("Location 1", "0", "0").with_zoom(10),
            Location::new("Location 2", "0", "0").with_zoom(10),
        ]
    }
}

impl Validate for Location {
    fn validate(&self) -> Result<()> {
        let field = |name: &str| format!("{}.{}", self.name, name);

        let lat = self.lat.value().ok_or_else(|| WatchError::InvalidConfigValueError {
            field: field("lat"),
            value: self.lat.to_string(),
            reason: "Latitude must be a number".to_string(),
        })?;
        validate_range(&field("lat"), lat, -90.0, 90.0)?;

        let long = self.long.value().ok_or_else(|| WatchError::InvalidConfigValueError {
            field: field("long"),
            value: self.long.to_string(),
            reason: "Longitude must be a number".to_string(),
        })?;
        validate_range(&field("long"), long, -180.0, 180.0)?;

        if let Some(zoom) = self.zoom {
            validate_range(&field("zoom"), zoom, 0, MAX_ZOOM)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    New,
    Changed,
    Unchanged,
    Failed,
}

impl UpdateStatus {
    pub fn is_promotion(&self) -> bool {
        matches!(self, Self::New | Self::Changed)
    }
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::New => "New",
            Self::Changed => "Changed",
            Self::Unchanged => "Unchanged",
            Self::Failed => "Failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub struct UpdateResult {
    pub name: String,
    pub location: String,
    pub status: UpdateStatus,
    pub reference_image_path: PathBuf,
    pub candidate_image_path: PathBuf,
    pub detail: Option<String>,
    /// Reference bytes that were overwritten by a `Changed` promotion.
    pub replaced_reference: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub results: Vec<UpdateResult>,
}

impl RunReport {
    pub fn new(results: Vec<UpdateResult>) -> Self {
        Self { results }
    }

    pub fn failed(&self) -> impl Iterator<Item = &UpdateResult> {
        self.results.iter().filter(|r| r.status == UpdateStatus::Failed)
    }

    pub fn count(&self, status: UpdateStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    /// True when at least one location got a fresh candidate this run.
    pub fn has_pulls(&self) -> bool {
        self.results.iter().any(|r| r.status != UpdateStatus::Failed)
    }
}
