use crate::domain::model::Location;
use crate::domain::ports::{LocationRegistry, RegistryLoad};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use serde::Serialize;
use std::ffi::OsString;
use std::path::PathBuf;
use tokio::fs;

/// Location registry stored as a hand-editable, pretty-printed JSON array.
#[derive(Debug, Clone)]
pub struct JsonLocationRegistry {
    path: PathBuf,
}

impl JsonLocationRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("registry"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn write_atomically(&self, locations: &[Location]) -> Result<()> {
        let json = to_pretty_json(locations)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        // 先寫暫存檔再 rename，避免中途失敗留下半份 JSON
        let temp_path = self.temp_path();
        fs::write(&temp_path, json).await?;
        fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}

/// 四格縮排，方便使用者手動編輯
pub fn to_pretty_json(locations: &[Location]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    locations.serialize(&mut serializer)?;
    Ok(buf)
}

impl LocationRegistry for JsonLocationRegistry {
    async fn load(&self) -> Result<RegistryLoad> {
        if !fs::try_exists(&self.path).await? {
            tracing::warn!(
                "📝 No registry found at {}, writing a template",
                self.path.display()
            );
            self.write_atomically(&Location::template()).await?;
            return Ok(RegistryLoad::TemplateCreated(self.path.clone()));
        }

        let content = fs::read(&self.path).await?;
        let locations: Vec<Location> = serde_json::from_slice(&content)?;
        for location in &locations {
            location.validate()?;
        }

        tracing::info!(
            "📋 Loaded {} locations from {}",
            locations.len(),
            self.path.display()
        );
        Ok(RegistryLoad::Loaded(locations))
    }

    async fn save(&self, locations: &[Location]) -> Result<()> {
        self.write_atomically(locations).await?;
        tracing::info!(
            "💾 Saved {} locations to {}",
            locations.len(),
            self.path.display()
        );
        Ok(())
    }
}
