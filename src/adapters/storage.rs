use crate::domain::model::ImageKey;
use crate::domain::ports::{ImageRole, ImageStore};
use crate::utils::error::Result;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Image store backed by two directories, one per [`ImageRole`].
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    reference_dir: PathBuf,
    candidate_dir: PathBuf,
}

impl LocalImageStore {
    pub fn new(reference_dir: impl Into<PathBuf>, candidate_dir: impl Into<PathBuf>) -> Self {
        Self {
            reference_dir: reference_dir.into(),
            candidate_dir: candidate_dir.into(),
        }
    }

    fn root(&self, role: ImageRole) -> &Path {
        match role {
            ImageRole::Reference => &self.reference_dir,
            ImageRole::Candidate => &self.candidate_dir,
        }
    }
}

impl ImageStore for LocalImageStore {
    async fn ensure_ready(&self) -> Result<()> {
        fs::create_dir_all(&self.reference_dir).await?;
        fs::create_dir_all(&self.candidate_dir).await?;
        tracing::debug!(
            "Image directories ready: {} / {}",
            self.reference_dir.display(),
            self.candidate_dir.display()
        );
        Ok(())
    }

    async fn exists(&self, role: ImageRole, key: &ImageKey) -> Result<bool> {
        Ok(fs::try_exists(self.path_of(role, key)).await?)
    }

    async fn read(&self, role: ImageRole, key: &ImageKey) -> Result<Vec<u8>> {
        let data = fs::read(self.path_of(role, key)).await?;
        Ok(data)
    }

    async fn write(&self, role: ImageRole, key: &ImageKey, data: &[u8]) -> Result<()> {
        let full_path = self.path_of(role, key);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        tracing::debug!("Writing {} bytes to {}", data.len(), full_path.display());
        fs::write(full_path, data).await?;
        Ok(())
    }

    fn path_of(&self, role: ImageRole, key: &ImageKey) -> PathBuf {
        self.root(role).join(key.as_str())
    }
}
