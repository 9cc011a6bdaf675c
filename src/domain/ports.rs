use crate::domain::model::{Coordinate, ImageKey, Location};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Which of the two image namespaces a key is resolved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageRole {
    /// Last accepted snapshot, the comparison baseline.
    Reference,
    /// Snapshot fetched during the current run.
    Candidate,
}

pub trait ImageStore: Send + Sync {
    /// Prepares the backing storage; safe to call more than once.
    fn ensure_ready(&self) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(
        &self,
        role: ImageRole,
        key: &ImageKey,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;
    fn read(
        &self,
        role: ImageRole,
        key: &ImageKey,
    ) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write(
        &self,
        role: ImageRole,
        key: &ImageKey,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn path_of(&self, role: ImageRole, key: &ImageKey) -> PathBuf;
}

#[async_trait]
pub trait MapImageFetcher: Send + Sync {
    /// Requests one rendered map image centred on (lat, long).
    async fn fetch(&self, lat: &Coordinate, long: &Coordinate, zoom: u32) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegistryLoad {
    Loaded(Vec<Location>),
    /// No registry existed; a placeholder was written and nothing should be fetched.
    TemplateCreated(PathBuf),
}

pub trait LocationRegistry: Send + Sync {
    fn load(&self) -> impl std::future::Future<Output = Result<RegistryLoad>> + Send;
    fn save(
        &self,
        locations: &[Location],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
