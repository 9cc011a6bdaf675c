pub mod comparator;
pub mod engine;
pub mod orchestrator;

pub use crate::domain::model::{Location, RunReport, UpdateResult, UpdateStatus};
pub use crate::domain::ports::{ImageRole, ImageStore, LocationRegistry, MapImageFetcher};
pub use crate::utils::error::Result;
