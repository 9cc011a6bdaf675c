pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod report;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::WatchSettings;
pub use crate::core::{
    comparator::ImageComparator,
    engine::{RunOutcome, WatchEngine},
    orchestrator::{FailurePolicy, UpdateOrchestrator},
};
pub use domain::model::{Location, RunReport, UpdateResult, UpdateStatus};
pub use utils::error::{Result, WatchError};
