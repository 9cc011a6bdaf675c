use crate::core::orchestrator::UpdateOrchestrator;
use crate::core::{ImageStore, LocationRegistry, MapImageFetcher, Result, RunReport, UpdateStatus};
use crate::domain::ports::RegistryLoad;
use std::path::PathBuf;

#[derive(Debug)]
pub enum RunOutcome {
    /// The registry did not exist; a template was written and nothing was fetched.
    TemplateCreated(PathBuf),
    NoLocations,
    Completed(RunReport),
}

pub struct WatchEngine<R: LocationRegistry, S: ImageStore, F: MapImageFetcher> {
    registry: R,
    orchestrator: UpdateOrchestrator<S, F>,
}

impl<R: LocationRegistry, S: ImageStore, F: MapImageFetcher> WatchEngine<R, S, F> {
    pub fn new(registry: R, orchestrator: UpdateOrchestrator<S, F>) -> Self {
        Self {
            registry,
            orchestrator,
        }
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        tracing::info!("Starting update run...");

        let mut locations = match self.registry.load().await? {
            RegistryLoad::TemplateCreated(path) => return Ok(RunOutcome::TemplateCreated(path)),
            RegistryLoad::Loaded(locations) => locations,
        };

        if locations.is_empty() {
            tracing::info!("Registry is empty, nothing to pull");
            return Ok(RunOutcome::NoLocations);
        }

        let results = self.orchestrator.run(&mut locations).await?;
        let report = RunReport::new(results);

        tracing::info!(
            "📊 {} new, {} changed, {} unchanged, {} failed",
            report.count(UpdateStatus::New),
            report.count(UpdateStatus::Changed),
            report.count(UpdateStatus::Unchanged),
            report.count(UpdateStatus::Failed)
        );

        // 只要有任何地點成功抓取，就寫回時間戳
        if report.has_pulls() {
            self.registry.save(&locations).await?;
        } else {
            tracing::warn!("No location was pulled successfully; registry left untouched");
        }

        Ok(RunOutcome::Completed(report))
    }
}
