use crate::adapters::http::StaticMapFetcher;
use crate::adapters::registry::JsonLocationRegistry;
use crate::adapters::storage::LocalImageStore;
use crate::config::api_key::ApiKeySource;
use crate::config::WatchSettings;
use crate::core::engine::{RunOutcome, WatchEngine};
use crate::core::orchestrator::UpdateOrchestrator;
use crate::utils::error::Result;

/// One complete run: API key check, registry load, update pass, registry save.
///
/// Key problems fail before the registry is touched or any request is made.
pub async fn run(settings: &WatchSettings) -> Result<RunOutcome> {
    let api_key = ApiKeySource::new(&settings.env_file, &settings.api.key_variable)
        .load()
        .await?;

    let registry = JsonLocationRegistry::new(&settings.registry_path);
    let store = LocalImageStore::new(&settings.reference_dir, &settings.candidate_dir);
    let fetcher = StaticMapFetcher::new(settings.api.clone(), api_key)?;
    let orchestrator =
        UpdateOrchestrator::new(store, fetcher).with_policy(settings.failure_policy);

    WatchEngine::new(registry, orchestrator).run().await
}
