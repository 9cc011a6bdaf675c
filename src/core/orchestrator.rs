use crate::core::comparator::{Comparison, ImageComparator, ImageSide};
use crate::domain::model::{Location, UpdateResult, UpdateStatus};
use crate::domain::ports::{ImageRole, ImageStore, MapImageFetcher};
use crate::utils::error::{Result, WatchError};
use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};

/// What to do when one location cannot be fetched or stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop the whole pass on the first error.
    Abort,
    /// Record the location as `Failed` and move on to the next one.
    #[default]
    Continue,
}

pub struct UpdateOrchestrator<S: ImageStore, F: MapImageFetcher> {
    store: S,
    fetcher: F,
    comparator: ImageComparator,
    policy: FailurePolicy,
}

impl<S: ImageStore, F: MapImageFetcher> UpdateOrchestrator<S, F> {
    pub fn new(store: S, fetcher: F) -> Self {
        Self {
            store,
            fetcher,
            comparator: ImageComparator::new(),
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Runs one pass over `locations` in order, updating their timestamps in place.
    ///
    /// Returns exactly one result per location unless the policy is
    /// [`FailurePolicy::Abort`] and a location fails.
    pub async fn run(&self, locations: &mut [Location]) -> Result<Vec<UpdateResult>> {
        let mut results = Vec::with_capacity(locations.len());
        if locations.is_empty() {
            tracing::info!("No locations to update");
            return Ok(results);
        }

        self.store.ensure_ready().await?;

        let total = locations.len();
        for (index, location) in locations.iter_mut().enumerate() {
            tracing::info!(
                "🛰️  [{}/{}] Pulling '{}' ({})",
                index + 1,
                total,
                location.name,
                location.display_location()
            );

            match self.update_location(location).await {
                Ok(result) => {
                    tracing::info!("'{}': {}", result.name, result.status);
                    results.push(result);
                }
                Err(e) if self.policy == FailurePolicy::Continue => {
                    tracing::warn!("⚠️  '{}' failed: {} ({:?})", location.name, e, e.category());
                    results.push(self.failed_result(location, &e));
                }
                Err(e) => {
                    tracing::error!("❌ '{}' failed, aborting run: {}", location.name, e);
                    return Err(e);
                }
            }
        }

        Ok(results)
    }

    async fn update_location(&self, location: &mut Location) -> Result<UpdateResult> {
        let zoom = location.effective_zoom();
        let key = location.image_key();

        let candidate = self
            .fetcher
            .fetch(&location.lat, &location.long, zoom)
            .await?;
        self.store
            .write(ImageRole::Candidate, &key, &candidate)
            .await?;

        let pulled_at = now();

        let mut detail = None;
        let mut replaced_reference = None;

        let status = if !self.store.exists(ImageRole::Reference, &key).await? {
            UpdateStatus::New
        } else {
            let reference = self.store.read(ImageRole::Reference, &key).await?;
            match self.comparator.compare(&reference, &candidate) {
                Comparison::Identical => UpdateStatus::Unchanged,
                Comparison::Different(diff) => {
                    tracing::debug!(
                        "{} differs: {} pixels, max channel delta {}, same size: {}",
                        key,
                        diff.differing_pixels,
                        diff.max_channel_delta,
                        diff.dimensions_match
                    );
                    replaced_reference = Some(reference);
                    UpdateStatus::Changed
                }
                Comparison::Undecodable(side) => {
                    let note = match side {
                        ImageSide::Reference => "stored reference image was corrupt and has been replaced",
                        ImageSide::Candidate => "fetched image could not be decoded",
                    };
                    tracing::warn!("⚠️  '{}': {}", location.name, note);
                    detail = Some(note.to_string());
                    if side == ImageSide::Candidate {
                        replaced_reference = Some(reference);
                    }
                    UpdateStatus::Changed
                }
            }
        };

        if status.is_promotion() {
            self.store
                .write(ImageRole::Reference, &key, &candidate)
                .await?;
        }

        // 所有儲存步驟成功後才更新時間戳
        location.last_pulled = Some(pulled_at);
        if status == UpdateStatus::Changed {
            location.last_changed = Some(pulled_at);
        }

        Ok(UpdateResult {
            name: location.name.clone(),
            location: location.display_location(),
            status,
            reference_image_path: absolute(&self.store.path_of(ImageRole::Reference, &key)),
            candidate_image_path: absolute(&self.store.path_of(ImageRole::Candidate, &key)),
            detail,
            replaced_reference,
        })
    }

    fn failed_result(&self, location: &Location, error: &WatchError) -> UpdateResult {
        let key = location.image_key();
        UpdateResult {
            name: location.name.clone(),
            location: location.display_location(),
            status: UpdateStatus::Failed,
            reference_image_path: absolute(&self.store.path_of(ImageRole::Reference, &key)),
            candidate_image_path: absolute(&self.store.path_of(ImageRole::Candidate, &key)),
            detail: Some(error.to_string()),
            replaced_reference: None,
        }
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
