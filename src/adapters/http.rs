use crate::config::api_key::ApiKey;
use crate::config::ApiSettings;
use crate::domain::model::Coordinate;
use crate::domain::ports::MapImageFetcher;
use crate::utils::error::{Result, WatchError};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

const MAX_ERROR_BODY_CHARS: usize = 200;

/// Fetches rendered map images from a static-map HTTP API.
pub struct StaticMapFetcher {
    client: Client,
    settings: ApiSettings,
    api_key: ApiKey,
}

impl StaticMapFetcher {
    pub fn new(settings: ApiSettings, api_key: ApiKey) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        Ok(Self {
            client: builder.build()?,
            settings,
            api_key,
        })
    }
}

#[async_trait]
impl MapImageFetcher for StaticMapFetcher {
    async fn fetch(&self, lat: &Coordinate, long: &Coordinate, zoom: u32) -> Result<Vec<u8>> {
        let zoom = zoom.to_string();
        let markers = format!("{}|{},{}", self.settings.marker, lat, long);

        // 金鑰只放進 query，不寫入日誌
        tracing::debug!(
            "Making map request to: {} (zoom={}, size={}, maptype={}, markers={})",
            self.settings.endpoint,
            zoom,
            self.settings.size,
            self.settings.maptype,
            markers
        );

        let response = self
            .client
            .get(&self.settings.endpoint)
            .query(&[
                ("zoom", zoom.as_str()),
                ("size", self.settings.size.as_str()),
                ("maptype", self.settings.maptype.as_str()),
                ("markers", markers.as_str()),
                ("key", self.api_key.expose()),
            ])
            .send()
            .await
            .map_err(redact)?;

        let status = response.status();
        tracing::debug!("Map API response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WatchError::Api {
                status: status.as_u16(),
                message: truncate(body.trim(), MAX_ERROR_BODY_CHARS),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if let Some(content_type) = content_type.filter(|ct| !ct.starts_with("image/")) {
            return Err(WatchError::Api {
                status: status.as_u16(),
                message: format!("expected an image, got content type '{}'", content_type),
            });
        }

        let bytes = response.bytes().await.map_err(redact)?;
        if bytes.is_empty() {
            return Err(WatchError::Api {
                status: status.as_u16(),
                message: "empty response body".to_string(),
            });
        }

        tracing::debug!("Received {} bytes of image data", bytes.len());
        Ok(bytes.to_vec())
    }
}

/// reqwest 錯誤訊息會帶完整 URL（含 key），轉換前先移除
fn redact(error: reqwest::Error) -> WatchError {
    WatchError::Fetch(error.without_url())
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
