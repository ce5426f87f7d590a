//! HTTP implementation of the remote client.
//!
//! Pulls changesets from the sync endpoint as JSON and media objects from
//! the file store as raw bytes. Both endpoints take the same bearer token.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;

use membridge_core::ChangesetPayload;

use crate::client::RemoteClient;
use crate::error::{Result, SyncError};

/// Connection settings for [`HttpRemote`].
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL of the sync API.
    pub sync_base_url: String,
    /// Base URL of the media store.
    pub media_base_url: String,
    /// Bearer token sent with every request.
    pub auth_token: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl RemoteConfig {
    /// Settings with the default 30 second timeout.
    pub fn new(
        sync_base_url: impl Into<String>,
        media_base_url: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Self {
        Self {
            sync_base_url: sync_base_url.into(),
            media_base_url: media_base_url.into(),
            auth_token: auth_token.into(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP-backed [`RemoteClient`] with its own connection pool.
pub struct HttpRemote {
    config: RemoteConfig,
    client: reqwest::Client,
}

impl HttpRemote {
    /// Build a client from the given settings.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl RemoteClient for HttpRemote {
    async fn pull(&self, since_ms: i64) -> Result<ChangesetPayload> {
        let url = format!(
            "{}/sync?timestamp={}",
            self.config.sync_base_url.trim_end_matches('/'),
            since_ms
        );
        tracing::debug!(%url, "pulling changes");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.auth_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SyncError::Status {
                status: response.status().as_u16(),
                url,
            });
        }
        Ok(response.json().await?)
    }

    async fn fetch_media(&self, path: &str) -> Result<Option<Bytes>> {
        let url = format!(
            "{}/data/{}",
            self.config.media_base_url.trim_end_matches('/'),
            path
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.auth_token)
            .send()
            .await?;

        // The media store answers anything but 200 for an absent object, and
        // an absent object means an empty field, not a failed import.
        if response.status() == StatusCode::OK {
            Ok(Some(response.bytes().await?))
        } else {
            Ok(None)
        }
    }
}
