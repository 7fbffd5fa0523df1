//! HTTP client for the upstream music service.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use super::models::{
    CreatePlaylistRequest, ServiceCreatedPlaylist, ServicePlaylist, ServiceTrack,
};

/// Seam for the upstream music service. Implemented by the HTTP client below
/// and by in-memory stubs in tests.
#[async_trait]
pub trait MusicService: Send + Sync {
    /// List the user's playlists.
    async fn get_playlists(&self) -> Result<Vec<ServicePlaylist>>;

    /// Fetch the tracks of a playlist, including nested artist/album/audio
    /// feature data.
    async fn get_playlist_tracks(&self, playlist_id: &str) -> Result<Vec<ServiceTrack>>;

    /// Create a playlist from an ordered list of track URIs.
    async fn create_playlist(
        &self,
        request: &CreatePlaylistRequest,
    ) -> Result<ServiceCreatedPlaylist>;
}

/// HTTP client for the upstream music service.
pub struct RemoteServiceClient {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteServiceClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the upstream service (e.g., "http://localhost:8080")
    /// * `timeout_sec` - Request timeout in seconds
    pub fn new(base_url: String, timeout_sec: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .expect("Failed to create HTTP client");

        // Ensure base_url doesn't have trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        Self { client, base_url }
    }

    /// Check if the upstream service is reachable.
    pub async fn health_check(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to connect to upstream music service")?;

        if response.status().is_success() {
            Ok(())
        } else {
            anyhow::bail!(
                "Upstream health check failed with status: {}",
                response.status()
            )
        }
    }

    /// Get the base URL of the upstream service.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl MusicService for RemoteServiceClient {
    async fn get_playlists(&self) -> Result<Vec<ServicePlaylist>> {
        let url = format!("{}/playlists", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch playlists from upstream")?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to fetch playlists: status {}", response.status());
        }

        response
            .json()
            .await
            .context("Failed to parse playlists response")
    }

    async fn get_playlist_tracks(&self, playlist_id: &str) -> Result<Vec<ServiceTrack>> {
        let url = format!("{}/playlists/{}/tracks", self.base_url, playlist_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch playlist tracks from upstream")?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Failed to fetch tracks for playlist {}: status {}",
                playlist_id,
                response.status()
            );
        }

        response
            .json()
            .await
            .context("Failed to parse playlist tracks response")
    }

    async fn create_playlist(
        &self,
        request: &CreatePlaylistRequest,
    ) -> Result<ServiceCreatedPlaylist> {
        let url = format!("{}/playlists", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .context("Failed to submit playlist to upstream")?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Failed to create playlist {:?}: status {}",
                request.name,
                response.status()
            );
        }

        response
            .json()
            .await
            .context("Failed to parse create playlist response")
    }
}
