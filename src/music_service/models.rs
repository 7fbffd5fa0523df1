//! Models for the upstream music service API responses.
//!
//! These types match the JSON structure returned by the upstream service and
//! include conversion methods to the domain track model.

use serde::{Deserialize, Serialize};

use crate::track::{AudioFeatures, Track};

/// Playlist summary from the upstream's playlist listing.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ServicePlaylist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tracks_total: Option<usize>,
}

/// Artist from the upstream API.
#[derive(Clone, Debug, Deserialize)]
pub struct ServiceArtist {
    pub name: String,
}

/// Album from the upstream API.
#[derive(Clone, Debug, Deserialize)]
pub struct ServiceAlbum {
    pub name: String,
}

/// Audio feature sub-object. Every field is optional: tracks without
/// analysis data come back with a partial record or none at all.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ServiceAudioFeatures {
    pub energy: Option<f64>,
    pub valence: Option<f64>,
    pub danceability: Option<f64>,
    pub tempo: Option<f64>,
    pub key: Option<i32>,
    pub mode: Option<i32>,
    pub time_signature: Option<i32>,
}

impl ServiceAudioFeatures {
    fn to_audio_features(&self) -> AudioFeatures {
        AudioFeatures {
            energy: self.energy,
            valence: self.valence,
            danceability: self.danceability,
            tempo: self.tempo,
            key: self.key,
            mode: self.mode,
            time_signature: self.time_signature,
        }
    }
}

/// Track from the upstream API.
#[derive(Clone, Debug, Deserialize)]
pub struct ServiceTrack {
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ServiceArtist>,
    pub album: ServiceAlbum,
    pub duration_ms: i64,
    pub uri: String,
    #[serde(default)]
    pub audio_features: Option<ServiceAudioFeatures>,
}

impl ServiceTrack {
    /// Convert to the domain track model.
    pub fn to_track(&self) -> Track {
        Track {
            name: self.name.clone(),
            artists: self.artists.iter().map(|a| a.name.clone()).collect(),
            album: self.album.name.clone(),
            duration_ms: self.duration_ms,
            uri: self.uri.clone(),
            audio_features: self
                .audio_features
                .as_ref()
                .map(|f| f.to_audio_features()),
        }
    }
}

/// Body sent to the upstream's playlist-creation endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub public: bool,
    pub track_uris: Vec<String>,
}

/// Upstream response after creating a playlist.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ServiceCreatedPlaylist {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}
