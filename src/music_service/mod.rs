mod client;
mod models;

pub use client::{MusicService, RemoteServiceClient};
pub use models::{
    CreatePlaylistRequest, ServiceAlbum, ServiceArtist, ServiceAudioFeatures,
    ServiceCreatedPlaylist, ServicePlaylist, ServiceTrack,
};
