use axum::extract::FromRef;

use crate::music_service::MusicService;
use crate::selection::SelectionStore;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedMusicService = Arc<dyn MusicService>;
pub type GuardedSelectionStore = Arc<SelectionStore>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub music_service: GuardedMusicService,
    pub selection_store: GuardedSelectionStore,
}

impl FromRef<ServerState> for GuardedMusicService {
    fn from_ref(input: &ServerState) -> Self {
        input.music_service.clone()
    }
}

impl FromRef<ServerState> for GuardedSelectionStore {
    fn from_ref(input: &ServerState) -> Self {
        input.selection_store.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
