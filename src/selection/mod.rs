//! Transient storage for a curated selection between the builder and creator
//! steps.
//!
//! In-memory only by design: selections are session-scoped working state, not
//! durable data. Entries expire after a TTL and a background task prunes them.

use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::track::Track;

struct StoredSelection {
    tracks: Vec<Track>,
    created_at: i64,
}

/// UUID-keyed in-memory selection store.
pub struct SelectionStore {
    ttl_secs: i64,
    selections: RwLock<HashMap<String, StoredSelection>>,
}

impl SelectionStore {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            ttl_secs,
            selections: RwLock::new(HashMap::new()),
        }
    }

    /// Store a selection and return its id.
    pub async fn store(&self, tracks: Vec<Track>) -> String {
        let id = Uuid::new_v4().to_string();
        let entry = StoredSelection {
            tracks,
            created_at: chrono::Utc::now().timestamp(),
        };
        let mut selections = self.selections.write().await;
        selections.insert(id.clone(), entry);
        id
    }

    /// Retrieve a selection by id, if present and not yet pruned.
    pub async fn get(&self, id: &str) -> Option<Vec<Track>> {
        let selections = self.selections.read().await;
        selections.get(id).map(|entry| entry.tracks.clone())
    }

    /// Remove a selection by id, returning its tracks if it existed.
    pub async fn remove(&self, id: &str) -> Option<Vec<Track>> {
        let mut selections = self.selections.write().await;
        selections.remove(id).map(|entry| entry.tracks)
    }

    /// Drop entries older than the TTL. Returns how many were pruned.
    pub async fn cleanup_expired(&self) -> usize {
        let now = chrono::Utc::now().timestamp();
        let mut selections = self.selections.write().await;
        let before = selections.len();
        selections.retain(|_, entry| now - entry.created_at < self.ttl_secs);
        before - selections.len()
    }

    /// Number of live selections.
    pub async fn len(&self) -> usize {
        self.selections.read().await.len()
    }
}
