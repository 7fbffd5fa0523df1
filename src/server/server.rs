use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;

use crate::engine::features::{key_name, mode_name, TrackMetrics};
use crate::engine::filter::{self, Range};
use crate::engine::{self, Arrangement, CurationSnapshot, CurveShape, FeatureBounds};
use crate::music_service::{CreatePlaylistRequest, MusicService};
use crate::selection::SelectionStore;
use crate::track::Track;

use super::{log_requests, metrics, state::*, RequestsLoggingLevel, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// Upstream failures are visible but non-fatal: the caller gets a 502 with a
/// JSON body. No retries here; retry policy belongs to the upstream transport.
fn upstream_error(operation: &str, err: anyhow::Error) -> Response {
    error!("Upstream {} failed: {:#}", operation, err);
    metrics::record_upstream_error(operation);
    (
        StatusCode::BAD_GATEWAY,
        Json(ErrorBody {
            error: format!("Upstream {} failed", operation),
        }),
    )
        .into_response()
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    Json(stats)
}

#[derive(Serialize)]
struct CurveInfo {
    name: &'static str,
    aliases: &'static [&'static str],
}

async fn get_curves() -> Json<Vec<CurveInfo>> {
    Json(
        CurveShape::ALL
            .iter()
            .map(|shape| CurveInfo {
                name: shape.name(),
                aliases: shape.aliases(),
            })
            .collect(),
    )
}

async fn get_playlists(State(music_service): State<GuardedMusicService>) -> Response {
    match music_service.get_playlists().await {
        Ok(playlists) => Json(playlists).into_response(),
        Err(err) => upstream_error("playlists", err),
    }
}

#[derive(Deserialize, Debug)]
struct TracksQuery {
    /// Comma-separated playlist ids.
    playlist_ids: String,
    danceability_min: Option<f64>,
    danceability_max: Option<f64>,
    tempo_min: Option<f64>,
    tempo_max: Option<f64>,
    valence_min: Option<f64>,
    valence_max: Option<f64>,
    energy_min: Option<f64>,
    energy_max: Option<f64>,
}

impl TracksQuery {
    fn ids(&self) -> Vec<&str> {
        self.playlist_ids
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .collect()
    }

    /// Bounds built from whichever range params were supplied, over the
    /// slider defaults. None when no range param is present at all.
    fn bounds(&self) -> Option<FeatureBounds> {
        let any_set = self.danceability_min.is_some()
            || self.danceability_max.is_some()
            || self.tempo_min.is_some()
            || self.tempo_max.is_some()
            || self.valence_min.is_some()
            || self.valence_max.is_some()
            || self.energy_min.is_some()
            || self.energy_max.is_some();
        if !any_set {
            return None;
        }

        let defaults = FeatureBounds::default();
        Some(FeatureBounds {
            danceability: Range::new(
                self.danceability_min.unwrap_or(defaults.danceability.min),
                self.danceability_max.unwrap_or(defaults.danceability.max),
            ),
            tempo: Range::new(
                self.tempo_min.unwrap_or(defaults.tempo.min),
                self.tempo_max.unwrap_or(defaults.tempo.max),
            ),
            valence: Range::new(
                self.valence_min.unwrap_or(defaults.valence.min),
                self.valence_max.unwrap_or(defaults.valence.max),
            ),
            energy: Range::new(
                self.energy_min.unwrap_or(defaults.energy.min),
                self.energy_max.unwrap_or(defaults.energy.max),
            ),
        })
    }
}

/// A track as listed in the builder table: the domain model plus the display
/// names the UI renders for key and mode.
#[derive(Serialize)]
struct TrackListing {
    #[serde(flatten)]
    track: Track,
    key_name: &'static str,
    mode_name: &'static str,
}

impl TrackListing {
    fn from_track(track: Track) -> Self {
        let metrics = TrackMetrics::from_track(&track);
        TrackListing {
            key_name: key_name(metrics.key),
            mode_name: mode_name(metrics.mode),
            track,
        }
    }
}

async fn get_tracks(
    State(music_service): State<GuardedMusicService>,
    Query(query): Query<TracksQuery>,
) -> Response {
    let ids = query.ids();
    if ids.is_empty() {
        return bad_request("No playlist IDs provided");
    }

    let mut all_tracks: Vec<Track> = Vec::new();
    for playlist_id in ids {
        info!("Fetching tracks for playlist {}", playlist_id);
        match music_service.get_playlist_tracks(playlist_id).await {
            Ok(tracks) => all_tracks.extend(tracks.iter().map(|t| t.to_track())),
            Err(err) => return upstream_error("playlist_tracks", err),
        }
    }

    let tracks = match query.bounds() {
        Some(bounds) => filter::filter_tracks(all_tracks, &bounds),
        None => all_tracks,
    };

    info!("Total tracks retrieved: {}", tracks.len());
    let listings: Vec<TrackListing> = tracks.into_iter().map(TrackListing::from_track).collect();
    Json(listings).into_response()
}

#[derive(Deserialize, Debug)]
struct ArrangeBody {
    /// Tracks supplied inline...
    #[serde(default)]
    tracks: Option<Vec<Track>>,
    /// ...or by reference to a stored selection.
    #[serde(default)]
    selection_id: Option<String>,
    /// "grouped_flow", "identity", or a curve name (canonical or alias).
    arrangement: String,
    #[serde(default)]
    bounds: Option<FeatureBounds>,
}

fn resolve_arrangement(name: &str) -> Arrangement {
    match name {
        "grouped_flow" => Arrangement::GroupedFlow,
        "identity" => Arrangement::Identity,
        other => match CurveShape::parse(other) {
            Some(shape) => Arrangement::Curve(shape),
            None => {
                warn!("Unrecognized curve name {:?}, keeping input order", other);
                Arrangement::Identity
            }
        },
    }
}

async fn post_arrange(State(state): State<ServerState>, Json(body): Json<ArrangeBody>) -> Response {
    let tracks = if let Some(tracks) = body.tracks {
        tracks
    } else if let Some(selection_id) = &body.selection_id {
        match state.selection_store.get(selection_id).await {
            Some(tracks) => tracks,
            None => return StatusCode::NOT_FOUND.into_response(),
        }
    } else {
        return bad_request("No track data provided");
    };

    let arrangement = resolve_arrangement(&body.arrangement);
    let label = match arrangement {
        Arrangement::GroupedFlow => "grouped_flow",
        Arrangement::Curve(shape) => shape.name(),
        Arrangement::Identity => "identity",
    };
    metrics::record_arrangement(label);

    let snapshot = CurationSnapshot { tracks };
    let model = engine::recompute(snapshot, body.bounds.as_ref(), arrangement);
    Json(model).into_response()
}

#[derive(Deserialize, Debug)]
struct StoreSelectionBody {
    tracks: Vec<Track>,
}

#[derive(Serialize)]
struct StoreSelectionResponse {
    id: String,
}

async fn post_selection(
    State(selection_store): State<GuardedSelectionStore>,
    Json(body): Json<StoreSelectionBody>,
) -> Response {
    let id = selection_store.store(body.tracks).await;
    metrics::set_selections_live(selection_store.len().await);
    Json(StoreSelectionResponse { id }).into_response()
}

async fn get_selection(
    State(selection_store): State<GuardedSelectionStore>,
    Path(id): Path<String>,
) -> Response {
    match selection_store.get(&id).await {
        Some(tracks) => Json(tracks).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn delete_selection(
    State(selection_store): State<GuardedSelectionStore>,
    Path(id): Path<String>,
) -> Response {
    let removed = selection_store.remove(&id).await;
    metrics::set_selections_live(selection_store.len().await);
    match removed {
        Some(_) => StatusCode::OK.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[derive(Deserialize, Debug)]
struct CreatePlaylistBody {
    pub name: String,
    pub track_uris: Vec<String>,
    #[serde(default = "default_public")]
    pub public: bool,
}

fn default_public() -> bool {
    true
}

#[derive(Serialize)]
struct CreatePlaylistResponse {
    success: bool,
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

async fn post_playlist(
    State(music_service): State<GuardedMusicService>,
    Json(body): Json<CreatePlaylistBody>,
) -> Response {
    if body.track_uris.is_empty() {
        return bad_request("No track URIs found");
    }

    let request = CreatePlaylistRequest {
        name: body.name,
        public: body.public,
        track_uris: body.track_uris,
    };
    match music_service.create_playlist(&request).await {
        Ok(created) => Json(CreatePlaylistResponse {
            success: true,
            id: created.id,
            url: created.url,
        })
        .into_response(),
        Err(err) => upstream_error("create_playlist", err),
    }
}

fn make_app(
    config: ServerConfig,
    music_service: Arc<dyn MusicService>,
    selection_store: Arc<SelectionStore>,
) -> Result<Router> {
    let state = ServerState {
        config: config.clone(),
        start_time: Instant::now(),
        music_service,
        selection_store,
    };

    let api_routes: Router = Router::new()
        .route("/playlists", get(get_playlists))
        .route("/tracks", get(get_tracks))
        .route("/curves", get(get_curves))
        .route("/arrange", post(post_arrange))
        .route("/selection", post(post_selection))
        .route("/selection/{id}", get(get_selection))
        .route("/selection/{id}", delete(delete_selection))
        .route("/playlist", post(post_playlist))
        .with_state(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let mut app: Router = home_router.nest("/v1", api_routes);
    app = app.layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

pub async fn run_server(
    music_service: Arc<dyn MusicService>,
    selection_store: Arc<SelectionStore>,
    requests_logging_level: RequestsLoggingLevel,
    port: u16,
    metrics_port: u16,
    frontend_dir_path: Option<String>,
) -> Result<()> {
    let config = ServerConfig {
        port,
        requests_logging_level,
        frontend_dir_path,
    };
    let app = make_app(config, music_service, selection_store)?;

    let metrics_app: Router = Router::new().route("/metrics", get(metrics::metrics_handler));
    let metrics_listener =
        tokio::net::TcpListener::bind(format!("127.0.0.1:{}", metrics_port)).await?;
    tokio::spawn(async move {
        if let Err(err) = axum::serve(metrics_listener, metrics_app).await {
            error!("Metrics server failed: {}", err);
        }
    });

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;

    Ok(axum::serve(listener, app).await?)
}
