use crate::layout::{LayoutTable, Point};
use crate::metrics::Metrics;
use crate::snapshot::{ExitOccupancy, Snapshot};
use crate::state::ViewEngine;
use crate::update::DeviceRecord;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared state for the query API
pub struct QueryAppState {
    pub engine: Arc<ViewEngine>,
    pub layout: Arc<LayoutTable>,
}

/// Query parameters for device listing
#[derive(Deserialize)]
pub struct DeviceQueryParams {
    /// Filter by assigned exit (exact match)
    pub exit: Option<String>,
}

/// Full current view with the staleness indicator
#[derive(Serialize)]
pub struct ViewResponse {
    pub snapshot: Snapshot,
    pub metrics: Metrics,
    #[serde(rename = "receivedAt")]
    pub received_at: Option<String>,
    #[serde(rename = "secondsSinceUpdate")]
    pub seconds_since_update: Option<i64>,
}

/// One node of a rendered evacuation path
#[derive(Serialize)]
pub struct PathNode {
    pub name: String,
    pub point: Point,
    pub on_fire: bool,
}

/// One drawable line segment between adjacent path nodes
#[derive(Serialize)]
pub struct PathSegment {
    pub from: Point,
    pub to: Point,
}

/// Evacuation path geometry for one device
#[derive(Serialize)]
pub struct PathResponse {
    pub device_tag: String,
    pub nodes: Vec<PathNode>,
    /// Empty when the path has fewer than two nodes (nothing to draw)
    pub segments: Vec<PathSegment>,
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create query API router
pub fn create_query_router(state: Arc<QueryAppState>) -> Router {
    Router::new()
        .route("/api/view", get(get_view))
        .route("/api/view/devices", get(list_devices))
        .route("/api/view/devices/:tag", get(get_device))
        .route("/api/view/exits", get(list_exits))
        .route("/api/view/paths/:tag", get(get_path))
        .with_state(state)
}

/// GET /api/view - Full current view
async fn get_view(State(state): State<Arc<QueryAppState>>) -> Json<ViewResponse> {
    let view = state.engine.current();

    Json(ViewResponse {
        seconds_since_update: view.seconds_since_update(),
        received_at: view.received_at.map(|at| at.to_rfc3339()),
        snapshot: view.snapshot.clone(),
        metrics: view.metrics.clone(),
    })
}

/// GET /api/view/devices - List tracked devices
///
/// Query parameters:
/// - `exit`: filter by assigned exit (exact match, e.g. ?exit=Entrance)
async fn list_devices(
    State(state): State<Arc<QueryAppState>>,
    Query(params): Query<DeviceQueryParams>,
) -> Json<Vec<DeviceRecord>> {
    let view = state.engine.current();

    let devices: Vec<DeviceRecord> = view
        .snapshot
        .devices
        .iter()
        .filter(|device| match params.exit {
            Some(ref exit) => device.assigned_exit == *exit,
            None => true,
        })
        .cloned()
        .collect();

    Json(devices)
}

/// GET /api/view/devices/:tag - Get specific device
async fn get_device(
    State(state): State<Arc<QueryAppState>>,
    Path(tag): Path<String>,
) -> Result<Json<DeviceRecord>, QueryError> {
    let view = state.engine.current();
    let device = view.snapshot.device(&tag).ok_or(QueryError::NotFound)?;

    Ok(Json(device.clone()))
}

/// GET /api/view/exits - Per-exit occupancy summary
async fn list_exits(State(state): State<Arc<QueryAppState>>) -> Json<Vec<ExitOccupancy>> {
    let view = state.engine.current();
    Json(view.snapshot.exit_occupancy())
}

/// GET /api/view/paths/:tag - Evacuation path geometry for one device
///
/// Projects the device's remaining route through the layout table: node
/// names with canvas coordinates and fire flags, plus one line segment per
/// adjacent node pair. Unknown node names project to the origin.
async fn get_path(
    State(state): State<Arc<QueryAppState>>,
    Path(tag): Path<String>,
) -> Result<Json<PathResponse>, QueryError> {
    let view = state.engine.current();
    let device = view.snapshot.device(&tag).ok_or(QueryError::NotFound)?;

    let nodes: Vec<PathNode> = device
        .shortest_path
        .iter()
        .map(|name| PathNode {
            name: name.clone(),
            point: state.layout.position(name),
            on_fire: view.snapshot.fire_nodes.contains(name),
        })
        .collect();

    let segments = if nodes.len() < 2 {
        Vec::new()
    } else {
        nodes
            .windows(2)
            .map(|pair| PathSegment {
                from: pair[0].point,
                to: pair[1].point,
            })
            .collect()
    };

    Ok(Json(PathResponse {
        device_tag: device.device_tag.clone(),
        nodes,
        segments,
    }))
}

/// Query error types
#[derive(Debug)]
enum QueryError {
    NotFound,
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            QueryError::NotFound => (StatusCode::NOT_FOUND, "Device not found"),
        };

        let body = Json(ErrorResponse {
            error: error_message.to_string(),
        });

        (status, body).into_response()
    }
}
