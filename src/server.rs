use crate::config::AppConfig;
use crate::processing::{classify, nearest_centroid};
use crate::types::{Centroid, CentroidGroup};
use anyhow::Result;
use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use geo::Point;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

pub struct AppState {
    pub centroids: Vec<Centroid>,
    pub config: AppConfig,
    pub summaries: Vec<GroupSummary>,
}

#[derive(Deserialize)]
pub struct LocateParams {
    lon: f64,
    lat: f64,
}

/// Nearest centroid and quadrant for an arbitrary coordinate.
#[derive(Serialize, Clone)]
pub struct LocateResponse {
    pub centroid: String,
    pub quadrant: &'static str,
}

/// Per-centroid rollup of the grouped data, precomputed at startup.
#[derive(Serialize, Clone)]
pub struct GroupSummary {
    pub centroid: String,
    pub quadrant: &'static str,
    pub color: &'static str,
    pub violations: usize,
}

pub async fn start_server(
    config: AppConfig,
    centroids: Vec<Centroid>,
    groups: Vec<CentroidGroup>,
) -> Result<()> {
    let summaries = groups
        .iter()
        .map(|group| GroupSummary {
            centroid: centroids[group.centroid.0].name.clone(),
            quadrant: group.quadrant.label(),
            color: group.quadrant.color(),
            violations: group.points.len(),
        })
        .collect();

    let port = config.server.port;
    let map_dir = config.output.dir.clone();
    let state = Arc::new(AppState {
        centroids,
        config,
        summaries,
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("Starting server on http://{}", addr);

    let app = Router::new()
        .route("/api/locate", get(locate_handler))
        .route("/api/groups", get(groups_handler))
        .fallback_service(ServeDir::new(map_dir))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn locate_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LocateParams>,
) -> Json<Option<LocateResponse>> {
    let point = Point::new(params.lon, params.lat);
    // NaN query coordinates never beat the running minimum, so they
    // fall out here as None rather than a bogus match.
    let response = nearest_centroid(&point, &state.centroids).map(|id| LocateResponse {
        centroid: state.centroids[id.0].name.clone(),
        quadrant: classify(params.lon, params.lat, &state.config.quadrants).label(),
    });
    Json(response)
}

async fn groups_handler(State(state): State<Arc<AppState>>) -> Json<Vec<GroupSummary>> {
    Json(state.summaries.clone())
}
