use crate::config::AppConfig;
use crate::legend::Legend;
use crate::state::{HoverInfo, MapState};
use crate::style::FeatureStyle;
use crate::types::{GeoFeature, Metric};
use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, put},
    Router,
};
use geo::algorithm::bounding_rect::BoundingRect;
use geo::algorithm::contains::Contains;
use geo::{MultiPolygon, Point};
use geojson::{FeatureCollection, JsonObject};
use rstar::{RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{info, warn};

// Wrapper for RTree indexing
struct AreaIndex {
    index: usize,
    aabb: AABB<[f64; 2]>,
}

impl RTreeObject for AreaIndex {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

pub struct AppState {
    pub map: RwLock<MapState>,
    // Parallel to the map's features; `None` for non-areal geometry.
    shapes: Vec<Option<MultiPolygon<f64>>>,
    tree: RTree<AreaIndex>,
}

impl AppState {
    pub fn new(map: MapState) -> Self {
        let shapes: Vec<Option<MultiPolygon<f64>>> = map.features().iter().map(area_of).collect();

        let tree_items: Vec<AreaIndex> = shapes
            .iter()
            .enumerate()
            .filter_map(|(index, shape)| {
                let rect = shape.as_ref()?.bounding_rect()?;
                Some(AreaIndex {
                    index,
                    aabb: AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
                })
            })
            .collect();
        info!("Indexed {} country shapes", tree_items.len());

        Self {
            map: RwLock::new(map),
            shapes,
            tree: RTree::bulk_load(tree_items),
        }
    }

    /// Index of the feature containing the point.
    pub fn feature_at(&self, lon: f64, lat: f64) -> Option<usize> {
        let point = Point::new(lon, lat);
        let envelope = AABB::from_point([lon, lat]);

        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|candidate| candidate.index)
            .find(|&index| {
                self.shapes
                    .get(index)
                    .and_then(Option::as_ref)
                    .is_some_and(|shape| shape.contains(&point))
            })
    }
}

fn area_of(feature: &GeoFeature) -> Option<MultiPolygon<f64>> {
    let geometry = feature.geometry.as_ref()?;
    let geometry: geo::Geometry<f64> = match geometry.value.clone().try_into() {
        Ok(g) => g,
        Err(e) => {
            warn!("Cannot index geometry of {:?}: {:?}", feature.name, e);
            return None;
        }
    };
    match geometry {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p])),
        _ => None,
    }
}

#[derive(Deserialize)]
pub struct QueryParams {
    lat: f64,
    lon: f64,
}

#[derive(Serialize)]
pub struct QueryResponse {
    info: HoverInfo,
    highlight: FeatureStyle,
    properties: JsonObject,
}

#[derive(Serialize)]
pub struct MetricInfo {
    metric: Metric,
    unit: Option<&'static str>,
}

#[derive(Serialize)]
pub struct MetricsResponse {
    selected: Metric,
    metrics: Vec<MetricInfo>,
}

#[derive(Deserialize)]
pub struct SelectMetricRequest {
    metric: String,
}

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

pub fn router(state: Arc<AppState>, web_dir: &Path) -> Router {
    Router::new()
        .route("/api/metrics", get(metrics_handler))
        .route("/api/metric", put(select_metric_handler))
        .route("/api/map", get(map_handler))
        .route("/api/legend", get(legend_handler))
        .route("/api/query", get(query_handler))
        .fallback_service(ServeDir::new(web_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(config: AppConfig, map: MapState) -> Result<()> {
    // 1. Build spatial index
    let state = Arc::new(AppState::new(map));

    // 2. Serve API and static front-end
    let addr = SocketAddr::from(([127, 0, 0, 1], config.server.port));
    info!("Starting server on http://{}", addr);

    let app = router(state, &config.server.web_dir);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn metrics_response(selected: Metric) -> MetricsResponse {
    MetricsResponse {
        selected,
        metrics: Metric::ALL
            .into_iter()
            .map(|metric| MetricInfo {
                metric,
                unit: metric.unit(),
            })
            .collect(),
    }
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> Json<MetricsResponse> {
    let selected = state.map.read().await.selected();
    Json(metrics_response(selected))
}

async fn select_metric_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectMetricRequest>,
) -> Result<Json<MetricsResponse>, ApiError> {
    let metric: Metric = request
        .metric
        .parse()
        .map_err(|e: anyhow::Error| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    state.map.write().await.select_metric(metric);
    Ok(Json(metrics_response(metric)))
}

async fn map_handler(State(state): State<Arc<AppState>>) -> Result<Json<FeatureCollection>, ApiError> {
    let map = state.map.read().await;
    map.styled_collection()
        .map(Json)
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

async fn legend_handler(State(state): State<Arc<AppState>>) -> Json<Legend> {
    Json(state.map.read().await.legend())
}

async fn query_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> Json<Option<QueryResponse>> {
    let Some(index) = state.feature_at(params.lon, params.lat) else {
        return Json(None);
    };

    let map = state.map.read().await;
    let Some(feature) = map.features().get(index) else {
        return Json(None);
    };
    Json(Some(QueryResponse {
        info: map.hover_info(Some(feature)),
        highlight: FeatureStyle::highlight(),
        properties: feature.properties.clone(),
    }))
}
