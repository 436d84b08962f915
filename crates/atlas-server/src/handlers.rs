//! HTTP handlers and response envelopes.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, warn};

use atlas_engine::{
    aggregate, canonical_key, resolve_markers, CompanyRecord, EngineConfig, EngineError,
    FacetOptions, QuantileBucket, QueryExecutor, RecordStore, RegionGranularity, RegionStat,
    ResolvedMarker, ResponseCache, ThreadRngJitter,
};
use atlas_filter::{compile, FieldError, FilterSpec, RawFilterParams};

/// Shared state injected into every handler.
///
/// The response cache is the only shared mutable state; it is constructed
/// once at process start and injected here, never re-created per request.
#[derive(Clone)]
pub struct AppState {
    /// The record store backend.
    pub store: Arc<dyn RecordStore>,
    /// The process-wide response cache, `None` when caching is disabled.
    pub cache: Option<Arc<ResponseCache<Value>>>,
    /// Engine configuration handed to per-request executors.
    pub config: EngineConfig,
}

impl AppState {
    /// Builds shared state from a store and engine configuration.
    ///
    /// The response cache comes from `config.cache`; a `None` there
    /// disables response caching entirely.
    pub fn new(store: Arc<dyn RecordStore>, config: EngineConfig) -> Self {
        let cache = config
            .cache
            .clone()
            .map(|cache_config| Arc::new(ResponseCache::new(cache_config)));
        Self {
            store,
            cache,
            config,
        }
    }
}

/// Builds the application router: company list, markers, heatmap, health,
/// with CORS (GET, POST, OPTIONS) and request tracing.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/companies", get(companies_get).post(companies_post))
        .route("/companies/markers", get(markers))
        .route("/companies/heatmap", get(heatmap))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Response envelopes
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompaniesResponse {
    data: Vec<CompanyRecord>,
    pagination: PaginationInfo,
    filters: FilterInfo,
    metadata: ResponseMetadata,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PaginationInfo {
    page: u32,
    limit: u32,
    total: Option<usize>,
    pages: Option<usize>,
    has_next: bool,
    has_prev: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FilterInfo {
    applied: FilterSpec,
    available: FacetOptions,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MarkersResponse {
    markers: Vec<ResolvedMarker>,
    missing_coordinates: usize,
    metadata: ResponseMetadata,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HeatmapResponse {
    regions: Vec<RegionStat>,
    buckets: Vec<QuantileBucket>,
    metadata: ResponseMetadata,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResponseMetadata {
    /// Execution time in milliseconds.
    execution_time: u128,
    timestamp: String,
}

impl ResponseMetadata {
    fn since(started: Instant) -> Self {
        Self {
            execution_time: started.elapsed().as_millis(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Error body shared by 400 and 500 responses. The timestamp lets clients
/// correlate failures with server logs.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: String,
    details: Value,
    timestamp: String,
}

fn validation_failure(errors: Vec<FieldError>) -> Response {
    let body = ErrorBody {
        error: "invalid filter parameters".to_string(),
        details: serde_json::to_value(&errors).unwrap_or(Value::Null),
        timestamp: Utc::now().to_rfc3339(),
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

fn execution_failure(err: EngineError) -> Response {
    match err {
        EngineError::Validation(errors) => validation_failure(errors),
        EngineError::Store(message) => {
            error!(error = %message, "store query failed");
            let body = ErrorBody {
                error: "query execution failed".to_string(),
                details: Value::String(message),
                timestamp: Utc::now().to_rfc3339(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

fn serialized(payload: impl Serialize) -> Result<Value, Response> {
    serde_json::to_value(payload).map_err(|e| {
        error!(error = %e, "response serialization failed");
        execution_failure(EngineError::Store("response serialization failed".to_string()))
    })
}

// =============================================================================
// Handlers
// =============================================================================

async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn companies_get(
    State(state): State<AppState>,
    Query(raw): Query<RawFilterParams>,
) -> Response {
    run_companies(&state, raw).await
}

/// Same semantics as the GET route, for filter sets too large for a query
/// string.
async fn companies_post(
    State(state): State<AppState>,
    Json(raw): Json<RawFilterParams>,
) -> Response {
    run_companies(&state, raw).await
}

async fn run_companies(state: &AppState, raw: RawFilterParams) -> Response {
    let started = Instant::now();
    let key = format!("companies?{}", canonical_key(raw.to_pairs()));

    if let Some(payload) = state.cache.as_ref().and_then(|cache| cache.get(&key)) {
        return Json(payload).into_response();
    }

    let spec = match compile(&raw) {
        Ok(spec) => spec,
        Err(errors) => return validation_failure(errors),
    };

    let executor = QueryExecutor::with_config(state.store.as_ref(), state.config.clone());
    let page = match executor.execute(&spec).await {
        Ok(page) => page,
        Err(err) => return execution_failure(err),
    };

    let has_next = page.has_next(spec.page, spec.limit);
    let response = CompaniesResponse {
        pagination: PaginationInfo {
            page: spec.page,
            limit: spec.limit,
            total: page.total_count,
            pages: page
                .total_count
                .map(|total| total.div_ceil(spec.limit as usize)),
            has_next,
            has_prev: spec.page > 1,
        },
        filters: FilterInfo {
            applied: spec,
            available: page.facets.clone(),
        },
        metadata: ResponseMetadata::since(started),
        data: page.rows,
    };

    let payload = match serialized(&response) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    // Empty result sets are never cached; a transient empty corpus must
    // not be memoized for the TTL window.
    if !response.data.is_empty() {
        if let Some(cache) = &state.cache {
            cache.set(key, payload.clone());
        }
    }
    Json(payload).into_response()
}

async fn markers(State(state): State<AppState>, Query(raw): Query<RawFilterParams>) -> Response {
    let started = Instant::now();
    let key = format!("markers?{}", canonical_key(raw.to_pairs()));

    if let Some(payload) = state.cache.as_ref().and_then(|cache| cache.get(&key)) {
        return Json(payload).into_response();
    }

    let spec = match compile(&raw) {
        Ok(spec) => spec,
        Err(errors) => return validation_failure(errors),
    };

    let executor = QueryExecutor::with_config(state.store.as_ref(), state.config.clone());
    let rows = match executor.select_all(&spec).await {
        Ok(rows) => rows,
        Err(err) => return execution_failure(err),
    };

    let set = resolve_markers(&rows, &ThreadRngJitter);
    let response = MarkersResponse {
        markers: set.markers,
        missing_coordinates: set.missing_coordinates,
        metadata: ResponseMetadata::since(started),
    };

    let payload = match serialized(&response) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    if !response.markers.is_empty() {
        if let Some(cache) = &state.cache {
            cache.set(key, payload.clone());
        }
    }
    Json(payload).into_response()
}

async fn heatmap(State(state): State<AppState>, Query(raw): Query<RawFilterParams>) -> Response {
    let started = Instant::now();
    let key = format!("heatmap?{}", canonical_key(raw.to_pairs()));

    if let Some(payload) = state.cache.as_ref().and_then(|cache| cache.get(&key)) {
        return Json(payload).into_response();
    }

    let spec = match compile(&raw) {
        Ok(spec) => spec,
        Err(errors) => return validation_failure(errors),
    };

    let granularity = match raw.region.as_deref() {
        Some(name) => match RegionGranularity::parse(name) {
            Some(granularity) => granularity,
            None => {
                return validation_failure(vec![FieldError::new(
                    "region",
                    "must be 'state' or 'country'",
                )])
            }
        },
        None => default_granularity(&spec),
    };

    let executor = QueryExecutor::with_config(state.store.as_ref(), state.config.clone());
    let rows = match executor.select_all(&spec).await {
        Ok(rows) => rows,
        Err(err) => return execution_failure(err),
    };

    let summary = aggregate(&rows, granularity);
    let response = HeatmapResponse {
        regions: summary.regions,
        buckets: summary.buckets,
        metadata: ResponseMetadata::since(started),
    };

    let payload = match serialized(&response) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    if response.regions.is_empty() {
        warn!("heatmap over empty result set, not cached");
    } else if let Some(cache) = &state.cache {
        cache.set(key, payload.clone());
    }
    Json(payload).into_response()
}

/// State granularity when the filter pins the corpus to the United States,
/// country granularity otherwise. Explicit `region=` always wins.
fn default_granularity(spec: &FilterSpec) -> RegionGranularity {
    let us_only = spec.countries.len() == 1
        && matches!(
            spec.countries[0].to_lowercase().as_str(),
            "united states" | "usa" | "us"
        );
    if us_only {
        RegionGranularity::State
    } else {
        RegionGranularity::Country
    }
}
