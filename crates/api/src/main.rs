use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rankwatch_core::domain::business::BusinessRef;
use rankwatch_core::domain::history::{RankingComparison, RankingSnapshot};
use rankwatch_core::error::RankError;
use rankwatch_core::history::{RankingHistory, DEFAULT_RECENT_LIMIT};
use rankwatch_core::service::batch::LocationResult;
use rankwatch_core::service::competitor::CompetitorKeywordRow;
use rankwatch_core::service::{KeywordAnalysis, SearchOutcome, SearchService};
use rankwatch_core::storage::{memory::MemoryBlobStore, BlobStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = rankwatch_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let store: Arc<dyn BlobStore> = match rankwatch_core::storage::open_blob_store(&settings).await
    {
        Ok(store) => store,
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(
                error = %e,
                "history store unavailable; starting API in degraded mode (in-memory history)"
            );
            Arc::new(MemoryBlobStore::new())
        }
    };
    let history = RankingHistory::new(store);
    tracing::info!(backend = history.backend_name(), "ranking history ready");

    let service = SearchService::from_settings(&settings, history)?;
    let state = AppState { service };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/search", post(search))
        .route("/api/batch", post(batch))
        .route("/api/competitors", post(competitors))
        .route("/api/keywords/analyze", post(analyze_keywords))
        .route("/api/history/recent", get(recent_searches))
        .route("/api/history/comparisons", get(comparisons))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    service: SearchService,
}

struct ApiError(RankError);

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl From<RankError> for ApiError {
    fn from(err: RankError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(RankError::validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(RankError::validation(rejection.body_text()))
    }
}

/// `Json` extractor whose rejections use the `{"error"}` body.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
struct ApiJson<T>(T);

/// `Query` extractor whose rejections use the `{"error"}` body.
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
struct ApiQuery<T>(T);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!(kind = self.0.kind(), error = %self.0, "request failed");
            if matches!(self.0, RankError::Configuration { .. }) {
                sentry::capture_error(&self.0);
            }
        }
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

fn status_for(err: &RankError) -> StatusCode {
    match err {
        RankError::Validation { .. } => StatusCode::BAD_REQUEST,
        RankError::Configuration { .. } | RankError::Persistence { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        RankError::Provider { .. } | RankError::Transport { .. } => StatusCode::BAD_GATEWAY,
    }
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    #[serde(default)]
    keyword: String,
    #[serde(default)]
    location: String,
}

async fn search(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SearchRequest>,
) -> Result<Json<SearchOutcome>, ApiError> {
    let outcome = state
        .service
        .search_and_record(&req.keyword, &req.location)
        .await?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
struct BatchRequest {
    #[serde(default)]
    keyword: String,
    #[serde(default)]
    locations: Vec<String>,
}

async fn batch(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<BatchRequest>,
) -> Result<Json<Vec<LocationResult>>, ApiError> {
    let results = state
        .service
        .batch_locations(&req.keyword, &req.locations)
        .await?;
    Ok(Json(results))
}

#[derive(Debug, Deserialize)]
struct CompetitorRequest {
    #[serde(default)]
    location: String,
    #[serde(default)]
    businesses: Vec<BusinessRef>,
    #[serde(default)]
    keywords: Vec<String>,
}

async fn competitors(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CompetitorRequest>,
) -> Result<Json<Vec<CompetitorKeywordRow>>, ApiError> {
    let rows = state
        .service
        .compare_competitors(&req.location, &req.businesses, &req.keywords)
        .await?;
    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    location: String,
}

async fn analyze_keywords(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AnalyzeRequest>,
) -> Result<Json<KeywordAnalysis>, ApiError> {
    let analysis = state
        .service
        .analyze_keywords(&req.name, &req.types, &req.location)
        .await?;
    Ok(Json(analysis))
}

#[derive(Debug, Deserialize)]
struct RecentQuery {
    limit: Option<usize>,
}

async fn recent_searches(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<RecentQuery>,
) -> Json<Vec<RankingSnapshot>> {
    let limit = q.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    Json(state.service.history().recent_searches(limit).await)
}

#[derive(Debug, Deserialize)]
struct ComparisonQuery {
    #[serde(default)]
    keyword: String,
    #[serde(default)]
    location: String,
}

async fn comparisons(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<ComparisonQuery>,
) -> Result<Json<Vec<RankingComparison>>, ApiError> {
    if q.keyword.trim().is_empty() || q.location.trim().is_empty() {
        return Err(RankError::validation("Keyword and location are required").into());
    }
    Ok(Json(
        state
            .service
            .history()
            .comparisons(&q.keyword, &q.location)
            .await,
    ))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &rankwatch_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
