//! HTTP server (Axum).
//!
//! Exposes the article operations as a JSON API. Mutations and reindex
//! require an `Authorization: Bearer <token>` header; reads are open.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/articles` | Create an article |
//! | `GET`  | `/api/articles?page=&limit=` | List articles, newest first |
//! | `GET`  | `/api/articles/search?q=` | Full-text search over the mirror |
//! | `POST` | `/api/articles/reindex` | Rebuild the mirror from the primary store |
//! | `GET`  | `/api/articles/{id}` | Fetch one article with author and category |
//! | `PUT`  | `/api/articles/{id}` | Update an article |
//! | `DELETE` | `/api/articles/{id}` | Delete an article |
//! | `GET`  | `/api/mirror/status` | Canonical vs mirrored document counts |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "validation failed: title is required" } }
//! ```
//!
//! Codes: `bad_request` (400), `unauthorized` (401), `forbidden` (403),
//! `not_found` (404), `store_error` (500), `index_error` (502).
//!
//! # Degraded Mirror
//!
//! When a mutation commits canonically but its mirror write fails, the
//! response is still a success and carries a top-level `warning` string.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use article_mirror_core::auth::{bearer_token, Principal, Verifier};
use article_mirror_core::models::{Article, ArticleDetail, ArticleFields, SearchHit};
use article_mirror_core::query::Page;
use article_mirror_core::sync::{DriftStatus, ReindexReport, Synced};
use article_mirror_core::Error;

use crate::app::App;
use crate::config::Config;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    app: Arc<App>,
}

/// Starts the HTTP server, verifying tokens with the secret named by
/// `[auth].secret_env`. Runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let app = App::open(config).await?;
    serve(config, Arc::new(app)).await
}

/// Like [`run_server`], with a caller-supplied [`Verifier`].
pub async fn run_server_with_verifier(
    config: &Config,
    verifier: Arc<dyn Verifier>,
) -> anyhow::Result<()> {
    let app = App::open_with_verifier(config, verifier).await?;
    serve(config, Arc::new(app)).await
}

async fn serve(config: &Config, app: Arc<App>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(bind = %config.server.bind, "article server listening");
    axum::serve(listener, router(app)).await?;
    Ok(())
}

/// Build the route table over an opened [`App`].
pub fn router(app: Arc<App>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/articles", get(handle_list).post(handle_create))
        .route("/api/articles/search", get(handle_search))
        .route("/api/articles/reindex", post(handle_reindex))
        .route(
            "/api/articles/{id}",
            get(handle_get).put(handle_update).delete(handle_delete),
        )
        .route("/api/mirror/status", get(handle_status))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(AppState { app })
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        let status = match err {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Index(_) => StatusCode::BAD_GATEWAY,
        };
        if status.is_server_error() {
            tracing::error!(error = %err, "request failed");
        }
        AppError {
            status,
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<Principal, AppError> {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    Ok(state.app.authorize(bearer_token(header))?)
}

fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| Error::validation(format!("invalid article id: {}", raw)).into())
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| Error::validation(rejection.body_text()).into())
}

/// A mutation result with an optional degraded-mirror warning.
#[derive(Serialize)]
struct MutationResponse<T: Serialize> {
    #[serde(flatten)]
    body: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

impl<T: Serialize> MutationResponse<T> {
    fn new<U>(synced: &Synced<U>, body: T) -> Self {
        Self {
            body,
            warning: synced.warning().map(str::to_string),
        }
    }
}

#[derive(Serialize)]
struct Message {
    message: &'static str,
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ Articles ============

#[derive(Deserialize)]
struct ListParams {
    page: Option<String>,
    limit: Option<String>,
}

/// Unparseable and non-positive numbers both fall back to the defaults.
fn lenient_number(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
}

async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<ArticleDetail>>, AppError> {
    let page = state
        .app
        .query
        .list(
            lenient_number(params.page.as_deref()),
            lenient_number(params.limit.as_deref()),
        )
        .await?;
    Ok(Json(page))
}

async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ArticleDetail>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(state.app.query.get(id).await?))
}

async fn handle_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ArticleFields>, JsonRejection>,
) -> Result<(StatusCode, Json<MutationResponse<Article>>), AppError> {
    let principal = authorize(&state, &headers)?;
    let fields = body(payload)?;
    let synced = state.app.sync.create(&fields, &principal).await?;
    let response = MutationResponse::new(&synced, synced.value.clone());
    Ok((StatusCode::CREATED, Json(response)))
}

async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<ArticleFields>, JsonRejection>,
) -> Result<Json<MutationResponse<Article>>, AppError> {
    let principal = authorize(&state, &headers)?;
    let id = parse_id(&id)?;
    let fields = body(payload)?;
    let synced = state.app.sync.update(id, &fields, &principal).await?;
    Ok(Json(MutationResponse::new(&synced, synced.value.clone())))
}

async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<MutationResponse<Message>>, AppError> {
    let principal = authorize(&state, &headers)?;
    let id = parse_id(&id)?;
    let synced = state.app.sync.delete(id, &principal).await?;
    Ok(Json(MutationResponse::new(
        &synced,
        Message {
            message: "Article deleted",
        },
    )))
}

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchHit>>, AppError> {
    let text = params.q.unwrap_or_default();
    Ok(Json(state.app.query.search(&text).await?))
}

async fn handle_reindex(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ReindexReport>, AppError> {
    let principal = authorize(&state, &headers)?;
    Ok(Json(state.app.sync.reindex(&principal).await?))
}

#[derive(Serialize)]
struct StatusResponse {
    #[serde(flatten)]
    status: DriftStatus,
    drift: i64,
}

async fn handle_status(State(state): State<AppState>) -> Result<Json<StatusResponse>, AppError> {
    let status = state.app.sync.drift_status().await?;
    Ok(Json(StatusResponse {
        drift: status.drift(),
        status,
    }))
}
