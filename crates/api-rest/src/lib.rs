//! # API REST
//!
//! REST API implementation for snaplog.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI documentation (served as JSON)
//! - REST-specific concerns (body normalisation, body size limit, CORS)
//!
//! Uses `snaplog_files` for photo storage and `snaplog-core` for the log.

#![warn(rust_2018_idioms)]

pub mod logs;
pub mod normalize;
pub mod photos;

use axum::{
    extract::DefaultBodyLimit,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::Serialize;
use snaplog_core::{CoreConfig, LogStore};
use snaplog_files::PhotoStore;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};

/// Application state shared across REST API handlers
///
/// Each store is owned once and shared by reference; handlers never touch the filesystem
/// directly.
#[derive(Clone)]
pub struct AppState {
    pub photos: Arc<PhotoStore>,
    pub logs: Arc<LogStore>,
}

impl AppState {
    /// Builds both stores from the startup configuration.
    pub fn new(cfg: &CoreConfig) -> Self {
        Self::from_paths(cfg.upload_dir().to_path_buf(), cfg.log_file().to_path_buf())
    }

    pub fn from_paths(upload_dir: PathBuf, log_file: PathBuf) -> Self {
        Self {
            photos: Arc::new(PhotoStore::new(upload_dir)),
            logs: Arc::new(LogStore::new(log_file)),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        photos::upload_photo,
        photos::list_photos,
        photos::get_photo,
        photos::download_photo,
        photos::delete_photos,
        logs::save_log,
        logs::view_logs,
        logs::download_logs,
        logs::delete_logs,
    ),
    components(schemas(
        HealthRes,
        photos::UploadRes,
        photos::PhotoEntry,
        photos::DeletePhotosRes,
        photos::DeleteFailure,
    ))
)]
pub struct ApiDoc;

/// Builds the snaplog router
///
/// `body_limit` caps every request body (JSON, text, form and multipart) in bytes.
/// All origins are allowed.
pub fn router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/upload", post(photos::upload_photo))
        .route("/photos", get(photos::list_photos))
        .route("/photos/", get(photos::list_photos))
        .route("/photos/:name", get(photos::get_photo))
        .route("/download/:filename", get(photos::download_photo))
        .route("/delete-photos", delete(photos::delete_photos))
        .route("/save", post(logs::save_log))
        .route("/logs", get(logs::view_logs))
        .route("/download", get(logs::download_logs))
        .route("/del", delete(logs::delete_logs))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
async fn health() -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "snaplog REST API is alive".into(),
    })
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
