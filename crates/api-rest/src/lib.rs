//! # API REST
//!
//! HTTP surface of the canvas service.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI documentation, served at `/api-docs/openapi.json`
//! - REST-specific concerns (multipart decoding, JSON responses, CORS, request tracing)
//!
//! Storage semantics live in `canvas-core`; this crate only maps them onto routes.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use canvas_core::{BlobStore, CanvasResult, CanvasService, CoreConfig};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

pub use error::{ApiError, ErrorBody};
pub use handlers::{UploadRes, LIVENESS_MESSAGE, UPLOAD_FIELD};

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub blobs: Arc<BlobStore>,
    pub canvases: Arc<CanvasService>,
}

impl AppState {
    /// Opens both stores under the configured data directory.
    ///
    /// # Errors
    /// Returns an error if either store directory cannot be created.
    pub fn new(cfg: Arc<CoreConfig>) -> CanvasResult<Self> {
        Ok(Self {
            blobs: Arc::new(cfg.open_blob_store()?),
            canvases: Arc::new(CanvasService::new(&cfg)?),
        })
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::root,
        handlers::upload_file,
        handlers::download_file,
        handlers::create_canvas,
        handlers::list_canvases,
        handlers::get_canvas,
    ),
    components(schemas(
        handlers::UploadRes,
        handlers::UploadForm,
        handlers::CanvasInput,
        handlers::CanvasDoc,
        error::ErrorBody,
    ))
)]
pub struct ApiDoc;

/// Builds the router with every endpoint and middleware layer attached.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route(
            "/upload",
            post(handlers::upload_file).layer(DefaultBodyLimit::disable()),
        )
        .route("/file/:file_id", get(handlers::download_file))
        .route(
            "/canvas",
            get(handlers::list_canvases).post(handlers::create_canvas),
        )
        .route("/canvas/:id", get(handlers::get_canvas))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
