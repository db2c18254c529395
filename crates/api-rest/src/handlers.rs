//! Request handlers.
//!
//! Handlers only decode requests, call into the stores and shape responses. Canvas operations
//! use synchronous file I/O and run on the blocking pool; blob uploads and downloads are
//! streamed.

use crate::error::{ApiError, ErrorBody};
use crate::AppState;
use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Multipart, Path as AxumPath, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use canvas_core::Canvas;
use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io;
use tokio_util::io::{ReaderStream, StreamReader};
use utoipa::ToSchema;

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

/// Body of `GET /`.
pub const LIVENESS_MESSAGE: &str = "Canvas server is running";

/// Response of a successful upload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadRes {
    /// Identifier to download the file with.
    pub file_id: String,
    pub message: String,
}

/// Multipart form accepted by `POST /upload`.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

/// Any JSON object. Its fields are stored verbatim except `id` and `createAt`.
#[derive(ToSchema)]
pub struct CanvasInput {}

/// A stored canvas: every field of the submitted object plus the two system fields below.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct CanvasDoc {
    /// Generated identifier.
    id: String,
    /// Creation time, ISO-8601 UTC with milliseconds.
    create_at: String,
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Liveness message", body = String, content_type = "text/plain")
    )
)]
/// Liveness endpoint.
pub async fn root() -> &'static str {
    LIVENESS_MESSAGE
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored", body = UploadRes),
        (status = 400, description = "Malformed multipart body or no file field", body = ErrorBody),
        (status = 500, description = "File could not be stored", body = ErrorBody)
    )
)]
/// Store the multipart field named `file`.
///
/// The field is streamed straight into the blob store; other fields are skipped. The original
/// filename only contributes its extension.
///
/// # Errors
/// Returns `400 Bad Request` if the body is not valid multipart (including a `file` field cut
/// off mid-stream) or has no `file` field, and `500 Internal Server Error` if the file cannot be
/// written.
#[axum::debug_handler]
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadRes>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let original_name = field.file_name().unwrap_or_default().to_owned();
        // Framing errors inside the field surface as InvalidData and map back to a 400
        let reader =
            StreamReader::new(field.map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)));
        tokio::pin!(reader);

        let file_id = state
            .blobs
            .put(reader, &original_name)
            .await
            .map_err(|e| ApiError::from_files(e, "Failed to upload file"))?;

        return Ok(Json(UploadRes {
            file_id: file_id.to_string(),
            message: "File uploaded successfully".into(),
        }));
    }

    Err(ApiError::BadRequest("No file uploaded".into()))
}

#[utoipa::path(
    get,
    path = "/file/{file_id}",
    params(("file_id" = String, Path, description = "Identifier returned by the upload")),
    responses(
        (status = 200, description = "Raw file bytes with a sniffed Content-Type"),
        (status = 404, description = "No such file", body = ErrorBody),
        (status = 500, description = "Storage could not be read", body = ErrorBody)
    )
)]
/// Stream a stored file back.
#[axum::debug_handler]
pub async fn download_file(
    State(state): State<AppState>,
    AxumPath(file_id): AxumPath<String>,
) -> Result<Response, ApiError> {
    let blob = state
        .blobs
        .get(&file_id)
        .await
        .map_err(|e| ApiError::from_files(e, "Failed to read file"))?;

    let headers = [
        (header::CONTENT_TYPE, blob.media_type.to_string()),
        (header::CONTENT_LENGTH, blob.size.to_string()),
    ];
    let body = Body::from_stream(ReaderStream::new(blob.file));

    Ok((headers, body).into_response())
}

#[utoipa::path(
    post,
    path = "/canvas",
    request_body = CanvasInput,
    responses(
        (status = 201, description = "Canvas stored", body = CanvasDoc),
        (status = 400, description = "Body is not a JSON object", body = ErrorBody),
        (status = 500, description = "Canvas could not be stored", body = ErrorBody)
    )
)]
/// Store a canvas document.
///
/// # Errors
/// Returns `400 Bad Request` for a body that is not JSON (or not sent as `application/json`)
/// or not a JSON object, and `500 Internal Server Error` if the document cannot be written.
#[axum::debug_handler]
pub async fn create_canvas(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Canvas>), ApiError> {
    let Json(document) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let canvases = state.canvases.clone();
    let canvas = tokio::task::spawn_blocking(move || canvases.create(document))
        .await?
        .map_err(|e| ApiError::from_canvas(e, "Failed to save canvas"))?;

    Ok((StatusCode::CREATED, Json(canvas)))
}

#[utoipa::path(
    get,
    path = "/canvas",
    responses(
        (status = 200, description = "All canvases, newest first", body = [CanvasDoc]),
        (status = 500, description = "Canvases could not be read", body = ErrorBody)
    )
)]
/// List every canvas, newest first.
#[axum::debug_handler]
pub async fn list_canvases(State(state): State<AppState>) -> Result<Json<Vec<Canvas>>, ApiError> {
    let canvases = state.canvases.clone();
    let listed = tokio::task::spawn_blocking(move || canvases.list())
        .await?
        .map_err(|e| ApiError::from_canvas(e, "Failed to read canvases"))?;

    Ok(Json(listed))
}

#[utoipa::path(
    get,
    path = "/canvas/{id}",
    params(("id" = String, Path, description = "Canvas identifier")),
    responses(
        (status = 200, description = "The canvas", body = CanvasDoc),
        (status = 404, description = "No such canvas", body = ErrorBody),
        (status = 500, description = "Canvas could not be read", body = ErrorBody)
    )
)]
/// Fetch one canvas by identifier.
#[axum::debug_handler]
pub async fn get_canvas(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<Canvas>, ApiError> {
    let canvases = state.canvases.clone();
    let canvas = tokio::task::spawn_blocking(move || canvases.get(&id))
        .await?
        .map_err(|e| ApiError::from_canvas(e, "Failed to read canvas"))?;

    Ok(Json(canvas))
}
