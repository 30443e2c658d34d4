//! Log endpoints: save a record, view, download and clear the log.

use crate::normalize::{normalize_body, BodyError};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use snaplog_core::{LogClear, LogContent, LogError, LogRecord};

/// File name offered to clients downloading the log.
pub const LOG_DOWNLOAD_NAME: &str = "logs.txt";

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

#[utoipa::path(
    post,
    path = "/save",
    request_body(
        content = String,
        description = "JSON (`data` field preferred), form fields or plain text",
        content_type = "text/plain"
    ),
    responses(
        (status = 200, description = "Data saved successfully"),
        (status = 400, description = "No data provided or malformed body"),
        (status = 413, description = "Payload too large"),
        (status = 500, description = "Internal server error")
    )
)]
/// Append one record to the log
///
/// The body is normalised according to its `Content-Type` and reduced to a single line of
/// text. Blank records are rejected without touching the log file.
#[axum::debug_handler]
pub async fn save_log(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, (StatusCode, &'static str)> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let text = match normalize_body(content_type, &body) {
        Ok(normalized) => normalized.into_record_text(),
        Err(BodyError::InvalidJson(e)) => {
            tracing::debug!("Rejected JSON body: {}", e);
            return Err((StatusCode::BAD_REQUEST, "Invalid JSON body"));
        }
        Err(BodyError::InvalidForm(e)) => {
            tracing::debug!("Rejected form body: {}", e);
            return Err((StatusCode::BAD_REQUEST, "Invalid form body"));
        }
    };

    let record =
        LogRecord::new(text).map_err(|_| (StatusCode::BAD_REQUEST, "No data provided"))?;

    match state.logs.append(&record) {
        Ok(()) => Ok("Data saved successfully"),
        Err(e) => {
            tracing::error!("Append log error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Failed to save data"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/logs",
    responses(
        (
            status = 200,
            description = "Raw log content, or `No logs found`",
            content_type = "text/plain"
        ),
        (status = 500, description = "Internal server error")
    )
)]
/// View the whole log in the browser
pub async fn view_logs(
    State(state): State<AppState>,
) -> Result<Response, (StatusCode, &'static str)> {
    match state.logs.read_all().map_err(log_read_error)? {
        LogContent::Present(bytes) => {
            Ok(([(header::CONTENT_TYPE, TEXT_PLAIN)], bytes).into_response())
        }
        LogContent::Absent => Ok("No logs found".into_response()),
    }
}

#[utoipa::path(
    get,
    path = "/download",
    responses(
        (status = 200, description = "Log file as the attachment `logs.txt`"),
        (status = 404, description = "No logs found")
    )
)]
/// Download the log as `logs.txt`
pub async fn download_logs(
    State(state): State<AppState>,
) -> Result<Response, (StatusCode, &'static str)> {
    match state.logs.read_all().map_err(log_read_error)? {
        LogContent::Present(bytes) => Ok((
            [
                (header::CONTENT_TYPE, TEXT_PLAIN.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{LOG_DOWNLOAD_NAME}\""),
                ),
            ],
            bytes,
        )
            .into_response()),
        LogContent::Absent => Err((StatusCode::NOT_FOUND, "No logs found.")),
    }
}

#[utoipa::path(
    delete,
    path = "/del",
    responses(
        (
            status = 200,
            description = "`All logs deleted successfully` or `No logs found to delete`"
        ),
        (status = 500, description = "Internal server error")
    )
)]
/// Clear the log
///
/// An existing log is truncated to empty; a missing one is left missing. Both are `200 OK`
/// and differ only in the response text.
pub async fn delete_logs(
    State(state): State<AppState>,
) -> Result<&'static str, (StatusCode, &'static str)> {
    match state.logs.clear() {
        Ok(LogClear::Cleared) => {
            tracing::info!("log cleared");
            Ok("All logs deleted successfully")
        }
        Ok(LogClear::NothingToDelete) => Ok("No logs found to delete"),
        Err(e) => {
            tracing::error!("Clear log error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete logs"))
        }
    }
}

fn log_read_error(e: LogError) -> (StatusCode, &'static str) {
    tracing::error!("Read log error: {:?}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read logs")
}
