//! Photo endpoints: upload, browse, fetch, download and bulk delete.

use crate::AppState;
use axum::{
    extract::{Host, Multipart, Path as AxumPath, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Response},
};
use serde::Serialize;
use snaplog_files::{FilesError, StoredPhoto};
use utoipa::ToSchema;

/// Multipart field carrying the uploaded photo.
pub const PHOTO_FIELD: &str = "photo";

const LISTING_BASE: &str = "http://localhost/photos/";

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadRes {
    pub message: String,
    pub filename: String,
    pub url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PhotoEntry {
    pub name: String,
    pub size_bytes: u64,
    /// RFC 3339 timestamp
    pub stored_at: String,
    pub url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteFailure {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeletePhotosRes {
    pub message: String,
    pub deleted: Vec<String>,
    pub failed: Vec<DeleteFailure>,
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body(
        content = String,
        content_type = "multipart/form-data",
        description = "Photo in the `photo` field"
    ),
    responses(
        (status = 200, description = "Photo stored", body = UploadRes),
        (status = 400, description = "No file uploaded"),
        (status = 413, description = "Payload too large"),
        (status = 500, description = "Internal server error")
    )
)]
/// Store an uploaded photo
///
/// Reads the first `photo` file part, stores it under a generated name and returns an
/// absolute URL built from the request's own scheme and host.
///
/// # Errors
/// Returns `400 Bad Request` if no non-empty `photo` file part is present, `413` if the body
/// exceeds the configured limit and `500` if the photo cannot be written.
#[axum::debug_handler]
pub async fn upload_photo(
    State(state): State<AppState>,
    Host(host): Host,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<UploadRes>, (StatusCode, &'static str)> {
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Upload multipart error: {:?}", e);
        multipart_rejection(e.status())
    })? {
        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }
        // A `photo` part without a file name is a plain form value, not a file.
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        let bytes = field.bytes().await.map_err(|e| {
            tracing::error!("Upload read error: {:?}", e);
            multipart_rejection(e.status())
        })?;
        upload = Some((filename, bytes));
        break;
    }

    let Some((original_filename, bytes)) = upload else {
        return Err((StatusCode::BAD_REQUEST, "No file uploaded."));
    };

    match state.photos.put(&original_filename, &bytes) {
        Ok(photo) => {
            tracing::info!(
                filename = %photo.name,
                original = %original_filename,
                size_bytes = photo.size_bytes,
                "photo stored"
            );
            let url = photo_url(&headers, &host, &photo.name);
            Ok(Json(UploadRes {
                message: "Photo uploaded successfully!".into(),
                filename: photo.name,
                url,
            }))
        }
        Err(FilesError::EmptyPayload) => Err((StatusCode::BAD_REQUEST, "No file uploaded.")),
        Err(e) => {
            tracing::error!("Store photo error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/photos/",
    responses(
        (
            status = 200,
            description = "Listing as HTML, JSON (Accept: application/json) or plain text",
            body = [PhotoEntry]
        ),
        (status = 500, description = "Upload directory unreadable")
    )
)]
/// Browse the upload directory
pub async fn list_photos(
    State(state): State<AppState>,
    Host(host): Host,
    headers: HeaderMap,
) -> Result<Response, (StatusCode, &'static str)> {
    let photos = state.photos.list().map_err(|e| {
        tracing::error!("List photos error: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Unable to scan uploads folder.")
    })?;

    let accept = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if accept.contains("application/json") {
        let entries: Vec<PhotoEntry> = photos
            .into_iter()
            .map(|photo| PhotoEntry {
                url: photo_url(&headers, &host, &photo.name),
                name: photo.name,
                size_bytes: photo.size_bytes,
                stored_at: photo.stored_at.to_rfc3339(),
            })
            .collect();
        return Ok(Json(entries).into_response());
    }

    if accept.contains("text/plain") {
        let mut text = String::new();
        for photo in &photos {
            text.push_str(&photo.name);
            text.push('\n');
        }
        return Ok(text.into_response());
    }

    Ok(Html(render_listing(&photos)).into_response())
}

#[utoipa::path(
    get,
    path = "/photos/{name}",
    params(("name" = String, Path, description = "Stored photo name")),
    responses(
        (status = 200, description = "Photo bytes"),
        (status = 404, description = "File not found")
    )
)]
/// Serve a stored photo inline
pub async fn get_photo(
    State(state): State<AppState>,
    AxumPath(name): AxumPath<String>,
) -> Result<Response, (StatusCode, &'static str)> {
    let content = state.photos.get(&name).map_err(photo_error)?;
    Ok(([(header::CONTENT_TYPE, content.media_type)], content.bytes).into_response())
}

#[utoipa::path(
    get,
    path = "/download/{filename}",
    params(("filename" = String, Path, description = "Stored photo name")),
    responses(
        (status = 200, description = "Photo as an attachment"),
        (status = 404, description = "File not found")
    )
)]
/// Download a stored photo as an attachment under its stored name
pub async fn download_photo(
    State(state): State<AppState>,
    AxumPath(filename): AxumPath<String>,
) -> Result<Response, (StatusCode, &'static str)> {
    let content = state.photos.get(&filename).map_err(photo_error)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        filename.replace(['"', '\r', '\n'], "_")
    );

    Ok((
        [
            (header::CONTENT_TYPE, content.media_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        content.bytes,
    )
        .into_response())
}

#[utoipa::path(
    delete,
    path = "/delete-photos",
    responses(
        (status = 200, description = "Photos deleted", body = DeletePhotosRes),
        (status = 500, description = "Upload directory unreadable")
    )
)]
/// Delete every stored photo
///
/// Deletion is best effort and not atomic; entries that could not be removed are listed in
/// `failed` rather than failing the request.
pub async fn delete_photos(
    State(state): State<AppState>,
) -> Result<Json<DeletePhotosRes>, (StatusCode, &'static str)> {
    match state.photos.clear() {
        Ok(report) => {
            tracing::info!(
                deleted = report.deleted.len(),
                failed = report.failed.len(),
                "photos cleared"
            );
            Ok(Json(DeletePhotosRes {
                message: "All photos deleted successfully!".into(),
                deleted: report.deleted,
                failed: report
                    .failed
                    .into_iter()
                    .map(|f| DeleteFailure {
                        name: f.name,
                        reason: f.reason,
                    })
                    .collect(),
            }))
        }
        Err(e) => {
            tracing::error!("Clear photos error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Unable to scan uploads folder."))
        }
    }
}

/// Absolute URL of a photo as seen by the client that made this request.
///
/// The scheme comes from the first `X-Forwarded-Proto` value when it is `http` or `https`,
/// otherwise `http`.
pub(crate) fn photo_url(headers: &HeaderMap, host: &str, name: &str) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| v.eq_ignore_ascii_case("https") || v.eq_ignore_ascii_case("http"))
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "http".to_string());

    format!("{scheme}://{host}/photos/{name}")
}

fn photo_error(e: FilesError) -> (StatusCode, &'static str) {
    match e {
        FilesError::NotFound(_) | FilesError::InvalidName(_) => {
            (StatusCode::NOT_FOUND, "File not found.")
        }
        e => {
            tracing::error!("Read photo error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}

fn multipart_rejection(status: StatusCode) -> (StatusCode, &'static str) {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        (status, "Payload too large")
    } else {
        (StatusCode::BAD_REQUEST, "Invalid multipart body")
    }
}

fn render_listing(photos: &[StoredPhoto]) -> String {
    let mut html = String::from(concat!(
        "<!DOCTYPE html>\n<html>\n",
        "<head><meta charset=\"utf-8\"><title>/photos/</title></head>\n",
        "<body>\n<h1>/photos/</h1>\n<ul>\n",
    ));
    for photo in photos {
        let href = escape_html(&photo_href(&photo.name));
        let name = escape_html(&photo.name);
        html.push_str(&format!(
            "<li><a href=\"{href}\">{name}</a> <small>{} bytes</small></li>\n",
            photo.size_bytes
        ));
    }
    html.push_str("</ul>\n</body>\n</html>\n");
    html
}

/// Site-relative link to a photo with the name percent-encoded as one path segment.
fn photo_href(name: &str) -> String {
    let mut url = match url::Url::parse(LISTING_BASE) {
        Ok(url) => url,
        Err(_) => return format!("/photos/{name}"),
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(name);
    }
    url.path().to_string()
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn named(name: &str) -> StoredPhoto {
        StoredPhoto {
            name: name.to_string(),
            extension: String::new(),
            size_bytes: 3,
            stored_at: Default::default(),
        }
    }

    #[test]
    fn test_photo_url_defaults_to_http() {
        let headers = HeaderMap::new();
        assert_eq!(
            photo_url(&headers, "localhost:3000", "1.png"),
            "http://localhost:3000/photos/1.png"
        );
    }

    #[test]
    fn test_photo_url_honours_forwarded_proto() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-proto", HeaderValue::from_static("HTTPS, http"));
        assert_eq!(
            photo_url(&headers, "myapp.example.com", "1.png"),
            "https://myapp.example.com/photos/1.png"
        );
    }

    #[test]
    fn test_photo_url_ignores_unknown_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-proto", HeaderValue::from_static("gopher"));
        assert!(photo_url(&headers, "h", "1.png").starts_with("http://"));
    }

    #[test]
    fn test_listing_escapes_names() {
        let html = render_listing(&[named("<b>.png")]);
        assert!(html.contains("&lt;b&gt;.png"));
        assert!(!html.contains("<b>.png"));
    }

    #[test]
    fn test_listing_href_is_percent_encoded() {
        let html = render_listing(&[named("my photo#1.png")]);
        assert!(html.contains("href=\"/photos/my%20photo%231.png\""));
        assert!(html.contains(">my photo#1.png</a>"));
    }

    #[test]
    fn test_photo_href_plain_name() {
        assert_eq!(photo_href("1700000000000.png"), "/photos/1700000000000.png");
    }
}
