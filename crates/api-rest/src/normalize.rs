//! Request body normalisation for `POST /save`.
//!
//! Clients send log records as JSON, as form fields or as raw text. [`normalize_body`] turns
//! the raw bytes into a tagged [`SaveBody`] based on the declared content type, and
//! [`SaveBody::into_record_text`] reduces that to the single string that gets appended.

use serde_json::Value;

/// Name of the field whose value is logged instead of the whole body.
pub const DATA_FIELD: &str = "data";

/// A `/save` body after content negotiation.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveBody {
    Json(Value),
    Form(Vec<(String, String)>),
    Text(String),
}

#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid form body: {0}")]
    InvalidForm(#[from] serde_urlencoded::de::Error),
}

/// Classifies `body` by its `Content-Type`.
///
/// JSON (`application/json` or any `+json` suffix) is parsed, URL-encoded forms are decoded
/// into ordered pairs, and everything else, including a missing content type, is read as
/// UTF-8 text with invalid sequences replaced. A blank body is always [`SaveBody::Text`].
pub fn normalize_body(content_type: Option<&str>, body: &[u8]) -> Result<SaveBody, BodyError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SaveBody::Text(String::from_utf8_lossy(body).into_owned()));
    }

    let media_type = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|mt| mt.trim().to_ascii_lowercase())
        .unwrap_or_default();

    if media_type == "application/json" || media_type.ends_with("+json") {
        return Ok(SaveBody::Json(serde_json::from_slice(body)?));
    }

    if media_type == "application/x-www-form-urlencoded" {
        return Ok(SaveBody::Form(serde_urlencoded::from_bytes(body)?));
    }

    Ok(SaveBody::Text(String::from_utf8_lossy(body).into_owned()))
}

impl SaveBody {
    /// The text to append to the log.
    ///
    /// A JSON object with a `data` field, or a form with a `data` key, contributes
    /// only that value. Otherwise the whole body is used. JSON strings are taken verbatim and
    /// other JSON values are rendered as compact JSON.
    pub fn into_record_text(self) -> String {
        match self {
            SaveBody::Json(Value::Object(mut map)) => match map.remove(DATA_FIELD) {
                Some(data) => json_text(data),
                None => Value::Object(map).to_string(),
            },
            SaveBody::Json(value) => json_text(value),
            SaveBody::Form(pairs) => match pairs.iter().find(|(key, _)| key == DATA_FIELD) {
                Some((_, value)) => value.clone(),
                None => serde_urlencoded::to_string(&pairs).unwrap_or_default(),
            },
            SaveBody::Text(text) => text,
        }
    }
}

fn json_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}
