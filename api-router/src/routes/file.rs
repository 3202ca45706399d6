use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_typed_multipart::{FieldData, TryFromMultipart, TypedMultipart};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use common::storage::{blob::BlobRef, types::file_record::FileRecord};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, TryFromMultipart)]
pub struct UploadParams {
    #[form_data(limit = "unlimited")]
    pub file: FieldData<Bytes>,
}

/// Upload response, the projection of a stored record handed back to clients.
#[derive(Debug, Serialize)]
pub struct FileSummary {
    pub filename: String,
    pub hash: String,
    pub file_id: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
}

impl From<FileRecord> for FileSummary {
    fn from(record: FileRecord) -> Self {
        Self {
            filename: record.display_name,
            hash: record.content_hash,
            file_id: record.blob_ref.to_string(),
            mime_type: record.mime_type,
            size_bytes: record.size_bytes,
            uploaded_at: record.uploaded_at,
        }
    }
}

pub async fn upload_file(
    State(state): State<ApiState>,
    TypedMultipart(input): TypedMultipart<UploadParams>,
) -> Result<impl IntoResponse, ApiError> {
    let file_name = input
        .file
        .metadata
        .file_name
        .ok_or_else(|| ApiError::ValidationError("File name missing in metadata".to_string()))?;

    info!(
        file_name = %file_name,
        size_bytes = input.file.contents.len(),
        "Received upload"
    );

    let record = state.files.ingest(input.file.contents, &file_name).await?;

    Ok((StatusCode::CREATED, Json(FileSummary::from(record))))
}

/// Representations the random-line endpoint can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    PlainText,
    Json,
    Xml,
}

impl ResponseFormat {
    /// Picks the first representation listed in `Accept` that we can produce.
    pub fn negotiate(headers: &HeaderMap) -> Self {
        let Some(accept) = headers
            .get(header::ACCEPT)
            .and_then(|value| value.to_str().ok())
        else {
            return Self::PlainText;
        };

        accept
            .split(',')
            .filter_map(|item| item.split(';').next())
            .map(str::trim)
            .find_map(|media| match media {
                "application/json" => Some(Self::Json),
                "application/xml" | "text/xml" => Some(Self::Xml),
                "text/plain" => Some(Self::PlainText),
                _ => None,
            })
            .unwrap_or(Self::PlainText)
    }
}

/// Escapes text for use inside an XML element.
fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub async fn random_line(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let line = state.files.pick_random_line().await?;

    let response = match ResponseFormat::negotiate(&headers) {
        ResponseFormat::Json => Json(json!({
            "line": line.text,
            "line_number": line.index,
            "file_name": line.file_name,
            "most_frequent_letter": line.most_frequent_letter,
        }))
        .into_response(),
        ResponseFormat::Xml => (
            [(header::CONTENT_TYPE, "application/xml")],
            format!(
                "<line><number>{}</number><text>{}</text></line>",
                line.index,
                escape_xml(&line.text)
            ),
        )
            .into_response(),
        ResponseFormat::PlainText => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            line.text,
        )
            .into_response(),
    };

    Ok(response)
}

pub async fn random_line_backward(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, ApiError> {
    let line = state.files.pick_random_line_reversed().await?;

    Ok(Json(json!({ "line": line })))
}

#[derive(Debug, Deserialize)]
pub struct LongestParams {
    pub number: Option<usize>,
    pub single: Option<String>,
}

pub async fn longest_lines(
    State(state): State<ApiState>,
    params: Result<Query<LongestParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) =
        params.map_err(|rejection| ApiError::ValidationError(rejection.body_text()))?;
    let number = params.number.unwrap_or(state.config.default_longest_count);
    let single = params
        .single
        .is_some_and(|value| value.eq_ignore_ascii_case("true"));

    let lines = if single {
        state.files.top_longest_lines_in_latest_file(number).await?
    } else {
        state.files.top_longest_lines(number).await?
    };

    Ok(Json(lines))
}

pub async fn get_blob(
    State(state): State<ApiState>,
    Path(blob_ref): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let blob_ref = BlobRef::parse(&blob_ref)
        .ok_or_else(|| ApiError::NotFound(format!("No file with id {blob_ref}")))?;

    let bytes = state.files.get_file_by_id(&blob_ref).await?;

    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn accept(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_negotiate_defaults_to_plain_text() {
        assert_eq!(
            ResponseFormat::negotiate(&HeaderMap::new()),
            ResponseFormat::PlainText
        );
        assert_eq!(
            ResponseFormat::negotiate(&accept("*/*")),
            ResponseFormat::PlainText
        );
    }

    #[test]
    fn test_negotiate_known_types() {
        assert_eq!(
            ResponseFormat::negotiate(&accept("application/json")),
            ResponseFormat::Json
        );
        assert_eq!(
            ResponseFormat::negotiate(&accept("application/xml")),
            ResponseFormat::Xml
        );
        assert_eq!(
            ResponseFormat::negotiate(&accept("text/html, application/xml;q=0.9, */*;q=0.8")),
            ResponseFormat::Xml
        );
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape_xml("plain"), "plain");
    }
}
