use axum::body::Bytes;
use axum::http::{HeaderMap, header};
use brokerdesk_application::Upload;

use crate::dto::UploadQuery;

/// Uploads arrive as a raw body; the name travels in the query string and
/// the MIME type in `Content-Type`.
pub fn read_upload(headers: &HeaderMap, query: UploadQuery, body: Bytes) -> Upload {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_owned();

    Upload {
        file_name: query.file_name,
        content_type,
        bytes: body.to_vec(),
    }
}
