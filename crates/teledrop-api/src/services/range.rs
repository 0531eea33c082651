//! The Range & Stream Gateway (§4.5).
//!
//! Parses a single-range HTTP `Range` header and resolves it against a blob's
//! size into a 200/206/416 decision. Range validity is fully decided here,
//! against a `stat()` call, before `StorageBackend::read_range` is ever
//! invoked — so the storage crate's error type carries no range-specific
//! variant; a gateway-level decision is either a valid, already-clamped
//! [`ByteRange`] or a [`RangeOutcome::NotSatisfiable`].

use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use teledrop_storage::ByteRange;

pub enum RangeOutcome {
    Full,
    Partial(ByteRange),
    NotSatisfiable,
}

/// Parse and resolve a `Range` header against `size` (§4.5).
///
/// Accepted forms: `bytes=S-E`, `bytes=S-`, `bytes=-N` (last `N` bytes).
/// Multipart ranges are not supported; anything but a single range is
/// treated as absent, falling back to a full-content response.
pub fn resolve(range_header: Option<&str>, size: u64) -> RangeOutcome {
    let Some(header) = range_header else {
        return RangeOutcome::Full;
    };
    let Some(spec) = header.strip_prefix("bytes=") else {
        return RangeOutcome::NotSatisfiable;
    };
    if spec.contains(',') {
        return RangeOutcome::Full;
    }

    let (start_str, end_str) = match spec.split_once('-') {
        Some(parts) => parts,
        None => return RangeOutcome::NotSatisfiable,
    };

    let (start, end_inclusive) = if start_str.is_empty() {
        // bytes=-N: last N bytes.
        let Ok(n) = end_str.parse::<u64>() else {
            return RangeOutcome::NotSatisfiable;
        };
        if n == 0 || size == 0 {
            return RangeOutcome::NotSatisfiable;
        }
        let start = size.saturating_sub(n);
        (start, size - 1)
    } else {
        let Ok(start) = start_str.parse::<u64>() else {
            return RangeOutcome::NotSatisfiable;
        };
        if end_str.is_empty() {
            (start, size.saturating_sub(1))
        } else {
            let Ok(end) = end_str.parse::<u64>() else {
                return RangeOutcome::NotSatisfiable;
            };
            (start, end)
        }
    };

    if start >= size || start > end_inclusive {
        return RangeOutcome::NotSatisfiable;
    }

    let end_inclusive = end_inclusive.min(size.saturating_sub(1));
    RangeOutcome::Partial(ByteRange { start, end_inclusive })
}

fn content_disposition(file_name: &str, as_attachment: bool) -> HeaderValue {
    let disposition = if as_attachment { "attachment" } else { "inline" };
    let encoded = utf8_percent_encode(file_name, NON_ALPHANUMERIC).to_string();
    let sanitized = file_name.replace('"', "\\\"");
    let value = format!("{disposition}; filename=\"{sanitized}\"; filename*=UTF-8''{encoded}");
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("inline"))
}

/// Build the full HTTP response for a download/preview request, given the
/// already-resolved content stream and blob metadata (§4.5).
pub fn respond(
    outcome: RangeOutcome,
    size: u64,
    media_type: &str,
    file_name: &str,
    as_attachment: bool,
    stream: teledrop_storage::BlobStream,
) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert("accept-ranges", HeaderValue::from_static("bytes"));
    if let Ok(value) = HeaderValue::from_str(media_type) {
        headers.insert(axum::http::header::CONTENT_TYPE, value);
    }
    headers.insert(axum::http::header::CONTENT_DISPOSITION, content_disposition(file_name, as_attachment));

    match outcome {
        RangeOutcome::NotSatisfiable => {
            headers.insert(
                "content-range",
                HeaderValue::from_str(&format!("bytes */{size}")).unwrap(),
            );
            (StatusCode::RANGE_NOT_SATISFIABLE, headers).into_response()
        }
        RangeOutcome::Full => {
            headers.insert(axum::http::header::CONTENT_LENGTH, HeaderValue::from(size));
            let body = Body::from_stream(stream.map(|r| r.map_err(std::io::Error::other)));
            (StatusCode::OK, headers, body).into_response()
        }
        RangeOutcome::Partial(range) => {
            headers.insert(
                "content-range",
                HeaderValue::from_str(&format!("bytes {}-{}/{size}", range.start, range.end_inclusive)).unwrap(),
            );
            headers.insert(axum::http::header::CONTENT_LENGTH, HeaderValue::from(range.len()));
            let body = Body::from_stream(stream.map(|r| r.map_err(std::io::Error::other)));
            (StatusCode::PARTIAL_CONTENT, headers, body).into_response()
        }
    }
}
