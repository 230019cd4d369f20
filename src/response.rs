//! Response envelope and the encoding seam toward the transport.

use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use std::sync::Arc;

/// Maximum inline headers before heap allocation. Most responses carry well
/// under 16 headers.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage.
///
/// Header names use `Arc<str>` because the same names repeat across
/// responses (content-type and friends); values are per-response data.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Response envelope handed back to the transport layer.
#[derive(Debug, Clone, Serialize)]
pub struct HandlerResponse {
    /// HTTP status code (200, 400, 500, ...)
    pub status: u16,
    /// Response headers
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response body as JSON
    pub body: Value,
}

impl HandlerResponse {
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// JSON response with a `content-type: application/json` header.
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// Plain-text response carrying `text` as its body.
    #[must_use]
    pub fn text(status: u16, text: impl Into<String>) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "text/plain".to_string()));
        Self {
            status,
            headers,
            body: Value::String(text.into()),
        }
    }

    /// Error response with a `{"error": message}` JSON body.
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    /// Get a header by name (case-insensitive).
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header.
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// Encoding seam between a handler's return value and the transport response
/// envelope. The dispatch adapter serializes the handler's return value to a
/// `serde_json::Value` and passes it here; the encoder decides status and
/// content type.
pub trait ResponseEncoder: Send + Sync + 'static {
    fn encode(&self, value: Value) -> HandlerResponse;
}

/// Default encoder: plain strings become `text/plain` bodies (so a handler
/// returning `"Hello, Ada"` responds with exactly that text), everything
/// else becomes `application/json`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextOrJsonEncoder;

impl ResponseEncoder for TextOrJsonEncoder {
    fn encode(&self, value: Value) -> HandlerResponse {
        match value {
            Value::String(s) => HandlerResponse::text(200, s),
            other => HandlerResponse::json(200, other),
        }
    }
}
