//! Client-level error type.

use thiserror::Error;

/// Errors returned by the Posty5 client.
///
/// The display strings are what ends up in a recorded `{ "error": ... }`
/// output item, so they are part of the node's observable behaviour:
/// - `Api`: any transport failure or non-2xx answer from the REST API.
/// - `Upload`: any failure while PUTting bytes to a pre-signed URL.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Posty5 API Error: {0}")]
    Api(String),

    #[error("File Upload Error: {0}")]
    Upload(String),

    /// The HTTP client could not be constructed from the given configuration.
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// The detail text without the `Posty5 API Error: ` style prefix.
    pub fn detail(&self) -> &str {
        match self {
            Self::Api(msg) | Self::Upload(msg) | Self::Config(msg) => msg,
        }
    }
}

/// Fallback detail when neither the server nor the transport said anything useful.
pub(crate) const UNKNOWN_ERROR: &str = "Unknown error";

/// Best-effort server message extraction: a JSON body with a string `message`
/// wins, then the caller-supplied transport description, then [`UNKNOWN_ERROR`].
pub(crate) fn extract_message(body: &str, fallback: Option<String>) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_owned))
        .filter(|m| !m.is_empty())
        .or(fallback.filter(|m| !m.is_empty()))
        .unwrap_or_else(|| UNKNOWN_ERROR.to_owned())
}
