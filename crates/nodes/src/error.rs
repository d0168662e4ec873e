//! Node-level error type.

use api::ApiError;
use thiserror::Error;

/// Errors returned by a node's `execute` method.
///
/// Every variant fails exactly one item. The engine then either records
/// `{ "error": <display string> }` for that item or aborts the run, depending
/// on `continue_on_fail`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NodeError {
    /// Gateway or upload failure; displayed verbatim (`Posty5 API Error: ...`).
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The item's parameters do not match the selected operation.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The item does not carry the binary property a file operation reads.
    #[error("no binary data found in property \"{0}\"")]
    MissingBinary(String),

    /// A metadata call that should have issued a pre-signed URL did not.
    #[error("response did not include an upload URL for {0}")]
    MissingUploadUrl(String),

    /// Anything else that must stop this item.
    #[error("fatal node error: {0}")]
    Fatal(String),
}

impl NodeError {
    pub fn invalid(msg: impl ToString) -> Self {
        Self::InvalidParameters(msg.to_string())
    }
}

impl From<serde_json::Error> for NodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_keep_their_wire_text() {
        let err: NodeError = ApiError::Api("Short link not found".into()).into();
        assert_eq!(err.to_string(), "Posty5 API Error: Short link not found");

        let err: NodeError = ApiError::Upload("Signature expired".into()).into();
        assert_eq!(err.to_string(), "File Upload Error: Signature expired");
    }

    #[test]
    fn missing_binary_names_the_property() {
        assert_eq!(
            NodeError::MissingBinary("data".into()).to_string(),
            "no binary data found in property \"data\""
        );
    }
}
