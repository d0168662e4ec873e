//! Engine-level error types.

use api::ApiError;
use nodes::NodeError;
use thiserror::Error;

use crate::models::OutputItem;

/// Errors that end a node run.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No implementation is registered under the requested node type.
    #[error("no node registered for type '{0}'")]
    UnknownNodeType(String),

    /// The gateway could not be built.
    #[error(transparent)]
    Client(#[from] ApiError),

    /// An item failed and continue-on-failure is off; the run is aborted.
    /// `emitted` holds the items produced before the failure.
    #[error("node '{node}' failed on item {item}: {source}")]
    ItemFailed {
        node: String,
        item: usize,
        #[source]
        source: NodeError,
        emitted: Vec<OutputItem>,
    },
}

impl EngineError {
    /// The underlying message, without the node/item prefix.
    pub fn message(&self) -> String {
        match self {
            Self::ItemFailed { source, .. } => source.to_string(),
            other => other.to_string(),
        }
    }
}
