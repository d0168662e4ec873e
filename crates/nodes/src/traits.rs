//! The `ExecutableNode` trait: the contract every Posty5 node fulfils.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use api::Posty5Api;
use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::NodeError;

/// Per-item context handed to every node call.
#[derive(Clone)]
pub struct ExecutionContext {
    /// ID of the current run.
    pub execution_id: Uuid,
    /// Position of the item being processed in the input list.
    pub item_index: usize,
    /// Authenticated connection, resolved once per run.
    pub api: Arc<dyn Posty5Api>,
}

impl ExecutionContext {
    pub fn new(execution_id: Uuid, api: Arc<dyn Posty5Api>) -> Self {
        Self { execution_id, item_index: 0, api }
    }

    /// Same run, next item.
    pub fn for_item(&self, item_index: usize) -> Self {
        Self { item_index, ..self.clone() }
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("execution_id", &self.execution_id)
            .field("item_index", &self.item_index)
            .finish_non_exhaustive()
    }
}

/// One input item: its resolved parameters plus any binary attachments,
/// keyed by property name (`data`, `thumbnail`, ...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputItem {
    pub params: Value,
    pub binary: HashMap<String, Vec<u8>>,
}

impl InputItem {
    pub fn new(params: Value) -> Self {
        Self { params, binary: HashMap::new() }
    }

    pub fn with_binary(mut self, property: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.binary.insert(property.into(), bytes.into());
        self
    }

    pub fn binary(&self, property: &str) -> Option<&[u8]> {
        self.binary.get(property).map(Vec::as_slice)
    }

    /// Bytes of `property`, or [`NodeError::MissingBinary`].
    pub fn require_binary(&self, property: &str) -> Result<Vec<u8>, NodeError> {
        self.binary(property)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| NodeError::MissingBinary(property.to_owned()))
    }

    /// The `operation` parameter, if present.
    pub fn operation(&self) -> Option<&str> {
        self.params.get("operation").and_then(Value::as_str)
    }
}

/// The core node trait.
///
/// A node handles one item per call; the engine owns the loop, pins the
/// operation, and decides what happens on failure.
#[async_trait]
pub trait ExecutableNode: Send + Sync {
    /// Host-facing node type name, e.g. `posty5ShortLink`.
    fn name(&self) -> &str;

    /// Run the item's operation and return the unwrapped payload. An array
    /// payload is fanned out into one output item per element by the engine.
    async fn execute(&self, item: &InputItem, ctx: &ExecutionContext) -> Result<Value, NodeError>;
}
