//! Output shapes of a node run.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// OutputItem
// ---------------------------------------------------------------------------

/// One produced item, linked back to the input item it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputItem {
    pub json: Value,
    /// Index of the originating input item.
    pub paired_item: usize,
    /// Set only for items recorded from a failure.
    #[serde(skip)]
    failed: bool,
}

impl OutputItem {
    pub fn new(json: Value, paired_item: usize) -> Self {
        Self { json, paired_item, failed: false }
    }

    /// The `{ "error": message }` item recorded under continue-on-failure.
    pub fn error(message: impl Into<String>, paired_item: usize) -> Self {
        Self { json: json!({ "error": message.into() }), paired_item, failed: true }
    }

    /// Whether this item stands for a failed input item.
    pub fn is_error(&self) -> bool {
        self.failed
    }

    /// One item per array element; any other payload is a single item.
    pub fn fan_out(payload: Value, paired_item: usize) -> Vec<Self> {
        match payload {
            Value::Array(values) => values.into_iter().map(|v| Self::new(v, paired_item)).collect(),
            other => vec![Self::new(other, paired_item)],
        }
    }
}

// ---------------------------------------------------------------------------
// ExecutionResult
// ---------------------------------------------------------------------------

/// Everything a completed run produced, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub execution_id: Uuid,
    pub items: Vec<OutputItem>,
}

impl ExecutionResult {
    pub fn errors(&self) -> impl Iterator<Item = &OutputItem> {
        self.items.iter().filter(|item| item.is_error())
    }
}
