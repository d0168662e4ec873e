//! `MockNode`: a test double for `ExecutableNode`.
//!
//! Useful in engine tests where the loop behaviour matters and the Posty5
//! resource behind the node does not.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use crate::traits::{ExecutionContext, InputItem};
use crate::{ExecutableNode, NodeError};
use api::ApiError;

/// Behaviour injected into `MockNode` at construction time.
pub enum MockBehaviour {
    /// Return a specific JSON value for every item.
    ReturnValue(Value),
    /// Echo the item's parameters back, tagged with the item index.
    Echo,
    /// Fail every item with an API error.
    FailAll(String),
    /// Echo, except the listed item indices fail with an API error.
    FailItems(Vec<usize>, String),
}

/// A mock node that records every item it receives and returns a
/// programmer-specified result.
pub struct MockNode {
    /// Node type name reported through `ExecutableNode::name`.
    pub name: String,
    pub behaviour: MockBehaviour,
    /// Parameters of every item seen (in call order).
    pub calls: Arc<Mutex<Vec<Value>>>,
}

impl MockNode {
    fn with(name: impl Into<String>, behaviour: MockBehaviour) -> Self {
        Self {
            name: name.into(),
            behaviour,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always succeeds with the given value.
    pub fn returning(name: impl Into<String>, value: Value) -> Self {
        Self::with(name, MockBehaviour::ReturnValue(value))
    }

    pub fn echo(name: impl Into<String>) -> Self {
        Self::with(name, MockBehaviour::Echo)
    }

    /// Fails every item with `Posty5 API Error: <msg>`.
    pub fn failing(name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::with(name, MockBehaviour::FailAll(msg.into()))
    }

    /// Echoes, failing only the given item indices.
    pub fn failing_on(name: impl Into<String>, items: Vec<usize>, msg: impl Into<String>) -> Self {
        Self::with(name, MockBehaviour::FailItems(items, msg.into()))
    }

    /// Number of items this node has been executed on.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Parameters seen so far.
    pub fn seen(&self) -> Vec<Value> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExecutableNode for MockNode {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, item: &InputItem, ctx: &ExecutionContext) -> Result<Value, NodeError> {
        self.calls.lock().unwrap().push(item.params.clone());

        let echo = || json!({ "item": ctx.item_index, "params": item.params });

        match &self.behaviour {
            MockBehaviour::ReturnValue(v) => Ok(v.clone()),
            MockBehaviour::Echo => Ok(echo()),
            MockBehaviour::FailAll(msg) => Err(ApiError::Api(msg.clone()).into()),
            MockBehaviour::FailItems(failing, msg) if failing.contains(&ctx.item_index) => {
                Err(ApiError::Api(msg.clone()).into())
            }
            MockBehaviour::FailItems(..) => Ok(echo()),
        }
    }
}
