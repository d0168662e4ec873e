//! Node execution engine.
//!
//! `NodeExecutor` drives one node over a list of input items, the way the
//! host workflow runtime does:
//! 1. Pins the `operation` chosen on the first item for the whole run.
//! 2. Executes items sequentially, in input order, each with its own
//!    `ExecutionContext` sharing the run's Posty5 connection.
//! 3. Fans array results out into one output item per element.
//! 4. On failure either records an `{ "error": ... }` item and carries on
//!    (continue-on-failure) or aborts the run with `EngineError::ItemFailed`.

use std::collections::HashMap;
use std::sync::Arc;

use api::{ClientConfig, Credential, Gateway, Posty5Api};
use serde_json::Value;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use nodes::traits::{ExecutionContext, InputItem};
use nodes::{
    ExecutableNode, FormSubmissionNode, HtmlHostingNode, PublisherNode, QrCodeNode,
    ShortLinkNode, WorkspaceNode,
};

use crate::models::{ExecutionResult, OutputItem};
use crate::EngineError;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tuning knobs for the executor.
#[derive(Debug, Clone, Default)]
pub struct ExecutorConfig {
    /// Record failed items as `{ "error": message }` instead of aborting.
    pub continue_on_fail: bool,
}

impl ExecutorConfig {
    pub fn continue_on_fail() -> Self {
        Self { continue_on_fail: true }
    }
}

// ---------------------------------------------------------------------------
// Node registry
// ---------------------------------------------------------------------------

/// Maps node type names to `ExecutableNode` implementations.
pub type NodeRegistry = HashMap<String, Arc<dyn ExecutableNode>>;

/// Every Posty5 node, keyed by its type name.
pub fn builtin_registry() -> NodeRegistry {
    let nodes: Vec<Arc<dyn ExecutableNode>> = vec![
        Arc::new(ShortLinkNode),
        Arc::new(QrCodeNode),
        Arc::new(HtmlHostingNode),
        Arc::new(FormSubmissionNode),
        Arc::new(WorkspaceNode),
        Arc::new(PublisherNode::task()),
        Arc::new(PublisherNode::post()),
    ];
    nodes
        .into_iter()
        .map(|node| (node.name().to_owned(), node))
        .collect()
}

// ---------------------------------------------------------------------------
// NodeExecutor
// ---------------------------------------------------------------------------

/// Runs nodes over item lists against one Posty5 connection.
pub struct NodeExecutor {
    api: Arc<dyn Posty5Api>,
    registry: NodeRegistry,
    config: ExecutorConfig,
}

impl NodeExecutor {
    /// Create an executor over an existing connection with every built-in node registered.
    pub fn new(api: Arc<dyn Posty5Api>, config: ExecutorConfig) -> Self {
        Self { api, registry: builtin_registry(), config }
    }

    /// Build the HTTP gateway from a credential and connect to it.
    ///
    /// # Errors
    /// Returns `EngineError::Client` if the HTTP client cannot be built.
    pub fn connect(
        credential: Credential,
        client: ClientConfig,
        config: ExecutorConfig,
    ) -> Result<Self, EngineError> {
        let gateway = Gateway::new(credential, client)?;
        Ok(Self::new(Arc::new(gateway), config))
    }

    /// [`NodeExecutor::connect`] with the client configuration read from the
    /// environment, so `POSTY5_BASE_URL` redirects every call.
    ///
    /// # Errors
    /// Returns `EngineError::Client` if the HTTP client cannot be built.
    pub fn from_env(credential: Credential, config: ExecutorConfig) -> Result<Self, EngineError> {
        let gateway = Gateway::from_env(credential)?;
        Ok(Self::new(Arc::new(gateway), config))
    }

    /// Add or replace a node under its own type name.
    pub fn register(&mut self, node: Arc<dyn ExecutableNode>) {
        self.registry.insert(node.name().to_owned(), node);
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Look up `node_type` in the registry and run it.
    ///
    /// # Errors
    /// `EngineError::UnknownNodeType` if nothing is registered under that name,
    /// otherwise whatever [`NodeExecutor::run`] returns.
    pub async fn run_type(
        &self,
        node_type: &str,
        items: &[InputItem],
    ) -> Result<ExecutionResult, EngineError> {
        let node = self
            .registry
            .get(node_type)
            .ok_or_else(|| EngineError::UnknownNodeType(node_type.to_owned()))?;
        self.run(node.as_ref(), items).await
    }

    /// Run `node` over every item and collect the output items.
    ///
    /// # Errors
    /// `EngineError::ItemFailed` for the first failing item when
    /// continue-on-failure is off.
    #[instrument(skip(self, node, items), fields(node = node.name(), items = items.len()))]
    pub async fn run(
        &self,
        node: &dyn ExecutableNode,
        items: &[InputItem],
    ) -> Result<ExecutionResult, EngineError> {
        let execution_id = Uuid::new_v4();
        let ctx = ExecutionContext::new(execution_id, Arc::clone(&self.api));
        let operation = items.first().and_then(InputItem::operation).map(str::to_owned);

        let mut emitted = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            let item = pin_operation(item, operation.as_deref());

            match node.execute(&item, &ctx.for_item(index)).await {
                Ok(payload) => emitted.extend(OutputItem::fan_out(payload, index)),

                Err(err) if self.config.continue_on_fail => {
                    warn!(item = index, "item failed, continuing: {err}");
                    emitted.push(OutputItem::error(err.to_string(), index));
                }

                Err(err) => {
                    error!(item = index, "item failed: {err}");
                    return Err(EngineError::ItemFailed {
                        node: node.name().to_owned(),
                        item: index,
                        source: err,
                        emitted,
                    });
                }
            }
        }

        info!(
            "node '{}' execution {} produced {} items",
            node.name(),
            execution_id,
            emitted.len()
        );

        Ok(ExecutionResult { execution_id, items: emitted })
    }
}

/// The first item's operation applies to every item of a run.
fn pin_operation(item: &InputItem, operation: Option<&str>) -> InputItem {
    let mut item = item.clone();
    if let (Some(operation), Value::Object(params)) = (operation, &mut item.params) {
        params.insert("operation".to_owned(), Value::String(operation.to_owned()));
    }
    item
}
