//! Posty5 Social Publisher Workspace node (`/api/social-publisher-workspace`).

use api::endpoints::SOCIAL_PUBLISHER_WORKSPACE;
use api::{ApiRequest, Query};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::params::{self, Paging, Plan};
use crate::traits::{ExecutionContext, InputItem};
use crate::{ExecutableNode, NodeError};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum WorkspaceOperation {
    Get {
        #[serde(rename = "workspaceId")]
        id: String,
    },
    /// Workspace plus the connected accounts a new post can target.
    GetForNewPost {
        #[serde(rename = "workspaceId")]
        id: String,
    },
    Delete {
        #[serde(rename = "workspaceId")]
        id: String,
    },
    List(Paging),
}

impl WorkspaceOperation {
    pub fn plan(&self) -> Plan {
        let root = SOCIAL_PUBLISHER_WORKSPACE;
        match self {
            Self::Get { id } => ApiRequest::get(format!("{root}/{id}")).into(),
            Self::GetForNewPost { id } => ApiRequest::get(format!("{root}/{id}/for-new-post")).into(),
            Self::Delete { id } => ApiRequest::delete(format!("{root}/{id}")).into(),
            Self::List(paging) => Plan::list(root, Query::new(), *paging),
        }
    }
}

/// `posty5SocialPublisherWorkspace`
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkspaceNode;

#[async_trait]
impl ExecutableNode for WorkspaceNode {
    fn name(&self) -> &str {
        "posty5SocialPublisherWorkspace"
    }

    async fn execute(&self, item: &InputItem, ctx: &ExecutionContext) -> Result<Value, NodeError> {
        let operation: WorkspaceOperation = params::parse(&item.params)?;
        operation.plan().run(ctx.api.as_ref()).await
    }
}
