//! Posty5 Form Submission node (`/api/html-hosting-form-submission`).

use api::endpoints::FORM_SUBMISSION;
use api::{ApiRequest, Query};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::params::{self, Body, Paging, Plan};
use crate::traits::{ExecutionContext, InputItem};
use crate::{ExecutableNode, NodeError};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum FormSubmissionOperation {
    Get {
        #[serde(rename = "submissionId")]
        id: String,
    },
    /// Next and previous submissions around the given one.
    GetAdjacent {
        #[serde(rename = "submissionId")]
        id: String,
    },
    Delete {
        #[serde(rename = "submissionId")]
        id: String,
    },
    ChangeStatus(ChangeStatus),
    List(ListSubmissions),
}

/// Review workflow states a submission can be moved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SubmissionStatus {
    New,
    PendingReview,
    InProgress,
    OnHold,
    NeedMoreInfo,
    Approved,
    PartiallyApproved,
    Rejected,
    Completed,
    Archived,
    Cancelled,
}

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::PendingReview => "pendingReview",
            Self::InProgress => "inProgress",
            Self::OnHold => "onHold",
            Self::NeedMoreInfo => "needMoreInfo",
            Self::Approved => "approved",
            Self::PartiallyApproved => "partiallyApproved",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
            Self::Archived => "archived",
            Self::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatus {
    pub submission_id: String,
    pub status: SubmissionStatus,
    pub rejected_reason: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSubmissions {
    #[serde(default)]
    pub return_all: bool,
    #[serde(default = "params::default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub filters: SubmissionFilters,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubmissionFilters {
    pub html_hosting_id: Option<String>,
    pub form_id: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

impl SubmissionFilters {
    /// `search` matches the human-readable submission number.
    pub fn to_query(&self) -> Query {
        let mut query = Query::new();
        query
            .set_opt("htmlHostingId", self.html_hosting_id.as_deref())
            .set_opt("formId", self.form_id.as_deref())
            .set_opt("status", self.status.as_deref())
            .set_opt("numbering", self.search.as_deref());
        query
    }
}

impl FormSubmissionOperation {
    pub fn plan(&self) -> Plan {
        match self {
            Self::Get { id } => ApiRequest::get(format!("{FORM_SUBMISSION}/{id}")).into(),
            Self::GetAdjacent { id } => {
                ApiRequest::get(format!("{FORM_SUBMISSION}/{id}/next-previous")).into()
            }
            Self::Delete { id } => ApiRequest::delete(format!("{FORM_SUBMISSION}/{id}")).into(),
            Self::ChangeStatus(change) => {
                let body = Body::new()
                    .field("status", change.status.as_str())
                    .text("rejectedReason", change.rejected_reason.as_deref())
                    .text("notes", change.notes.as_deref());
                ApiRequest::put(format!("{FORM_SUBMISSION}/{}/status", change.submission_id), body.build())
                    .into()
            }
            Self::List(list) => Plan::list(
                FORM_SUBMISSION,
                list.filters.to_query(),
                Paging { return_all: list.return_all, limit: list.limit },
            ),
        }
    }
}

/// `posty5FormSubmission`
#[derive(Debug, Default, Clone, Copy)]
pub struct FormSubmissionNode;

#[async_trait]
impl ExecutableNode for FormSubmissionNode {
    fn name(&self) -> &str {
        "posty5FormSubmission"
    }

    async fn execute(&self, item: &InputItem, ctx: &ExecutionContext) -> Result<Value, NodeError> {
        let operation: FormSubmissionOperation = params::parse(&item.params)?;
        operation.plan().run(ctx.api.as_ref()).await
    }
}
