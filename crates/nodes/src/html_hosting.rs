//! Posty5 HTML Hosting node (`/api/html-hosting`).
//!
//! File-based create/update is two-phase: the metadata call answers with
//! `{details, uploadFileConfig: {uploadUrl}}`, the item's HTML bytes are PUT to
//! that URL, and `details` becomes the output. If the upload fails the page
//! already exists server-side; nothing is rolled back.

use api::endpoints::HTML_HOSTING;
use api::{ApiRequest, Query, UploadTarget};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::params::{self, Body, Paging, Plan};
use crate::traits::{ExecutionContext, InputItem};
use crate::{ExecutableNode, NodeError};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum HtmlHostingOperation {
    CreateFromFile(FileSource),
    CreateFromGithub(GithubSource),
    UpdateFromFile(UpdateFromFile),
    UpdateFromGithub(UpdateFromGithub),
    Get {
        #[serde(rename = "htmlHostingId")]
        id: String,
    },
    Delete {
        #[serde(rename = "htmlHostingId")]
        id: String,
    },
    ClearCache {
        #[serde(rename = "htmlHostingId")]
        id: String,
    },
    GetFormIds {
        #[serde(rename = "htmlHostingId")]
        id: String,
    },
    List(ListHtmlPages),
}

fn default_binary_property() -> String {
    "data".to_owned()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSource {
    pub name: String,
    pub file_name: String,
    /// Name of the binary property holding the HTML.
    #[serde(default = "default_binary_property")]
    pub html_file: String,
    pub custom_landing_id: Option<String>,
    #[serde(default)]
    pub additional_fields: HtmlHostingFields,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubSource {
    pub name: String,
    pub github_file_url: String,
    pub custom_landing_id: Option<String>,
    #[serde(default)]
    pub additional_fields: HtmlHostingFields,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFromFile {
    pub html_hosting_id: String,
    #[serde(flatten)]
    pub source: FileSource,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFromGithub {
    pub html_hosting_id: String,
    #[serde(flatten)]
    pub source: GithubSource,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HtmlHostingFields {
    pub tag: Option<String>,
    pub ref_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListHtmlPages {
    #[serde(default)]
    pub return_all: bool,
    #[serde(default = "params::default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub filters: HtmlHostingFilters,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HtmlHostingFilters {
    pub tag: Option<String>,
    pub ref_id: Option<String>,
    pub search: Option<String>,
}

impl HtmlHostingFilters {
    /// `search` matches either the page name or its id.
    pub fn to_query(&self) -> Query {
        let mut query = Query::new();
        query
            .set_opt("tag", self.tag.as_deref())
            .set_opt("refId", self.ref_id.as_deref())
            .set_opt("name", self.search.as_deref())
            .set_opt("htmlHostingId", self.search.as_deref());
        query
    }
}

fn with_common(
    body: Body,
    custom_landing_id: Option<&str>,
    fields: &HtmlHostingFields,
) -> Body {
    body.text("customLandingId", custom_landing_id)
        .text("tag", fields.tag.as_deref())
        .text("refId", fields.ref_id.as_deref())
}

impl FileSource {
    fn body(&self) -> Value {
        let body = Body::new()
            .field("name", self.name.as_str())
            .field("fileName", self.file_name.as_str());
        with_common(body, self.custom_landing_id.as_deref(), &self.additional_fields).build()
    }
}

impl GithubSource {
    fn body(&self) -> Value {
        let body = Body::new()
            .field("name", self.name.as_str())
            .field("githubInfo", json!({ "fileURL": self.github_file_url }));
        with_common(body, self.custom_landing_id.as_deref(), &self.additional_fields).build()
    }
}

/// What an operation resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum HtmlHostingStep {
    Single(Plan),
    /// Metadata call, then PUT the named binary property to the issued URL.
    WithFile { metadata: ApiRequest, binary_property: String },
}

impl HtmlHostingOperation {
    pub fn step(&self) -> HtmlHostingStep {
        let single = |request: ApiRequest| HtmlHostingStep::Single(request.into());

        match self {
            Self::CreateFromFile(source) => HtmlHostingStep::WithFile {
                metadata: ApiRequest::post(format!("{HTML_HOSTING}/file"), source.body()),
                binary_property: source.html_file.clone(),
            },
            Self::UpdateFromFile(update) => HtmlHostingStep::WithFile {
                metadata: ApiRequest::put(
                    format!("{HTML_HOSTING}/{}/file", update.html_hosting_id),
                    update.source.body(),
                ),
                binary_property: update.source.html_file.clone(),
            },
            Self::CreateFromGithub(source) => {
                single(ApiRequest::post(format!("{HTML_HOSTING}/github"), source.body()))
            }
            Self::UpdateFromGithub(update) => single(ApiRequest::put(
                format!("{HTML_HOSTING}/{}/github", update.html_hosting_id),
                update.source.body(),
            )),
            Self::Get { id } => single(ApiRequest::get(format!("{HTML_HOSTING}/{id}"))),
            Self::Delete { id } => single(ApiRequest::delete(format!("{HTML_HOSTING}/{id}"))),
            Self::ClearCache { id } => {
                single(ApiRequest::put_empty(format!("{HTML_HOSTING}/{id}/clean-cache")))
            }
            Self::GetFormIds { id } => {
                single(ApiRequest::get(format!("{HTML_HOSTING}/lookup-froms/{id}")))
            }
            Self::List(list) => HtmlHostingStep::Single(Plan::list(
                HTML_HOSTING,
                list.filters.to_query(),
                Paging { return_all: list.return_all, limit: list.limit },
            )),
        }
    }
}

/// `uploadFileConfig.uploadUrl` of a file-operation response.
fn upload_target(response: &Value) -> Option<UploadTarget> {
    response
        .pointer("/uploadFileConfig/uploadUrl")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(UploadTarget::new)
}

/// `posty5HtmlHosting`
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlHostingNode;

#[async_trait]
impl ExecutableNode for HtmlHostingNode {
    fn name(&self) -> &str {
        "posty5HtmlHosting"
    }

    async fn execute(&self, item: &InputItem, ctx: &ExecutionContext) -> Result<Value, NodeError> {
        let operation: HtmlHostingOperation = params::parse(&item.params)?;

        match operation.step() {
            HtmlHostingStep::Single(plan) => plan.run(ctx.api.as_ref()).await,
            HtmlHostingStep::WithFile { metadata, binary_property } => {
                let bytes = item.require_binary(&binary_property)?;
                let mut response = ctx.api.send(metadata).await?;

                let target = upload_target(&response)
                    .ok_or_else(|| NodeError::MissingUploadUrl("HTML file".to_owned()))?;
                debug!(file_url = %target.file_url, bytes = bytes.len(), "uploading HTML file");
                ctx.api.upload(&target.upload_url, bytes).await?;

                let details = response.get_mut("details").map(Value::take);
                Ok(details.unwrap_or(response))
            }
        }
    }
}
