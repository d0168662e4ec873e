//! Posty5 Short Link node (`/api/short-link`).

use api::endpoints::SHORT_LINK;
use api::{ApiRequest, Query};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::params::{self, non_empty, Body, Paging, Plan};
use crate::traits::{ExecutionContext, InputItem};
use crate::{ExecutableNode, NodeError};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum ShortLinkOperation {
    Create(CreateShortLink),
    Get {
        #[serde(rename = "shortLinkId")]
        id: String,
    },
    Update(UpdateShortLink),
    Delete {
        #[serde(rename = "shortLinkId")]
        id: String,
    },
    List(ListShortLinks),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShortLink {
    pub url: String,
    pub name: Option<String>,
    pub custom_landing_id: Option<String>,
    #[serde(default)]
    pub additional_fields: ShortLinkFields,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShortLink {
    pub short_link_id: String,
    pub name: Option<String>,
    pub custom_landing_id: Option<String>,
    #[serde(default)]
    pub additional_fields: ShortLinkFields,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShortLinkFields {
    pub tag: Option<String>,
    pub ref_id: Option<String>,
    pub template_id: Option<String>,
    pub is_enable_monetization: Option<bool>,
    pub page_title: Option<String>,
    pub page_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListShortLinks {
    #[serde(default)]
    pub return_all: bool,
    #[serde(default = "params::default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub filters: ShortLinkFilters,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShortLinkFilters {
    pub tag: Option<String>,
    pub ref_id: Option<String>,
    pub search: Option<String>,
}

/// Fields shared by create and update.
fn common_body(
    body: Body,
    name: Option<&str>,
    custom_landing_id: Option<&str>,
    fields: &ShortLinkFields,
) -> Body {
    let title = non_empty(fields.page_title.as_deref());
    let description = non_empty(fields.page_description.as_deref());
    let page_info = (title.is_some() || description.is_some()).then(|| {
        json!({
            "title": title.unwrap_or_default(),
            "description": description.unwrap_or_default(),
        })
    });

    body.text("name", name)
        .text("customLandingId", custom_landing_id)
        .text("tag", fields.tag.as_deref())
        .text("refId", fields.ref_id.as_deref())
        .text("templateId", fields.template_id.as_deref())
        .flag("isEnableMonetization", fields.is_enable_monetization)
        .object("pageInfo", page_info)
}

impl ShortLinkFilters {
    /// `search` matches either the name or the destination URL.
    pub fn to_query(&self) -> Query {
        let mut query = Query::new();
        query
            .set_opt("tag", self.tag.as_deref())
            .set_opt("refId", self.ref_id.as_deref())
            .set_opt("name", self.search.as_deref())
            .set_opt("baseUrl", self.search.as_deref());
        query
    }
}

impl ShortLinkOperation {
    pub fn plan(&self) -> Plan {
        match self {
            Self::Create(create) => {
                let body = Body::new().field("baseUrl", create.url.as_str());
                let body = common_body(
                    body,
                    create.name.as_deref(),
                    create.custom_landing_id.as_deref(),
                    &create.additional_fields,
                );
                ApiRequest::post(SHORT_LINK, body.build()).into()
            }
            Self::Get { id } => ApiRequest::get(format!("{SHORT_LINK}/{id}")).into(),
            Self::Update(update) => {
                let body = common_body(
                    Body::new(),
                    update.name.as_deref(),
                    update.custom_landing_id.as_deref(),
                    &update.additional_fields,
                );
                ApiRequest::put(format!("{SHORT_LINK}/{}", update.short_link_id), body.build()).into()
            }
            Self::Delete { id } => ApiRequest::delete(format!("{SHORT_LINK}/{id}")).into(),
            Self::List(list) => Plan::list(
                SHORT_LINK,
                list.filters.to_query(),
                Paging { return_all: list.return_all, limit: list.limit },
            ),
        }
    }
}

/// `posty5ShortLink`
#[derive(Debug, Default, Clone, Copy)]
pub struct ShortLinkNode;

#[async_trait]
impl ExecutableNode for ShortLinkNode {
    fn name(&self) -> &str {
        "posty5ShortLink"
    }

    async fn execute(&self, item: &InputItem, ctx: &ExecutionContext) -> Result<Value, NodeError> {
        let operation: ShortLinkOperation = params::parse(&item.params)?;
        operation.plan().run(ctx.api.as_ref()).await
    }
}
