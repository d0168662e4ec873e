//! Shared parameter handling for the resource modules.
//!
//! Each resource deserializes an item's parameter object into its own
//! `#[serde(tag = "operation")]` enum, then turns the variant into a [`Plan`].

use api::pagination::{self, DEFAULT_LIMIT};
use api::{ApiRequest, Posty5Api, Query};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::NodeError;

/// Deserialize an item's parameters into a typed operation.
pub fn parse<T: DeserializeOwned>(params: &Value) -> Result<T, NodeError> {
    Ok(T::deserialize(params)?)
}

/// `Some(s)` only when `s` is non-empty.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

pub(crate) fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

/// `returnAll` / `limit`, shared by every list operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    #[serde(default)]
    pub return_all: bool,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Default for Paging {
    fn default() -> Self {
        Self { return_all: false, limit: DEFAULT_LIMIT }
    }
}

// ---------------------------------------------------------------------------
// Body builder
// ---------------------------------------------------------------------------

/// JSON object builder that leaves unset optionals off the wire.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Body(Map<String, Value>);

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always set.
    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_owned(), value.into());
        self
    }

    /// Set only when non-empty.
    pub fn text(self, key: &str, value: Option<&str>) -> Self {
        match non_empty(value) {
            Some(v) => self.field(key, v),
            None => self,
        }
    }

    /// Set whenever supplied, `false` included.
    pub fn flag(self, key: &str, value: Option<bool>) -> Self {
        match value {
            Some(v) => self.field(key, v),
            None => self,
        }
    }

    pub fn object(self, key: &str, value: Option<Value>) -> Self {
        match value {
            Some(v) => self.field(key, v),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn build(self) -> Value {
        Value::Object(self.0)
    }
}

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

/// What a single-call operation resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    Call(ApiRequest),
    List { path: String, filters: Query, paging: Paging },
}

impl Plan {
    pub fn list(path: impl Into<String>, filters: Query, paging: Paging) -> Self {
        Self::List { path: path.into(), filters, paging }
    }

    /// Execute against the API. Lists resolve to a JSON array.
    pub async fn run(self, api: &dyn Posty5Api) -> Result<Value, NodeError> {
        match self {
            Self::Call(request) => Ok(api.send(request).await?),
            Self::List { path, filters, paging } => {
                let items = if paging.return_all {
                    pagination::list_all(api, &path, &filters).await?
                } else {
                    pagination::list_page(api, &path, &filters, paging.limit).await?
                };
                Ok(Value::Array(items))
            }
        }
    }
}

impl From<ApiRequest> for Plan {
    fn from(request: ApiRequest) -> Self {
        Self::Call(request)
    }
}
