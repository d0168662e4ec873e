//! HTTP request gateway.
//!
//! `Gateway` turns an [`ApiRequest`] into one authenticated HTTP call:
//! 1. Joins the configured base URL with the request path.
//! 2. Attaches `X-API-Key` (and a JSON body when there is one).
//! 3. Tags every `POST` body with `createdFrom`.
//! 4. Unwraps the `{message, result}` envelope on success.
//! 5. Folds every failure into a single [`ApiError`].

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client as ReqwestClient;
use serde_json::{Map, Value};
use tracing::debug;

use crate::endpoints::{CREATED_FROM, SHORT_LINK};
use crate::error::extract_message;
use crate::{ApiError, ApiRequest, ClientConfig, Credential, Method, Posty5Api, Query, UploadResponse};

/// Header carrying the credential.
pub const API_KEY_HEADER: &str = "X-API-Key";

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

/// The two success shapes the API answers with.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape {
    /// `{ "message": ..., "result": <payload> }`
    Envelope { result: Value },
    /// Anything that is not an object with a `result` key.
    Bare(Value),
}

impl ResponseShape {
    /// Structural check: an object that has a `result` key is an envelope,
    /// even when `result` itself is `null`.
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Object(mut map) => match map.remove("result") {
                Some(result) => Self::Envelope { result },
                None => Self::Bare(Value::Object(map)),
            },
            other => Self::Bare(other),
        }
    }

    pub fn into_payload(self) -> Value {
        match self {
            Self::Envelope { result } => result,
            Self::Bare(value) => value,
        }
    }
}

/// Parse a success body. Empty bodies become `{}`; non-JSON text is kept as a string.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Object(Map::new());
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned()))
}

/// Merge `createdFrom` into a POST body.
fn tag_provenance(body: Option<Value>) -> Value {
    let mut map = match body {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    map.insert("createdFrom".to_owned(), Value::String(CREATED_FROM.to_owned()));
    Value::Object(map)
}

fn status_text(status: reqwest::StatusCode) -> String {
    format!("request failed with status {}", status.as_u16())
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

/// Authenticated Posty5 client. Cheap to clone; the underlying connection
/// pool is shared.
#[derive(Debug, Clone)]
pub struct Gateway {
    client: ReqwestClient,
    config: ClientConfig,
    credential: Credential,
}

impl Gateway {
    /// Build a gateway for one credential.
    ///
    /// # Errors
    /// [`ApiError::Config`] when the underlying HTTP client cannot be built.
    pub fn new(credential: Credential, config: ClientConfig) -> Result<Self, ApiError> {
        let mut builder = ReqwestClient::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|err| ApiError::Config(err.to_string()))?;

        Ok(Self { client, config, credential })
    }

    /// [`Gateway::new`] with [`ClientConfig::from_env`].
    pub fn from_env(credential: Credential) -> Result<Self, ApiError> {
        Self::new(credential, ClientConfig::from_env())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The generic credential test: list a single short link.
    pub async fn verify_credentials(&self) -> Result<Value, ApiError> {
        let mut query = Query::new();
        query.set("page", 1).set("pageSize", 1);
        self.send(ApiRequest::get(SHORT_LINK).with_query(query)).await
    }
}

#[async_trait]
impl Posty5Api for Gateway {
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let ApiRequest { method, path, query, body } = request;
        let url = self.config.url_for(&path);

        let body = match method {
            Method::Post => Some(tag_provenance(body)),
            _ => body,
        };

        let mut builder = self
            .client
            .request(method.into(), &url)
            .header(API_KEY_HEADER, self.credential.api_key());
        if !query.is_empty() {
            builder = builder.query(query.pairs());
        }
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        debug!(%method, %url, "sending Posty5 request");

        let response = builder
            .send()
            .await
            .map_err(|err| ApiError::Api(extract_message("", Some(err.to_string()))))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| ApiError::Api(extract_message("", Some(err.to_string()))))?;

        debug!(%method, %url, %status, "received Posty5 response");

        if !status.is_success() {
            return Err(ApiError::Api(extract_message(&text, Some(status_text(status)))));
        }

        Ok(ResponseShape::classify(parse_body(&text)).into_payload())
    }

    async fn upload(&self, upload_url: &str, bytes: Vec<u8>) -> Result<UploadResponse, ApiError> {
        debug!(bytes = bytes.len(), "uploading file to pre-signed URL");

        let response = self
            .client
            .put(upload_url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(|err| ApiError::Upload(extract_message("", Some(err.to_string()))))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ApiError::Upload(extract_message("", Some(err.to_string()))))?;

        if !status.is_success() {
            return Err(ApiError::Upload(extract_message(&body, Some(status_text(status)))));
        }

        Ok(UploadResponse { status: status.as_u16(), body })
    }
}
