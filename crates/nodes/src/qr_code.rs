//! Posty5 QR Code node (`/api/qr-code`).
//!
//! Create and update post to a type-specific path (`/url`, `/wifi`, ...) and
//! carry one nested target object shaped for that type. Free text is the one
//! exception: create sends a top-level `text`, update sends
//! `qrCodeTarget.text`. The server expects exactly that, so it is kept.

use api::endpoints::QR_CODE;
use api::{ApiRequest, Query};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Number, Value};

use crate::params::{self, non_empty, Body, Paging, Plan};
use crate::traits::{ExecutionContext, InputItem};
use crate::{ExecutableNode, NodeError};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum QrCodeOperation {
    Create(QrCodeInput),
    Get {
        #[serde(rename = "qrCodeId")]
        id: String,
    },
    Update(UpdateQrCode),
    Delete {
        #[serde(rename = "qrCodeId")]
        id: String,
    },
    List(ListQrCodes),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QrType {
    Url,
    FreeText,
    Email,
    Wifi,
    Call,
    Sms,
    Geolocation,
}

impl QrType {
    /// Path segment, identical to the node-facing name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::FreeText => "freeText",
            Self::Email => "email",
            Self::Wifi => "wifi",
            Self::Call => "call",
            Self::Sms => "sms",
            Self::Geolocation => "geolocation",
        }
    }
}

/// Everything create and update share. Only the fields of the selected
/// `qrType` are read.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeInput {
    pub qr_type: QrType,
    pub name: Option<String>,
    #[serde(default)]
    pub additional_fields: QrCodeFields,
    pub url: Option<String>,
    pub text: Option<String>,
    pub email: Option<String>,
    pub email_subject: Option<String>,
    pub email_body: Option<String>,
    pub wifi_name: Option<String>,
    pub wifi_auth_type: Option<String>,
    pub wifi_password: Option<String>,
    pub phone_number: Option<String>,
    pub sms_phone_number: Option<String>,
    pub sms_message: Option<String>,
    pub latitude: Option<Value>,
    pub longitude: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQrCode {
    pub qr_code_id: String,
    #[serde(flatten)]
    pub input: QrCodeInput,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QrCodeFields {
    pub tag: Option<String>,
    pub ref_id: Option<String>,
    pub template_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQrCodes {
    #[serde(default)]
    pub return_all: bool,
    #[serde(default = "params::default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub filters: QrCodeFilters,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QrCodeFilters {
    pub tag: Option<String>,
    pub ref_id: Option<String>,
    pub search: Option<String>,
}

impl QrCodeFilters {
    pub fn to_query(&self) -> Query {
        let mut query = Query::new();
        query
            .set_opt("tag", self.tag.as_deref())
            .set_opt("refId", self.ref_id.as_deref())
            .set_opt("name", self.search.as_deref());
        query
    }
}

fn required<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str, NodeError> {
    non_empty(value).ok_or_else(|| NodeError::invalid(format!("missing parameter `{name}`")))
}

/// Accepts a JSON number or a numeric string.
fn coordinate(name: &str, value: Option<&Value>) -> Result<Value, NodeError> {
    let parsed = match value {
        Some(Value::Number(n)) => Some(Value::Number(n.clone())),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        _ => None,
    };
    parsed.ok_or_else(|| NodeError::invalid(format!("`{name}` must be a number")))
}

impl QrCodeInput {
    /// Body for create (`update = false`) or update.
    pub fn body(&self, update: bool) -> Result<Value, NodeError> {
        let fields = &self.additional_fields;
        let body = Body::new()
            .text("name", self.name.as_deref())
            .text("tag", fields.tag.as_deref())
            .text("refId", fields.ref_id.as_deref())
            .text("templateId", fields.template_id.as_deref());

        let or_empty = |v: &Option<String>| v.clone().unwrap_or_default();

        let body = match self.qr_type {
            QrType::Url => body.field("url", json!({ "url": required("url", self.url.as_deref())? })),
            QrType::FreeText => {
                let text = required("text", self.text.as_deref())?;
                if update {
                    body.field("qrCodeTarget", json!({ "text": text }))
                } else {
                    body.field("text", text)
                }
            }
            QrType::Email => body.field(
                "email",
                json!({
                    "email": required("email", self.email.as_deref())?,
                    "subject": or_empty(&self.email_subject),
                    "body": or_empty(&self.email_body),
                }),
            ),
            QrType::Wifi => body.field(
                "wifi",
                json!({
                    "name": required("wifiName", self.wifi_name.as_deref())?,
                    "authenticationType": required("wifiAuthType", self.wifi_auth_type.as_deref())?,
                    "password": or_empty(&self.wifi_password),
                }),
            ),
            QrType::Call => body.field(
                "call",
                json!({ "phoneNumber": required("phoneNumber", self.phone_number.as_deref())? }),
            ),
            QrType::Sms => body.field(
                "sms",
                json!({
                    "phoneNumber": required("smsPhoneNumber", self.sms_phone_number.as_deref())?,
                    "message": or_empty(&self.sms_message),
                }),
            ),
            QrType::Geolocation => body.field(
                "geolocation",
                json!({
                    "latitude": coordinate("latitude", self.latitude.as_ref())?,
                    "longitude": coordinate("longitude", self.longitude.as_ref())?,
                }),
            ),
        };

        Ok(body.build())
    }
}

impl QrCodeOperation {
    pub fn plan(&self) -> Result<Plan, NodeError> {
        let plan = match self {
            Self::Create(input) => {
                let path = format!("{QR_CODE}/{}", input.qr_type.as_str());
                ApiRequest::post(path, input.body(false)?).into()
            }
            Self::Get { id } => ApiRequest::get(format!("{QR_CODE}/{id}")).into(),
            Self::Update(update) => {
                let path = format!("{QR_CODE}/{}/{}", update.input.qr_type.as_str(), update.qr_code_id);
                ApiRequest::put(path, update.input.body(true)?).into()
            }
            Self::Delete { id } => ApiRequest::delete(format!("{QR_CODE}/{id}")).into(),
            Self::List(list) => Plan::list(
                QR_CODE,
                list.filters.to_query(),
                Paging { return_all: list.return_all, limit: list.limit },
            ),
        };
        Ok(plan)
    }
}

/// `posty5QrCode`
#[derive(Debug, Default, Clone, Copy)]
pub struct QrCodeNode;

#[async_trait]
impl ExecutableNode for QrCodeNode {
    fn name(&self) -> &str {
        "posty5QrCode"
    }

    async fn execute(&self, item: &InputItem, ctx: &ExecutionContext) -> Result<Value, NodeError> {
        let operation: QrCodeOperation = params::parse(&item.params)?;
        operation.plan()?.run(ctx.api.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use api::mock::MockApi;
    use api::Method;
    use serde_json::json;

    use super::*;
    use crate::params::test_support::context;

    fn call(params: Value) -> ApiRequest {
        match params::parse::<QrCodeOperation>(&params).unwrap().plan().unwrap() {
            Plan::Call(request) => request,
            other => panic!("expected a single call, got {other:?}"),
        }
    }

    #[test]
    fn url_create_posts_to_type_path() {
        let req = call(json!({
            "operation": "create",
            "qrType": "url",
            "name": "Website QR",
            "url": "https://example.com",
            "additionalFields": { "tag": "web" }
        }));
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.path, "/api/qr-code/url");
        assert_eq!(
            req.body,
            Some(json!({ "name": "Website QR", "tag": "web", "url": { "url": "https://example.com" } }))
        );
    }

    #[test]
    fn free_text_uses_different_fields_for_create_and_update() {
        let create = call(json!({ "operation": "create", "qrType": "freeText", "text": "Hello World!" }));
        assert_eq!(create.body, Some(json!({ "text": "Hello World!" })));

        let update = call(json!({
            "operation": "update",
            "qrCodeId": "qr1",
            "qrType": "freeText",
            "text": "Hello again"
        }));
        assert_eq!(update.path, "/api/qr-code/freeText/qr1");
        assert_eq!(update.body, Some(json!({ "qrCodeTarget": { "text": "Hello again" } })));
    }

    #[test]
    fn nested_targets_keep_full_shape() {
        let email = call(json!({ "operation": "create", "qrType": "email", "email": "a@b.c" }));
        assert_eq!(
            email.body,
            Some(json!({ "email": { "email": "a@b.c", "subject": "", "body": "" } }))
        );

        let wifi = call(json!({
            "operation": "update",
            "qrCodeId": "qr789",
            "qrType": "wifi",
            "wifiName": "MyNetwork",
            "wifiAuthType": "WPA",
            "wifiPassword": "secret123"
        }));
        assert_eq!(wifi.method, Method::Put);
        assert_eq!(wifi.path, "/api/qr-code/wifi/qr789");
        assert_eq!(
            wifi.body,
            Some(json!({ "wifi": { "name": "MyNetwork", "authenticationType": "WPA", "password": "secret123" } }))
        );

        let sms = call(json!({ "operation": "create", "qrType": "sms", "smsPhoneNumber": "+1", "smsMessage": "hi" }));
        assert_eq!(sms.body, Some(json!({ "sms": { "phoneNumber": "+1", "message": "hi" } })));

        let phone = call(json!({ "operation": "create", "qrType": "call", "phoneNumber": "+1234567890" }));
        assert_eq!(phone.body, Some(json!({ "call": { "phoneNumber": "+1234567890" } })));
    }

    #[test]
    fn geolocation_accepts_numbers_and_numeric_strings() {
        let req = call(json!({
            "operation": "create",
            "qrType": "geolocation",
            "latitude": 37.7749,
            "longitude": "-122.4194"
        }));
        assert_eq!(
            req.body,
            Some(json!({ "geolocation": { "latitude": 37.7749, "longitude": -122.4194 } }))
        );

        let bad = params::parse::<QrCodeOperation>(&json!({
            "operation": "create",
            "qrType": "geolocation",
            "latitude": "north",
            "longitude": 1
        }))
        .unwrap()
        .plan()
        .unwrap_err();
        assert!(matches!(bad, NodeError::InvalidParameters(_)));
    }

    #[test]
    fn missing_type_field_is_rejected() {
        let err = params::parse::<QrCodeOperation>(&json!({ "operation": "create", "qrType": "url" }))
            .unwrap()
            .plan()
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid parameters: missing parameter `url`");
    }

    #[test]
    fn search_maps_to_name_only() {
        let plan = params::parse::<QrCodeOperation>(&json!({
            "operation": "list",
            "returnAll": false,
            "limit": 50,
            "filters": { "tag": "test", "refId": "ref-001", "search": "Filtered" }
        }))
        .unwrap()
        .plan()
        .unwrap();
        let Plan::List { filters, .. } = plan else { panic!("expected list") };
        assert_eq!(filters.get("name"), Some("Filtered"));
        assert_eq!(filters.get("baseUrl"), None);
        assert_eq!(filters.get("refId"), Some("ref-001"));
    }

    #[tokio::test]
    async fn get_returns_the_unwrapped_payload() {
        let api = MockApi::new();
        api.push_ok(json!({ "_id": "qr123", "name": "Promo" }));

        let out = QrCodeNode
            .execute(&InputItem::new(json!({ "operation": "get", "qrCodeId": "qr123" })), &context(&api))
            .await
            .unwrap();

        assert_eq!(out["name"], "Promo");
        assert_eq!(api.sent_requests()[0].path, "/api/qr-code/qr123");
    }
}
