//! Page-by-page listing.
//!
//! The server has no cursor. "Return all" keeps asking for the next page while
//! the last one came back full, and stops on the first short (or empty) page.

use serde_json::Value;
use tracing::debug;

use crate::{ApiError, ApiRequest, Posty5Api, Query};

/// Page size used when every item is requested.
pub const PAGE_SIZE_ALL: u32 = 100;

/// Page size used for a bounded list when the caller gives no limit.
pub const DEFAULT_LIMIT: u32 = 50;

/// One page of a list endpoint, normalised from either response shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<Value>,
    pub total_count: Option<u64>,
    pub page: u32,
    pub page_size: u32,
}

impl Page {
    /// Accepts `{items, total?}` as well as a bare array. Any other payload
    /// is treated as an empty page.
    pub fn from_response(payload: Value, page: u32, page_size: u32) -> Self {
        let (items, total_count) = match payload {
            Value::Array(items) => (items, None),
            Value::Object(mut map) => {
                let total = map
                    .get("total")
                    .or_else(|| map.get("totalCount"))
                    .and_then(Value::as_u64);
                let items = match map.remove("items") {
                    Some(Value::Array(items)) => items,
                    _ => Vec::new(),
                };
                (items, total)
            }
            _ => (Vec::new(), None),
        };

        Self { items, total_count, page, page_size }
    }

    /// A full page means there may be more.
    pub fn is_full(&self) -> bool {
        self.page_size > 0 && self.items.len() == self.page_size as usize
    }
}

/// Fetch a single page.
pub async fn fetch_page(
    api: &dyn Posty5Api,
    path: &str,
    filters: &Query,
    page: u32,
    page_size: u32,
) -> Result<Page, ApiError> {
    let request = ApiRequest::get(path).with_query(filters.with_page(page, page_size));
    let payload = api.send(request).await?;
    Ok(Page::from_response(payload, page, page_size))
}

/// Bounded variant: one call for page 1 with `pageSize = limit`.
pub async fn list_page(
    api: &dyn Posty5Api,
    path: &str,
    filters: &Query,
    limit: u32,
) -> Result<Vec<Value>, ApiError> {
    Ok(fetch_page(api, path, filters, 1, limit).await?.items)
}

/// Every item, in server order.
pub async fn list_all(api: &dyn Posty5Api, path: &str, filters: &Query) -> Result<Vec<Value>, ApiError> {
    let mut all = Vec::new();
    let mut page_number = 1;

    loop {
        let page = fetch_page(api, path, filters, page_number, PAGE_SIZE_ALL).await?;
        let more = page.is_full();
        debug!(path, page = page_number, fetched = page.items.len(), "fetched list page");
        all.extend(page.items);

        if !more {
            break;
        }
        page_number += 1;
    }

    Ok(all)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::mock::MockApi;

    fn items(range: std::ops::Range<u32>) -> Vec<Value> {
        range.map(|n| json!({ "_id": format!("id-{n}") })).collect()
    }

    #[test]
    fn page_reads_envelope_items_and_total() {
        let page = Page::from_response(json!({ "items": [{ "a": 1 }], "total": 7 }), 1, 50);
        assert_eq!(page.items, vec![json!({ "a": 1 })]);
        assert_eq!(page.total_count, Some(7));
    }

    #[test]
    fn page_accepts_bare_array() {
        let page = Page::from_response(json!([{ "a": 1 }, { "a": 2 }]), 2, 2);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_count, None);
        assert!(page.is_full());
    }

    #[test]
    fn unexpected_payload_is_an_empty_page() {
        let page = Page::from_response(json!("nope"), 1, 10);
        assert!(page.items.is_empty());
        assert!(!page.is_full());
    }

    #[tokio::test]
    async fn list_all_concatenates_until_short_page() {
        let api = MockApi::new();
        api.push_ok(json!({ "items": items(0..100), "total": 230 }));
        api.push_ok(json!({ "items": items(100..200), "total": 230 }));
        api.push_ok(json!({ "items": items(200..230), "total": 230 }));

        let mut filters = Query::new();
        filters.set("tag", "promo");
        let all = list_all(&api, "/api/short-link", &filters).await.unwrap();

        assert_eq!(all.len(), 230);
        assert_eq!(all[0]["_id"], "id-0");
        assert_eq!(all[229]["_id"], "id-229");

        let sent = api.sent_requests();
        assert_eq!(sent.len(), 3);
        for (index, request) in sent.iter().enumerate() {
            assert_eq!(request.query.get("page"), Some((index + 1).to_string().as_str()));
            assert_eq!(request.query.get("pageSize"), Some("100"));
            assert_eq!(request.query.get("tag"), Some("promo"));
        }
    }

    #[tokio::test]
    async fn exact_multiple_issues_one_extra_request() {
        let api = MockApi::new();
        api.push_ok(json!(items(0..100)));
        api.push_ok(json!(items(100..200)));
        api.push_ok(json!([]));

        let all = list_all(&api, "/api/qr-code", &Query::new()).await.unwrap();

        assert_eq!(all.len(), 200);
        assert_eq!(api.sent_requests().len(), 3);
    }

    #[tokio::test]
    async fn list_page_is_one_bounded_call() {
        let api = MockApi::new();
        api.push_ok(json!({ "items": items(0..5) }));

        let got = list_page(&api, "/api/html-hosting", &Query::new(), 5).await.unwrap();

        assert_eq!(got.len(), 5);
        let sent = api.sent_requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].query.get("page"), Some("1"));
        assert_eq!(sent[0].query.get("pageSize"), Some("5"));
    }

    #[tokio::test]
    async fn errors_stop_the_loop() {
        let api = MockApi::new();
        api.push_ok(json!(items(0..100)));
        api.push_err(ApiError::Api("rate limited".into()));

        let err = list_all(&api, "/api/short-link", &Query::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "Posty5 API Error: rate limited");
        assert_eq!(api.sent_requests().len(), 2);
    }
}
