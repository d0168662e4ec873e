//! Request descriptors: the `{method, path, query, body}` value a resource
//! builder hands to the gateway.

use std::fmt;

use serde_json::Value;

/// HTTP verbs the Posty5 REST surface uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Ordered query-string pairs.
///
/// Values are stringified on insertion; empty optional values are skipped so
/// an unset filter never reaches the wire as `name=`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing an earlier value for the same key.
    pub fn set(&mut self, key: &str, value: impl ToString) -> &mut Self {
        let value = value.to_string();
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key.to_owned(), value)),
        }
        self
    }

    /// Set `key` only when `value` is present and non-empty.
    pub fn set_opt(&mut self, key: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.set(key, v);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// `self` followed by `page` / `pageSize`.
    pub fn with_page(&self, page: u32, page_size: u32) -> Self {
        let mut query = self.clone();
        query.set("page", page).set("pageSize", page_size);
        query
    }
}

/// A single REST call, built fresh per call and consumed once by the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the configured base URL, e.g. `/api/short-link/abc`.
    pub path: String,
    pub query: Query,
    pub body: Option<Value>,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Query::new(),
            body,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path, None)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path, None)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path, Some(body))
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Put, path, Some(body))
    }

    /// A `PUT` with no payload (e.g. cache invalidation).
    pub fn put_empty(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path, None)
    }

    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_skips_empty_optionals_and_replaces_duplicates() {
        let mut q = Query::new();
        q.set_opt("tag", Some("")).set_opt("refId", None).set_opt("name", Some("promo"));
        q.set("name", "launch");
        assert_eq!(q.pairs(), &[("name".to_owned(), "launch".to_owned())]);
    }

    #[test]
    fn with_page_appends_paging_without_touching_filters() {
        let mut filters = Query::new();
        filters.set("tag", "x");
        let paged = filters.with_page(3, 100);
        assert_eq!(paged.get("tag"), Some("x"));
        assert_eq!(paged.get("page"), Some("3"));
        assert_eq!(paged.get("pageSize"), Some("100"));
        assert_eq!(filters.get("page"), None);
    }

    #[test]
    fn constructors_set_method_and_body() {
        let req = ApiRequest::post("/api/short-link", json!({ "baseUrl": "https://a.b" }));
        assert_eq!(req.method, Method::Post);
        assert!(req.body.is_some());
        assert!(ApiRequest::get("/api/qr-code/1").body.is_none());
        assert_eq!(ApiRequest::put_empty("/x").method.to_string(), "PUT");
    }
}
