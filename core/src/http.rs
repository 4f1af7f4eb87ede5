//! HTTP transport types and the executor seam.
//!
//! # Design
//! Requests and responses are plain data. The core builds an `HttpRequest`,
//! hands it to an `HttpExecutor`, and parses the `HttpResponse` it gets back.
//! Sockets, TLS, timeouts and cancellation all live behind the executor, so
//! the core stays deterministic and tests can swap in an in-memory executor.

use std::sync::Arc;

use crate::error::TransportError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `url` has the identifier already substituted but carries no query string;
/// query parameters stay in `query` so executors can encode them their own way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Full URL including the percent-encoded query string.
    pub fn full_url(&self) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }
        let query: Vec<String> = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect();
        format!("{}?{}", self.url, query.join("&"))
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_error_status(&self) -> bool {
        self.status >= 400
    }
}

/// Executes one fully built request and returns the raw status and body.
///
/// Error statuses (4xx/5xx) must come back as `Ok(HttpResponse)`; only
/// failures to obtain a response at all are `TransportError`s.
pub trait HttpExecutor: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<E: HttpExecutor + ?Sized> HttpExecutor for Arc<E> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<E: HttpExecutor + ?Sized> HttpExecutor for &E {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_url_without_query_is_unchanged() {
        let req = HttpRequest::new(HttpMethod::Get, "https://api.example.com/v1/companies");
        assert_eq!(req.full_url(), "https://api.example.com/v1/companies");
    }

    #[test]
    fn full_url_encodes_query_in_order() {
        let mut req = HttpRequest::new(HttpMethod::Get, "http://h/companies");
        req.query.push(("country".to_string(), "AU".to_string()));
        req.query.push(("name".to_string(), "Acme & Co".to_string()));
        assert_eq!(req.full_url(), "http://h/companies?country=AU&name=Acme%20%26%20Co");
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let mut req = HttpRequest::new(HttpMethod::Post, "http://h/x");
        req.headers.push(("Content-Type".to_string(), "application/json".to_string()));
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("authorization"), None);
    }

    #[test]
    fn full_url_keeps_unreserved_and_encodes_the_rest() {
        let mut req = HttpRequest::new(HttpMethod::Get, "http://h/groups");
        req.query.push(("abc-DEF_1.2~".to_string(), "a/b é".to_string()));
        assert_eq!(req.full_url(), "http://h/groups?abc-DEF_1.2~=a%2Fb%20%C3%A9");
    }

    #[test]
    fn error_status_threshold() {
        assert!(!HttpResponse::new(399, "").is_error_status());
        assert!(HttpResponse::new(400, "").is_error_status());
        assert!(HttpResponse::new(503, "").is_error_status());
    }
}
