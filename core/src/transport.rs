//! Blocking `HttpExecutor` backed by a `ureq` agent.

use std::time::Duration;

use crate::error::TransportError;
use crate::http::{HttpExecutor, HttpMethod, HttpRequest, HttpResponse};

/// Executes requests over real HTTP with `ureq`.
///
/// Status codes are never turned into errors here; 4xx/5xx responses come
/// back as data so the envelope parser can read their error payloads.
#[derive(Clone)]
pub struct UreqExecutor {
    agent: ureq::Agent,
}

impl UreqExecutor {
    pub fn new() -> Self {
        Self::with_timeout(None)
    }

    /// Executor whose whole request/response cycle is bounded by `timeout`.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl std::fmt::Debug for UreqExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqExecutor").finish_non_exhaustive()
    }
}

impl Default for UreqExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpExecutor for UreqExecutor {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let result = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => prepare(self.agent.get(&request.url), request).call(),
            (HttpMethod::Delete, _) => prepare(self.agent.delete(&request.url), request).call(),
            (HttpMethod::Post, Some(body)) => {
                prepare(self.agent.post(&request.url), request).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => prepare(self.agent.post(&request.url), request).send_empty(),
        };
        let mut response = result.map_err(|e| {
            TransportError::with_source(format!("{} {} failed", request.method, request.url), e)
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = response.body_mut().read_to_string().map_err(|e| {
            TransportError::with_source(format!("reading body of {} {}", request.method, request.url), e)
        })?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn prepare<B>(mut builder: ureq::RequestBuilder<B>, request: &HttpRequest) -> ureq::RequestBuilder<B> {
    for (name, value) in &request.query {
        builder = builder.query(name, value);
    }
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
