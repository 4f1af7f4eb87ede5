//! Per-preset request builder and response parser.
//!
//! # Design
//! `PresetClient` is bound to one preset and holds no mutable state. Each
//! operation is split into a `build_*` method that produces a signed
//! `HttpRequest` and a `parse_*` method that consumes the `HttpResponse`. The
//! caller (normally `MnoClient`) runs the round-trip in between, which keeps
//! this type free of I/O and easy to test.
//!
//! Single-resource and collection responses go through separate parse paths.
//! On an error status a single-resource body is read as a top-level
//! `ErrorEnvelope`; a collection body is always read as a full
//! `CollectionEnvelope`.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::auth::Signer;
use crate::envelope::{CollectionEnvelope, Envelope, ErrorEnvelope, Resource};
use crate::error::{MnoError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::naming::to_snake_case;
use crate::params::Params;
use crate::preset::ApiPreset;

/// Placeholder replaced by the resource identifier in a resource path.
pub const ID_SEGMENT: &str = "{id}";

/// HTTP client bound to exactly one preset.
#[derive(Debug)]
pub struct PresetClient {
    name: String,
    preset: ApiPreset,
    root_url: String,
    signer: Arc<dyn Signer>,
}

impl PresetClient {
    pub fn new(name: impl Into<String>, preset: ApiPreset, signer: Arc<dyn Signer>) -> Self {
        let root_url = preset.root_url();
        Self {
            name: name.into(),
            preset,
            root_url,
            signer,
        }
    }

    /// Preset name this client was created for.
    pub fn preset_name(&self) -> &str {
        &self.name
    }

    pub fn preset(&self) -> &ApiPreset {
        &self.preset
    }

    /// `GET path` with `filters` applied verbatim as query parameters.
    ///
    /// A trailing `/{id}` is dropped; a placeholder anywhere else is rejected
    /// because there is no identifier to put in it.
    pub fn build_list(&self, path: &str, filters: Params) -> Result<HttpRequest> {
        let mut request = HttpRequest::new(HttpMethod::Get, self.collection_url(path)?);
        request.query = filters.into_vec();
        Ok(self.signed(request))
    }

    pub fn build_retrieve(&self, path: &str, id: &str) -> HttpRequest {
        let request = HttpRequest::new(HttpMethod::Get, self.resource_url(path, id));
        self.signed(request)
    }

    /// `POST path` with every parameter name normalized to snake_case.
    pub fn build_create(&self, path: &str, parameters: Params) -> Result<HttpRequest> {
        let mut body = serde_json::Map::new();
        for (key, value) in parameters.into_vec() {
            let name = to_snake_case(&key);
            if body.insert(name.clone(), serde_json::Value::String(value)).is_some() {
                warn!(parameter = %key, field = %name, "create parameters collide, keeping the later value");
            }
        }
        let body = serde_json::to_string(&body).map_err(|e| MnoError::Serialization(e.to_string()))?;

        let mut request = HttpRequest::new(HttpMethod::Post, self.collection_url(path)?);
        request
            .headers
            .push(("content-type".to_string(), "application/json".to_string()));
        request.body = Some(body);
        Ok(self.signed(request))
    }

    pub fn build_delete(&self, path: &str, id: &str) -> HttpRequest {
        let request = HttpRequest::new(HttpMethod::Delete, self.resource_url(path, id));
        self.signed(request)
    }

    /// Parse a single-resource response and stamp it with this client's preset.
    pub fn parse_single<T>(&self, response: &HttpResponse) -> Result<T>
    where
        T: Resource + DeserializeOwned,
    {
        if response.is_error_status() {
            let envelope: ErrorEnvelope = decode(&response.body)?;
            return Err(envelope.into_error(response.status, &response.body));
        }
        let envelope: Envelope = decode(&response.body)?;
        envelope.into_data(response.status, &self.name)
    }

    /// Parse a collection response and stamp every item with this client's preset.
    pub fn parse_collection<T>(&self, response: &HttpResponse) -> Result<Vec<T>>
    where
        T: Resource + DeserializeOwned,
    {
        let envelope: CollectionEnvelope = decode(&response.body)?;
        if response.is_error_status() && envelope.errors.is_empty() {
            return Err(MnoError::UnexpectedStatus {
                status: response.status,
                body: response.body.clone(),
            });
        }
        envelope.into_data(response.status, &self.name)
    }

    fn resource_url(&self, path: &str, id: &str) -> String {
        let path = path.trim_matches('/');
        let id = urlencoding::encode(id);
        let path = if path.contains(ID_SEGMENT) {
            path.replace(ID_SEGMENT, &id)
        } else {
            format!("{path}/{id}")
        };
        format!("{}/{path}", self.root_url)
    }

    fn collection_url(&self, path: &str) -> Result<String> {
        let path = path.trim_matches('/');
        let path = path
            .strip_suffix(ID_SEGMENT)
            .map_or(path, |p| p.trim_end_matches('/'));
        if path.contains(ID_SEGMENT) {
            return Err(MnoError::Configuration {
                message: format!("path '{path}' needs an identifier"),
            });
        }
        Ok(format!("{}/{path}", self.root_url))
    }

    fn signed(&self, mut request: HttpRequest) -> HttpRequest {
        self.signer.sign(&self.preset, &mut request);
        request
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| MnoError::Decoding(e.to_string()))
}
