//! Caller-facing CRUD surface.
//!
//! # Design
//! `MnoClient` owns the per-preset client cache and the HTTP executor. Each
//! operation is one blocking round-trip: build the request on the preset's
//! client, execute it, parse the envelope. Nothing is retried and no partial
//! result is ever returned.
//!
//! Calls without an explicit preset go to `DEFAULT_PRESET`; use
//! `with_preset` to target another tenant:
//!
//! ```no_run
//! # use mno_core::{MnoClient, PresetRegistry, Resource, UreqExecutor};
//! # #[derive(serde::Deserialize)]
//! # struct Company { id: String, #[serde(skip)] preset: Option<String> }
//! # impl Resource for Company {
//! #     fn preset(&self) -> Option<&str> { self.preset.as_deref() }
//! #     fn assign_preset(&mut self, p: &str) { self.preset = Some(p.to_string()) }
//! # }
//! # fn main() -> mno_core::Result<()> {
//! let mno = MnoClient::new(UreqExecutor::new(), PresetRegistry::from_env()?);
//! let companies: Vec<Company> = mno
//!     .with_preset("partner")
//!     .list("companies", [("country", "AU")])?;
//! for company in &companies {
//!     // follow-up calls route back to the tenant the object came from
//!     mno.with_preset(company.preset_or_default())
//!         .delete::<Company>("companies", &company.id)?;
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::auth::{BasicAuthSigner, Signer};
use crate::cache::ClientCache;
use crate::client::PresetClient;
use crate::envelope::Resource;
use crate::error::Result;
use crate::http::{HttpExecutor, HttpRequest, HttpResponse};
use crate::params::Params;
use crate::preset::{PresetSource, DEFAULT_PRESET};

/// Generic REST resource client over a set of tenant presets.
#[derive(Debug)]
pub struct MnoClient<E, S> {
    executor: E,
    cache: ClientCache<S>,
}

impl<E: HttpExecutor, S: PresetSource> MnoClient<E, S> {
    /// Client signing requests with HTTP Basic credentials from each preset.
    pub fn new(executor: E, presets: S) -> Self {
        Self::with_signer(executor, presets, BasicAuthSigner)
    }

    pub fn with_signer(executor: E, presets: S, signer: impl Signer + 'static) -> Self {
        Self {
            executor,
            cache: ClientCache::new(presets, Arc::new(signer)),
        }
    }

    /// The cached client for `preset`, created on first use.
    pub fn client(&self, preset: &str) -> Result<Arc<PresetClient>> {
        self.cache.get_client(preset)
    }

    pub fn cache(&self) -> &ClientCache<S> {
        &self.cache
    }

    /// Operations scoped to `preset` instead of the default one.
    pub fn with_preset<'a>(&'a self, preset: &'a str) -> PresetScope<'a, E, S> {
        PresetScope { mno: self, preset }
    }

    pub fn list<T>(&self, path: &str, filters: impl Into<Params>) -> Result<Vec<T>>
    where
        T: Resource + DeserializeOwned,
    {
        self.with_preset(DEFAULT_PRESET).list(path, filters)
    }

    pub fn retrieve<T>(&self, path: &str, id: &str) -> Result<T>
    where
        T: Resource + DeserializeOwned,
    {
        self.with_preset(DEFAULT_PRESET).retrieve(path, id)
    }

    pub fn create<T>(&self, path: &str, parameters: impl Into<Params>) -> Result<T>
    where
        T: Resource + DeserializeOwned,
    {
        self.with_preset(DEFAULT_PRESET).create(path, parameters)
    }

    pub fn delete<T>(&self, path: &str, id: &str) -> Result<T>
    where
        T: Resource + DeserializeOwned,
    {
        self.with_preset(DEFAULT_PRESET).delete(path, id)
    }
}

/// `MnoClient` operations bound to one preset name.
#[derive(Debug)]
pub struct PresetScope<'a, E, S> {
    mno: &'a MnoClient<E, S>,
    preset: &'a str,
}

impl<E: HttpExecutor, S: PresetSource> PresetScope<'_, E, S> {
    pub fn preset(&self) -> &str {
        self.preset
    }

    /// Every resource under `path`; empty `filters` means no query string.
    pub fn list<T>(&self, path: &str, filters: impl Into<Params>) -> Result<Vec<T>>
    where
        T: Resource + DeserializeOwned,
    {
        let client = self.mno.client(self.preset)?;
        let request = client.build_list(path, filters.into())?;
        let response = self.dispatch(&request)?;
        client.parse_collection(&response).inspect_err(|e| self.report(&request, e))
    }

    pub fn retrieve<T>(&self, path: &str, id: &str) -> Result<T>
    where
        T: Resource + DeserializeOwned,
    {
        let client = self.mno.client(self.preset)?;
        let request = client.build_retrieve(path, id);
        let response = self.dispatch(&request)?;
        client.parse_single(&response).inspect_err(|e| self.report(&request, e))
    }

    /// Create a resource; parameter names are sent in snake_case.
    pub fn create<T>(&self, path: &str, parameters: impl Into<Params>) -> Result<T>
    where
        T: Resource + DeserializeOwned,
    {
        let client = self.mno.client(self.preset)?;
        let request = client.build_create(path, parameters.into())?;
        let response = self.dispatch(&request)?;
        client.parse_single(&response).inspect_err(|e| self.report(&request, e))
    }

    /// Delete a resource and return its final server-side state.
    pub fn delete<T>(&self, path: &str, id: &str) -> Result<T>
    where
        T: Resource + DeserializeOwned,
    {
        let client = self.mno.client(self.preset)?;
        let request = client.build_delete(path, id);
        let response = self.dispatch(&request)?;
        client.parse_single(&response).inspect_err(|e| self.report(&request, e))
    }

    fn dispatch(&self, request: &HttpRequest) -> Result<HttpResponse> {
        debug!(
            preset = self.preset,
            method = %request.method,
            url = %request.full_url(),
            "dispatching request"
        );
        let response = self.mno.executor.execute(request).inspect_err(|e| {
            warn!(preset = self.preset, method = %request.method, url = %request.url, error = %e, "transport failure");
        })?;
        debug!(preset = self.preset, status = response.status, "received response");
        Ok(response)
    }

    fn report(&self, request: &HttpRequest, error: &crate::error::MnoError) {
        warn!(
            preset = self.preset,
            method = %request.method,
            url = %request.url,
            %error,
            "request failed"
        );
    }
}
