//! Lazily built, never evicted map of preset name to `PresetClient`.
//!
//! # Design
//! Lookups take the read lock. On a miss the preset is resolved and a client
//! constructed with no lock held, then inserted under the write lock with
//! compute-if-absent semantics: if another thread stored a client first, the
//! local candidate is dropped and the stored one is returned. Every caller
//! therefore sees the same `Arc` for a given name.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use crate::auth::Signer;
use crate::client::PresetClient;
use crate::error::Result;
use crate::preset::PresetSource;

#[derive(Debug)]
pub struct ClientCache<S> {
    source: S,
    signer: Arc<dyn Signer>,
    clients: RwLock<HashMap<String, Arc<PresetClient>>>,
}

impl<S: PresetSource> ClientCache<S> {
    pub fn new(source: S, signer: Arc<dyn Signer>) -> Self {
        Self {
            source,
            signer,
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Client for `preset`, built on first use.
    pub fn get_client(&self, preset: &str) -> Result<Arc<PresetClient>> {
        // The map is insert-only, so a poisoned lock still holds consistent data.
        if let Some(client) = self
            .clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(preset)
        {
            return Ok(Arc::clone(client));
        }

        let api = self.source.resolve(preset)?;
        let candidate = Arc::new(PresetClient::new(preset, api, Arc::clone(&self.signer)));

        let mut clients = self.clients.write().unwrap_or_else(PoisonError::into_inner);
        let stored = clients.entry(preset.to_string()).or_insert_with(|| {
            info!(preset, host = %candidate.preset().host, "created preset client");
            Arc::clone(&candidate)
        });
        if !Arc::ptr_eq(stored, &candidate) {
            debug!(preset, "lost client creation race, reusing stored client");
        }
        Ok(Arc::clone(stored))
    }

    pub fn contains(&self, preset: &str) -> bool {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(preset)
    }

    pub fn len(&self) -> usize {
        self.clients.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
