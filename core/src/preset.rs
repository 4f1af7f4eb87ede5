//! Named tenant presets: API host, base path and credentials.
//!
//! # Design
//! The core only needs lookup-by-name, expressed as the `PresetSource` trait.
//! `PresetRegistry` is the stock implementation, built in code or loaded from
//! a JSON document keyed by preset name. Presets are never mutated after
//! loading; `resolve` hands out clones.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{MnoError, Result};

/// Preset used when a caller does not name one.
pub const DEFAULT_PRESET: &str = "maestrano";

/// Environment variable read by `PresetRegistry::from_env`.
pub const CONFIG_PATH_ENV: &str = "MNO_CONFIG_PATH";

/// Connection parameters for one tenant preset.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiPreset {
    pub host: String,
    #[serde(rename = "base", default)]
    pub base_path: String,
    #[serde(rename = "id")]
    pub credential_id: String,
    #[serde(rename = "key")]
    pub credential_secret: String,
}

impl ApiPreset {
    pub fn new(
        host: impl Into<String>,
        base_path: impl Into<String>,
        credential_id: impl Into<String>,
        credential_secret: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            base_path: base_path.into(),
            credential_id: credential_id.into(),
            credential_secret: credential_secret.into(),
        }
    }

    /// Host and base path joined with exactly one slash, no trailing slash.
    pub fn root_url(&self) -> String {
        let host = self.host.trim_end_matches('/');
        let base = self.base_path.trim_matches('/');
        if base.is_empty() {
            host.to_string()
        } else {
            format!("{host}/{base}")
        }
    }

    fn validate(&self, name: &str) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(MnoError::Configuration {
                message: format!("preset '{name}' has an empty api host"),
            });
        }
        if self.credential_id.trim().is_empty() {
            return Err(MnoError::Configuration {
                message: format!("preset '{name}' has an empty api id"),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for ApiPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiPreset")
            .field("host", &self.host)
            .field("base_path", &self.base_path)
            .field("credential_id", &self.credential_id)
            .field("credential_secret", &"<redacted>")
            .finish()
    }
}

/// Paths the platform calls back on when account data changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookAccount {
    #[serde(default)]
    pub groups_path: Option<String>,
    #[serde(default)]
    pub group_users_path: Option<String>,
}

/// Data-sharing notification settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookConnec {
    #[serde(default)]
    pub initialization_path: Option<String>,
    #[serde(default)]
    pub notifications_path: Option<String>,
    /// Entity name to whether notifications are wanted for it.
    #[serde(default)]
    pub subscriptions: HashMap<String, bool>,
}

impl WebhookConnec {
    pub fn is_subscribed(&self, entity: &str) -> bool {
        self.subscriptions.get(entity).copied().unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(default)]
    pub account: WebhookAccount,
    #[serde(default)]
    pub connec: WebhookConnec,
}

/// Everything configured under one preset name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub api: ApiPreset,
    #[serde(default)]
    pub webhook: WebhookConfig,
}

/// Resolves a preset name to its connection parameters.
pub trait PresetSource: Send + Sync {
    /// Fails with `MnoError::Configuration` when `name` is unknown.
    fn resolve(&self, name: &str) -> Result<ApiPreset>;
}

impl<S: PresetSource + ?Sized> PresetSource for Arc<S> {
    fn resolve(&self, name: &str) -> Result<ApiPreset> {
        (**self).resolve(name)
    }
}

/// In-memory preset table.
#[derive(Debug, Clone, Default)]
pub struct PresetRegistry {
    presets: HashMap<String, Preset>,
}

impl PresetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object mapping preset names to `{ "api": {...}, "webhook": {...} }`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let presets: HashMap<String, Preset> =
            serde_json::from_str(json).map_err(|e| MnoError::Configuration {
                message: format!("invalid preset configuration: {e}"),
            })?;
        for (name, preset) in &presets {
            preset.api.validate(name)?;
        }
        Ok(Self { presets })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| MnoError::Configuration {
            message: format!("cannot read preset file {}: {e}", path.display()),
        })?;
        Self::from_json_str(&raw)
    }

    /// Load from the file named by `MNO_CONFIG_PATH`.
    pub fn from_env() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).map_err(|_| MnoError::Configuration {
            message: format!("{CONFIG_PATH_ENV} is not set"),
        })?;
        Self::from_path(path)
    }

    /// Add or replace the API settings for `name`, keeping its webhook config.
    pub fn insert(&mut self, name: impl Into<String>, api: ApiPreset) -> &mut Self {
        let name = name.into();
        match self.presets.get_mut(&name) {
            Some(existing) => existing.api = api,
            None => {
                self.presets.insert(
                    name,
                    Preset {
                        api,
                        webhook: WebhookConfig::default(),
                    },
                );
            }
        }
        self
    }

    pub fn with_preset(mut self, name: impl Into<String>, api: ApiPreset) -> Self {
        self.insert(name, api);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.get(name)
    }

    pub fn webhook(&self, name: &str) -> Option<&WebhookConfig> {
        self.presets.get(name).map(|p| &p.webhook)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

impl PresetSource for PresetRegistry {
    fn resolve(&self, name: &str) -> Result<ApiPreset> {
        self.presets
            .get(name)
            .map(|p| p.api.clone())
            .ok_or_else(|| MnoError::unknown_preset(name))
    }
}
