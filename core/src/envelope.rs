//! Response envelopes and resource stamping.
//!
//! # Design
//! Every API body is wrapped as `{"data": ..., "errors": [...]}`. Single
//! resources and collections get separate types because the API treats them
//! differently on failure: a failed single-resource call returns the errors
//! at the top level with no `data` key (`ErrorEnvelope`), while a failed
//! collection call keeps the full collection shape. Envelopes are consumed by
//! `into_data`, which checks `errors` before decoding `data` into the
//! caller's type; only the stamped payload survives.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ErrorDetail, MnoError, Result};
use crate::preset::DEFAULT_PRESET;

/// A domain object that remembers which preset it was loaded under.
///
/// Implementors keep the preset as a plain field, usually
/// `#[serde(skip)] preset: Option<String>`, so the object stays serializable
/// and never holds on to a client.
pub trait Resource {
    fn preset(&self) -> Option<&str>;

    fn assign_preset(&mut self, preset: &str);

    /// Preset to use for follow-up calls on this object.
    fn preset_or_default(&self) -> &str {
        self.preset().unwrap_or(DEFAULT_PRESET)
    }
}

/// Body of a single-resource response.
///
/// `data` stays raw JSON until `errors` has been checked, so a payload that
/// does not fit the caller's type never hides an API error.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, deserialize_with = "nullable_errors")]
    pub errors: Vec<ErrorDetail>,
}

/// Body of a collection response.
#[derive(Debug, Deserialize)]
pub struct CollectionEnvelope {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, deserialize_with = "nullable_errors")]
    pub errors: Vec<ErrorDetail>,
}

/// Top-level error body returned by single-resource calls with an error status.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default, deserialize_with = "nullable_errors")]
    pub errors: Vec<ErrorDetail>,
}

impl Envelope {
    /// Check for errors, then decode, stamp and unwrap the payload.
    pub fn into_data<T>(self, status: u16, preset: &str) -> Result<T>
    where
        T: Resource + DeserializeOwned,
    {
        check_errors(status, self.errors)?;
        let data = self.data.ok_or_else(|| {
            MnoError::Decoding("envelope carries neither data nor errors".to_string())
        })?;
        let mut data: T = from_value(data)?;
        data.assign_preset(preset);
        Ok(data)
    }
}

impl CollectionEnvelope {
    /// Check for errors, then decode and stamp every item.
    pub fn into_data<T>(self, status: u16, preset: &str) -> Result<Vec<T>>
    where
        T: Resource + DeserializeOwned,
    {
        check_errors(status, self.errors)?;
        let data = self.data.ok_or_else(|| {
            MnoError::Decoding("collection envelope carries neither data nor errors".to_string())
        })?;
        let mut data: Vec<T> = from_value(data)?;
        for item in &mut data {
            item.assign_preset(preset);
        }
        Ok(data)
    }
}

impl ErrorEnvelope {
    pub fn into_error(self, status: u16, body: &str) -> MnoError {
        match check_errors(status, self.errors) {
            Err(err) => err,
            Ok(()) => MnoError::UnexpectedStatus {
                status,
                body: body.to_string(),
            },
        }
    }
}

fn check_errors(status: u16, errors: Vec<ErrorDetail>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(MnoError::Api { status, errors })
    }
}

fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| MnoError::Decoding(e.to_string()))
}

fn nullable_errors<'de, D>(deserializer: D) -> std::result::Result<Vec<ErrorDetail>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<ErrorDetail>>::deserialize(deserializer)?.unwrap_or_default())
}
