//! Request signing from a preset's credentials.

use base64::Engine as _;

use crate::http::HttpRequest;
use crate::preset::ApiPreset;

/// Derives authentication headers for a request from the bound preset.
pub trait Signer: Send + Sync + std::fmt::Debug {
    fn sign(&self, preset: &ApiPreset, request: &mut HttpRequest);
}

/// HTTP Basic authentication with the preset's id and secret.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicAuthSigner;

impl Signer for BasicAuthSigner {
    fn sign(&self, preset: &ApiPreset, request: &mut HttpRequest) {
        let raw = format!("{}:{}", preset.credential_id, preset.credential_secret);
        let token = base64::engine::general_purpose::STANDARD.encode(raw);
        request
            .headers
            .retain(|(k, _)| !k.eq_ignore_ascii_case("authorization"));
        request
            .headers
            .push(("authorization".to_string(), format!("Basic {token}")));
    }
}
