//! Multi-tenant REST resource access layer.
//!
//! # Overview
//! `MnoClient` exposes `list` / `retrieve` / `create` / `delete` over any
//! resource path, for any resource type implementing [`Resource`]. Each call
//! runs under a named preset (host, base path and credentials). Results are
//! unwrapped from the API's `{"data": ..., "errors": [...]}` envelope and
//! stamped with the preset they came from.
//!
//! # Design
//! - One `PresetClient` per preset name, built lazily and cached for the life
//!   of the `MnoClient` (`ClientCache`).
//! - `PresetClient` splits every operation into `build_*` (request) and
//!   `parse_*` (response); actual I/O goes through the `HttpExecutor` trait.
//!   `UreqExecutor` (feature `ureq`) is the stock blocking implementation.
//! - Failures are typed: configuration, transport, decoding, or API errors
//!   reported in the envelope (`MnoError`).
//! - `sso::Group` maps SSO assertion attributes to a domain object.

pub mod api;
pub mod auth;
pub mod cache;
pub mod client;
pub mod datetime;
pub mod envelope;
pub mod error;
pub mod http;
pub mod naming;
pub mod params;
pub mod preset;
pub mod sso;
#[cfg(feature = "ureq")]
pub mod transport;

pub use api::{MnoClient, PresetScope};
pub use auth::{BasicAuthSigner, Signer};
pub use cache::ClientCache;
pub use client::PresetClient;
pub use envelope::{CollectionEnvelope, Envelope, ErrorEnvelope, Resource};
pub use error::{ErrorDetail, MnoError, Result, TransportError};
pub use http::{HttpExecutor, HttpMethod, HttpRequest, HttpResponse};
pub use params::Params;
pub use preset::{ApiPreset, Preset, PresetRegistry, PresetSource, DEFAULT_PRESET};
#[cfg(feature = "ureq")]
pub use transport::UreqExecutor;
