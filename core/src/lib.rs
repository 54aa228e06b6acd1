//! Typed HTTP service client for a JSON backend.
//!
//! # Overview
//! `ApiService` is the single choke point for outbound calls: it attaches the
//! active credential, executes the request through a `Transport`, and folds
//! every outcome into an `Envelope` (`{ok, data, code?}`). Expected failures
//! (4xx/5xx, unparsable bodies, transport errors) never surface as Rust
//! errors from `get`/`post`/`put`/`delete`.
//!
//! # Design
//! - `ApiClient` is the sans-IO core: `build` produces an `HttpRequest`,
//!   `parse` consumes an `HttpResponse`. It is deterministic and holds no
//!   mutable state.
//! - `ApiService` owns the credential as a plain field; mutating it needs
//!   `&mut self`, so it is read-only while any call is in flight.
//! - The credential store (`CredentialStore`) and the network
//!   (`Transport`) are injected collaborators.
//! - No retries, alerts or navigation: callers decide what to do with a
//!   failed envelope.

pub mod client;
pub mod config;
pub mod credential;
pub mod envelope;
pub mod error;
pub mod http;
pub mod service;
pub mod transport;

pub use client::{ApiClient, Query};
pub use config::{ClientConfig, Environment};
pub use credential::{CredentialMode, CredentialStore, FileStore, MemoryStore};
pub use envelope::{Envelope, ErrorCode};
pub use error::{ConfigError, StoreError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use service::ApiService;
pub use transport::{ReqwestTransport, Transport};
