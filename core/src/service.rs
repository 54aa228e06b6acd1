//! Async façade: the single choke point for outbound calls.
//!
//! # Design
//! `ApiService` composes the sans-IO `ApiClient` with a `Transport` and owns
//! the active credential. Verb methods take `&self` and snapshot the token
//! when the request is built; `set_token`/`remove_token` take `&mut self`, so
//! the credential cannot change underneath an in-flight call. Every outcome,
//! transport failures included, comes back as an `Envelope`.

use std::fmt;

use serde_json::Value;
use tracing::Instrument;

use crate::client::{ApiClient, Query};
use crate::config::{ClientConfig, DEFAULT_TOKEN_KEY};
use crate::credential::{CredentialStore, MemoryStore};
use crate::envelope::{Envelope, ErrorCode};
use crate::error::{StoreError, TransportError};
use crate::http::HttpRequest;
use crate::transport::{ReqwestTransport, Transport};

pub struct ApiService<T = ReqwestTransport> {
    client: ApiClient,
    transport: T,
    store: Box<dyn CredentialStore>,
    token_key: String,
    token: Option<String>,
}

impl ApiService<ReqwestTransport> {
    /// Service over a fresh `reqwest` client, with an in-memory store.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(config.timeout())?;
        let client =
            ApiClient::new(&config.base_url).with_credential_mode(config.credential_mode.clone());
        let mut service = ApiService::new(client, transport);
        service.token_key = config.token_key.clone();
        Ok(service)
    }
}

impl<T: Transport> ApiService<T> {
    /// Service with no credential and an in-memory store.
    pub fn new(client: ApiClient, transport: T) -> Self {
        Self {
            client,
            transport,
            store: Box::new(MemoryStore::new()),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            token: None,
        }
    }

    /// Store the credential under `key`, restoring whatever the current
    /// store already holds there.
    pub fn with_token_key(mut self, key: impl Into<String>) -> Result<Self, StoreError> {
        self.token_key = key.into();
        self.restore()?;
        Ok(self)
    }

    /// Swap in `store` and restore any credential it already holds.
    pub fn with_store(mut self, store: impl CredentialStore + 'static) -> Result<Self, StoreError> {
        self.store = Box::new(store);
        self.restore()?;
        Ok(self)
    }

    fn restore(&mut self) -> Result<(), StoreError> {
        self.token = self.store.read(&self.token_key)?;
        if self.token.is_some() {
            tracing::debug!(key = %self.token_key, "restored credential from store");
        }
        Ok(())
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn get(&self, path: &str, query: Option<&Query>) -> Envelope {
        let request = self.client.build_get(path, query, self.token.as_deref());
        self.send(request).await
    }

    pub async fn post(&self, path: &str, body: Option<&Value>) -> Envelope {
        let request = self.client.build_post(path, body, self.token.as_deref());
        self.send(request).await
    }

    pub async fn put(&self, path: &str, body: Option<&Value>) -> Envelope {
        let request = self.client.build_put(path, body, self.token.as_deref());
        self.send(request).await
    }

    pub async fn delete(&self, path: &str) -> Envelope {
        let request = self.client.build_delete(path, self.token.as_deref());
        self.send(request).await
    }

    /// Persist `token` and attach it to every subsequent call.
    ///
    /// On a store failure the previous credential stays active.
    pub fn set_token(&mut self, token: impl Into<String>) -> Result<(), StoreError> {
        let token = token.into();
        self.store.write(&self.token_key, &token)?;
        self.token = Some(token);
        Ok(())
    }

    /// Forget the credential, in the store and in memory.
    pub fn remove_token(&mut self) -> Result<(), StoreError> {
        self.store.remove(&self.token_key)?;
        self.token = None;
        Ok(())
    }

    pub fn get_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    async fn send(&self, request: HttpRequest) -> Envelope {
        let span = tracing::debug_span!(
            "api_call",
            method = %request.method,
            path = %route_of(&request),
        );
        self.execute(request).instrument(span).await
    }

    async fn execute(&self, request: HttpRequest) -> Envelope {
        let method = request.method;
        match self.transport.execute(request).await {
            Ok(response) => {
                tracing::debug!(status = response.status, "response received");
                self.client.parse(response)
            }
            Err(e @ TransportError::InvalidRequest(_)) => {
                tracing::warn!(%method, error = %e, "request not sent");
                Envelope::failure(ErrorCode::NetworkError, None)
            }
            Err(e) => {
                tracing::warn!(%method, error = %e, "transport failure");
                Envelope::failure(ErrorCode::NetworkError, None)
            }
        }
    }
}

/// The route part of the request URL, without host or query, for logging.
fn route_of(request: &HttpRequest) -> &str {
    let without_scheme = request
        .url
        .split_once("://")
        .map_or(request.url.as_str(), |(_, rest)| rest);
    let route = without_scheme
        .find('/')
        .map_or("/", |idx| &without_scheme[idx..]);
    route.split('?').next().unwrap_or(route)
}

impl<T> fmt::Debug for ApiService<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiService")
            .field("client", &self.client)
            .field("store", &self.store)
            .field("token_key", &self.token_key)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}
