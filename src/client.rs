//! HTTP client for the tenant encryption endpoint
//!
//! Implements [`EncryptionTransport`] against
//! `/api/v1/namespaces/{namespace}/tenants/{tenant}/encryption`:
//!
//! - `GET` returns the current configuration
//! - `PUT` persists a [`ConfigDocument`]
//! - `DELETE` disables encryption, carrying a [`DisableDirective`]
//!
//! All requests use bearer token authentication.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, trace, Instrument};
use url::Url;

use crate::config::ClientSettings;
use crate::domain::TenantEncryptionInfo;
use crate::errors::{KmsplaneError, Result};
use crate::secrets::SecretString;
use crate::session::{EncryptionTransport, TenantRef};
use crate::synthesis::{ConfigDocument, DisableDirective};
use crate::transport_span;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the management API (e.g. "http://localhost:9090")
    pub base_url: String,

    /// Bearer token for authentication
    pub token: SecretString,

    /// Request timeout
    pub timeout: Duration,

    /// Log response bodies and request shapes at trace level
    pub verbose: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9090".to_string(),
            token: SecretString::default(),
            timeout: Duration::from_secs(30),
            verbose: false,
        }
    }
}

impl From<&ClientSettings> for ClientConfig {
    fn from(settings: &ClientSettings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            token: settings.token.clone().unwrap_or_default(),
            timeout: settings.timeout(),
            verbose: settings.verbose,
        }
    }
}

/// Authenticated client for the tenant encryption endpoint
#[derive(Debug, Clone)]
pub struct EncryptionClient {
    client: Client,
    config: ClientConfig,
    base_url: Url,
}

impl EncryptionClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            KmsplaneError::config(format!("Invalid base URL '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(KmsplaneError::config(format!(
                "Base URL '{}' cannot carry a path",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| KmsplaneError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Endpoint URL for a tenant; namespace and name are percent-encoded
    pub fn encryption_url(&self, tenant: &TenantRef) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([
                "api",
                "v1",
                "namespaces",
                tenant.namespace.as_str(),
                "tenants",
                tenant.name.as_str(),
                "encryption",
            ]);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "Sending encryption request");
        self.client.request(method, url).bearer_auth(self.config.token.expose_secret())
    }

    fn trace_body<T: Serialize>(&self, body: &T) {
        if !self.config.verbose {
            return;
        }
        // Bodies carry credentials; only their shape is logged.
        if let Ok(serde_json::Value::Object(map)) = serde_json::to_value(body) {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            trace!(keys = ?keys, "Request body");
        }
    }

    async fn ensure_success(&self, response: Response) -> Result<Response> {
        let status = response.status();
        debug!(%status, "Response status");

        if status.is_success() {
            return Ok(response);
        }

        let error_text =
            response.text().await.unwrap_or_else(|_| "<unable to read error>".to_string());
        if self.config.verbose {
            trace!("Error response:\n{}", error_text);
        }

        Err(KmsplaneError::transport_status(
            format!("HTTP request failed with status {}: {}", status, error_text),
            status.as_u16(),
        ))
    }
}

#[async_trait]
impl EncryptionTransport for EncryptionClient {
    async fn fetch(&self, tenant: &TenantRef) -> Result<TenantEncryptionInfo> {
        let url = self.encryption_url(tenant);
        let span = transport_span!("GET", url.path());

        async {
            let response = self
                .request(Method::GET, url)
                .send()
                .await
                .map_err(|e| KmsplaneError::from(e).with_context("Failed to send GET request"))?;

            if response.status() == StatusCode::NOT_FOUND {
                debug!("No encryption configuration found; treating as disabled");
                return Ok::<_, KmsplaneError>(TenantEncryptionInfo::default());
            }

            let response = self.ensure_success(response).await?;
            let body = response
                .text()
                .await
                .map_err(|e| KmsplaneError::from(e).with_context("Failed to read response body"))?;

            if self.config.verbose {
                trace!(bytes = body.len(), "Response body received");
            }

            serde_json::from_str::<TenantEncryptionInfo>(&body).map_err(|e| {
                KmsplaneError::transport(format!("Failed to decode encryption configuration: {}", e))
            })
        }
        .instrument(span)
        .await
    }

    async fn apply(&self, tenant: &TenantRef, document: &ConfigDocument) -> Result<()> {
        let url = self.encryption_url(tenant);
        let span = transport_span!("PUT", url.path(), removals = document.secrets_to_be_deleted.len());

        async {
            self.trace_body(document);
            let response = self
                .request(Method::PUT, url)
                .json(document)
                .send()
                .await
                .map_err(|e| KmsplaneError::from(e).with_context("Failed to send PUT request"))?;
            self.ensure_success(response).await?;
            Ok::<_, KmsplaneError>(())
        }
        .instrument(span)
        .await
    }

    async fn disable(&self, tenant: &TenantRef, directive: &DisableDirective) -> Result<()> {
        let url = self.encryption_url(tenant);
        let span =
            transport_span!("DELETE", url.path(), removals = directive.secrets_to_be_deleted.len());

        async {
            self.trace_body(directive);
            let response = self
                .request(Method::DELETE, url)
                .json(directive)
                .send()
                .await
                .map_err(|e| KmsplaneError::from(e).with_context("Failed to send DELETE request"))?;
            self.ensure_success(response).await?;
            Ok::<_, KmsplaneError>(())
        }
        .instrument(span)
        .await
    }
}
