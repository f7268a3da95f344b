//! Gateway client
//!
//! Talks to the external e-invoicing authority: a password-grant credential
//! exchange with a cached bearer token, and JSON document submission. The
//! client never retries on its own; it classifies failures via
//! `PortError::is_transient` and leaves retry policy to the invoice
//! lifecycle.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use core_kernel::{CoreError, DomainPort, PortError};
use domain_invoicing::{InvoiceGateway, SalesDocument};

use crate::config::GatewayConfig;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
struct CachedCredential {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedCredential {
    fn is_fresh(&self) -> bool {
        Utc::now() < self.expires_at
    }
}

/// HTTP client for the e-invoicing authority
///
/// The credential cache is read-mostly: submissions take a read lock, and a
/// cache miss serializes on `refresh_lock` so concurrent callers never
/// trigger independent exchanges (single-flight acquisition).
pub struct GatewayClient {
    config: GatewayConfig,
    http: reqwest::Client,
    credential: RwLock<Option<CachedCredential>>,
    refresh_lock: Mutex<()>,
}

impl GatewayClient {
    /// Builds a client, failing fast on missing configuration
    pub fn new(config: GatewayConfig) -> Result<Self, CoreError> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CoreError::configuration(format!("http client: {e}")))?;

        Ok(Self {
            config,
            http,
            credential: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    /// Returns a cached credential, performing the password-grant exchange
    /// on a miss
    pub async fn acquire_credential(&self) -> Result<String, PortError> {
        if let Some(credential) = self.credential.read().await.as_ref() {
            if credential.is_fresh() {
                return Ok(credential.access_token.clone());
            }
        }

        let _refresh = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited on the lock
        if let Some(credential) = self.credential.read().await.as_ref() {
            if credential.is_fresh() {
                return Ok(credential.access_token.clone());
            }
        }

        debug!(auth_url = %self.config.auth_url, "exchanging credentials");
        let response = self
            .http
            .post(&self.config.auth_url)
            .form(&[
                ("grant_type", "password"),
                ("client_id", self.config.client_id.as_str()),
                ("username", self.config.username.as_str()),
                ("password", self.config.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| self.map_send_error("credential exchange", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "credential exchange rejected");
            return Err(if status.as_u16() == 401 || status.as_u16() == 403 {
                PortError::Unauthorized {
                    message: format!("credential exchange rejected: {body}"),
                }
            } else {
                PortError::Upstream {
                    status: status.as_u16(),
                    body,
                }
            });
        }

        let token: TokenResponse = response.json().await.map_err(|e| PortError::Internal {
            message: format!("malformed token response: {e}"),
            source: None,
        })?;

        let lifetime = token.expires_in.unwrap_or(self.config.token_lifetime_secs);
        let usable = lifetime
            .saturating_sub(self.config.token_refresh_margin_secs)
            .max(1);
        let credential = CachedCredential {
            access_token: token.access_token.clone(),
            expires_at: Utc::now() + chrono::Duration::seconds(usable as i64),
        };
        *self.credential.write().await = Some(credential);

        debug!(usable_secs = usable, "credential cached");
        Ok(token.access_token)
    }

    fn map_send_error(&self, operation: &str, err: reqwest::Error) -> PortError {
        if err.is_timeout() {
            PortError::Timeout {
                operation: operation.to_string(),
                duration_ms: self.config.timeout_secs * 1000,
            }
        } else {
            PortError::Connection {
                message: format!("{operation} failed: {err}"),
                source: Some(Box::new(err)),
            }
        }
    }
}

impl DomainPort for GatewayClient {}

#[async_trait]
impl InvoiceGateway for GatewayClient {
    /// Submits a document with the bearer credential attached
    ///
    /// Returns the provider response verbatim; the caller persists it for
    /// audit. Non-2xx responses become `PortError::Upstream` with the raw
    /// body retained.
    async fn submit(&self, document: &SalesDocument) -> Result<serde_json::Value, PortError> {
        let token = self.acquire_credential().await?;

        let mut request = self
            .http
            .post(&self.config.sales_url)
            .bearer_auth(token)
            .json(document);
        if let Some(branch_id) = &self.config.branch_id {
            request = request.query(&[("branch_id", branch_id)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.map_send_error("submit", e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| PortError::Internal {
            message: format!("reading provider response: {e}"),
            source: None,
        })?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "authority rejected submission");
            return Err(PortError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        // Keep whatever the provider sent, JSON or not, for the audit trail
        Ok(serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body)))
    }
}
