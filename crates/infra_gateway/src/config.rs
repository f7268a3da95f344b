//! Gateway configuration

use core_kernel::CoreError;
use serde::Deserialize;

fn default_timeout_secs() -> u64 {
    30
}

fn default_token_lifetime_secs() -> u64 {
    3600
}

// Refresh five minutes before the token actually expires, so a 60-minute
// credential is only trusted for 55.
fn default_token_refresh_margin_secs() -> u64 {
    300
}

/// Connection settings for the external e-invoicing authority
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Password-grant token endpoint
    pub auth_url: String,
    /// Document submission endpoint
    pub sales_url: String,
    /// Tenant identifier sent on the credential exchange
    pub client_id: String,
    /// Service account credentials
    pub username: String,
    pub password: String,
    /// Optional branch sent as a query parameter on submissions
    #[serde(default)]
    pub branch_id: Option<String>,
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Credential lifetime assumed when the provider omits `expires_in`
    #[serde(default = "default_token_lifetime_secs")]
    pub token_lifetime_secs: u64,
    /// How long before actual expiry the cached credential is discarded
    #[serde(default = "default_token_refresh_margin_secs")]
    pub token_refresh_margin_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            auth_url: String::new(),
            sales_url: String::new(),
            client_id: String::new(),
            username: String::new(),
            password: String::new(),
            branch_id: None,
            timeout_secs: default_timeout_secs(),
            token_lifetime_secs: default_token_lifetime_secs(),
            token_refresh_margin_secs: default_token_refresh_margin_secs(),
        }
    }
}

impl GatewayConfig {
    /// Loads configuration from `GATEWAY_`-prefixed environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("GATEWAY"))
            .build()?
            .try_deserialize()
    }

    /// Fails fast on missing required settings
    ///
    /// Called at client construction; a misconfigured gateway must never
    /// get as far as a network call.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (field, value) in [
            ("auth_url", &self.auth_url),
            ("sales_url", &self.sales_url),
            ("client_id", &self.client_id),
            ("username", &self.username),
            ("password", &self.password),
        ] {
            if value.trim().is_empty() {
                return Err(CoreError::configuration(format!(
                    "gateway setting {field} is required"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_missing_settings() {
        let config = GatewayConfig::default();
        let result = config.validate();
        assert!(matches!(result, Err(CoreError::Configuration(_))));
    }

    #[test]
    fn test_validate_accepts_complete_settings() {
        let config = GatewayConfig {
            auth_url: "https://auth.example/token".to_string(),
            sales_url: "https://api.example/sales".to_string(),
            client_id: "tenant-1".to_string(),
            username: "svc".to_string(),
            password: "secret".to_string(),
            ..Default::default()
        };
        config.validate().unwrap();
    }
}
