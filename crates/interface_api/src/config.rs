//! API configuration

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use domain_settlement::ReschedulePolicy;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Log level
    pub log_level: String,
    /// Marketplace commission rate, as a percentage
    pub commission_rate_percent: Decimal,
    /// `in_place` or `new_record`; see `ReschedulePolicy`
    pub reschedule_policy: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            commission_rate_percent: dec!(8.0),
            reschedule_policy: "new_record".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parses the configured reschedule behavior, defaulting to new-record
    pub fn reschedule_policy(&self) -> ReschedulePolicy {
        match self.reschedule_policy.as_str() {
            "in_place" => ReschedulePolicy::InPlace,
            _ => ReschedulePolicy::NewRecord,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reschedule_policy_parsing() {
        let mut config = ApiConfig::default();
        assert_eq!(config.reschedule_policy(), ReschedulePolicy::NewRecord);

        config.reschedule_policy = "in_place".to_string();
        assert_eq!(config.reschedule_policy(), ReschedulePolicy::InPlace);
    }
}
