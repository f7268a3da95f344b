//! Ports and Adapters Infrastructure
//!
//! Each domain defines port traits (repository, gateway) that depend only on
//! this crate; adapters in the `infra_*` crates implement them. `PortError`
//! is the unified error type all port implementations return, so domain code
//! can classify failures without knowing the transport behind the port.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error type for port operations
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    /// A validation error occurred
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// The operation conflicts with existing data (e.g., a lost CAS race)
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Connection to the underlying system failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The operation timed out
    #[error("Timeout after {duration_ms}ms: {operation}")]
    Timeout { operation: String, duration_ms: u64 },

    /// Authentication against the external system failed
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// The external authority answered with a non-2xx response
    ///
    /// The raw body is retained verbatim for manual reconciliation.
    #[error("Upstream error {status}: {body}")]
    Upstream { status: u16, body: String },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
        }
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this failure may succeed on retry
    ///
    /// Timeouts, connection failures and upstream 5xx responses are
    /// transient; upstream 4xx responses mean the payload itself was
    /// rejected and retrying the same document is not sensible.
    pub fn is_transient(&self) -> bool {
        match self {
            PortError::Connection { .. } | PortError::Timeout { .. } => true,
            PortError::Upstream { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

/// Marker trait for all domain ports
///
/// Port traits extend this marker so implementations are thread-safe and
/// usable in async contexts.
pub trait DomainPort: Send + Sync + 'static {}

/// Scope of a read query: one seller's records or the whole marketplace
///
/// Both scopes read the same records; there is no separate admin copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "seller_id", rename_all = "snake_case")]
pub enum QueryScope {
    /// Seller-facing view, restricted to the seller's own records
    Seller(crate::identifiers::SellerId),
    /// Admin-facing view over every record
    All,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_error_not_found() {
        let error = PortError::not_found("Voucher", "V-123");
        assert!(error.is_not_found());
        assert!(!error.is_transient());
        assert!(error.to_string().contains("Voucher"));
        assert!(error.to_string().contains("V-123"));
    }

    #[test]
    fn test_upstream_transience_follows_status_class() {
        let server_side = PortError::Upstream {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert!(server_side.is_transient());

        let rejected = PortError::Upstream {
            status: 422,
            body: "malformed document".to_string(),
        };
        assert!(!rejected.is_transient());
    }

    #[test]
    fn test_timeout_is_transient() {
        let timeout = PortError::Timeout {
            operation: "submit".to_string(),
            duration_ms: 30_000,
        };
        assert!(timeout.is_transient());

        let validation = PortError::validation("missing customer name");
        assert!(!validation.is_transient());
    }
}
