//! Scriptable gateway double
//!
//! Stands in for the e-invoicing authority in tests that exercise the
//! engine above the transport layer. Scenarios flip the mode at runtime;
//! the call counter backs "no gateway call was attempted" assertions.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use core_kernel::{DomainPort, PortError};
use domain_invoicing::{InvoiceGateway, SalesDocument};

/// What the next submission should do
#[derive(Debug, Clone, Copy)]
pub enum StubGatewayMode {
    /// Answer 200 with a canned provider response
    Succeed,
    /// Answer the given non-2xx status
    FailUpstream(u16),
    /// Simulate a transport timeout
    FailTimeout,
}

pub struct StubGateway {
    mode: Mutex<StubGatewayMode>,
    calls: AtomicUsize,
}

impl StubGateway {
    pub fn new(mode: StubGatewayMode) -> Self {
        Self {
            mode: Mutex::new(mode),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(StubGatewayMode::Succeed)
    }

    /// Number of submissions attempted so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_mode(&self, mode: StubGatewayMode) {
        *self.mode.lock().unwrap() = mode;
    }
}

impl DomainPort for StubGateway {}

#[async_trait]
impl InvoiceGateway for StubGateway {
    async fn submit(&self, document: &SalesDocument) -> Result<serde_json::Value, PortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match *self.mode.lock().unwrap() {
            StubGatewayMode::Succeed => Ok(serde_json::json!({
                "status": "received",
                "document": format!("{}-{}", document.series, document.number),
            })),
            StubGatewayMode::FailUpstream(status) => Err(PortError::Upstream {
                status,
                body: "provider error".to_string(),
            }),
            StubGatewayMode::FailTimeout => Err(PortError::Timeout {
                operation: "submit".to_string(),
                duration_ms: 30_000,
            }),
        }
    }
}
