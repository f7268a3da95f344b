//! E-Invoicing Gateway Adapter
//!
//! This crate isolates every network-facing interaction with the external
//! e-invoicing authority behind the `InvoiceGateway` port: it acquires and
//! caches the bearer credential, submits invoice payloads, and maps
//! transport failures into `PortError` so the rest of the engine never
//! sees HTTP details.

pub mod client;
pub mod config;

pub use client::GatewayClient;
pub use config::GatewayConfig;
