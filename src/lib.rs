//! Guardian Engine — scam-risk evaluation for live coaching flows.
//!
//! Modular structure:
//! - [`catalog`] — Per-channel signal catalogs (keys, weights, labels)
//! - [`risk`] — Scoring policies: call, payment, inbox, identity channels
//! - [`store`] — In-memory session registry (TTL sweep) and profile store
//! - [`engine`] — Facade the HTTP layer calls
//! - [`http`] — axum router and /v1 handlers
//! - [`logging`] — Structured JSON logging

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod logging;
pub mod risk;
pub mod store;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::EngineError;
pub use logging::StructuredLogger;
pub use risk::{Module, RiskLevel, RiskResponse};
pub use store::{ProfileStore, SessionStore};
