//! Structured JSON logging setup.

mod format;

pub use format::StructuredLogger;
