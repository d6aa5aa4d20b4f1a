//! Utility modules.

/// Keeps secrets and oversized payloads out of logs.
pub mod log_sanitizer;
