//! Unified error types for the kra library.
//!
//! This module provides the single error type surfaced by every decoding
//! operation, together with conversions from the XML and ZIP crates.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
