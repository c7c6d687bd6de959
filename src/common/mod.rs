//! Common types and utilities shared by the Krita decoders.
//!
//! This module provides the unified error type and the XML document model
//! used by the main document and key frame parsers.

// Submodule declarations
pub mod error;
pub mod xml;

// Re-exports for convenience
pub use error::{Error, Result};
