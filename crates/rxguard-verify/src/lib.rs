//! # rxguard-verify
//!
//! The typed parse/validate boundary in front of the RXGUARD engine.
//!
//! Drafts and patient profiles arrive as JSON. [`BoundaryVerifier`] checks
//! them against a JSON Schema, reporting every violation at once, and only
//! then decodes them into `rxguard-contracts` types.

pub mod boundary;
pub mod schema;

pub use boundary::{load_json, BoundaryVerifier, DocumentKind};
