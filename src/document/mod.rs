//! Saved-object documents.
//!
//! A saved object is kept as a schema-tolerant [`serde_json::Value`]; fields
//! come and go between schema generations, so every read goes through the
//! optional accessors in [`access`] and never panics on a missing or
//! mistyped key.
pub mod access;
pub mod decode;

pub use access::{lookup, lookup_mut, lookup_str};
pub use decode::normalize_document;
