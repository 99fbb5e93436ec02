//! # viscensus: Kibana saved-object census
//!
//! Walks a corpus of integration packages and beats modules, finds every
//! visualization they ship (standalone or embedded in a dashboard), and
//! emits one normalized record per visualization for migration tracking.
//!
//! ## Architecture
//!
//! - **[`config`]**: Configuration loading and validation
//! - **[`document`]**: Path accessors and nested-JSON field decoding
//! - **[`dashboard`]**: Panel list resolution and the reference index
//! - **[`classify`]**: Visualization type, TSVB sub-type and title
//! - **[`walker`]**: Package and beats traversal on a rayon pool
//! - **[`manifest`]**: Package manifest loading and caching
//! - **[`ownership`]**: Owning team derived from the manifest
//! - **[`provenance`]**: Last-commit lookup via `git log`
//! - **[`record`]**: The emitted record and its enums
//! - **[`report`]**: Legacy visualization counts and diffs
//! - **[`sink`]**: Result file output
//! - **[`error`]**: Library error type

pub mod classify;
pub mod config;
pub mod dashboard;
pub mod document;
pub mod error;
pub mod manifest;
pub mod ownership;
pub mod provenance;
pub mod record;
pub mod report;
pub mod sink;
pub mod walker;
