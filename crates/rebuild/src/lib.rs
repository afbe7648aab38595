//! Resumable index construction: turns a [`DocumentSource`] into populated
//! SimHash and winnowing indices, one document at a time, atomically.
//!
//! This crate owns none of the documents it indexes — `rebuild` depends on
//! [`DocumentSource`] rather than any particular store, the same way
//! `matcher` depends on `DocumentMetadataProvider` rather than owning
//! document metadata.

pub mod builder;
pub mod config;
pub mod error;
pub mod source;

pub use builder::{IndexBuilder, RebuildStats};
pub use config::RebuildConfig;
pub use error::RebuildError;
pub use source::{DocumentRecord, DocumentSource};
