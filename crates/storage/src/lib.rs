//! Storage layer for Murmur
//!
//! This crate provides the document store backing the engagement graph:
//! typed collections over an embedded sled database, keyed by opaque
//! string identifiers.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod documents;

pub use documents::{Collection, DocumentConfig, DocumentStore, StorageError};
