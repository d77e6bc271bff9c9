//! JSON document storage for the Quill publishing endpoint.
//!
//! This crate provides a [`DocumentStore`] trait for reading, writing and
//! removing post documents independently of the backend. This enables:
//!
//! - **Unit testing** of the post lifecycle without touching the filesystem
//! - **Clean separation** between location resolution and I/O
//!
//! # Architecture
//!
//! The crate provides:
//! - [`DocumentStore`] trait with `read()`, `write()`, `delete()` and `exists()`
//! - [`FsStore`] for one pretty-printed JSON file per document
//! - [`MockStore`] for testing (behind `mock` feature flag)
//!
//! A missing document is always reported as [`StorageErrorKind::NotFound`],
//! distinct from every other I/O failure.

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use fs::FsStore;
#[cfg(feature = "mock")]
pub use mock::MockStore;
pub use storage::{DocumentStore, JsonObject, StorageError, StorageErrorKind};
