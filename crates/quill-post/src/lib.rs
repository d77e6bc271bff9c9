//! Post lifecycle and storage resolution for a Micropub-style endpoint.
//!
//! Submissions are classified into a post type, given a slug and a
//! date-bucketed location, and stored as JSON documents under one of several
//! configured destinations.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use quill_post::{
//!     Destination, DestinationRegistry, PostFactory, PostLifecycle, PostTypeDiscovery,
//!     SystemClock,
//! };
//! use quill_storage::FsStore;
//!
//! let registry = DestinationRegistry::new(vec![
//!     Destination::new("blog", "Blog", "data/blog", "https://blog.example.com/")?,
//! ])?;
//! let lifecycle = PostLifecycle::new(
//!     Arc::new(FsStore::new()),
//!     Arc::new(PostTypeDiscovery),
//!     Arc::new(SystemClock),
//! );
//! let factory = PostFactory::new(registry, lifecycle);
//!
//! let post = factory.create(&serde_json::json!({"h": "entry", "content": "hello"}))?;
//! println!("{}", post.url()?);
//! ```

mod classify;
mod clock;
mod destination;
mod entry;
mod error;
mod factory;
mod kind;
mod lifecycle;
mod location;
pub mod normalize;
mod post;
pub mod properties;
pub mod slug;
mod update;

pub use classify::{Classifier, PostTypeDiscovery};
pub use clock::{Clock, FixedClock, SystemClock, format_timestamp, parse_timestamp};
pub use destination::{Destination, DestinationRegistry, DestinationSummary};
pub use entry::Entry;
pub use error::PostError;
pub use factory::PostFactory;
pub use kind::{KINDS, PostKind};
pub use lifecycle::PostLifecycle;
pub use location::Location;
pub use post::Post;
pub use properties::{EntryDocument, Properties};
pub use update::{Deletion, UpdateSpec};
