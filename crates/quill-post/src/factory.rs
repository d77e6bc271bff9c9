//! Destination-aware entry point for the boundary layer.

use std::sync::Arc;

use serde_json::Value;
use url::Url;

use crate::destination::{Destination, DestinationRegistry};
use crate::error::PostError;
use crate::lifecycle::PostLifecycle;
use crate::location::Location;
use crate::normalize::for_create;
use crate::post::Post;
use crate::properties::DESTINATION;
use crate::update::UpdateSpec;

/// Resolves destinations for submissions and URLs, then drives the lifecycle.
#[derive(Debug, Clone)]
pub struct PostFactory {
    registry: DestinationRegistry,
    lifecycle: PostLifecycle,
}

impl PostFactory {
    #[must_use]
    pub fn new(registry: DestinationRegistry, lifecycle: PostLifecycle) -> Self {
        Self {
            registry,
            lifecycle,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &DestinationRegistry {
        &self.registry
    }

    #[must_use]
    pub fn lifecycle(&self) -> &PostLifecycle {
        &self.lifecycle
    }

    /// Create a post from a raw submission in either create encoding.
    ///
    /// An `mp-destination` property selects the destination and is not
    /// stored; without it the default destination is used.
    ///
    /// # Errors
    ///
    /// - [`PostError::InvalidCreate`] or [`PostError::InvalidTypeHint`] for
    ///   unrecognised submissions
    /// - [`PostError::UnrecognisedDestination`] for an unknown override
    /// - anything [`PostLifecycle::create`] returns
    pub fn create(&self, submission: &Value) -> Result<Post, PostError> {
        let mut document = for_create(submission, self.lifecycle.now())?;
        let destination = match document.properties.remove(DESTINATION) {
            Some(values) => self.destination_for(values.first())?,
            None => Arc::clone(self.registry.default_destination()),
        };
        self.lifecycle.create(destination, document)
    }

    /// Load the post published at `url`.
    ///
    /// # Errors
    ///
    /// - [`PostError::InvalidUrl`] if `url` does not parse or map to a path
    /// - [`PostError::UnrecognisedDestination`] if no destination serves `url`
    /// - [`PostError::InvalidPath`] if nothing is stored for `url`
    pub fn from(&self, url: &str) -> Result<Post, PostError> {
        let parsed = Url::parse(url).map_err(|e| PostError::invalid_url(url, e))?;
        let destination = Arc::clone(self.registry.resolve_by_url(parsed.as_str())?);
        let path = Location::new(&destination).path_for_url(&parsed)?;
        self.lifecycle
            .retrieve(destination, &path, parsed)
            .map_err(|e| match e {
                PostError::NotFound(_) => PostError::InvalidPath(url.to_owned()),
                other => other,
            })
    }

    /// Apply `spec` to the post at `url`.
    pub fn update(&self, url: &str, spec: &UpdateSpec) -> Result<Post, PostError> {
        self.lifecycle.update(self.from(url)?, spec)
    }

    /// Soft-delete the post at `url`.
    pub fn delete(&self, url: &str) -> Result<Post, PostError> {
        self.lifecycle.delete(self.from(url)?)
    }

    /// Restore the soft-deleted post at `url`.
    pub fn undelete(&self, url: &str) -> Result<Post, PostError> {
        self.lifecycle.undelete(self.from(url)?)
    }

    fn destination_for(&self, uid: Option<&Value>) -> Result<Arc<Destination>, PostError> {
        let uid = match uid {
            Some(Value::String(uid)) => uid.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        self.registry.resolve_by_identifier(&uid).map(Arc::clone)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use quill_storage::{DocumentStore, MockStore};
    use serde_json::json;

    use super::*;
    use crate::classify::PostTypeDiscovery;
    use crate::clock::FixedClock;

    fn factory(store: &Arc<MockStore>) -> PostFactory {
        let registry = DestinationRegistry::new(vec![
            Destination::new("main", "Main", "/data/main", "https://example.com/").unwrap(),
            Destination::new("blog", "Blog", "/data/blog", "https://blog.example.com/").unwrap(),
        ])
        .unwrap();
        let lifecycle = PostLifecycle::new(
            Arc::clone(store) as Arc<dyn DocumentStore>,
            Arc::new(PostTypeDiscovery),
            Arc::new(FixedClock(
                Utc.with_ymd_and_hms(2019, 2, 7, 12, 34, 56).unwrap(),
            )),
        );
        PostFactory::new(registry, lifecycle)
    }

    #[test]
    fn test_create_uses_default_destination() {
        let store = Arc::new(MockStore::new());

        let post = factory(&store)
            .create(&json!({"h": "entry", "content": "hello"}))
            .unwrap();

        assert_eq!(post.destination().uid(), "main");
        assert_eq!(
            post.url().unwrap().as_str(),
            "https://example.com/notes/2019/02/07/123456"
        );
        assert!(store.document(Path::new("/data/main/notes/2019/02/07/123456.json")).is_some());
    }

    #[test]
    fn test_create_with_destination_override_strips_it() {
        let store = Arc::new(MockStore::new());

        let post = factory(&store)
            .create(&json!({"h": "entry", "content": "hello", "mp-destination": "blog"}))
            .unwrap();

        assert_eq!(post.destination().uid(), "blog");
        assert!(!post.properties().contains("mp-destination"));
        let stored = store
            .document(Path::new("/data/blog/notes/2019/02/07/123456.json"))
            .unwrap();
        assert!(stored["properties"].get("mp-destination").is_none());
    }

    #[test]
    fn test_create_with_unknown_destination() {
        let store = Arc::new(MockStore::new());

        let err = factory(&store)
            .create(&json!({"h": "entry", "content": "hello", "mp-destination": "nope"}))
            .unwrap_err();

        assert!(matches!(err, PostError::UnrecognisedDestination(uid) if uid == "nope"));
        assert!(store.writes().is_empty());
    }

    #[test]
    fn test_from_round_trips_create() {
        let store = Arc::new(MockStore::new());
        let factory = factory(&store);
        let created = factory
            .create(&json!({"h": "entry", "content": "hello", "category": ["a", "b"]}))
            .unwrap();
        let url = created.url().unwrap().to_string();

        let loaded = factory.from(&url).unwrap();

        assert_eq!(loaded.properties(), created.properties());
        assert_eq!(loaded.properties().first_str("entry_type"), Some("note"));
        assert_eq!(loaded.original_url().map(Url::as_str), Some(url.as_str()));
    }

    #[test]
    fn test_from_missing_is_invalid_path() {
        let store = Arc::new(MockStore::new());

        let err = factory(&store)
            .from("https://blog.example.com/notes/2019/02/07/000000")
            .unwrap_err();

        assert!(matches!(err, PostError::InvalidPath(url) if url.ends_with("000000")));
    }

    #[test]
    fn test_from_unknown_destination() {
        let store = Arc::new(MockStore::new());

        let err = factory(&store)
            .from("https://elsewhere.example.org/notes/1")
            .unwrap_err();

        assert!(matches!(err, PostError::UnrecognisedDestination(_)));
    }

    #[test]
    fn test_from_unparseable_url() {
        let store = Arc::new(MockStore::new());

        let err = factory(&store).from("not a url").unwrap_err();

        assert!(matches!(err, PostError::InvalidUrl { .. }));
    }

    #[test]
    fn test_delete_then_undelete_by_url() {
        let store = Arc::new(MockStore::new());
        let factory = factory(&store);
        let url = factory
            .create(&json!({"h": "entry", "content": "hello"}))
            .unwrap()
            .url()
            .unwrap()
            .to_string();

        assert!(factory.delete(&url).unwrap().is_deleted());
        assert!(factory.from(&url).unwrap().is_deleted());
        assert!(!factory.undelete(&url).unwrap().is_deleted());
        assert!(!factory.from(&url).unwrap().is_deleted());
    }
}
