//! Create, retrieve, update, delete and undelete transitions.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use quill_storage::DocumentStore;
use url::Url;

use crate::classify::Classifier;
use crate::clock::{Clock, format_timestamp};
use crate::destination::Destination;
use crate::entry::Entry;
use crate::error::PostError;
use crate::kind::PostKind;
use crate::location::Location;
use crate::post::Post;
use crate::properties::{DELETED_AT, EntryDocument, UPDATED_AT};
use crate::update::UpdateSpec;

/// Drives posts through their lifecycle against a document store.
///
/// Holds no per-post state; every call is one transition.
#[derive(Clone)]
pub struct PostLifecycle {
    store: Arc<dyn DocumentStore>,
    classifier: Arc<dyn Classifier>,
    clock: Arc<dyn Clock>,
}

impl PostLifecycle {
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        classifier: Arc<dyn Classifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            classifier,
            clock,
        }
    }

    /// Current time from the configured clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Classify `document` and store it as a new post in `destination`.
    ///
    /// # Errors
    ///
    /// - [`PostError::UnrecognisedType`] if the classified type has no strategy
    /// - [`PostError::DuplicateCreate`] if a document already exists at the
    ///   derived path; nothing is written
    pub fn create(
        &self,
        destination: Arc<Destination>,
        document: EntryDocument,
    ) -> Result<Post, PostError> {
        let post = Post::new(self.entry(document)?, destination, None);
        let path = post.path()?;
        if self.store.exists(path) {
            return Err(PostError::DuplicateCreate(path.to_path_buf()));
        }
        self.save(&post)?;

        tracing::info!(
            kind = %post.kind(),
            url = %post.url()?,
            path = %path.display(),
            "Created post"
        );
        Ok(post)
    }

    /// Load the post stored at `path`, remembering it was addressed by `url`.
    ///
    /// # Errors
    ///
    /// - [`PostError::NotFound`] if nothing is stored at `path`
    /// - [`PostError::UnrecognisedType`] if the stored type has no strategy
    pub fn retrieve(
        &self,
        destination: Arc<Destination>,
        path: &Path,
        url: Url,
    ) -> Result<Post, PostError> {
        let object = self.store.read(path).map_err(|e| {
            if e.is_not_found() {
                PostError::NotFound(path.to_path_buf())
            } else {
                PostError::Storage(e)
            }
        })?;
        let document = EntryDocument::from_object(object, path)?;
        Ok(Post::new(self.entry(document)?, destination, Some(url)))
    }

    /// Apply `spec`, stamp `updated_at` and save.
    ///
    /// The returned post resolves its location from the updated properties.
    /// When that yields a different URL from the one the post was loaded by,
    /// the document at the old location is removed. A document already stored
    /// at the new location is overwritten.
    pub fn update(&self, post: Post, spec: &UpdateSpec) -> Result<Post, PostError> {
        let (entry, destination, original_url) = post.into_parts();
        let kind = entry.kind();
        let mut document = entry.into_document();
        spec.apply(&mut document.properties);
        document
            .properties
            .set_str(UPDATED_AT, format_timestamp(self.now()));

        let updated = Post::new(
            Entry::new(kind, document, self.now()),
            destination,
            original_url,
        );
        self.save(&updated)?;
        tracing::info!(url = %updated.url()?, "Updated post");

        if updated.url_changed()?
            && let Some(original) = updated.original_url()
        {
            let old = Location::new(updated.destination()).path_for_url(original)?;
            if old != updated.path()? {
                self.store.delete(&old)?;
                tracing::info!(
                    from = %original,
                    to = %updated.url()?,
                    "Renamed post"
                );
            }
        }
        Ok(updated)
    }

    /// Soft-delete: set `deleted_at` to now and save.
    ///
    /// Repeating this refreshes the timestamp.
    pub fn delete(&self, mut post: Post) -> Result<Post, PostError> {
        let now = format_timestamp(self.now());
        post.properties_mut().set_str(DELETED_AT, now);
        self.save(&post)?;
        tracing::info!(url = %post.url()?, "Deleted post");
        Ok(post)
    }

    /// Remove `deleted_at`, if any, and save.
    pub fn undelete(&self, mut post: Post) -> Result<Post, PostError> {
        post.properties_mut().remove(DELETED_AT);
        self.save(&post)?;
        tracing::info!(url = %post.url()?, "Undeleted post");
        Ok(post)
    }

    fn entry(&self, document: EntryDocument) -> Result<Entry, PostError> {
        let name = self.classifier.classify(&document);
        let kind = PostKind::from_name(&name).ok_or(PostError::UnrecognisedType(name))?;
        Ok(Entry::new(kind, document, self.now()))
    }

    fn save(&self, post: &Post) -> Result<(), PostError> {
        self.store
            .write(post.path()?, &post.document().to_object())?;
        Ok(())
    }
}

impl std::fmt::Debug for PostLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostLifecycle").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use quill_storage::{JsonObject, MockStore};
    use serde_json::{Value, json};

    use super::*;
    use crate::classify::PostTypeDiscovery;
    use crate::clock::FixedClock;
    use crate::normalize::for_create;

    struct Fixed(&'static str);

    impl Classifier for Fixed {
        fn classify(&self, _document: &EntryDocument) -> String {
            self.0.to_owned()
        }
    }

    fn destination() -> Arc<Destination> {
        Arc::new(Destination::new("site", "Site", "/data", "https://example.com/").unwrap())
    }

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock(Utc.with_ymd_and_hms(2019, 2, 8, 9, 0, 0).unwrap()))
    }

    fn lifecycle(store: &Arc<MockStore>) -> PostLifecycle {
        PostLifecycle::new(
            Arc::clone(store) as Arc<dyn DocumentStore>,
            Arc::new(PostTypeDiscovery),
            clock(),
        )
    }

    fn document(submission: &Value) -> EntryDocument {
        for_create(submission, clock().now()).unwrap()
    }

    fn object(value: Value) -> JsonObject {
        match value {
            Value::Object(object) => object,
            _ => unreachable!(),
        }
    }

    fn article() -> EntryDocument {
        document(&json!({
            "h": "entry",
            "name": "Hello World",
            "content": "Body",
            "published": "2019-02-07T12:34:56Z"
        }))
    }

    #[test]
    fn test_create_writes_document() {
        let store = Arc::new(MockStore::new());

        let post = lifecycle(&store).create(destination(), article()).unwrap();

        let path = PathBuf::from("/data/articles/2019/02/07/hello-world.json");
        assert_eq!(post.path().unwrap(), path);
        assert_eq!(
            post.url().unwrap().as_str(),
            "https://example.com/articles/2019/02/07/hello-world"
        );
        let stored = store.document(&path).unwrap();
        assert_eq!(stored["properties"]["entry_type"], json!(["article"]));
        assert_eq!(stored["type"], json!(["h-entry"]));
    }

    #[test]
    fn test_create_duplicate_is_rejected_without_write() {
        let path = PathBuf::from("/data/articles/2019/02/07/hello-world.json");
        let store = Arc::new(MockStore::new().with_document(&path, JsonObject::new()));

        let err = lifecycle(&store)
            .create(destination(), article())
            .unwrap_err();

        assert!(matches!(err, PostError::DuplicateCreate(p) if p == path));
        assert!(store.writes().is_empty());
    }

    #[test]
    fn test_create_unrecognised_type() {
        let store = Arc::new(MockStore::new());
        let lifecycle = PostLifecycle::new(
            Arc::clone(&store) as Arc<dyn DocumentStore>,
            Arc::new(Fixed("rsvp")),
            clock(),
        );

        let err = lifecycle.create(destination(), article()).unwrap_err();

        assert!(matches!(err, PostError::UnrecognisedType(t) if t == "rsvp"));
    }

    #[test]
    fn test_create_storage_failure_propagates() {
        let store = Arc::new(MockStore::new());
        store.fail_writes(true);

        let err = lifecycle(&store)
            .create(destination(), article())
            .unwrap_err();

        assert!(matches!(err, PostError::Storage(_)));
    }

    #[test]
    fn test_retrieve_missing_is_not_found() {
        let store = Arc::new(MockStore::new());
        let url = Url::parse("https://example.com/notes/1").unwrap();

        let err = lifecycle(&store)
            .retrieve(destination(), Path::new("/data/notes/1.json"), url)
            .unwrap_err();

        assert!(matches!(err, PostError::NotFound(_)));
    }

    #[test]
    fn test_retrieve_sets_original_url() {
        let path = PathBuf::from("/data/notes/2019/02/07/123456.json");
        let stored = object(json!({
            "type": ["h-entry"],
            "properties": {"content": ["hi"], "published": ["2019-02-07T12:34:56Z"]}
        }));
        let store = Arc::new(MockStore::new().with_document(&path, stored));
        let url = Url::parse("https://example.com/notes/2019/02/07/123456").unwrap();

        let post = lifecycle(&store)
            .retrieve(destination(), &path, url.clone())
            .unwrap();

        assert_eq!(post.original_url(), Some(&url));
        assert_eq!(post.kind(), PostKind::Note);
        assert!(!post.url_changed().unwrap());
    }

    #[test]
    fn test_update_renames() {
        let store = Arc::new(MockStore::new());
        let lifecycle = lifecycle(&store);
        let created = lifecycle.create(destination(), article()).unwrap();
        let old_path = created.path().unwrap().to_path_buf();
        let url = created.url().unwrap().clone();
        let post = lifecycle.retrieve(destination(), &old_path, url).unwrap();
        let spec = UpdateSpec::from_value(&json!({"replace": {"name": ["Goodbye"]}})).unwrap();

        let updated = lifecycle.update(post, &spec).unwrap();

        assert!(updated.url_changed().unwrap());
        assert_eq!(
            updated.path().unwrap(),
            Path::new("/data/articles/2019/02/07/goodbye.json")
        );
        assert!(store.document(&old_path).is_none());
        let stored = store.document(updated.path().unwrap()).unwrap();
        assert_eq!(stored["properties"]["updated_at"], json!(["2019-02-08T09:00:00Z"]));
    }

    #[test]
    fn test_update_rename_onto_taken_slug_overwrites() {
        let taken = PathBuf::from("/data/articles/2019/02/07/goodbye.json");
        let store = Arc::new(
            MockStore::new().with_document(&taken, object(json!({"properties": {"name": ["Other"]}}))),
        );
        let lifecycle = lifecycle(&store);
        let created = lifecycle.create(destination(), article()).unwrap();
        let old_path = created.path().unwrap().to_path_buf();
        let url = created.url().unwrap().clone();
        let post = lifecycle.retrieve(destination(), &old_path, url).unwrap();
        let spec = UpdateSpec::from_value(&json!({"replace": {"name": ["Goodbye"]}})).unwrap();

        let updated = lifecycle.update(post, &spec).unwrap();

        assert_eq!(updated.path().unwrap(), taken);
        assert!(store.document(&old_path).is_none());
        let stored = store.document(&taken).unwrap();
        assert_eq!(stored["properties"]["name"], json!(["Goodbye"]));
        assert_eq!(stored["properties"]["content"], json!(["Body"]));
    }

    #[test]
    fn test_update_in_place_keeps_document() {
        let store = Arc::new(MockStore::new());
        let lifecycle = lifecycle(&store);
        let created = lifecycle.create(destination(), article()).unwrap();
        let path = created.path().unwrap().to_path_buf();
        let url = created.url().unwrap().clone();
        let post = lifecycle.retrieve(destination(), &path, url).unwrap();
        let spec = UpdateSpec::from_value(&json!({"add": {"category": ["x"]}})).unwrap();

        let updated = lifecycle.update(post, &spec).unwrap();

        assert!(!updated.url_changed().unwrap());
        let stored = store.document(&path).unwrap();
        assert_eq!(stored["properties"]["category"], json!(["x"]));
    }

    #[test]
    fn test_update_with_extension_url_does_not_delete_itself() {
        let store = Arc::new(MockStore::new());
        let lifecycle = lifecycle(&store);
        let created = lifecycle.create(destination(), article()).unwrap();
        let path = created.path().unwrap().to_path_buf();
        let url = Url::parse("https://example.com/articles/2019/02/07/hello-world.html").unwrap();
        let post = lifecycle.retrieve(destination(), &path, url).unwrap();

        let updated = lifecycle.update(post, &UpdateSpec::default()).unwrap();

        assert!(updated.url_changed().unwrap());
        assert!(store.document(&path).is_some());
    }

    #[test]
    fn test_rename_cleanup_failure_propagates() {
        let store = Arc::new(MockStore::new());
        let lifecycle = lifecycle(&store);
        let created = lifecycle.create(destination(), article()).unwrap();
        let path = created.path().unwrap().to_path_buf();
        let stale = Url::parse("https://example.com/articles/2019/02/07/gone").unwrap();
        let post = lifecycle.retrieve(destination(), &path, stale).unwrap();

        let err = lifecycle.update(post, &UpdateSpec::default()).unwrap_err();

        assert!(matches!(err, PostError::Storage(e) if e.is_not_found()));
    }

    #[test]
    fn test_delete_and_undelete() {
        let store = Arc::new(MockStore::new());
        let lifecycle = lifecycle(&store);
        let post = lifecycle.create(destination(), article()).unwrap();
        let path = post.path().unwrap().to_path_buf();

        let post = lifecycle.delete(post).unwrap();
        assert!(post.is_deleted());
        assert_eq!(
            store.document(&path).unwrap()["properties"]["deleted_at"],
            json!(["2019-02-08T09:00:00Z"])
        );

        let post = lifecycle.undelete(post).unwrap();
        assert!(!post.is_deleted());
        let stored = store.document(&path).unwrap();
        assert!(stored["properties"].get("deleted_at").is_none());
    }

    #[test]
    fn test_undelete_when_not_deleted_still_saves() {
        let store = Arc::new(MockStore::new());
        let lifecycle = lifecycle(&store);
        let post = lifecycle.create(destination(), article()).unwrap();

        lifecycle.undelete(post).unwrap();

        assert_eq!(store.writes().len(), 2);
    }
}
