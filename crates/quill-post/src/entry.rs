//! A post-type strategy bound to one document.

use std::cell::OnceCell;

use chrono::{DateTime, FixedOffset, Utc};
use serde_json::Value;

use crate::clock::parse_timestamp;
use crate::error::PostError;
use crate::kind::PostKind;
use crate::properties::{ENTRY_TYPE, EntryDocument, PUBLISHED, Properties, SLUG};
use crate::slug::normalize;

/// A typed post document.
///
/// The slug and path fragment are computed on first access and then kept for
/// the lifetime of the value, even if properties change afterwards. Rename
/// detection relies on this: a post loaded from storage remembers where it
/// was, while a fresh [`Entry`] over the updated document says where it goes.
#[derive(Debug)]
pub struct Entry {
    kind: PostKind,
    document: EntryDocument,
    now: DateTime<Utc>,
    slug: OnceCell<String>,
    path: OnceCell<String>,
}

impl Entry {
    /// Bind `kind` to `document`, recording the type in `entry_type`.
    ///
    /// `now` stands in for a missing `published` timestamp.
    #[must_use]
    pub fn new(kind: PostKind, mut document: EntryDocument, now: DateTime<Utc>) -> Self {
        document.properties.set_str(ENTRY_TYPE, kind.name());
        Self {
            kind,
            document,
            now,
            slug: OnceCell::new(),
            path: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> PostKind {
        self.kind
    }

    #[must_use]
    pub fn document(&self) -> &EntryDocument {
        &self.document
    }

    #[must_use]
    pub fn properties(&self) -> &Properties {
        &self.document.properties
    }

    /// Mutable properties. Does not affect an already-computed slug or path.
    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.document.properties
    }

    pub(crate) fn into_document(self) -> EntryDocument {
        self.document
    }

    /// Publication time, in the offset it was written with.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::InvalidPublished`] if `published` is present but
    /// not a parseable timestamp.
    pub fn published(&self) -> Result<DateTime<FixedOffset>, PostError> {
        match self.document.properties.first(PUBLISHED) {
            None => Ok(self.now.fixed_offset()),
            Some(Value::String(value)) => {
                parse_timestamp(value).ok_or_else(|| PostError::InvalidPublished(value.clone()))
            }
            Some(other) => Err(PostError::InvalidPublished(other.to_string())),
        }
    }

    /// Relative directory for this post, e.g. `notes/2019/02/07`. Cached.
    pub fn path(&self) -> Result<&str, PostError> {
        if let Some(path) = self.path.get() {
            return Ok(path);
        }
        let path = self.kind.path_fragment(&self.published()?);
        Ok(self.path.get_or_init(|| path))
    }

    /// URL-safe slug. Cached.
    ///
    /// The first of these wins: a usable `mp-slug`, the type's content-derived
    /// slug, then the publication time as `HHMMSS`.
    pub fn slug(&self) -> Result<&str, PostError> {
        if let Some(slug) = self.slug.get() {
            return Ok(slug);
        }
        let slug = self.derive_slug()?;
        Ok(self.slug.get_or_init(|| slug))
    }

    fn derive_slug(&self) -> Result<String, PostError> {
        let properties = &self.document.properties;
        if let Some(slug) = properties.first_str(SLUG).and_then(normalize) {
            return Ok(slug);
        }
        let published = self.published()?;
        if let Some(slug) = self.kind.content_slug(properties, &published) {
            return Ok(slug);
        }
        Ok(published.format("%H%M%S").to_string())
    }
}
