//! The post aggregate.

use std::cell::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};
use url::Url;

use crate::destination::Destination;
use crate::entry::Entry;
use crate::error::PostError;
use crate::kind::PostKind;
use crate::location::Location;
use crate::properties::{DELETED_AT, ENTRY_TYPE, EntryDocument, Properties};

/// One post: a typed document, the destination that owns it and, when
/// loaded from storage, the URL it was addressed by.
///
/// The storage path and public URL are resolved on first access and kept for
/// the lifetime of the value.
#[derive(Debug)]
pub struct Post {
    entry: Entry,
    destination: Arc<Destination>,
    original_url: Option<Url>,
    save_location: OnceCell<PathBuf>,
    absolute_url: OnceCell<Url>,
}

impl Post {
    pub(crate) fn new(entry: Entry, destination: Arc<Destination>, original_url: Option<Url>) -> Self {
        Self {
            entry,
            destination,
            original_url,
            save_location: OnceCell::new(),
            absolute_url: OnceCell::new(),
        }
    }

    pub(crate) fn into_parts(self) -> (Entry, Arc<Destination>, Option<Url>) {
        (self.entry, self.destination, self.original_url)
    }

    #[must_use]
    pub fn kind(&self) -> PostKind {
        self.entry.kind()
    }

    #[must_use]
    pub fn properties(&self) -> &Properties {
        self.entry.properties()
    }

    pub(crate) fn properties_mut(&mut self) -> &mut Properties {
        self.entry.properties_mut()
    }

    #[must_use]
    pub fn document(&self) -> &EntryDocument {
        self.entry.document()
    }

    #[must_use]
    pub fn destination(&self) -> &Arc<Destination> {
        &self.destination
    }

    /// URL this post was looked up by; `None` for freshly created posts.
    #[must_use]
    pub fn original_url(&self) -> Option<&Url> {
        self.original_url.as_ref()
    }

    /// Where this post is stored. Cached.
    pub fn path(&self) -> Result<&Path, PostError> {
        if let Some(path) = self.save_location.get() {
            return Ok(path);
        }
        let path = Location::new(&self.destination).path_for(&self.entry)?;
        Ok(self.save_location.get_or_init(|| path))
    }

    /// Public URL of this post. Cached.
    pub fn url(&self) -> Result<&Url, PostError> {
        if let Some(url) = self.absolute_url.get() {
            return Ok(url);
        }
        let url = Location::new(&self.destination).url_for(&self.entry)?;
        Ok(self.absolute_url.get_or_init(|| url))
    }

    /// Whether the resolved URL differs from the one this post was loaded by.
    pub fn url_changed(&self) -> Result<bool, PostError> {
        match &self.original_url {
            Some(original) => Ok(original != self.url()?),
            None => Ok(false),
        }
    }

    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.properties().contains(DELETED_AT)
    }

    /// External view of the post, without `entry_type`.
    ///
    /// With `only`, just `{properties}` restricted to those names; otherwise
    /// `{type, properties}`.
    #[must_use]
    pub fn source(&self, only: Option<&[String]>) -> Value {
        let mut properties = self.properties().clone();
        properties.remove(ENTRY_TYPE);

        let mut view = Map::new();
        if let Some(names) = only {
            properties.retain_names(names);
        } else {
            let kind = self.document().kind.iter().cloned().map(Value::String);
            view.insert("type".to_owned(), Value::Array(kind.collect()));
        }
        view.insert("properties".to_owned(), properties.to_value());
        Value::Object(view)
    }
}
