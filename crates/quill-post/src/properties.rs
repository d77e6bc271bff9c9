//! Post properties and the stored document shape.
//!
//! Every property maps to an ordered sequence of values, never a bare scalar;
//! [`Properties`] enforces that in its type.

use std::collections::BTreeMap;
use std::path::Path;

use quill_storage::{JsonObject, StorageError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Mirrors the classified post type. Persisted, hidden from source views.
pub const ENTRY_TYPE: &str = "entry_type";
/// Publication timestamp (ISO-8601).
pub const PUBLISHED: &str = "published";
/// Set on every update.
pub const UPDATED_AT: &str = "updated_at";
/// Presence marks a soft-deleted post.
pub const DELETED_AT: &str = "deleted_at";
/// Explicit slug override.
pub const SLUG: &str = "mp-slug";
/// Explicit destination override.
pub const DESTINATION: &str = "mp-destination";

/// Mapping from property name to its ordered values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, Vec<Value>>);

impl Properties {
    /// Create an empty property set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Values of `name`, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[Value]> {
        self.0.get(name).map(Vec::as_slice)
    }

    /// First value of `name`, if present.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&Value> {
        self.0.get(name)?.first()
    }

    /// First value of `name` when it is a string.
    #[must_use]
    pub fn first_str(&self, name: &str) -> Option<&str> {
        self.first(name)?.as_str()
    }

    /// Whether `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Whether `name` is present with at least one value.
    #[must_use]
    pub fn has_values(&self, name: &str) -> bool {
        self.0.get(name).is_some_and(|v| !v.is_empty())
    }

    /// Replace the values of `name` wholesale.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<Value>) {
        self.0.insert(name.into(), values);
    }

    /// Set `name` to a single string value.
    pub fn set_str(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.insert(name, vec![Value::String(value.into())]);
    }

    /// Append `values` to `name`, starting from an empty sequence if absent.
    pub fn append(&mut self, name: &str, values: &[Value]) {
        self.0
            .entry(name.to_owned())
            .or_default()
            .extend_from_slice(values);
    }

    /// Remove `name` entirely, returning its values.
    pub fn remove(&mut self, name: &str) -> Option<Vec<Value>> {
        self.0.remove(name)
    }

    /// Remove every occurrence of `values` from `name`; drop `name` if nothing remains.
    pub fn remove_values(&mut self, name: &str, values: &[Value]) {
        let Some(current) = self.0.get_mut(name) else {
            return;
        };
        current.retain(|v| !values.contains(v));
        if current.is_empty() {
            self.0.remove(name);
        }
    }

    /// Keep only the properties named in `names`.
    pub fn retain_names(&mut self, names: &[String]) {
        self.0.retain(|k, _| names.contains(k));
    }

    /// JSON object form.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), Value::Array(v.clone())))
                .collect(),
        )
    }
}

impl FromIterator<(String, Vec<Value>)> for Properties {
    fn from_iter<T: IntoIterator<Item = (String, Vec<Value>)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn default_kind() -> Vec<String> {
    vec!["h-entry".to_owned()]
}

/// One stored post: `type`, `properties`, and any other keys passed through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDocument {
    /// Microformats type, e.g. `["h-entry"]`.
    #[serde(rename = "type", default = "default_kind")]
    pub kind: Vec<String>,
    /// Post properties.
    #[serde(default)]
    pub properties: Properties,
    /// Opaque top-level keys.
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl EntryDocument {
    /// An `h-entry` document with the given properties.
    #[must_use]
    pub fn new(properties: Properties) -> Self {
        Self {
            kind: default_kind(),
            properties,
            extra: JsonObject::new(),
        }
    }

    /// Decode a stored JSON object read from `path`.
    ///
    /// # Errors
    ///
    /// Returns an invalid-document [`StorageError`] if the object does not
    /// have the expected shape (e.g. a property that is not an array).
    pub fn from_object(object: JsonObject, path: &Path) -> Result<Self, StorageError> {
        serde_json::from_value(Value::Object(object))
            .map_err(|e| StorageError::invalid_document(e, path))
    }

    /// Encode as a JSON object for storage.
    #[must_use]
    pub fn to_object(&self) -> JsonObject {
        let mut object = self.extra.clone();
        object.insert(
            "type".to_owned(),
            Value::Array(self.kind.iter().cloned().map(Value::String).collect()),
        );
        object.insert("properties".to_owned(), self.properties.to_value());
        object
    }
}
