//! Partial updates.

use serde_json::{Map, Value};

use crate::error::PostError;
use crate::properties::Properties;

/// A validated update: `replace`, then `add`, then `delete`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSpec {
    pub replace: Vec<(String, Vec<Value>)>,
    pub add: Vec<(String, Vec<Value>)>,
    pub delete: Option<Deletion>,
}

/// The `delete` section of an update.
#[derive(Debug, Clone, PartialEq)]
pub enum Deletion {
    /// Remove these properties entirely.
    Properties(Vec<String>),
    /// Remove these values; a property left empty is removed.
    Values(Vec<(String, Vec<Value>)>),
}

impl UpdateSpec {
    /// Parse and validate an update object.
    ///
    /// Every section is checked before anything is applied, so a malformed
    /// update never leaves a post half-modified.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::InvalidUpdate`] if the update is not an object or
    /// any present section has the wrong shape.
    pub fn from_value(value: &Value) -> Result<Self, PostError> {
        let Value::Object(sections) = value else {
            return Err(PostError::InvalidUpdate("update must be an object".to_owned()));
        };
        let mut spec = Self::default();
        if let Some(replace) = sections.get("replace") {
            spec.replace = value_lists("replace", replace)?;
        }
        if let Some(add) = sections.get("add") {
            spec.add = value_lists("add", add)?;
        }
        if let Some(delete) = sections.get("delete") {
            spec.delete = Some(Deletion::from_value(delete)?);
        }
        Ok(spec)
    }

    /// Apply to `properties` in replace, add, delete order.
    pub fn apply(&self, properties: &mut Properties) {
        for (name, values) in &self.replace {
            properties.insert(name.clone(), values.clone());
        }
        for (name, values) in &self.add {
            properties.append(name, values);
        }
        match &self.delete {
            Some(Deletion::Properties(names)) => {
                for name in names {
                    properties.remove(name);
                }
            }
            Some(Deletion::Values(removals)) => {
                for (name, values) in removals {
                    properties.remove_values(name, values);
                }
            }
            None => {}
        }
    }
}

impl Deletion {
    fn from_value(value: &Value) -> Result<Self, PostError> {
        match value {
            Value::Array(names) => names
                .iter()
                .map(|name| {
                    name.as_str().map(str::to_owned).ok_or_else(|| {
                        PostError::InvalidUpdate(format!(
                            "'delete' property names must be strings, got {name}"
                        ))
                    })
                })
                .collect::<Result<_, _>>()
                .map(Self::Properties),
            Value::Object(_) => value_lists("delete", value).map(Self::Values),
            _ => Err(PostError::InvalidUpdate(
                "'delete' must be an array or an object".to_owned(),
            )),
        }
    }
}

fn value_lists(section: &str, value: &Value) -> Result<Vec<(String, Vec<Value>)>, PostError> {
    let Value::Object(map) = value else {
        return Err(PostError::InvalidUpdate(format!("'{section}' must be an object")));
    };
    map_of_arrays(section, map)
}

fn map_of_arrays(
    section: &str,
    map: &Map<String, Value>,
) -> Result<Vec<(String, Vec<Value>)>, PostError> {
    map.iter()
        .map(|(name, values)| match values {
            Value::Array(values) => Ok((name.clone(), values.clone())),
            _ => Err(PostError::InvalidUpdate(format!(
                "'{section}.{name}' must be an array"
            ))),
        })
        .collect()
}
