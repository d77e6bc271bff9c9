//! Normalization of create submissions.
//!
//! Two encodings are accepted: the form-encoded shorthand with an `h` key,
//! and the JSON shape with `type` and `properties`.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::clock::format_timestamp;
use crate::error::PostError;
use crate::properties::{EntryDocument, PUBLISHED, Properties};

/// Normalize a create submission into an `h-entry` document.
///
/// Every property value becomes a sequence, and `published` is set to `now`
/// if the submission has none.
///
/// # Errors
///
/// - [`PostError::InvalidTypeHint`] if `h` is not `entry` or the first `type`
///   is not `h-entry`
/// - [`PostError::InvalidCreate`] if the submission matches neither encoding
pub fn for_create(submission: &Value, now: DateTime<Utc>) -> Result<EntryDocument, PostError> {
    let Value::Object(data) = submission else {
        return Err(PostError::InvalidCreate);
    };

    let mut properties = if let Some(h) = data.get("h") {
        if h.as_str() != Some("entry") {
            return Err(PostError::InvalidTypeHint(hint(h)));
        }
        data.iter()
            .filter(|(key, _)| *key != "h")
            .map(|(key, value)| (key.clone(), into_values(value)))
            .collect::<Properties>()
    } else if let Some(submitted) = data.get("properties") {
        let first_type = data
            .get("type")
            .and_then(Value::as_array)
            .and_then(|types| types.first());
        if first_type.and_then(Value::as_str) != Some("h-entry") {
            return Err(PostError::InvalidTypeHint(
                first_type.map(hint).unwrap_or_default(),
            ));
        }
        let Value::Object(submitted) = submitted else {
            return Err(PostError::InvalidCreate);
        };
        submitted
            .iter()
            .map(|(key, value)| (key.clone(), into_values(value)))
            .collect::<Properties>()
    } else {
        return Err(PostError::InvalidCreate);
    };

    if !properties.has_values(PUBLISHED) {
        properties.set_str(PUBLISHED, format_timestamp(now));
    }
    Ok(EntryDocument::new(properties))
}

fn into_values(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(values) => values.clone(),
        other => vec![other.clone()],
    }
}

fn hint(value: &Value) -> String {
    value
        .as_str()
        .map_or_else(|| value.to_string(), str::to_owned)
}
