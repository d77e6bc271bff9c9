//! Post type classification.

use serde_json::Value;

use crate::properties::{EntryDocument, Properties};

/// Maps a submitted or stored document to a post type name.
///
/// The returned name is looked up in [`crate::kind::KINDS`]; names without a
/// strategy surface as [`crate::PostError::UnrecognisedType`].
pub trait Classifier: Send + Sync {
    fn classify(&self, document: &EntryDocument) -> String;
}

/// IndieWeb Post Type Discovery, extended with bookmarks, reads, scrobbles
/// and check-ins.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostTypeDiscovery;

/// Property that implies a type, checked in order.
const IMPLIED: [(&str, &str); 10] = [
    ("rsvp", "rsvp"),
    ("repost-of", "repost"),
    ("like-of", "like"),
    ("in-reply-to", "reply"),
    ("bookmark-of", "bookmark"),
    ("read-of", "read"),
    ("scrobble-of", "scrobble"),
    ("checkin", "checkin"),
    ("video", "video"),
    ("photo", "photo"),
];

impl Classifier for PostTypeDiscovery {
    fn classify(&self, document: &EntryDocument) -> String {
        let properties = &document.properties;
        let kind = IMPLIED
            .iter()
            .find(|(property, _)| properties.has_values(property))
            .map_or_else(
                || if is_article(properties) { "article" } else { "note" },
                |&(_, kind)| kind,
            );
        kind.to_owned()
    }
}

/// A post is an article when it has a name that is not just the start of its content.
fn is_article(properties: &Properties) -> bool {
    let Some(name) = properties
        .first_str("name")
        .map(collapse_whitespace)
        .filter(|n| !n.is_empty())
    else {
        return false;
    };
    let content = properties
        .first("content")
        .and_then(content_text)
        .map(collapse_whitespace)
        .unwrap_or_default();
    !content.starts_with(&name)
}

/// Plain text of a `content` value, either a string or `{value, html}`.
fn content_text(value: &Value) -> Option<&str> {
    match value {
        Value::String(text) => Some(text),
        Value::Object(map) => map
            .get("value")
            .or_else(|| map.get("html"))
            .and_then(Value::as_str),
        _ => None,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn classify(pairs: &[(&str, Value)]) -> String {
        let properties = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), vec![v.clone()]))
            .collect();
        PostTypeDiscovery.classify(&EntryDocument::new(properties))
    }

    #[test]
    fn test_note() {
        assert_eq!(classify(&[("content", json!("hello world"))]), "note");
    }

    #[test]
    fn test_article() {
        assert_eq!(
            classify(&[
                ("name", json!("A Title")),
                ("content", json!("Some body text."))
            ]),
            "article"
        );
    }

    #[test]
    fn test_name_prefix_of_content_is_note() {
        assert_eq!(
            classify(&[
                ("name", json!("hello  world")),
                ("content", json!({"value": "hello world and more", "html": "<p>hello</p>"}))
            ]),
            "note"
        );
    }

    #[test]
    fn test_name_without_content_is_article() {
        assert_eq!(classify(&[("name", json!("Title only"))]), "article");
    }

    #[test]
    fn test_implied_types() {
        assert_eq!(classify(&[("in-reply-to", json!("https://a.example/"))]), "reply");
        assert_eq!(classify(&[("bookmark-of", json!("https://a.example/"))]), "bookmark");
        assert_eq!(classify(&[("read-of", json!("https://a.example/"))]), "read");
        assert_eq!(classify(&[("scrobble-of", json!({}))]), "scrobble");
        assert_eq!(classify(&[("checkin", json!({}))]), "checkin");
        assert_eq!(classify(&[("photo", json!("https://a.example/p.jpg"))]), "photo");
        assert_eq!(classify(&[("like-of", json!("https://a.example/"))]), "like");
    }

    #[test]
    fn test_order_prefers_repost_over_photo() {
        assert_eq!(
            classify(&[
                ("photo", json!("https://a.example/p.jpg")),
                ("repost-of", json!("https://a.example/"))
            ]),
            "repost"
        );
    }
}
