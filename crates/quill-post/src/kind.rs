//! Post-type strategies.
//!
//! Each [`PostKind`] decides three things about a post: the directory it is
//! filed under, how finely `published` buckets it by date, and whether its
//! content yields a slug. Dispatch from a classifier's type name goes through
//! the [`KINDS`] table.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde_json::Value;

use crate::properties::Properties;
use crate::slug::normalize;

/// A post type with a storage strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostKind {
    Article,
    Bookmark,
    Checkin,
    Note,
    Photo,
    Read,
    Reply,
    Repost,
    Scrobble,
}

/// Type name to strategy lookup table.
pub const KINDS: [(&str, PostKind); 9] = [
    ("article", PostKind::Article),
    ("bookmark", PostKind::Bookmark),
    ("checkin", PostKind::Checkin),
    ("note", PostKind::Note),
    ("photo", PostKind::Photo),
    ("read", PostKind::Read),
    ("reply", PostKind::Reply),
    ("repost", PostKind::Repost),
    ("scrobble", PostKind::Scrobble),
];

impl PostKind {
    /// Look up the strategy for a classifier type name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        KINDS
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|&(_, kind)| kind)
    }

    /// Type name, as stored in `entry_type`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Bookmark => "bookmark",
            Self::Checkin => "checkin",
            Self::Note => "note",
            Self::Photo => "photo",
            Self::Read => "read",
            Self::Reply => "reply",
            Self::Repost => "repost",
            Self::Scrobble => "scrobble",
        }
    }

    /// Sub-directory this type is filed under.
    #[must_use]
    pub fn directory(self) -> &'static str {
        match self {
            Self::Article => "articles",
            Self::Bookmark => "bookmarks",
            Self::Checkin => "checkins",
            Self::Note => "notes",
            Self::Photo => "photos",
            Self::Read => "reading",
            Self::Reply => "replies",
            Self::Repost => "reposts",
            Self::Scrobble => "scrobbles",
        }
    }

    /// `strftime` pattern for the date fragment.
    ///
    /// Reading-log entries bucket by month, everything else by day.
    #[must_use]
    pub fn date_format(self) -> &'static str {
        match self {
            Self::Read => "%Y/%m",
            _ => "%Y/%m/%d",
        }
    }

    /// Relative path fragment, e.g. `notes/2019/02/07`.
    #[must_use]
    pub fn path_fragment(self, published: &DateTime<FixedOffset>) -> String {
        format!("{}/{}", self.directory(), published.format(self.date_format()))
    }

    /// Slug derived from the post's content, if this type has such a rule
    /// and the content normalizes to something usable.
    #[must_use]
    pub fn content_slug(
        self,
        properties: &Properties,
        published: &DateTime<FixedOffset>,
    ) -> Option<String> {
        match self {
            Self::Article => normalize(properties.first_str("name")?),
            Self::Read => {
                let title = properties
                    .first("read-of")?
                    .pointer("/properties/name/0")?
                    .as_str()?;
                // Drop any subtitle.
                normalize(title.split(':').next().unwrap_or(title))
            }
            Self::Scrobble => {
                let cited = properties.first("scrobble-of")?.get("properties")?;
                let time = published.format("%H%M%S").to_string();
                let mut parts: Vec<&str> = ["artist", "title"]
                    .iter()
                    .filter_map(|key| cited.get(*key).and_then(Value::as_array))
                    .flatten()
                    .filter_map(Value::as_str)
                    .collect();
                parts.push(&time);
                normalize(&parts.join("-"))
            }
            _ => None,
        }
    }
}

impl fmt::Display for PostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
