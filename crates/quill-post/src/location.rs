//! Mapping between posts, storage paths and public URLs.
//!
//! On disk a post lives at `<directory>/<type-dir>/<date>/<slug>.json`; its
//! public URL is `<base_url><type-dir>/<date>/<slug>`. Both share the same
//! relative structure, which is what lets [`Location::path_for_url`] invert
//! the URL without knowing the post's type.

use std::borrow::Cow;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use url::Url;

use crate::destination::Destination;
use crate::entry::Entry;
use crate::error::PostError;

/// Location resolver for one destination.
#[derive(Debug, Clone, Copy)]
pub struct Location<'a> {
    destination: &'a Destination,
}

impl<'a> Location<'a> {
    #[must_use]
    pub fn new(destination: &'a Destination) -> Self {
        Self { destination }
    }

    /// Storage path of `entry`.
    pub fn path_for(&self, entry: &Entry) -> Result<PathBuf, PostError> {
        let file = format!("{}.json", entry.slug()?);
        Ok(self.destination.directory().join(entry.path()?).join(file))
    }

    /// Public URL of `entry`.
    pub fn url_for(&self, entry: &Entry) -> Result<Url, PostError> {
        let base = self.destination.base_url();
        let directory = format!("{}/", entry.path()?);
        let slug = entry.slug()?;
        base.join(&directory)
            .and_then(|u| u.join(slug))
            .map_err(|e| PostError::invalid_url(base.as_str(), e))
    }

    /// Storage path for a post addressed only by `url`.
    ///
    /// The destination's own base path is stripped, the last segment loses
    /// any extension and gains `.json`.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::InvalidUrl`] if the URL has no path segments past
    /// the base, or a segment would escape the destination directory.
    pub fn path_for_url(&self, url: &Url) -> Result<PathBuf, PostError> {
        let base = decoded_segments(self.destination.base_url())?;
        let mut segments = decoded_segments(url)?;
        if segments.starts_with(&base) {
            segments.drain(..base.len());
        }

        if let Some(bad) = segments
            .iter()
            .find(|s| *s == "." || *s == ".." || s.contains(['/', '\\']))
        {
            return Err(PostError::invalid_url(
                url.as_str(),
                format!("illegal path segment '{bad}'"),
            ));
        }
        let Some(last) = segments.pop() else {
            return Err(PostError::invalid_url(url.as_str(), "does not address a post"));
        };

        let stem = Path::new(&last)
            .file_stem()
            .and_then(OsStr::to_str)
            .unwrap_or(&last);
        let mut path = self.destination.directory().to_path_buf();
        path.extend(&segments);
        path.push(format!("{stem}.json"));
        Ok(path)
    }
}

fn decoded_segments(url: &Url) -> Result<Vec<String>, PostError> {
    let Some(segments) = url.path_segments() else {
        return Err(PostError::invalid_url(url.as_str(), "URL has no path"));
    };
    segments
        .filter(|s| !s.is_empty())
        .map(|s| {
            percent_decode_str(s)
                .decode_utf8()
                .map(Cow::into_owned)
                .map_err(|e| PostError::invalid_url(url.as_str(), e))
        })
        .collect()
}
