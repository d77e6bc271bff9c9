//! Destinations and the registry that resolves them.
//!
//! A [`Destination`] pairs a storage root with a public base URL. The
//! [`DestinationRegistry`] owns the fixed, ordered set loaded at startup and
//! resolves a destination by identifier, by URL, or as the default.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use url::Url;

use crate::error::PostError;

/// One published site: a storage root plus a public base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    uid: String,
    name: String,
    directory: PathBuf,
    base_url: Url,
    default: bool,
}

impl Destination {
    /// Create a destination.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::InvalidUrl`] if `base_url` is not an absolute URL.
    /// A missing trailing slash is added.
    pub fn new(
        uid: impl Into<String>,
        name: impl Into<String>,
        directory: impl Into<PathBuf>,
        base_url: &str,
    ) -> Result<Self, PostError> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| PostError::invalid_url(base_url, e))?;
        if base_url.cannot_be_a_base() {
            return Err(PostError::invalid_url(
                base_url.as_str(),
                "cannot be used as a base URL",
            ));
        }
        // Joining relative paths onto the base must keep its last segment.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            uid: uid.into(),
            name: name.into(),
            directory: directory.into(),
            base_url,
            default: false,
        })
    }

    /// Flag (or unflag) this destination as the default.
    #[must_use]
    pub fn with_default(mut self, default: bool) -> Self {
        self.default = default;
        self
    }

    /// Identifier used by destination overrides.
    #[must_use]
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Storage root directory.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Public base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Whether this destination is explicitly flagged default.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.default
    }

    /// Public summary (`uid` and `name`).
    #[must_use]
    pub fn summary(&self) -> DestinationSummary {
        DestinationSummary {
            uid: self.uid.clone(),
            name: self.name.clone(),
        }
    }
}

/// The `{uid, name}` view of a destination exposed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DestinationSummary {
    /// Destination identifier.
    pub uid: String,
    /// Display name.
    pub name: String,
}

/// Fixed, ordered collection of destinations.
///
/// Registration order matters twice: the first destination is the default
/// when none is flagged, and it breaks ties between equally specific URL
/// matches.
#[derive(Debug, Clone)]
pub struct DestinationRegistry {
    destinations: Vec<Arc<Destination>>,
    default: usize,
}

impl DestinationRegistry {
    /// Build a registry from destinations in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::NoDestinations`] if `destinations` is empty.
    pub fn new(destinations: Vec<Destination>) -> Result<Self, PostError> {
        if destinations.is_empty() {
            return Err(PostError::NoDestinations);
        }
        let default = destinations
            .iter()
            .position(Destination::is_default)
            .unwrap_or(0);
        Ok(Self {
            destinations: destinations.into_iter().map(Arc::new).collect(),
            default,
        })
    }

    /// All destinations in registration order.
    #[must_use]
    pub fn all(&self) -> &[Arc<Destination>] {
        &self.destinations
    }

    /// The flagged default destination, else the first registered one.
    #[must_use]
    pub fn default_destination(&self) -> &Arc<Destination> {
        &self.destinations[self.default]
    }

    /// Resolve a destination by exact `uid` match.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::UnrecognisedDestination`] if no destination has `uid`.
    pub fn resolve_by_identifier(&self, uid: &str) -> Result<&Arc<Destination>, PostError> {
        self.destinations
            .iter()
            .find(|d| d.uid == uid)
            .ok_or_else(|| PostError::UnrecognisedDestination(uid.to_owned()))
    }

    /// Resolve the destination whose base URL is a prefix of `url`.
    ///
    /// When several base URLs match, the longest one wins; equally long
    /// matches fall back to registration order.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::UnrecognisedDestination`] if no base URL matches.
    pub fn resolve_by_url(&self, url: &str) -> Result<&Arc<Destination>, PostError> {
        let mut best: Option<&Arc<Destination>> = None;
        for destination in &self.destinations {
            let base = destination.base_url.as_str();
            if !url.starts_with(base) {
                continue;
            }
            if best.is_none_or(|b| base.len() > b.base_url.as_str().len()) {
                best = Some(destination);
            }
        }
        best.ok_or_else(|| PostError::UnrecognisedDestination(url.to_owned()))
    }

    /// Summaries of all destinations, in registration order.
    #[must_use]
    pub fn to_config(&self) -> Vec<DestinationSummary> {
        self.destinations.iter().map(|d| d.summary()).collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn site(n: u8) -> Destination {
        Destination::new(
            format!("https://site-{n}.example.com/"),
            format!("Site {n}"),
            format!("data/site/{n}"),
            &format!("https://site-{n}.example.com/"),
        )
        .unwrap()
    }

    fn three_sites() -> Vec<Destination> {
        vec![site(1), site(2), site(3)]
    }

    #[test]
    fn test_destination_rejects_relative_base_url() {
        let err = Destination::new("a", "A", "a", "/relative/").unwrap_err();

        assert!(matches!(err, PostError::InvalidUrl { .. }));
    }

    #[test]
    fn test_destination_normalises_base_url() {
        let destination = Destination::new("a", "A", "a", "https://a.example.com").unwrap();

        assert_eq!(destination.base_url().as_str(), "https://a.example.com/");
    }

    #[test]
    fn test_destination_adds_trailing_slash_to_path() {
        let destination = Destination::new("a", "A", "a", "https://example.com/blog").unwrap();

        assert_eq!(destination.base_url().as_str(), "https://example.com/blog/");
    }

    #[test]
    fn test_empty_registry_is_rejected() {
        assert!(matches!(
            DestinationRegistry::new(Vec::new()),
            Err(PostError::NoDestinations)
        ));
    }

    #[test]
    fn test_all_keeps_registration_order() {
        let registry = DestinationRegistry::new(three_sites()).unwrap();

        let uids: Vec<_> = registry.all().iter().map(|d| d.uid()).collect();
        assert_eq!(
            uids,
            vec![
                "https://site-1.example.com/",
                "https://site-2.example.com/",
                "https://site-3.example.com/",
            ]
        );
    }

    #[test]
    fn test_default_is_flagged_destination() {
        let mut sites = three_sites();
        sites[1] = site(2).with_default(true);
        let registry = DestinationRegistry::new(sites).unwrap();

        assert_eq!(registry.default_destination().name(), "Site 2");
    }

    #[test]
    fn test_default_falls_back_to_first() {
        let registry = DestinationRegistry::new(three_sites()).unwrap();

        assert_eq!(registry.default_destination().name(), "Site 1");
    }

    #[test]
    fn test_resolve_by_identifier() {
        let registry = DestinationRegistry::new(three_sites()).unwrap();

        let destination = registry
            .resolve_by_identifier("https://site-3.example.com/")
            .unwrap();

        assert_eq!(destination.name(), "Site 3");
    }

    #[test]
    fn test_resolve_by_identifier_unknown() {
        let registry = DestinationRegistry::new(three_sites()).unwrap();

        let err = registry.resolve_by_identifier("nope").unwrap_err();

        assert!(matches!(err, PostError::UnrecognisedDestination(uid) if uid == "nope"));
    }

    #[test]
    fn test_resolve_by_url() {
        let registry = DestinationRegistry::new(three_sites()).unwrap();

        let destination = registry
            .resolve_by_url("https://site-2.example.com/notes/2019/02/07/123456")
            .unwrap();

        assert_eq!(destination.name(), "Site 2");
    }

    #[test]
    fn test_resolve_by_url_unknown() {
        let registry = DestinationRegistry::new(three_sites()).unwrap();

        let err = registry
            .resolve_by_url("https://elsewhere.example.com/notes/1")
            .unwrap_err();

        assert!(matches!(err, PostError::UnrecognisedDestination(_)));
    }

    #[test]
    fn test_resolve_by_url_prefers_longest_base() {
        let root = Destination::new("root", "Root", "root", "https://example.com/").unwrap();
        let blog = Destination::new("blog", "Blog", "blog", "https://example.com/blog/").unwrap();
        let registry = DestinationRegistry::new(vec![root, blog]).unwrap();

        let destination = registry
            .resolve_by_url("https://example.com/blog/articles/2019/02/07/hello")
            .unwrap();
        assert_eq!(destination.uid(), "blog");

        let destination = registry
            .resolve_by_url("https://example.com/notes/2019/02/07/123456")
            .unwrap();
        assert_eq!(destination.uid(), "root");
    }

    #[test]
    fn test_resolve_by_url_equal_bases_use_registration_order() {
        let first = Destination::new("first", "First", "a", "https://example.com/").unwrap();
        let second = Destination::new("second", "Second", "b", "https://example.com/").unwrap();
        let registry = DestinationRegistry::new(vec![first, second]).unwrap();

        let destination = registry.resolve_by_url("https://example.com/x").unwrap();

        assert_eq!(destination.uid(), "first");
    }

    #[test]
    fn test_to_config() {
        let registry = DestinationRegistry::new(vec![site(1), site(2)]).unwrap();

        assert_eq!(
            registry.to_config(),
            vec![
                DestinationSummary {
                    uid: "https://site-1.example.com/".to_owned(),
                    name: "Site 1".to_owned(),
                },
                DestinationSummary {
                    uid: "https://site-2.example.com/".to_owned(),
                    name: "Site 2".to_owned(),
                },
            ]
        );
    }
}
