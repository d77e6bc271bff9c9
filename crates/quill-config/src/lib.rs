//! Loading of `quill.toml`.
//!
//! The file is found either explicitly or by walking up from the current
//! directory. Command-line overrides come in through [`CliSettings`].
//!
//! ## Destinations
//!
//! Each `[[destinations]]` table describes one published site:
//!
//! ```toml
//! [[destinations]]
//! uid = "https://blog.example.com/"
//! name = "Blog"
//! directory = "data/blog"
//! base_url = "https://blog.example.com/"
//! default = true
//! ```
//!
//! Relative directories are resolved against the directory containing the
//! config file. Order is significant: it is the registration order used for
//! destination lookup.
//!
//! ## Environment variables
//!
//! `directory` and `base_url` may reference `${VAR}` (an error when unset)
//! or `${VAR:-fallback}`.

mod expand;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Command-line overrides, applied after the file is loaded.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Make the destination with this `uid` the default one.
    pub default_destination: Option<String>,
}

const CONFIG_FILENAME: &str = "quill.toml";

/// Parsed and validated `quill.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Destinations as parsed from TOML (directories are relative strings).
    #[serde(rename = "destinations")]
    destinations_raw: Vec<DestinationConfigRaw>,

    /// Resolved destinations, in file order (set after loading).
    #[serde(skip)]
    pub destinations: Vec<DestinationConfig>,
    /// File the configuration was read from, if any.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Raw destination as parsed from TOML.
#[derive(Debug, Deserialize)]
struct DestinationConfigRaw {
    uid: String,
    name: String,
    directory: String,
    base_url: String,
    #[serde(default)]
    default: bool,
}

/// Resolved destination configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationConfig {
    /// Identifier used by `mp-destination` overrides.
    pub uid: String,
    /// Display name.
    pub name: String,
    /// Storage root for this site's documents.
    pub directory: PathBuf,
    /// Public base URL of the site.
    pub base_url: String,
    /// Whether this destination is the explicit default.
    pub default: bool,
}

/// Failure to find, parse or validate the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no configuration at {}", .0.display())]
    NotFound(PathBuf),
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed quill.toml: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Validation(String),
    #[error("cannot expand {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`destinations[0].directory`").
        field: String,
        /// Error message (e.g., "${`BLOG_DIR`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load `config_path`, or the nearest `quill.toml` above the current
    /// directory, then apply `cli_settings` on top.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let path = match config_path {
            Some(path) if path.is_file() => path.to_path_buf(),
            Some(path) => return Err(ConfigError::NotFound(path.to_path_buf())),
            None => Self::discover_config()
                .ok_or_else(|| ConfigError::NotFound(PathBuf::from(CONFIG_FILENAME)))?,
        };
        let mut config = Self::load_from_file(&path)?;
        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings)?;
        }

        Ok(config)
    }

    /// Parse configuration from a TOML string, resolving relative directories
    /// against `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns error if parsing, expansion or validation fails.
    pub fn from_toml(content: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_env_vars()?;
        config.resolve_paths(base_dir);
        config.validate()?;
        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) -> Result<(), ConfigError> {
        if let Some(uid) = &settings.default_destination {
            if !self.destinations.iter().any(|d| &d.uid == uid) {
                return Err(ConfigError::Validation(format!(
                    "default destination '{uid}' is not configured"
                )));
            }
            for destination in &mut self.destinations {
                destination.default = &destination.uid == uid;
            }
        }
        Ok(())
    }

    fn discover_config() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        cwd.ancestors()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .find(|candidate| candidate.is_file())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let config_dir = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::from_toml(&std::fs::read_to_string(path)?, config_dir)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Check the destination table: at least one entry, no blank fields,
    /// http(s) base URLs, unique `uid`s and at most one default.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.destinations.is_empty() {
            return Err(ConfigError::Validation(
                "at least one [[destinations]] entry is required".to_owned(),
            ));
        }

        let mut uids = HashSet::new();
        for (i, destination) in self.destinations.iter().enumerate() {
            require_non_empty(&destination.uid, &format!("destinations[{i}].uid"))?;
            require_non_empty(&destination.name, &format!("destinations[{i}].name"))?;
            require_non_empty(
                &destination.directory.to_string_lossy(),
                &format!("destinations[{i}].directory"),
            )?;
            require_non_empty(&destination.base_url, &format!("destinations[{i}].base_url"))?;
            require_http_url(&destination.base_url, &format!("destinations[{i}].base_url"))?;

            if !uids.insert(destination.uid.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate destination uid '{}'",
                    destination.uid
                )));
            }
        }

        if self.destinations.iter().filter(|d| d.default).count() > 1 {
            return Err(ConfigError::Validation(
                "only one destination may be flagged default".to_owned(),
            ));
        }

        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        for (i, destination) in self.destinations_raw.iter_mut().enumerate() {
            destination.directory = expand::expand_env(
                &destination.directory,
                &format!("destinations[{i}].directory"),
            )?;
            destination.base_url = expand::expand_env(
                &destination.base_url,
                &format!("destinations[{i}].base_url"),
            )?;
        }
        Ok(())
    }

    /// Relative directories are taken from `config_dir`.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.destinations = self
            .destinations_raw
            .iter()
            .map(|raw| DestinationConfig {
                uid: raw.uid.clone(),
                name: raw.name.clone(),
                directory: if raw.directory.is_empty() {
                    PathBuf::new()
                } else {
                    config_dir.join(&raw.directory)
                },
                base_url: raw.base_url.clone(),
                default: raw.default,
            })
            .collect();
    }
}
