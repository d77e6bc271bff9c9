//! CLI command implementations.

mod create;
mod delete;
mod destinations;
mod source;
mod update;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use quill_config::{CliSettings, Config, DestinationConfig};
use quill_post::{
    Destination, DestinationRegistry, PostError, PostFactory, PostLifecycle, PostTypeDiscovery,
    SystemClock,
};
use quill_storage::FsStore;
use serde_json::Value;

use crate::error::CliError;

pub(crate) use create::CreateArgs;
pub(crate) use delete::UrlArgs;
pub(crate) use destinations::list_destinations;
pub(crate) use source::SourceArgs;
pub(crate) use update::UpdateArgs;

/// Global options shared by every command.
pub(crate) struct Session {
    pub(crate) config_path: Option<PathBuf>,
    pub(crate) default_destination: Option<String>,
}

impl Session {
    pub(crate) fn config(&self) -> Result<Config, CliError> {
        let settings = CliSettings {
            default_destination: self.default_destination.clone(),
        };
        Ok(Config::load(self.config_path.as_deref(), Some(&settings))?)
    }

    /// Build a factory over the filesystem for the configured destinations.
    pub(crate) fn factory(&self) -> Result<PostFactory, CliError> {
        let config = self.config()?;
        let registry = registry(&config.destinations)?;
        tracing::info!(
            config = ?config.config_path,
            destinations = registry.all().len(),
            default = registry.default_destination().uid(),
            "Loaded destinations"
        );
        let lifecycle = PostLifecycle::new(
            Arc::new(FsStore::new()),
            Arc::new(PostTypeDiscovery),
            Arc::new(SystemClock),
        );
        Ok(PostFactory::new(registry, lifecycle))
    }
}

fn registry(destinations: &[DestinationConfig]) -> Result<DestinationRegistry, PostError> {
    let destinations = destinations
        .iter()
        .map(|d| {
            Destination::new(&d.uid, &d.name, &d.directory, &d.base_url)
                .map(|destination| destination.with_default(d.default))
        })
        .collect::<Result<Vec<_>, _>>()?;
    DestinationRegistry::new(destinations)
}

/// Read a JSON document from `path`, or from stdin for `-`.
fn read_json(path: &Path) -> Result<Value, CliError> {
    let text = if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        text
    } else {
        std::fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&text)?)
}
