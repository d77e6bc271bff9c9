//! `quill update` command implementation.

use std::path::PathBuf;

use clap::Args;
use quill_post::UpdateSpec;

use super::{Session, read_json};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the update command.
#[derive(Args)]
pub(crate) struct UpdateArgs {
    /// Public URL of the post.
    url: String,

    /// JSON file with `replace`, `add` and/or `delete` sections, `-` for stdin.
    #[arg(default_value = "-")]
    input: PathBuf,
}

impl UpdateArgs {
    /// Execute the update command.
    pub(crate) fn execute(self, session: &Session, output: &Output) -> Result<(), CliError> {
        let spec = UpdateSpec::from_value(&read_json(&self.input)?)?;

        let post = session.factory()?.update(&self.url, &spec)?;

        if post.url_changed()? {
            output.info(&format!("Moved from {}", self.url));
        }
        output.success("Updated");
        output.result(post.url()?.as_str());
        Ok(())
    }
}
