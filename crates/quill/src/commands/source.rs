//! `quill source` command implementation.

use clap::Args;

use super::Session;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the source command.
#[derive(Args)]
pub(crate) struct SourceArgs {
    /// Public URL of the post.
    url: String,

    /// Only show these properties.
    #[arg(short, long = "property", value_name = "NAME")]
    properties: Vec<String>,
}

impl SourceArgs {
    /// Execute the source command.
    pub(crate) fn execute(self, session: &Session, output: &Output) -> Result<(), CliError> {
        let post = session.factory()?.from(&self.url)?;
        if post.is_deleted() {
            output.warning("This post is deleted");
        }

        let only = (!self.properties.is_empty()).then_some(self.properties.as_slice());
        output.result(&serde_json::to_string_pretty(&post.source(only))?);
        Ok(())
    }
}
