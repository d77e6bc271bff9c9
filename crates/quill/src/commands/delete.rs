//! `quill delete` and `quill undelete` command implementations.

use clap::Args;

use super::Session;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for commands addressing a single post.
#[derive(Args)]
pub(crate) struct UrlArgs {
    /// Public URL of the post.
    url: String,
}

impl UrlArgs {
    /// Soft-delete the post.
    pub(crate) fn delete(self, session: &Session, output: &Output) -> Result<(), CliError> {
        let factory = session.factory()?;
        let post = factory.from(&self.url)?;
        if post.is_deleted() {
            output.warning("Already deleted, refreshing deletion time");
        }

        let post = factory.lifecycle().delete(post)?;
        output.success("Deleted");
        output.result(post.url()?.as_str());
        Ok(())
    }

    /// Restore the post.
    pub(crate) fn undelete(self, session: &Session, output: &Output) -> Result<(), CliError> {
        let factory = session.factory()?;
        let post = factory.from(&self.url)?;
        if !post.is_deleted() {
            output.warning("Not deleted");
        }

        let post = factory.lifecycle().undelete(post)?;
        output.success("Restored");
        output.result(post.url()?.as_str());
        Ok(())
    }
}
