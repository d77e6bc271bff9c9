//! `quill destinations` command implementation.

use super::Session;
use crate::error::CliError;
use crate::output::Output;

/// Print the configured destinations as `[{uid, name}]` JSON.
pub(crate) fn list_destinations(session: &Session, output: &Output) -> Result<(), CliError> {
    let factory = session.factory()?;
    output.result(&serde_json::to_string_pretty(&factory.registry().to_config())?);
    Ok(())
}
