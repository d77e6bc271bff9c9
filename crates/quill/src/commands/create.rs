//! `quill create` command implementation.

use std::path::PathBuf;

use clap::Args;
use serde_json::{Map, Value};

use super::{Session, read_json};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the create command.
#[derive(Args)]
pub(crate) struct CreateArgs {
    /// JSON submission file, `-` for stdin. Ignored when fields are given.
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Form-style field, e.g. `content=hello` or `category[]=rust`.
    #[arg(short, long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
    fields: Vec<(String, String)>,
}

impl CreateArgs {
    /// Execute the create command.
    pub(crate) fn execute(self, session: &Session, output: &Output) -> Result<(), CliError> {
        let submission = if self.fields.is_empty() {
            read_json(&self.input)?
        } else {
            form_submission(self.fields)
        };

        let post = session.factory()?.create(&submission)?;

        output.success(&format!(
            "Created {} in {}",
            post.kind(),
            post.destination().name()
        ));
        output.result(post.url()?.as_str());
        Ok(())
    }
}

fn parse_field(field: &str) -> Result<(String, String), String> {
    field
        .split_once('=')
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{field}'"))
}

/// Build the form-encoded shorthand; `key[]` fields collect into arrays and
/// `h` defaults to `entry`.
fn form_submission(fields: Vec<(String, String)>) -> Value {
    let mut submission = Map::new();
    for (key, value) in fields {
        if let Some(key) = key.strip_suffix("[]") {
            let entry = submission
                .entry(key.to_owned())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(values) = entry {
                values.push(Value::String(value));
            }
        } else {
            submission.insert(key, Value::String(value));
        }
    }
    submission
        .entry("h".to_owned())
        .or_insert_with(|| Value::String("entry".to_owned()));
    Value::Object(submission)
}
