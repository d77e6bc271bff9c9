//! Environment variable expansion for configuration strings.
//!
//! Only the braced forms are recognised:
//! - `${VAR}` expands to the value of VAR and fails if it is unset
//! - `${VAR:-default}` falls back to `default` when VAR is unset
//!
//! A bare `$` (as in `$VAR` or `$5`) is kept literally.

use crate::ConfigError;

/// Variable lookup failure.
struct Unset;

/// Expand the `${...}` references in `value`.
///
/// `field` names the configuration key for error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let mut expanded = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        expanded.push_str(&rest[..start]);
        expanded.push_str(&expand_reference(&rest[start..=start + len], field)?);
        rest = &rest[start + len + 1..];
    }
    expanded.push_str(rest);
    Ok(expanded)
}

/// Expand a single `${...}` reference.
fn expand_reference(reference: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env_with_context(reference, |var| std::env::var(var).map(Some).map_err(|_| Unset))
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_unchanged() {
        assert_eq!(
            expand_env("https://blog.example.com/", "f").unwrap(),
            "https://blog.example.com/"
        );
    }

    #[test]
    fn test_bare_dollar_kept() {
        assert_eq!(
            expand_env("https://example.com/$HOME/costs-$5", "f").unwrap(),
            "https://example.com/$HOME/costs-$5"
        );
    }

    #[test]
    fn test_bare_dollar_kept_next_to_reference() {
        // SAFETY: no other test reads or writes this variable
        unsafe {
            std::env::set_var("QUILL_EXPAND_ROOT", "/srv/site");
        }

        assert_eq!(
            expand_env("${QUILL_EXPAND_ROOT}/$HOME/${QUILL_EXPAND_ROOT}", "f").unwrap(),
            "/srv/site/$HOME//srv/site"
        );
    }

    #[test]
    fn test_unclosed_reference_kept() {
        assert_eq!(expand_env("data/${oops", "f").unwrap(), "data/${oops");
    }

    #[test]
    fn test_default_used_when_unset() {
        // SAFETY: no other test reads or writes this variable
        unsafe {
            std::env::remove_var("QUILL_EXPAND_UNSET");
        }

        assert_eq!(
            expand_env("${QUILL_EXPAND_UNSET:-data/blog}", "f").unwrap(),
            "data/blog"
        );
    }

    #[test]
    fn test_missing_var_names_field() {
        // SAFETY: no other test reads or writes this variable
        unsafe {
            std::env::remove_var("QUILL_EXPAND_MISSING");
        }

        let err = expand_env("${QUILL_EXPAND_MISSING}", "destinations[0].directory").unwrap_err();

        assert!(err.to_string().contains("QUILL_EXPAND_MISSING"));
        assert!(err.to_string().contains("destinations[0].directory"));
    }
}
