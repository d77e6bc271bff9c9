//! Slug normalization.
//!
//! Letters and digits outside ASCII are transliterated (`é` becomes `e`,
//! `ß` becomes `ss`); any other non-ASCII character, such as a currency sign,
//! is dropped. The result is lower-cased, whitespace, hyphens and underscores
//! collapse into single hyphens, and all other punctuation is removed.

use deunicode::deunicode_char;

/// Normalize human text into a URL-safe slug.
///
/// Returns `None` when nothing usable remains, e.g. for `"  -----  "`.
/// Normalizing an already-normalized slug returns it unchanged.
#[must_use]
pub fn normalize(text: &str) -> Option<String> {
    let mut result = String::with_capacity(text.len());
    let mut last_was_dash = true; // Prevents leading dash

    for c in text.chars() {
        if c.is_ascii() || c.is_whitespace() {
            push_ascii(c, &mut result, &mut last_was_dash);
        } else if c.is_alphanumeric()
            && let Some(ascii) = deunicode_char(c)
        {
            for t in ascii.chars() {
                push_ascii(t, &mut result, &mut last_was_dash);
            }
        }
    }

    // Remove trailing dash if present
    if result.ends_with('-') {
        result.pop();
    }

    if result.is_empty() { None } else { Some(result) }
}

fn push_ascii(c: char, result: &mut String, last_was_dash: &mut bool) {
    if c.is_ascii_alphanumeric() {
        result.push(c.to_ascii_lowercase());
        *last_was_dash = false;
    } else if !*last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
        result.push('-');
        *last_was_dash = true;
    }
}
