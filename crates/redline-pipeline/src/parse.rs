//! Defensive parsing of untrusted capability output.
//!
//! Every structured capability call site consumes this as parse-or-fallback:
//! the caller supplies an explicit fallback value for the `Err` arm and the
//! miss is logged as a diagnostic event, never raised.

use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// The capability responded but its text did not parse as the expected shape.
#[derive(Debug, Error)]
#[error("structured output did not parse: {reason}")]
pub struct MalformedOutput {
    pub reason: String,
}

static CODE_FENCE: OnceLock<Regex> = OnceLock::new();

fn code_fence() -> &'static Regex {
    CODE_FENCE.get_or_init(|| {
        Regex::new(r"(?s)^```[a-zA-Z]*\s*(.*?)\s*```$").expect("code fence pattern")
    })
}

/// Parse capability output as `T`, tolerating markdown code fences and prose
/// around the first JSON value.
pub fn structured<T: DeserializeOwned>(raw: &str) -> Result<T, MalformedOutput> {
    let trimmed = raw.trim();
    let body = code_fence()
        .captures(trimmed)
        .and_then(|captures| captures.get(1))
        .map(|body| body.as_str())
        .unwrap_or(trimmed);

    match serde_json::from_str(body) {
        Ok(value) => Ok(value),
        Err(first_error) => {
            let Some(candidate) = first_json_value(body) else {
                return Err(MalformedOutput {
                    reason: first_error.to_string(),
                });
            };
            serde_json::from_str(candidate).map_err(|error| MalformedOutput {
                reason: error.to_string(),
            })
        }
    }
}

/// Slice from the first `[` or `{` to the last matching close bracket.
fn first_json_value(text: &str) -> Option<&str> {
    let start = text.find(['[', '{'])?;
    let close = if text.as_bytes()[start] == b'[' {
        ']'
    } else {
        '}'
    };
    let end = text.rfind(close)?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}
