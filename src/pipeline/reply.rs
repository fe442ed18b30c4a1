//! Model reply handling: turn the chat message content into a JSON value.
//!
//! The prompt asks for bare JSON, but chat models regularly wrap it in a
//! ```` ```json ```` fence anyway. The fence is stripped before parsing; the
//! parsed value is otherwise returned untouched, whatever its shape.

use crate::error::GradeCheckError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

static RE_OUTER_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z]*[ \t]*\n?(.*?)\n?```$").unwrap());

/// Parse message content: strings are decoded as JSON, anything else is
/// already structured and passes through.
pub fn parse_reply(content: Value) -> Result<Value, GradeCheckError> {
    match content {
        Value::String(text) => {
            let body = strip_code_fence(&text);
            serde_json::from_str(body).map_err(|source| GradeCheckError::InvalidReply { source })
        }
        other => Ok(other),
    }
}

/// Remove one surrounding Markdown code fence, if present.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    match RE_OUTER_FENCE.captures(trimmed).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => trimmed,
    }
}

/// Typed view of the expected `{"GPA": <number>, "F": <integer>}` reply.
///
/// Used for display only; the HTTP response relays the raw value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeSummary {
    #[serde(rename = "GPA")]
    pub gpa: f64,
    #[serde(rename = "F")]
    pub failing: u32,
}

impl TryFrom<&Value> for GradeSummary {
    type Error = serde_json::Error;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        GradeSummary::deserialize(value)
    }
}
