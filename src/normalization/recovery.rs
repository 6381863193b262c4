//! Recovery of a single JSON object from raw model output.
//!
//! Generation stops on `"\n}"`, so well-formed answers routinely arrive without their final
//! brace. Recovery appends the missing closing braces, takes the greedy `{ ... }` span and
//! decodes it strictly. It either returns the whole object or fails; partial data never escapes.

use serde_json::{Map, Value};
use std::borrow::Cow;
use thiserror::Error;

/// Reasons a raw model output could not be turned into a JSON object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecoveryError {
    /// The output contained no `{ ... }` span at all.
    #[error("no JSON object found in model output")]
    NoObjectFound,
    /// A span was found but failed strict decoding.
    #[error("invalid JSON object extracted from model output: {message}")]
    MalformedObject {
        /// The candidate span that failed to decode.
        span: String,
        /// Decoder diagnostic.
        message: String,
    },
}

/// Append one `}` per unmatched `{`. Balanced (or over-closed) text is returned untouched.
pub fn repair_truncation(text: &str) -> Cow<'_, str> {
    let opening = text.matches('{').count();
    let closing = text.matches('}').count();
    if opening <= closing {
        return Cow::Borrowed(text);
    }

    let mut repaired = String::with_capacity(text.len() + opening - closing);
    repaired.push_str(text);
    repaired.extend(std::iter::repeat_n('}', opening - closing));
    Cow::Owned(repaired)
}

/// Decode the first-to-last brace span of `raw` after brace repair.
pub fn recover_object(raw: &str) -> Result<Map<String, Value>, RecoveryError> {
    let repaired = repair_truncation(raw);
    let span = candidate_span(&repaired).ok_or(RecoveryError::NoObjectFound)?;

    serde_json::from_str::<Map<String, Value>>(span).map_err(|error| {
        RecoveryError::MalformedObject {
            span: span.to_string(),
            message: error.to_string(),
        }
    })
}

fn candidate_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
