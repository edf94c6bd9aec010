//! Submission rules for grammar-correction requests.
//!
//! A submission is measured in Unicode scalar values, not bytes: Arabic
//! letters are two bytes each in UTF-8 and the configured bound is meant
//! to read as "characters" to the person typing.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default upper bound on a submission, in characters.
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 5000;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Which submission constraint was violated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "constraint", rename_all = "snake_case")]
pub enum ValidationFailure {
    /// The text is empty or whitespace only.
    #[error("Text cannot be empty")]
    Empty,

    /// The text is longer than the configured maximum.
    #[error("Text length {length} exceeds the maximum of {max} characters")]
    TooLong { length: usize, max: usize },
}

/// Check a raw submission against the emptiness and length constraints.
///
/// The text itself is not altered: callers store exactly what was
/// submitted once it passes.
pub fn validate_submission(raw_text: &str, max_length: usize) -> Result<(), ValidationFailure> {
    if raw_text.trim().is_empty() {
        return Err(ValidationFailure::Empty);
    }

    let length = char_length(raw_text);
    if length > max_length {
        return Err(ValidationFailure::TooLong {
            length,
            max: max_length,
        });
    }

    Ok(())
}

/// Length of `text` in characters.
pub fn char_length(text: &str) -> usize {
    text.chars().count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
