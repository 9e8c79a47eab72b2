//! Step validators.
//!
//! Each validator is a pure function from raw input to the typed field
//! value the step collects. Rejection never mutates anything; the engine
//! re-prompts and the session stays on the same step.

use crate::catalog::{IndexSlug, SKIP_PHOTO_LABEL};
use crate::error::ValidationFailure;

/// Step 1: exact-match lookup against the closed catalog.
pub fn category(text: &str) -> Result<IndexSlug, ValidationFailure> {
    IndexSlug::from_label(text).ok_or(ValidationFailure::UnknownCategory)
}

/// Step 2: any non-empty text.
pub fn location(text: &str) -> Result<String, ValidationFailure> {
    if text.is_empty() {
        return Err(ValidationFailure::EmptyLocation);
    }
    Ok(text.to_string())
}

/// Step 3: a plain string of decimal digits, parsed exactly.
///
/// A sign, separator, or any other character is a failure, as is a digit
/// string too large for the native range.
pub fn price(text: &str) -> Result<u64, ValidationFailure> {
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationFailure::NonNumericPrice);
    }
    text.parse().map_err(|_| ValidationFailure::NonNumericPrice)
}

/// Step 4: a photo reference wins over the skip button; skip stores nothing.
pub fn photo(
    text: Option<&str>,
    attachment: Option<&str>,
) -> Result<Option<String>, ValidationFailure> {
    if let Some(file_id) = attachment {
        return Ok(Some(file_id.to_string()));
    }
    match text {
        Some(t) if t == SKIP_PHOTO_LABEL => Ok(None),
        _ => Err(ValidationFailure::PhotoOrSkipExpected),
    }
}
