//! Request payload validation
//!
//! Validation runs on the decoded request body before any storage call and
//! collects every failing field instead of stopping at the first.

use super::error::{ApiError, FieldError};

/// Longest accepted name or link
pub const MAX_FIELD_LEN: usize = 255;

/// Punctuation allowed in artist and song names besides letters, digits and spaces
const NAME_PUNCTUATION: &[char] = &['\'', '.', ',', '-', '&', '+', '!', '?', '/', '(', ')', ':'];

/// Implemented by every mutating request shape
pub trait Validate {
    fn validate(&self) -> Result<(), ApiError> {
        let mut violations = Violations::default();
        self.check(&mut violations);
        violations.into_result()
    }

    /// Record every problem with this value
    fn check(&self, violations: &mut Violations);
}

/// Accumulates field errors
#[derive(Debug, Default)]
pub struct Violations(Vec<FieldError>);

impl Violations {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    /// Record `rule`'s failure, if any, against `field`
    pub fn check(&mut self, field: &str, rule: Result<(), String>) {
        if let Err(message) = rule {
            self.add(field, message);
        }
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.0))
        }
    }
}

/// Non-empty after trimming
pub fn required(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err("is required".to_string())
    } else {
        Ok(())
    }
}

/// Artist / song name: letters, digits, spaces and common punctuation,
/// with at least one letter
pub fn name(value: &str) -> Result<(), String> {
    if value.chars().count() > MAX_FIELD_LEN {
        return Err(format!("must be at most {} characters", MAX_FIELD_LEN));
    }
    if !value.chars().any(char::is_alphabetic) {
        return Err("must contain at least one letter".to_string());
    }
    if let Some(bad) = value
        .chars()
        .find(|c| !(c.is_alphanumeric() || c.is_whitespace() || NAME_PUNCTUATION.contains(c)))
    {
        return Err(format!("contains invalid character '{}'", bad));
    }
    Ok(())
}

/// Required name (create)
pub fn required_name(value: &str) -> Result<(), String> {
    required(value).and_then(|_| name(value))
}

/// Optional name (update): empty is allowed, anything else must be a valid name
pub fn optional_name(value: &str) -> Result<(), String> {
    if value.is_empty() {
        Ok(())
    } else {
        name(value)
    }
}

/// Positive integer reference
pub fn positive_id(value: i64) -> Result<(), String> {
    if value > 0 {
        Ok(())
    } else {
        Err("must be a positive integer".to_string())
    }
}

/// Absolute http(s) URL no longer than the column allows
pub fn link(value: &str) -> Result<(), String> {
    if value.chars().count() > MAX_FIELD_LEN {
        return Err(format!("must be at most {} characters", MAX_FIELD_LEN));
    }
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() && !host.chars().any(char::is_whitespace) => Ok(()),
        _ => Err("must be an http:// or https:// URL".to_string()),
    }
}
