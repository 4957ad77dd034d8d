//! Slug validation against the configured pattern and reserved set.

use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

/// Default slug pattern: alphanumeric segments joined by single hyphens.
pub const DEFAULT_SLUG_PATTERN: &str = r"^[a-z0-9]+(?:-[a-z0-9]+)*$";

/// Reasons a candidate slug is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("slug '{slug}' does not match the slug pattern")]
    InvalidFormat { slug: String },

    #[error("slug '{slug}' is reserved")]
    Reserved { slug: String },
}

/// Pure slug validator built once from configuration.
///
/// The pattern is compiled case-insensitively. Reserved slugs are compared
/// after lowercasing, so `Dashboard` is as reserved as `dashboard`.
#[derive(Debug, Clone)]
pub struct SlugValidator {
    pattern: Regex,
    reserved: HashSet<String>,
    max_length: usize,
}

impl SlugValidator {
    /// Compiles `pattern` (case-insensitive) and normalizes the reserved set.
    ///
    /// # Errors
    ///
    /// Returns the regex compilation error if `pattern` is invalid.
    pub fn new<I, S>(pattern: &str, reserved: I, max_length: usize) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pattern = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        let reserved = reserved
            .into_iter()
            .map(|s| s.as_ref().trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            pattern,
            reserved,
            max_length,
        })
    }

    /// Full creation-time check: format, then reserved set.
    pub fn validate(&self, candidate: &str) -> Result<(), ValidationError> {
        self.validate_format(candidate)?;

        if self.is_reserved(candidate) {
            return Err(ValidationError::Reserved {
                slug: candidate.to_string(),
            });
        }

        Ok(())
    }

    /// Syntactic check only. Used on the resolution path, where reserved slugs
    /// simply never exist.
    pub fn validate_format(&self, candidate: &str) -> Result<(), ValidationError> {
        if candidate.is_empty()
            || candidate.len() > self.max_length
            || !self.pattern.is_match(candidate)
        {
            return Err(ValidationError::InvalidFormat {
                slug: candidate.to_string(),
            });
        }

        Ok(())
    }

    pub fn is_reserved(&self, candidate: &str) -> bool {
        self.reserved.contains(&candidate.to_lowercase())
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }
}
