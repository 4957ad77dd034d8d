//! Random slug generation.
//!
//! Generated slugs use only lowercase ASCII letters and digits, so they always
//! pass the default slug pattern and never need case canonicalisation.

use rand::Rng;

/// Characters a generated slug is drawn from.
const SLUG_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generates a random slug of `length` characters.
///
/// Uses the thread-local CSPRNG. Uniqueness is not guaranteed here; callers
/// confirm it through the store's conflict signal and retry.
///
/// # Examples
///
/// ```ignore
/// let slug = generate_slug(6);
/// assert_eq!(slug.len(), 6);
/// assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
/// ```
pub fn generate_slug(length: usize) -> String {
    let mut rng = rand::rng();

    (0..length)
        .map(|_| SLUG_ALPHABET[rng.random_range(0..SLUG_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_slug_has_requested_length() {
        assert_eq!(generate_slug(6).len(), 6);
        assert_eq!(generate_slug(12).len(), 12);
    }

    #[test]
    fn test_generate_slug_charset() {
        let slug = generate_slug(64);
        assert!(
            slug.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_generate_slug_no_hyphens() {
        for _ in 0..100 {
            assert!(!generate_slug(8).contains('-'));
        }
    }

    #[test]
    fn test_generate_slug_produces_unique_values() {
        let slugs: HashSet<String> = (0..1000).map(|_| generate_slug(10)).collect();
        assert_eq!(slugs.len(), 1000);
    }

    #[test]
    fn test_generate_slug_zero_length() {
        assert!(generate_slug(0).is_empty());
    }
}
