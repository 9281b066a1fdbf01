//! Canonical temple names: the single definition of "same landmark".

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Trim, strip diacritics (NFD then drop combining marks) and lowercase.
/// Blank names map to the empty string, which callers treat as "no key".
pub fn canonical_name(value: &str) -> String {
    value
        .trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Canonical key for indexing, or `None` when the name is blank.
pub fn name_key(value: &str) -> Option<String> {
    let key = canonical_name(value);
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}
