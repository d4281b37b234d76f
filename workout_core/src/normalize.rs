//! Exercise title normalization.
//!
//! Two independent variants:
//! - [`normalize_title`] is the deduplication key. It folds case, trims and
//!   collapses whitespace, and transliterates Polish diacritics.
//! - [`normalize_title_for_db_lookup`] matches a stored normalized-title
//!   column that keeps Polish letters. Same folding, no transliteration.
//!
//! `ł` is a letter of its own and is never mapped to `l`.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Polish diacritics and their ASCII base letters (lower-case only; input is
/// lower-cased first)
const DIACRITIC_PAIRS: [(char, char); 8] = [
    ('ą', 'a'),
    ('ć', 'c'),
    ('ę', 'e'),
    ('ń', 'n'),
    ('ó', 'o'),
    ('ś', 's'),
    ('ź', 'z'),
    ('ż', 'z'),
];

static DIACRITIC_TABLE: Lazy<HashMap<char, char>> =
    Lazy::new(|| DIACRITIC_PAIRS.iter().copied().collect());

/// Transliterate a single (already lower-cased) character
pub fn strip_diacritic(c: char) -> char {
    DIACRITIC_TABLE.get(&c).copied().unwrap_or(c)
}

/// Deduplication key for an exercise title
pub fn normalize_title(input: &str) -> String {
    fold(input).chars().map(strip_diacritic).collect()
}

/// Key matching the stored normalized-title column (diacritics preserved)
pub fn normalize_title_for_db_lookup(input: &str) -> String {
    fold(input)
}

/// Lower-case, trim, and collapse whitespace runs to a single space
fn fold(input: &str) -> String {
    input
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
