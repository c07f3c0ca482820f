//! String predicates used by the built-in filter modes.
//!
//! Every predicate is total: odd inputs answer `false` instead of failing.
//! Literal lengths are counted in characters, not bytes. `case_sensitive`
//! folds literal text only; pattern needles follow their own `i` flag.

use crate::pattern::{Anchor, Pattern};

/// What a predicate looks for inside the haystack.
#[derive(Debug, Clone, Copy)]
pub enum Needle<'a> {
    Text(&'a str),
    Pattern(&'a Pattern),
}

impl<'a> From<&'a str> for Needle<'a> {
    fn from(s: &'a str) -> Self {
        Needle::Text(s)
    }
}

impl<'a> From<&'a String> for Needle<'a> {
    fn from(s: &'a String) -> Self {
        Needle::Text(s)
    }
}

impl<'a> From<&'a Pattern> for Needle<'a> {
    fn from(p: &'a Pattern) -> Self {
        Needle::Pattern(p)
    }
}

/// True when `haystack` begins with `needle`. Pattern needles are anchored
/// at the start.
pub fn starts_with<'a>(haystack: &str, needle: impl Into<Needle<'a>>, case_sensitive: bool) -> bool {
    match needle.into() {
        Needle::Text(search) => {
            segment(haystack, search, Edge::Leading).is_some_and(|s| same_text(s, search, case_sensitive))
        }
        Needle::Pattern(p) => p.test(haystack, Anchor::Start),
    }
}

/// True when `haystack` ends with `needle`. Pattern needles are anchored at
/// the end.
pub fn ends_with<'a>(haystack: &str, needle: impl Into<Needle<'a>>, case_sensitive: bool) -> bool {
    match needle.into() {
        Needle::Text(search) => {
            segment(haystack, search, Edge::Trailing).is_some_and(|s| same_text(s, search, case_sensitive))
        }
        Needle::Pattern(p) => p.test(haystack, Anchor::End),
    }
}

/// Literal needles are compared against the leading segment only, so this
/// behaves like `starts_with` for text. Pattern needles match anywhere.
// NOTE: not a substring scan; callers that need one should pass a pattern.
pub fn contains<'a>(haystack: &str, needle: impl Into<Needle<'a>>, case_sensitive: bool) -> bool {
    match needle.into() {
        Needle::Text(search) => {
            segment(haystack, search, Edge::Leading).is_some_and(|s| same_text(s, search, case_sensitive))
        }
        Needle::Pattern(p) => p.test(haystack, Anchor::None),
    }
}

/// Whole-string comparison. Pattern needles must match the full haystack.
pub fn equals<'a>(haystack: &str, needle: impl Into<Needle<'a>>, case_sensitive: bool) -> bool {
    match needle.into() {
        Needle::Text(search) => {
            haystack.chars().count() == search.chars().count()
                && same_text(haystack, search, case_sensitive)
        }
        Needle::Pattern(p) => p.test(haystack, Anchor::Both),
    }
}

/// Unanchored regular-expression test. Literal needles are compiled as a
/// pattern source with `flags`, plus `i` when `case_sensitive` is false.
/// Pattern needles get `flags` added to their own.
pub fn matches<'a>(
    haystack: &str,
    needle: impl Into<Needle<'a>>,
    case_sensitive: bool,
    flags: Option<&str>,
) -> bool {
    match needle.into() {
        Needle::Text(search) => {
            if segment(haystack, search, Edge::Leading).is_none() {
                return false;
            }
            let mut all_flags = flags.unwrap_or_default().to_string();
            if !case_sensitive {
                all_flags.push('i');
            }
            Pattern::new(search, &all_flags)
                .map(|p| p.test(haystack, Anchor::None))
                .unwrap_or(false)
        }
        Needle::Pattern(p) => match flags.filter(|f| !f.is_empty()) {
            None => p.test(haystack, Anchor::None),
            Some(extra) => p
                .with_extra_flags(extra)
                .map(|p| p.test(haystack, Anchor::None))
                .unwrap_or(false),
        },
    }
}

#[derive(Clone, Copy)]
enum Edge {
    Leading,
    Trailing,
}

/// The part of `haystack` with the same character length as `needle`, taken
/// from the given edge. `None` when the needle is empty or too long.
fn segment<'h>(haystack: &'h str, needle: &str, edge: Edge) -> Option<&'h str> {
    let wanted = needle.chars().count();
    let available = haystack.chars().count();
    if wanted == 0 || wanted > available {
        return None;
    }
    let skip = match edge {
        Edge::Leading => 0,
        Edge::Trailing => available - wanted,
    };
    let start = haystack.char_indices().nth(skip).map_or(haystack.len(), |(i, _)| i);
    let end = haystack
        .char_indices()
        .nth(skip + wanted)
        .map_or(haystack.len(), |(i, _)| i);
    Some(&haystack[start..end])
}

fn same_text(a: &str, b: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.to_lowercase() == b.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_respects_char_boundaries() {
        assert_eq!(segment("héllo", "hé", Edge::Leading), Some("hé"));
        assert_eq!(segment("héllo", "lo", Edge::Trailing), Some("lo"));
        assert_eq!(segment("hé", "hél", Edge::Leading), None);
        assert_eq!(segment("abc", "", Edge::Trailing), None);
    }

    #[test]
    fn contains_only_checks_the_leading_segment() {
        assert!(contains("HelloWorld", "Hello", true));
        assert!(!contains("HelloWorld", "World", true));
        let p = Pattern::new("World", "").unwrap();
        assert!(contains("HelloWorld", &p, true));
    }

    #[test]
    fn equals_needs_same_length() {
        assert!(equals("", "", true));
        assert!(!equals("abc", "ab", false));
        assert!(equals("ABC", "abc", false));
    }
}
