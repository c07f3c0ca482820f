use filter_chain::strings::{contains, ends_with, equals, matches, starts_with};
use filter_chain::Pattern;

fn re(source: &str, flags: &str) -> Pattern {
    Pattern::new(source, flags).unwrap()
}

#[test]
fn starts_with_respects_case() {
    assert!(starts_with("HelloWorld", "Hello", true));
    assert!(!starts_with("HelloWorld", "hello", true));
    assert!(starts_with("HelloWorld", "hello", false));
}

#[test]
fn ends_with_respects_case() {
    assert!(ends_with("HelloWorld", "World", true));
    assert!(!ends_with("HelloWorld", "world", true));
    assert!(ends_with("HelloWorld", "world", false));
}

#[test]
fn contains_respects_case() {
    assert!(contains("HelloWorld", "Hello", true));
    assert!(!contains("HelloWorld", "hello", true));
    assert!(contains("HelloWorld", "hello", false));
}

#[test]
fn matches_with_and_without_flags() {
    assert!(matches("HelloWorld", "Hello", true, None));
    assert!(!matches("HelloWorld", "hello", true, None));
    assert!(matches("HelloWorld", "hello", false, None));
    assert!(matches("HelloWorld123", r"\d+", true, Some("g")));
    assert!(!matches("HelloWorld", "(", true, None));
    assert!(!matches("HelloWorld", "x", true, Some("q")));
}

#[test]
fn equals_respects_case() {
    assert!(equals("HelloWorld", "HelloWorld", true));
    assert!(equals("HelloWorld", "helloworld", false));
    assert!(!equals("HelloWorld", "helloworld", true));
}

#[test]
fn pattern_needles_carry_their_own_flags() {
    assert!(starts_with("HelloWorld", &re("^hello", "i"), true));
    assert!(!starts_with("HelloWorld", &re("hello", ""), false));
    assert!(!starts_with("HelloWorld", &re("hello", ""), true));
    assert!(!contains("bg_layer", &re("^Bg", ""), false));
    assert!(!equals("ABC", &re("abc", ""), false));
    assert!(equals("ABC", &re("abc", "i"), true));
}

#[test]
fn matches_merges_caller_flags_into_pattern_needles() {
    assert!(matches("a\nb", "^b", true, Some("m")));
    assert!(matches("a\nb", &re("^b", ""), true, Some("m")));
    assert!(!matches("a\nb", &re("^b", ""), true, None));
    assert!(matches("a\nB", &re("^b", "m"), true, Some("i")));
    assert!(!matches("a\nb", &re("^b", ""), true, Some("q")));
}

#[test]
fn verbose_patterns_keep_working_under_anchors() {
    let p = re("abc # trailing comment", "x");
    assert!(starts_with("abcdef", &p, true));
    assert!(ends_with("xxabc", &p, true));
    assert!(equals("abc", &p, true));
    assert!(!starts_with("xabc", &p, true));
}

#[test]
fn longer_needles_never_match() {
    assert!(!starts_with("Hi", "Hello", true));
    assert!(!ends_with("Hi", "World", true));
    assert!(!contains("Hi", "Hello", true));
    assert!(!matches("Hi", "Hello", true, None));
    assert!(!equals("Hi", "Hello", false));
}

#[test]
fn pattern_needles_are_anchored_at_the_edge() {
    assert!(!starts_with("Hi", &re("Hello", ""), true));
    assert!(!ends_with("elloHi", &re("ello$", ""), true));
    assert!(!starts_with("xHello", &re("Hello", ""), true));
    assert!(ends_with("HelloWorld", &re("Wor.d", ""), true));
    assert!(equals("abc", &re("a.c", ""), true));
    assert!(!equals("abcd", &re("a.c", ""), true));
    assert!(matches("xHello", &re("Hello", ""), true, None));
}

#[test]
fn empty_needles_never_match() {
    assert!(!starts_with("HelloWorld", "", true));
    assert!(!ends_with("HelloWorld", "", true));
    assert!(!contains("HelloWorld", "", true));
    assert!(!matches("HelloWorld", "", true, None));
}

#[test]
fn multibyte_text_is_measured_in_chars() {
    assert!(starts_with("Ünïcode", "ünï", false));
    assert!(ends_with("Ünïcode", "CODE", false));
    assert!(!starts_with("Ü", "Üx", true));
}
