use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::errors::{FilterError, Result};

/// Where a pattern has to match inside the haystack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    None,
    Start,
    End,
    Both,
}

/// A compiled regular expression together with the source and flags it was
/// written with. Flags follow the familiar `/source/flags` letters; the
/// pattern's own `i` flag alone decides case sensitivity.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    flags: String,
    unanchored: Regex,
    start: Regex,
    end: Regex,
    both: Regex,
}

impl Pattern {
    pub fn new(source: &str, flags: &str) -> Result<Self> {
        Ok(Self {
            source: source.to_string(),
            flags: flags.to_string(),
            unanchored: build(source, flags, Anchor::None)?,
            start: build(source, flags, Anchor::Start)?,
            end: build(source, flags, Anchor::End)?,
            both: build(source, flags, Anchor::Both)?,
        })
    }

    /// Same source, with `extra` flags added to the pattern's own.
    pub fn with_extra_flags(&self, extra: &str) -> Result<Self> {
        let mut flags = self.flags.clone();
        for flag in extra.chars() {
            if !flags.contains(flag) {
                flags.push(flag);
            }
        }
        Self::new(&self.source, &flags)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.flags.contains('i')
    }

    pub fn test(&self, haystack: &str, anchor: Anchor) -> bool {
        let regex = match anchor {
            Anchor::None => &self.unanchored,
            Anchor::Start => &self.start,
            Anchor::End => &self.end,
            Anchor::Both => &self.both,
        };
        regex.is_match(haystack)
    }
}

fn build(source: &str, flags: &str, anchor: Anchor) -> Result<Regex> {
    // in `x` mode a trailing `#` comment would swallow the closing group
    let body = if flags.contains('x') {
        format!("{source}\n")
    } else {
        source.to_string()
    };
    let anchored = match anchor {
        Anchor::None => body,
        Anchor::Start => format!("^(?:{body})"),
        Anchor::End => format!("(?:{body})$"),
        Anchor::Both => format!("^(?:{body})$"),
    };
    let mut builder = RegexBuilder::new(&anchored);
    for flag in flags.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'x' => {
                builder.ignore_whitespace(true);
            }
            // global/unicode/sticky only matter for stateful matching
            'g' | 'u' | 'y' => {}
            other => return Err(FilterError::InvalidFlag(other)),
        }
    }
    Ok(builder.build()?)
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.flags == other.flags
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}
