//! Key Pattern Module
//!
//! Glob-style key matching: `*` matches any run of characters (including
//! none), `?` matches exactly one character, everything else is literal.

use regex::Regex;

// == Glob Pattern ==
/// A compiled, anchored glob pattern.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    regex: Regex,
}

impl GlobPattern {
    /// Compiles a glob pattern.
    ///
    /// Returns None if the pattern cannot be compiled; callers treat that as
    /// matching nothing.
    pub fn new(pattern: &str) -> Option<Self> {
        let mut source = String::with_capacity(pattern.len() + 8);
        source.push_str("(?s)^");
        for c in pattern.chars() {
            match c {
                '*' => source.push_str(".*"),
                '?' => source.push('.'),
                other => source.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
            }
        }
        source.push('$');

        Regex::new(&source).ok().map(|regex| Self { regex })
    }

    /// Returns true if the whole key matches the whole pattern.
    pub fn matches(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }
}
