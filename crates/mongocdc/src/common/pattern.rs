//! Namespace pattern matching.
//!
//! Compiles a namespace glob (`*` is the only metacharacter) into a matcher
//! usable both as an in-process predicate and as a driver-side query
//! predicate. Matching is case-insensitive and anchored to the full
//! namespace string; every other character is escaped and matches literally.
//!
//! ## Example
//!
//! ```rust
//! use mongocdc::common::NsPattern;
//!
//! let pattern = NsPattern::compile(Some("shop.*"));
//! assert!(pattern.matches("shop.orders"));
//! assert!(pattern.matches("SHOP.Users"));
//! assert!(!pattern.matches("other.orders"));
//! ```

use regex::{Regex, RegexBuilder};

/// A compiled namespace pattern.
///
/// Compiled once at subscription time, immutable, reused for every incoming
/// entry.
#[derive(Debug, Clone)]
pub struct NsPattern {
    /// Original glob string (for display/debugging)
    pattern: String,
    /// Compiled regex (case-insensitive, anchored)
    regex: Regex,
    /// Whether this pattern matches every namespace
    is_wildcard: bool,
}

impl NsPattern {
    /// Compile a namespace glob. An absent pattern defaults to `*`.
    ///
    /// There are no error conditions: `*` is the only metacharacter and all
    /// other characters are escaped before translation, so the compiled
    /// expression always builds.
    pub fn compile(pattern: Option<&str>) -> Self {
        let pattern = pattern.unwrap_or("*");
        let is_wildcard = pattern == "*";
        let regex = RegexBuilder::new(&glob_to_regex(pattern))
            .case_insensitive(true)
            .build()
            .expect("escaped glob translation always compiles");

        Self {
            pattern: pattern.to_string(),
            regex,
            is_wildcard,
        }
    }

    /// Check if a namespace matches the pattern. Pure, no side effects.
    #[inline]
    pub fn matches(&self, ns: &str) -> bool {
        if self.is_wildcard {
            return true;
        }
        self.regex.is_match(ns)
    }

    /// The original glob string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether this pattern matches everything.
    pub fn is_wildcard(&self) -> bool {
        self.is_wildcard
    }

    /// The anchored regex source for driver-side filtering, `None` for a
    /// match-all pattern (no query predicate needed). The driver is expected
    /// to apply it case-insensitively (`$regex` with the `i` option).
    pub fn query_regex(&self) -> Option<&str> {
        if self.is_wildcard {
            None
        } else {
            Some(self.regex.as_str())
        }
    }
}

impl Default for NsPattern {
    fn default() -> Self {
        Self::compile(None)
    }
}

/// Convert a namespace glob to an anchored regex: escape everything, then
/// turn each literal `*` into a non-greedy wildcard.
fn glob_to_regex(pattern: &str) -> String {
    let escaped = regex::escape(pattern);
    format!("^{}$", escaped.replace(r"\*", "(.*?)"))
}
