//! Message pattern matching - substring and regex modes
//!
//! Patterns are compiled once per request and applied to every candidate
//! message. Both modes are Unicode-aware: substring matching folds operands
//! with `str::to_lowercase`, regex matching uses the `regex` crate's
//! Unicode semantics with the case-insensitive flag applied at build time.

use regex::{Regex, RegexBuilder};

use jlog_core::{GatewayError, GatewayResult, QueryFilter};

/// A compiled message filter
#[derive(Debug, Clone)]
pub enum PatternMatcher {
    /// Empty pattern: everything matches
    Any,
    /// Plain containment check
    Substring {
        /// Needle, already folded in case-insensitive mode
        needle: String,
        /// Whether both operands are case-folded before the check
        fold: bool,
    },
    /// Compiled regular expression
    Regex(Regex),
}

impl PatternMatcher {
    /// Compile a pattern. Fails with [`GatewayError::Pattern`] when `regex`
    /// is set and the pattern does not compile.
    pub fn new(pattern: &str, case_sensitive: bool, regex: bool) -> GatewayResult<Self> {
        if pattern.is_empty() {
            return Ok(Self::Any);
        }
        if regex {
            let compiled = RegexBuilder::new(pattern)
                .case_insensitive(!case_sensitive)
                .build()
                .map_err(|e| GatewayError::Pattern {
                    reason: e.to_string(),
                })?;
            return Ok(Self::Regex(compiled));
        }
        Ok(Self::Substring {
            needle: if case_sensitive {
                pattern.to_string()
            } else {
                pattern.to_lowercase()
            },
            fold: !case_sensitive,
        })
    }

    /// Compile the matcher described by a request filter
    pub fn for_filter(filter: &QueryFilter) -> GatewayResult<Self> {
        Self::new(filter.pattern(), filter.is_case_sensitive(), filter.is_regex())
    }

    /// Whether `text` passes the filter
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Substring { needle, fold: false } => text.contains(needle.as_str()),
            Self::Substring { needle, fold: true } => {
                text.to_lowercase().contains(needle.as_str())
            }
            Self::Regex(re) => re.is_match(text),
        }
    }
}

/// One-shot convenience over [`PatternMatcher::new`]
pub fn matches(text: &str, pattern: &str, case_sensitive: bool, regex: bool) -> GatewayResult<bool> {
    Ok(PatternMatcher::new(pattern, case_sensitive, regex)?.matches(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pattern_matches_everything() {
        assert!(matches("anything at all", "", true, false).unwrap());
        assert!(matches("", "", false, true).unwrap());
    }

    #[test]
    fn test_case_insensitive_substring() {
        assert!(matches("ERROR: disk full", "error", false, false).unwrap());
    }

    #[test]
    fn test_case_sensitive_substring_misses() {
        assert!(!matches("ERROR: disk full", "error", true, false).unwrap());
    }

    #[test]
    fn test_unicode_fold_in_substring_mode() {
        assert!(matches("Fehler: ÜBERLAUF im Puffer", "überlauf", false, false).unwrap());
        assert!(!matches("Fehler: ÜBERLAUF im Puffer", "überlauf", true, false).unwrap());
    }

    #[test]
    fn test_regex_finds_match_anywhere() {
        assert!(matches("temp=93C fan=off", r"temp=\d+C", true, true).unwrap());
        assert!(!matches("temp=hot", r"temp=\d+C", true, true).unwrap());
    }

    #[test]
    fn test_regex_case_insensitive_flag() {
        assert!(matches("ERROR: disk full", "^error", false, true).unwrap());
        assert!(!matches("ERROR: disk full", "^error", true, true).unwrap());
    }

    #[test]
    fn test_invalid_regex_is_a_pattern_error() {
        let err = matches("anything", "(unclosed", true, true).unwrap_err();
        assert!(matches!(err, GatewayError::Pattern { .. }));
    }

    #[test]
    fn test_invalid_pattern_in_substring_mode_is_fine() {
        // Only regex mode compiles the pattern
        assert!(matches("a (unclosed b", "(unclosed", true, false).unwrap());
    }
}
