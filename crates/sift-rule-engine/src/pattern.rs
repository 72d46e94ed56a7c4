//! Asset and datapoint name patterns.
//!
//! A configured name is treated as a literal unless it contains a regex
//! metacharacter, in which case it is compiled once and cached. Since
//! regex matching is comparatively slow, the literal path is a plain
//! string comparison. Regex matches are anchored at both ends; a
//! pattern matches the whole candidate or not at all.

use crate::{Result, RuleError};
use regex::{Regex, RegexBuilder};

/// Longest accepted pattern, in characters.
const MAX_PATTERN_LENGTH: usize = 500;

/// Compiled regex size limit (bytes).
const REGEX_SIZE_LIMIT: usize = 10 * 1024 * 1024;

/// Lazy DFA size limit (bytes).
const REGEX_DFA_SIZE_LIMIT: usize = 2 * 1024 * 1024;

/// Characters whose presence classifies a name as a regex pattern.
const SPECIALS: &[char] = &['.', '*', '+', '[', ']', '(', ')', '^', '$'];

/// Check whether a configured name should be treated as a regex.
///
/// True if the name contains any of `. * + [ ] ( ) ^ $` or the literal
/// two-character sequence `\d`. A literal asset name that happens to
/// contain one of these is classified as a regex; that is the
/// documented heuristic, not a flag in the configuration.
pub fn is_pattern(name: &str) -> bool {
    name.contains(SPECIALS) || name.contains("\\d")
}

/// Compile a regex with defensive size limits, anchored at both ends.
///
/// The pattern is wrapped in a non-capturing group so explicit capture
/// group numbering is unaffected.
fn compile_anchored(pattern: &str) -> Result<Regex> {
    if pattern.len() > MAX_PATTERN_LENGTH {
        return Err(RuleError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: format!("exceeds maximum length of {MAX_PATTERN_LENGTH} characters"),
        });
    }

    RegexBuilder::new(&format!("^(?:{pattern})$"))
        .size_limit(REGEX_SIZE_LIMIT)
        .dfa_size_limit(REGEX_DFA_SIZE_LIMIT)
        .build()
        .map_err(|e| RuleError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

/// A configured name, either literal or compiled regex.
#[derive(Debug, Clone)]
pub struct NamePattern {
    raw: String,
    regex: Option<Regex>,
}

impl NamePattern {
    /// Build a pattern from a configured name.
    ///
    /// Fails only when the name is classified as a regex and does not
    /// compile; the caller is expected to skip that one rule.
    pub fn new(name: &str) -> Result<Self> {
        let regex = if is_pattern(name) {
            Some(compile_anchored(name)?)
        } else {
            None
        };
        Ok(Self {
            raw: name.to_string(),
            regex,
        })
    }

    /// The configured name as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when this pattern is regex matched rather than compared.
    pub fn is_regex(&self) -> bool {
        self.regex.is_some()
    }

    /// Check whether a candidate name matches this pattern.
    ///
    /// Regex patterns must match the full candidate; literals use exact
    /// case-sensitive equality.
    pub fn matches(&self, candidate: &str) -> bool {
        match &self.regex {
            Some(regex) => regex.is_match(candidate),
            None => self.raw == candidate,
        }
    }

    /// Substitute capture groups of this pattern into a template.
    ///
    /// Returns `None` when the pattern is a literal or the candidate
    /// does not match. `$N` in the template is replaced by capture
    /// group N of the match against the candidate; a reference to a
    /// group the pattern does not define expands to the empty string.
    pub fn substitute(&self, candidate: &str, template: &str) -> Option<String> {
        let captures = self.regex.as_ref()?.captures(candidate)?;
        let mut result = String::with_capacity(template.len());
        let mut chars = template.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '$' {
                result.push(c);
                continue;
            }
            match chars.peek() {
                // "$$" is a literal dollar sign
                Some('$') => {
                    chars.next();
                    result.push('$');
                }
                Some(d) if d.is_ascii_digit() => {
                    // An overflowing group number is treated like any
                    // other group the pattern does not define.
                    let mut group: Option<usize> = Some(0);
                    while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                        chars.next();
                        group = group
                            .and_then(|g| g.checked_mul(10))
                            .and_then(|g| g.checked_add(d as usize - '0' as usize));
                    }
                    if let Some(m) = group.and_then(|g| captures.get(g)) {
                        result.push_str(m.as_str());
                    }
                }
                _ => result.push('$'),
            }
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_names_use_exact_equality() {
        let p = NamePattern::new("pump1").unwrap();
        assert!(!p.is_regex());
        assert!(p.matches("pump1"));
        assert!(!p.matches("pump10"));
        assert!(!p.matches("Pump1"));
    }

    #[test]
    fn metacharacters_classify_as_regex() {
        for name in ["pump.", "pump*", "a+b", "[ab]", "(a)", "^a", "a$", "\\d+"] {
            assert!(is_pattern(name), "{name} should classify as a pattern");
        }
        assert!(!is_pattern("plain_name-2"));
    }

    #[test]
    fn regex_match_is_anchored() {
        let p = NamePattern::new("test[0-9]*").unwrap();
        assert!(p.is_regex());
        assert!(p.matches("test12"));
        assert!(p.matches("test"));
        assert!(!p.matches("mytest12"));
        assert!(!p.matches("test12x"));
    }

    #[test]
    fn alternation_respects_anchoring() {
        // The ^(?:...)$ wrapper must bind tighter than a top level '|'.
        let p = NamePattern::new("ab|cd").unwrap();
        assert!(p.matches("ab"));
        assert!(p.matches("cd"));
        assert!(!p.matches("xab"));
        assert!(!p.matches("cdx"));
    }

    #[test]
    fn invalid_regex_is_rejected() {
        assert!(NamePattern::new("test[").is_err());
    }

    #[test]
    fn substitution_expands_groups() {
        let p = NamePattern::new("test([0-9]*)").unwrap();
        assert_eq!(p.substitute("test12", "new$1").unwrap(), "new12");
        assert_eq!(p.substitute("test1", "new$1").unwrap(), "new1");
    }

    #[test]
    fn extra_groups_are_ignored() {
        let p = NamePattern::new("test([0-9]*)([a-z]*)").unwrap();
        assert_eq!(p.substitute("test12", "new$1").unwrap(), "new12");
    }

    #[test]
    fn missing_groups_expand_empty() {
        let p = NamePattern::new("test([0-9]*)").unwrap();
        assert_eq!(p.substitute("test12", "new$1$2").unwrap(), "new12");
    }

    #[test]
    fn huge_group_numbers_expand_empty() {
        let p = NamePattern::new("test([0-9]*)").unwrap();
        assert_eq!(
            p.substitute("test12", "x$99999999999999999999999y").unwrap(),
            "xy"
        );
    }

    #[test]
    fn group_reference_followed_by_text() {
        let p = NamePattern::new("test([0-9]*)").unwrap();
        assert_eq!(p.substitute("test12", "$1_out").unwrap(), "12_out");
        assert_eq!(p.substitute("test12", "a$$b$1").unwrap(), "a$b12");
    }

    #[test]
    fn substitution_requires_a_match() {
        let p = NamePattern::new("test([0-9]*)").unwrap();
        assert!(p.substitute("other", "new$1").is_none());

        let literal = NamePattern::new("test").unwrap();
        assert!(literal.substitute("test", "new").is_none());
    }
}
