//! Content predicates: "does this file mention X".
//!
//! Literal predicates are case-insensitive searches where both `*` and `**` stand for
//! any run of text, newlines included. Every other character is matched literally.
//! Compiled patterns are applied to the whole content unchanged.

use regex::Regex;
use tracing::debug;

use crate::contract::{ContentPredicate, SnapshotError};

#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    matchers: Vec<Regex>,
}

impl ContentFilter {
    pub fn new(predicates: &[ContentPredicate]) -> Result<Self, SnapshotError> {
        let matchers = predicates
            .iter()
            .map(|predicate| match predicate {
                ContentPredicate::Literal(literal) => literal_to_regex(literal),
                ContentPredicate::Pattern(pattern) => Ok(pattern.clone()),
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!(predicates = matchers.len(), "Compiled content filter");
        Ok(Self { matchers })
    }

    /// Empty filter accepts everything; otherwise any single match is enough.
    pub fn accepts(&self, content: &str) -> bool {
        self.matchers.is_empty() || self.matchers.iter().any(|re| re.is_match(content))
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

/// Converts a wildcard literal into a case-insensitive, dot-matches-newline regex.
pub fn literal_to_regex(literal: &str) -> Result<Regex, SnapshotError> {
    let mut expression = String::from("(?is)");
    for (index, chunk) in literal.split('*').enumerate() {
        if index > 0 && !expression.ends_with(".*") {
            expression.push_str(".*");
        }
        expression.push_str(&regex::escape(chunk));
    }
    Regex::new(&expression).map_err(|e| SnapshotError::InvalidContentPattern {
        pattern: literal.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(predicates: Vec<ContentPredicate>) -> ContentFilter {
        ContentFilter::new(&predicates).unwrap()
    }

    #[test]
    fn empty_filter_accepts_everything() {
        let f = filter(vec![]);
        assert!(f.is_empty());
        assert!(f.accepts(""));
        assert!(f.accepts("anything at all"));
    }

    #[test]
    fn literal_is_a_case_insensitive_substring() {
        let f = filter(vec!["app.disabled".into()]);
        assert!(f.accepts("if (App.Disabled('x')) {}"));
        assert!(!f.accepts("app.enabled only"));
    }

    #[test]
    fn literal_dots_are_not_regex_wildcards() {
        let f = filter(vec!["app.disabled".into()]);
        assert!(!f.accepts("appXdisabled"));
    }

    #[test]
    fn single_and_double_star_both_match_any_text_across_lines() {
        let single = filter(vec!["require*express".into()]);
        let double = filter(vec!["require**express".into()]);
        let content = "const x = require(\n  'express'\n);";
        assert!(single.accepts(content));
        assert!(double.accepts(content));
    }

    #[test]
    fn any_predicate_matching_is_enough() {
        let f = filter(vec![
            "never-present".into(),
            ContentPredicate::pattern(r"fn\s+main").unwrap(),
        ]);
        assert!(f.accepts("pub fn   main() {}"));
        assert!(!f.accepts("nothing here"));
    }

    #[test]
    fn compiled_pattern_is_applied_as_is() {
        let f = filter(vec![ContentPredicate::pattern("^Exact$").unwrap()]);
        assert!(f.accepts("Exact"));
        assert!(!f.accepts("exact"));
    }

    #[test]
    fn invalid_regex_predicate_is_rejected() {
        let err = ContentPredicate::pattern("(unclosed").unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidContentPattern { .. }));
    }
}
