// Copyright 2026-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The name-matching seam.
//!
//! The engines never rank names themselves - they consume an injected
//! [`NameMatcher`] and only rely on its contract: `None` means the candidate
//! does not match at all and must be excluded; `Some(s)` with `s` in `(0, 1]`
//! is the match strength, multiplied into the combined score. Anything
//! fancier (camelCase segmentation, typo tolerance) lives behind this trait
//! on the caller's side.
//!
//! [`SubsequenceMatcher`] is the batteries-included implementation used by
//! the CLI and the test suite: case-insensitive subsequence matching with a
//! preference for tight, early matches.

/// Scores candidate names against one fixed query.
pub trait NameMatcher {
    /// `None` excludes the candidate; `Some(s)` is its match strength in
    /// `(0, 1]`.
    fn match_name(&self, candidate: &str) -> Option<f32>;
}

/// Any plain scoring function is a matcher; handy for tests.
impl<F> NameMatcher for F
where
    F: Fn(&str) -> Option<f32>,
{
    fn match_name(&self, candidate: &str) -> Option<f32> {
        self(candidate)
    }
}

/// Case-insensitive subsequence matcher.
///
/// The query matches if its characters appear in the candidate in order.
/// The score rewards matches that span few candidate characters and
/// candidates not much longer than the query, so `"vec"` scores `vector`
/// above `very_eccentric_counter`. An empty query matches everything at
/// full strength.
pub struct SubsequenceMatcher {
    pattern: Vec<char>,
}

impl SubsequenceMatcher {
    pub fn new(query: &str) -> Self {
        SubsequenceMatcher {
            pattern: query.to_lowercase().chars().collect(),
        }
    }
}

impl NameMatcher for SubsequenceMatcher {
    fn match_name(&self, candidate: &str) -> Option<f32> {
        if self.pattern.is_empty() {
            return Some(1.0);
        }
        let lowered: Vec<char> = candidate.to_lowercase().chars().collect();
        if lowered.is_empty() || self.pattern.len() > lowered.len() {
            return None;
        }

        // Greedy leftmost alignment of the pattern inside the candidate.
        let mut first = None;
        let mut last = 0usize;
        let mut next = 0usize;
        for (pos, &c) in lowered.iter().enumerate() {
            if next < self.pattern.len() && c == self.pattern[next] {
                if next == 0 {
                    first = Some(pos);
                }
                last = pos;
                next += 1;
            }
        }
        if next < self.pattern.len() {
            return None;
        }

        let span = (last - first.expect("pattern matched")) + 1;
        // Tightness: how contiguously the pattern matched.
        let tightness = self.pattern.len() as f32 / span as f32;
        // Coverage: how much of the candidate the pattern accounts for.
        let coverage = self.pattern.len() as f32 / lowered.len() as f32;
        Some(0.75 * tightness + 0.25 * coverage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_scores_one() {
        let m = SubsequenceMatcher::new("vector");
        assert_eq!(m.match_name("vector"), Some(1.0));
        assert_eq!(m.match_name("Vector"), Some(1.0));
    }

    #[test]
    fn test_non_subsequence_is_excluded() {
        let m = SubsequenceMatcher::new("xyz");
        assert_eq!(m.match_name("vector"), None);
        // Order matters: "cba" is not a subsequence of "abc".
        assert_eq!(SubsequenceMatcher::new("cba").match_name("abc"), None);
    }

    #[test]
    fn test_prefix_beats_scattered() {
        let m = SubsequenceMatcher::new("vec");
        let tight = m.match_name("vector").unwrap();
        let scattered = m.match_name("very_eccentric_counter").unwrap();
        assert!(tight > scattered);
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let m = SubsequenceMatcher::new("");
        assert_eq!(m.match_name("anything"), Some(1.0));
        assert_eq!(m.match_name(""), Some(1.0));
    }

    #[test]
    fn test_pattern_longer_than_candidate_is_excluded() {
        let m = SubsequenceMatcher::new("vector");
        assert_eq!(m.match_name("vec"), None);
    }

    #[test]
    fn test_scores_stay_in_unit_interval() {
        let m = SubsequenceMatcher::new("ab");
        for candidate in ["ab", "axb", "a_________b", "abab"] {
            let score = m.match_name(candidate).unwrap();
            assert!(score > 0.0 && score <= 1.0, "{candidate}: {score}");
        }
    }

    #[test]
    fn test_closures_are_matchers() {
        let reject_all = |_: &str| -> Option<f32> { None };
        assert_eq!(reject_all.match_name("x"), None);
    }
}
