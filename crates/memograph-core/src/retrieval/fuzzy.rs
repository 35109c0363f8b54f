//! Approximate string matching for the search mirror.
//!
//! A field is scored by the cheapest approximate occurrence of the pattern
//! anywhere inside it: `edits / pattern_len`, plus `start / distance` so that
//! matches far from the beginning of a field rank lower. `0.0` is an exact
//! match at position zero; scores are clamped to `1.0`.

use crate::config::SearchConfig;

/// Scores text fields against one query.
#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    pattern: Vec<char>,
    threshold: f64,
    distance: usize,
    ignore_location: bool,
}

impl FuzzyMatcher {
    /// Build a matcher. Returns `None` for a blank query.
    pub fn new(query: &str, config: &SearchConfig) -> Option<Self> {
        let pattern = fold(query.trim());
        if pattern.is_empty() {
            return None;
        }
        Some(Self {
            pattern,
            threshold: config.threshold,
            distance: config.distance,
            ignore_location: config.ignore_location,
        })
    }

    /// Score of the best match in `text`, or `None` when it exceeds the threshold.
    pub fn score(&self, text: &str) -> Option<f64> {
        self.score_folded(&fold(text))
    }

    /// Like [`score`](Self::score) for text that is already case-folded.
    pub fn score_folded(&self, text: &[char]) -> Option<f64> {
        let score = self.raw_score(text);
        (score <= self.threshold).then_some(score)
    }

    /// Best score over several fields.
    pub fn best_score<'a, I>(&self, fields: I) -> Option<f64>
    where
        I: IntoIterator<Item = &'a [char]>,
    {
        let mut best: Option<f64> = None;
        for field in fields {
            if let Some(score) = self.score_folded(field) {
                if best.map_or(true, |b| score < b) {
                    best = Some(score);
                }
                if score == 0.0 {
                    break;
                }
            }
        }
        best
    }

    fn raw_score(&self, text: &[char]) -> f64 {
        let m = self.pattern.len();

        // cost[i] / start[i]: cheapest alignment of pattern[..i] ending at the
        // current text column, and the text index where that alignment begins.
        let mut cost: Vec<usize> = (0..=m).collect();
        let mut start: Vec<usize> = vec![0; m + 1];
        let mut best = self.location_score(m, 0);

        for (j, &tc) in text.iter().enumerate() {
            let mut next_cost = vec![0; m + 1];
            let mut next_start = vec![0; m + 1];
            next_start[0] = j + 1;

            for i in 1..=m {
                let substitution = cost[i - 1] + usize::from(self.pattern[i - 1] != tc);
                let mut choice = (substitution, start[i - 1]);

                let skip_text = (cost[i] + 1, start[i]);
                if skip_text < choice {
                    choice = skip_text;
                }
                let skip_pattern = (next_cost[i - 1] + 1, next_start[i - 1]);
                if skip_pattern < choice {
                    choice = skip_pattern;
                }

                next_cost[i] = choice.0;
                next_start[i] = choice.1;
            }

            cost = next_cost;
            start = next_start;

            let score = self.location_score(cost[m], start[m]);
            if score < best {
                best = score;
                if best == 0.0 {
                    break;
                }
            }
        }

        best
    }

    fn location_score(&self, edits: usize, position: usize) -> f64 {
        let accuracy = edits as f64 / self.pattern.len() as f64;
        let proximity = if self.ignore_location || self.distance == 0 {
            0.0
        } else {
            position as f64 / self.distance as f64
        };
        (accuracy + proximity).min(1.0)
    }
}

/// Lowercase into a char vector so indices are character positions.
pub(crate) fn fold(text: &str) -> Vec<char> {
    text.chars().flat_map(char::to_lowercase).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(query: &str) -> FuzzyMatcher {
        FuzzyMatcher::new(query, &SearchConfig::default()).unwrap()
    }

    #[test]
    fn test_blank_query_has_no_matcher() {
        assert!(FuzzyMatcher::new("   ", &SearchConfig::default()).is_none());
    }

    #[test]
    fn test_exact_match_scores_zero() {
        assert_eq!(matcher("john").score("John"), Some(0.0));
    }

    #[test]
    fn test_typo_within_threshold() {
        let score = matcher("johm").score("John").unwrap();
        assert!((score - 0.25).abs() < 1e-9, "score was {}", score);
    }

    #[test]
    fn test_unrelated_text_is_rejected() {
        assert_eq!(matcher("widgets").score("Person"), None);
    }

    #[test]
    fn test_substring_is_penalized_by_position() {
        let near = matcher("widgets").score("makes widgets").unwrap();
        assert!(near > 0.0 && near < 0.1, "score was {}", near);

        let far_text = format!("{}widgets", "x".repeat(60));
        assert_eq!(matcher("widgets").score(&far_text), None);
    }

    #[test]
    fn test_ignore_location() {
        let config = SearchConfig {
            ignore_location: true,
            ..Default::default()
        };
        let far_text = format!("{}widgets", "x".repeat(60));
        let matcher = FuzzyMatcher::new("widgets", &config).unwrap();
        assert_eq!(matcher.score(&far_text), Some(0.0));
    }

    #[test]
    fn test_query_longer_than_text() {
        // "johnny" vs "john": two missing characters out of six.
        let score = matcher("johnny").score("John").unwrap();
        assert!((score - 2.0 / 6.0).abs() < 1e-9, "score was {}", score);
    }

    #[test]
    fn test_best_score_over_fields() {
        let m = matcher("acme");
        let fields = [fold("Company"), fold("Acme")];
        assert_eq!(m.best_score(fields.iter().map(Vec::as_slice)), Some(0.0));
        let none = [fold("zzz")];
        assert_eq!(m.best_score(none.iter().map(Vec::as_slice)), None);
    }

    #[test]
    fn test_non_ascii_text() {
        assert_eq!(matcher("软件").score("是一名软件工程师").map(|s| s < 0.1), Some(true));
    }
}
