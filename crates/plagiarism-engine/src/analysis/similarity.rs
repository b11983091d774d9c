//! Set-based n-gram Jaccard similarity with a word-level fallback for short texts.

use std::collections::HashSet;

pub const DEFAULT_NGRAM_SIZE: usize = 3;
pub const DEFAULT_THRESHOLD: f64 = 0.7;

/// Compares normalized texts.
///
/// The score is symmetric and always in `[0, 1]`. The match threshold is
/// only consulted by [`SimilarityEngine::is_match`] and never alters a score.
#[derive(Debug, Clone, Copy)]
pub struct SimilarityEngine {
    ngram_size: usize,
    threshold: f64,
}

impl SimilarityEngine {
    /// Sizes below 2 fall back to [`DEFAULT_NGRAM_SIZE`], non-positive
    /// thresholds to [`DEFAULT_THRESHOLD`].
    pub fn new(ngram_size: usize, threshold: f64) -> Self {
        let ngram_size = if ngram_size < 2 {
            DEFAULT_NGRAM_SIZE
        } else {
            ngram_size
        };
        let threshold = if threshold > 0.0 {
            threshold
        } else {
            DEFAULT_THRESHOLD
        };

        Self {
            ngram_size,
            threshold,
        }
    }

    pub fn ngram_size(&self) -> usize {
        self.ngram_size
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Similarity of two normalized texts (whitespace-separated tokens).
    pub fn compare(&self, text_a: &str, text_b: &str) -> f64 {
        let tokens_a: Vec<&str> = text_a.split_whitespace().collect();
        let tokens_b: Vec<&str> = text_b.split_whitespace().collect();
        self.compare_tokens(&tokens_a, &tokens_b)
    }

    pub fn compare_tokens<S: AsRef<str>>(&self, tokens_a: &[S], tokens_b: &[S]) -> f64 {
        if tokens_a.is_empty() || tokens_b.is_empty() {
            return 0.0;
        }

        if tokens_a.len() < self.ngram_size || tokens_b.len() < self.ngram_size {
            let words_a: HashSet<&str> = tokens_a.iter().map(|t| t.as_ref()).collect();
            let words_b: HashSet<&str> = tokens_b.iter().map(|t| t.as_ref()).collect();
            return jaccard(&words_a, &words_b);
        }

        let grams_a = self.ngrams(tokens_a);
        let grams_b = self.ngrams(tokens_b);
        jaccard(&grams_a, &grams_b)
    }

    pub fn is_match(&self, score: f64) -> bool {
        score >= self.threshold
    }

    /// Runs of at least `min_words` consecutive tokens shared by both texts.
    ///
    /// Scans `text_a` left to right; after a run is recorded the scan resumes
    /// past its end.
    pub fn common_sections(&self, text_a: &str, text_b: &str, min_words: usize) -> Vec<String> {
        let words_a: Vec<&str> = text_a.split_whitespace().collect();
        let words_b: Vec<&str> = text_b.split_whitespace().collect();
        let min_words = min_words.max(1);

        let mut sections = Vec::new();
        let mut i = 0;
        while i < words_a.len() {
            let mut advance = 1;
            for j in 0..words_b.len() {
                let run = words_a[i..]
                    .iter()
                    .zip(&words_b[j..])
                    .take_while(|(a, b)| a == b)
                    .count();
                if run >= min_words {
                    sections.push(words_a[i..i + run].join(" "));
                    advance = run;
                    break;
                }
            }
            i += advance;
        }

        sections
    }

    fn ngrams<S: AsRef<str>>(&self, tokens: &[S]) -> HashSet<String> {
        tokens
            .windows(self.ngram_size)
            .map(|window| {
                window
                    .iter()
                    .map(|t| t.as_ref())
                    .collect::<Vec<&str>>()
                    .join(" ")
            })
            .collect()
    }
}

impl Default for SimilarityEngine {
    fn default() -> Self {
        Self::new(DEFAULT_NGRAM_SIZE, DEFAULT_THRESHOLD)
    }
}

fn jaccard<T: Eq + std::hash::Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXTS: &[&str] = &[
        "",
        "alpha",
        "alpha beta",
        "alpha beta gamma",
        "alpha beta gamma delta",
        "beta gamma delta epsilon",
        "delta gamma beta alpha alpha beta",
        "работа студента номер один работа",
        "совсем другой текст без совпадений вообще",
    ];

    #[test]
    fn test_worked_example() {
        let engine = SimilarityEngine::default();
        let score = engine.compare("a b c d", "b c d e");
        assert!((score - 1.0 / 3.0).abs() < 1e-9, "got {}", score);
    }

    #[test]
    fn test_symmetric_and_in_range() {
        let engine = SimilarityEngine::default();
        for a in TEXTS {
            for b in TEXTS {
                let ab = engine.compare(a, b);
                let ba = engine.compare(b, a);
                assert_eq!(ab, ba, "asymmetric for {:?} / {:?}", a, b);
                assert!((0.0..=1.0).contains(&ab), "out of range for {:?} / {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_identity() {
        let engine = SimilarityEngine::default();
        for text in TEXTS.iter().filter(|t| !t.is_empty()) {
            assert_eq!(engine.compare(text, text), 1.0, "identity failed for {:?}", text);
        }
    }

    #[test]
    fn test_empty_input_scores_zero() {
        let engine = SimilarityEngine::default();
        for text in TEXTS {
            assert_eq!(engine.compare("", text), 0.0);
            assert_eq!(engine.compare(text, ""), 0.0);
        }
    }

    #[test]
    fn test_short_text_uses_word_sets() {
        let engine = SimilarityEngine::default();
        // "alpha beta" has fewer than 3 tokens: {alpha, beta} vs {alpha, beta, gamma, delta}
        assert_eq!(engine.compare("alpha beta", "alpha beta gamma delta"), 0.5);
        // Duplicates collapse in the word sets.
        assert_eq!(engine.compare("beta beta", "beta alpha"), 0.5);
    }

    #[test]
    fn test_duplicate_grams_collapse() {
        let engine = SimilarityEngine::default();
        // grams(a) = {"x y z", "y z x", "z x y"}, grams(b) = {"x y z"}
        let score = engine.compare("x y z x y z x y", "x y z");
        assert!((score - 1.0 / 3.0).abs() < 1e-9, "got {}", score);
    }

    #[test]
    fn test_disjoint_texts() {
        let engine = SimilarityEngine::default();
        assert_eq!(engine.compare("a b c d", "e f g h"), 0.0);
    }

    #[test]
    fn test_invalid_parameters_fall_back_to_defaults() {
        let engine = SimilarityEngine::new(1, 0.0);
        assert_eq!(engine.ngram_size(), DEFAULT_NGRAM_SIZE);
        assert_eq!(engine.threshold(), DEFAULT_THRESHOLD);

        let engine = SimilarityEngine::new(4, 0.5);
        assert_eq!(engine.ngram_size(), 4);
        assert_eq!(engine.threshold(), 0.5);
    }

    #[test]
    fn test_is_match_is_inclusive() {
        let engine = SimilarityEngine::default();
        assert!(engine.is_match(0.7));
        assert!(engine.is_match(1.0));
        assert!(!engine.is_match(0.69));
    }

    #[test]
    fn test_common_sections() {
        let engine = SimilarityEngine::default();
        let sections = engine.common_sections(
            "intro shared part one middle another shared run here",
            "xx shared part one yy another shared run zz",
            3,
        );
        assert_eq!(sections, vec!["shared part one", "another shared run"]);

        assert!(engine.common_sections("a b", "c d", 2).is_empty());
    }
}
