//! Turns extracted document text into the token stream used for comparison.

/// Russian function words that carry no signal for similarity.
const STOP_WORDS: &[&str] = &[
    "и", "в", "не", "на", "с", "по", "к", "у", "о", "за", "из", "от", "до", "для", "это", "как",
    "так", "но", "а", "же", "что", "он", "она", "они", "мы", "вы", "его", "ее", "их", "все", "то",
    "бы", "во",
];

/// Tokens with this many UTF-8 bytes or fewer are dropped. Two-letter
/// Cyrillic words are four bytes long and survive unless they are stop words.
const MIN_TOKEN_BYTES: usize = 2;

#[derive(Debug, Clone, Copy, Default)]
pub struct TextNormalizer;

impl TextNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Lowercases, strips everything except Cyrillic/Latin letters and digits,
    /// and drops stop words and short tokens.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        let cleaned: String = text
            .to_lowercase()
            .chars()
            .map(|c| if is_word_char(c) { c } else { ' ' })
            .collect();

        cleaned
            .split_whitespace()
            .filter(|token| token.len() > MIN_TOKEN_BYTES)
            .filter(|token| !STOP_WORDS.contains(token))
            .map(str::to_string)
            .collect()
    }

    /// Normalized text: the surviving tokens joined by single spaces.
    pub fn normalize(&self, text: &str) -> String {
        self.tokens(text).join(" ")
    }
}

fn is_word_char(c: char) -> bool {
    matches!(c, 'а'..='я' | 'ё' | 'a'..='z' | '0'..='9')
}
