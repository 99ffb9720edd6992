//! Tokenization and weighting strategies.
//!
//! A tokenizer turns raw text into a weighted token multiset. The fingerprint
//! engine accepts any `(token, weight)` sequence, so these are conveniences
//! rather than a fixed policy.

use std::borrow::Cow;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A token paired with its weight.
pub type WeightedToken<'a> = (Cow<'a, str>, f64);

/// Strategy producing a weighted token multiset from text.
pub trait Tokenizer {
    /// Tokenize `text`; weights default to occurrence counts.
    fn tokenize<'a>(&self, text: &'a str) -> Vec<WeightedToken<'a>>;
}

/// Collapse repeated tokens into one entry weighted by occurrence count.
///
/// First-occurrence order is preserved.
pub fn count_tokens<'a, I>(tokens: I) -> Vec<WeightedToken<'a>>
where
    I: IntoIterator<Item = Cow<'a, str>>,
{
    let mut counts: IndexMap<Cow<'a, str>, f64> = IndexMap::new();
    for token in tokens {
        *counts.entry(token).or_insert(0.0) += 1.0;
    }
    counts.into_iter().collect()
}

/// Splits on Unicode whitespace; one token per word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WordTokenizer;

impl Tokenizer for WordTokenizer {
    fn tokenize<'a>(&self, text: &'a str) -> Vec<WeightedToken<'a>> {
        count_tokens(text.split_whitespace().map(Cow::Borrowed))
    }
}

/// Overlapping word k-grams joined by a single space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShingleTokenizer {
    size: usize,
}

impl ShingleTokenizer {
    /// Create a shingle tokenizer; a size of 0 is treated as 1.
    pub fn new(size: usize) -> Self {
        Self { size: size.max(1) }
    }

    /// Words per shingle.
    pub fn size(&self) -> usize {
        self.size
    }
}

impl Tokenizer for ShingleTokenizer {
    fn tokenize<'a>(&self, text: &'a str) -> Vec<WeightedToken<'a>> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return Vec::new();
        }
        if self.size == 1 {
            return count_tokens(words.into_iter().map(Cow::Borrowed));
        }
        // Short texts still contribute a single shingle.
        if words.len() < self.size {
            return vec![(Cow::Owned(words.join(" ")), 1.0)];
        }
        count_tokens(
            words
                .windows(self.size)
                .map(|window| Cow::Owned(window.join(" "))),
        )
    }
}

/// Serializable selector over the built-in tokenizers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum TokenizerKind {
    /// [`WordTokenizer`]
    #[default]
    Words,
    /// [`ShingleTokenizer`] with the given k-gram size
    Shingles {
        /// Words per shingle
        size: usize,
    },
}

impl Tokenizer for TokenizerKind {
    fn tokenize<'a>(&self, text: &'a str) -> Vec<WeightedToken<'a>> {
        match self {
            Self::Words => WordTokenizer.tokenize(text),
            Self::Shingles { size } => ShingleTokenizer::new(*size).tokenize(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(tokens: Vec<WeightedToken<'_>>) -> Vec<(String, f64)> {
        tokens
            .into_iter()
            .map(|(token, weight)| (token.into_owned(), weight))
            .collect()
    }

    #[test]
    fn test_word_weights_are_counts() {
        let tokens = owned(WordTokenizer.tokenize("blar  blar\tthanks\nblar"));
        assert_eq!(
            tokens,
            vec![("blar".to_string(), 3.0), ("thanks".to_string(), 1.0)]
        );
    }

    #[test]
    fn test_word_empty_text() {
        assert!(WordTokenizer.tokenize("   ").is_empty());
    }

    #[test]
    fn test_shingles() {
        let tokens = owned(ShingleTokenizer::new(2).tokenize("a b a b"));
        assert_eq!(
            tokens,
            vec![("a b".to_string(), 2.0), ("b a".to_string(), 1.0)]
        );
    }

    #[test]
    fn test_shingles_short_text() {
        let tokens = owned(ShingleTokenizer::new(3).tokenize("only two"));
        assert_eq!(tokens, vec![("only two".to_string(), 1.0)]);
        assert!(ShingleTokenizer::new(3).tokenize("").is_empty());
    }

    #[test]
    fn test_kind_yaml_form() {
        let kind: TokenizerKind = serde_yaml::from_str("kind: shingles\nsize: 4").unwrap();
        assert_eq!(kind, TokenizerKind::Shingles { size: 4 });
        let kind: TokenizerKind = serde_yaml::from_str("kind: words").unwrap();
        assert_eq!(kind, TokenizerKind::Words);
    }
}
