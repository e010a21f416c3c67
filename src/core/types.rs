// src/core/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a word in the trie's term store.
pub type WordId = usize;

/// Ordered, lowercase words associated with one emoji.
pub type WordList = Vec<String>;

/// A pictographic symbol, identified by its code point(s).
/// Usually a single scalar value; sequences read from data files are kept
/// verbatim so that keys like "❤️" survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Emoji(String);

impl Emoji {
    pub fn from_char(c: char) -> Self {
        Self(c.to_string())
    }

    /// Returns `None` for an empty string.
    pub fn new(symbol: impl Into<String>) -> Option<Self> {
        let symbol = symbol.into();
        let trimmed = symbol.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first scalar value.
    pub fn code_point(&self) -> u32 {
        self.0.chars().next().map(u32::from).unwrap_or(0)
    }

    /// Lowercase hex of every scalar, joined with '-', e.g. "1f3b2".
    pub fn hex_label(&self) -> String {
        self.0
            .chars()
            .map(|c| format!("{:x}", u32::from(c)))
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl fmt::Display for Emoji {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One dictionary row: an emoji, its words and the group it is listed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub emoji: Emoji,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub words: WordList,
}

/// What the trie stores per word: every emoji listing it, with a score
/// derived from the word's position in that emoji's list.
#[derive(Debug, Clone)]
pub struct WordMetadata {
    pub word: String,
    pub emojis: Vec<(Emoji, u64)>,
}

impl WordMetadata {
    pub fn best_score(&self) -> u64 {
        self.emojis.iter().map(|(_, s)| *s).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_label_covers_sequences() {
        assert_eq!(Emoji::from_char('🎲').hex_label(), "1f3b2");
        assert_eq!(Emoji::new("❤️").unwrap().hex_label(), "2764-fe0f");
    }

    #[test]
    fn blank_symbol_is_rejected() {
        assert!(Emoji::new("  ").is_none());
        assert_eq!(Emoji::new(" 😀 ").unwrap().as_str(), "😀");
    }
}
