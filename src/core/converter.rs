// File: src/core/converter.rs
use crate::core::types::Emoji;
use std::collections::HashMap;

/// What happens to matched words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubstitutionMode {
    /// "i love pizza" -> "i ❤️ 🍕"
    #[default]
    Replace,
    /// "i love pizza" -> "i love ❤️ pizza 🍕"
    Append,
}

/// A piece of input text: a word, or whatever lies between words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Word(&'a str),
    Gap(&'a str),
}

impl<'a> Segment<'a> {
    pub fn as_str(&self) -> &'a str {
        match self {
            Segment::Word(s) | Segment::Gap(s) => *s,
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '\''
}

/// Splits text into alternating words and gaps; concatenating the
/// segments gives back the input exactly.
pub fn segment(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_word: Option<bool> = None;
    for (i, c) in text.char_indices() {
        let word = is_word_char(c);
        match in_word {
            Some(current) if current != word => {
                segments.push(if current { Segment::Word(&text[start..i]) } else { Segment::Gap(&text[start..i]) });
                start = i;
            }
            _ => {}
        }
        in_word = Some(word);
    }
    if let Some(current) = in_word {
        let rest = &text[start..];
        segments.push(if current { Segment::Word(rest) } else { Segment::Gap(rest) });
    }
    segments
}

/// Lowercases and collapses whitespace so "Thumbs  Up" finds "thumbs up".
pub fn normalize_phrase(phrase: &str) -> String {
    phrase.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Replaces known words and phrases in text with emoji.
#[derive(Clone, Default)]
pub struct EmojiConverter {
    phrases: HashMap<String, Emoji>,
    max_phrase_words: usize,
}

impl EmojiConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `phrase` for `emoji`. The first emoji registered for a
    /// phrase keeps it.
    pub fn add_phrase(&mut self, phrase: &str, emoji: &Emoji) {
        let key = normalize_phrase(phrase);
        if key.is_empty() {
            return;
        }
        let words = key.split(' ').count();
        self.phrases.entry(key).or_insert_with(|| emoji.clone());
        self.max_phrase_words = self.max_phrase_words.max(words);
    }

    pub fn lookup(&self, phrase: &str) -> Option<&Emoji> {
        self.phrases.get(&normalize_phrase(phrase))
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Longest known phrase starting at word segment `at`, as the index of
    /// its last word segment and the emoji. Words in a phrase may only be
    /// separated by whitespace.
    fn longest_match(&self, segments: &[Segment<'_>], at: usize) -> Option<(usize, &Emoji)> {
        let mut word_idxs = vec![at];
        let mut j = at;
        while word_idxs.len() < self.max_phrase_words {
            match (segments.get(j + 1), segments.get(j + 2)) {
                (Some(Segment::Gap(gap)), Some(Segment::Word(_))) if gap.chars().all(char::is_whitespace) => {
                    j += 2;
                    word_idxs.push(j);
                }
                _ => break,
            }
        }

        for n in (1..=word_idxs.len()).rev() {
            let phrase = word_idxs[..n]
                .iter()
                .map(|&k| segments[k].as_str())
                .collect::<Vec<_>>()
                .join(" ");
            if let Some(emoji) = self.lookup(&phrase) {
                return Some((word_idxs[n - 1], emoji));
            }
        }
        None
    }

    /// Converts `text`, consulting `fallback` for single words that have no
    /// exact entry. Gaps (spaces, punctuation) pass through unchanged.
    pub fn convert<F>(&self, text: &str, mode: SubstitutionMode, fallback: F) -> String
    where
        F: Fn(&str) -> Option<Emoji>,
    {
        let segments = segment(text);
        let mut result = String::with_capacity(text.len());
        let mut i = 0;
        while i < segments.len() {
            let Segment::Word(word) = segments[i] else {
                result.push_str(segments[i].as_str());
                i += 1;
                continue;
            };

            let (end, emoji) = match self.longest_match(&segments, i) {
                Some((end, emoji)) => (end, Some(emoji.clone())),
                None => (i, fallback(word)),
            };
            let original: String = segments[i..=end].iter().map(Segment::as_str).collect();
            match (emoji, mode) {
                (Some(emoji), SubstitutionMode::Replace) => result.push_str(emoji.as_str()),
                (Some(emoji), SubstitutionMode::Append) => {
                    result.push_str(&original);
                    result.push(' ');
                    result.push_str(emoji.as_str());
                }
                (None, _) => result.push_str(&original),
            }
            i = end + 1;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converter() -> EmojiConverter {
        let mut c = EmojiConverter::new();
        c.add_phrase("pizza", &Emoji::new("🍕").unwrap());
        c.add_phrase("love", &Emoji::new("❤️").unwrap());
        c.add_phrase("thumbs up", &Emoji::new("👍").unwrap());
        c.add_phrase("thumbs", &Emoji::new("👎").unwrap());
        c.add_phrase("Pizza", &Emoji::new("🍰").unwrap());
        c
    }

    #[test]
    fn segments_rebuild_the_input() {
        let text = "Hi, it's 9am — ok?";
        let segments = segment(text);
        assert_eq!(segments.iter().map(Segment::as_str).collect::<String>(), text);
        assert_eq!(segments[0], Segment::Word("Hi"));
        assert_eq!(segments[2], Segment::Word("it's"));
        assert!(segment("").is_empty());
    }

    #[test]
    fn replaces_words_and_keeps_punctuation() {
        let out = converter().convert("I love Pizza!", SubstitutionMode::Replace, |_| None);
        assert_eq!(out, "I ❤️ 🍕!");
    }

    #[test]
    fn append_mode_keeps_the_words() {
        let out = converter().convert("love pizza", SubstitutionMode::Append, |_| None);
        assert_eq!(out, "love ❤️ pizza 🍕");
    }

    #[test]
    fn longest_phrase_wins() {
        let c = converter();
        assert_eq!(c.convert("thumbs  up!", SubstitutionMode::Replace, |_| None), "👍!");
        assert_eq!(c.convert("thumbs, up", SubstitutionMode::Replace, |_| None), "👎, up");
    }

    #[test]
    fn fallback_only_for_unknown_single_words() {
        let out = converter().convert("pizzza party", SubstitutionMode::Replace, |w| {
            (w == "pizzza").then(|| Emoji::new("🍕").unwrap())
        });
        assert_eq!(out, "🍕 party");
    }

    #[test]
    fn first_registration_keeps_the_phrase() {
        assert_eq!(converter().lookup("PIZZA").unwrap().as_str(), "🍕");
    }
}
