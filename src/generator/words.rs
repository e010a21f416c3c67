// File: src/generator/words.rs
//! Prompt construction, output parsing and the placeholder fallback.

use crate::core::types::{Emoji, WordList};
use std::collections::HashSet;

pub fn build_prompt(emoji: &Emoji, min_words: usize, max_words: usize) -> String {
    format!(
        "List between {min} and {max} short, lowercase English words or phrases that people \
         commonly associate with the emoji {emoji} (U+{cp:04X}), focusing on how it is used in \
         everyday messages.\n\
         Respond with a single JSON array of strings and nothing else, for example: \
         [\"word one\", \"word two\"]",
        min = min_words,
        max = max_words,
        emoji = emoji,
        cp = emoji.code_point(),
    )
}

/// Removes a surrounding ``` fence (with or without a language tag).
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            None => rest,
        };
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Parses process output as a JSON array of strings. Falls back to the
/// outermost `[...]` span when the model wrapped the array in prose.
/// Returns `None` unless the result is a non-empty list of strings.
pub fn parse_word_array(raw: &str) -> Option<Vec<String>> {
    let text = strip_code_fences(raw);
    let value: serde_json::Value = serde_json::from_str(text).ok().or_else(|| {
        let start = text.find('[')?;
        let end = text.rfind(']')?;
        if end <= start {
            return None;
        }
        serde_json::from_str(&text[start..=end]).ok()
    })?;

    let items = value.as_array()?;
    let words = items
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()?;
    let words = normalize(words);
    if words.is_empty() {
        None
    } else {
        Some(words)
    }
}

/// Trims, lowercases and collapses inner whitespace; drops blanks and repeats.
pub fn normalize(words: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    words
        .into_iter()
        .map(|w| w.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase())
        .filter(|w| !w.is_empty())
        .filter(|w| seen.insert(w.clone()))
        .collect()
}

pub fn placeholder(emoji: &Emoji, n: usize) -> String {
    format!("emoji-{}-{}", emoji.hex_label(), n)
}

/// Pads with placeholders up to `min_words` and truncates to `max_words`.
pub fn fit_to_bounds(emoji: &Emoji, mut words: WordList, min_words: usize, max_words: usize) -> WordList {
    words.truncate(max_words);
    let mut n = 1;
    while words.len() < min_words {
        let filler = placeholder(emoji, n);
        if !words.contains(&filler) {
            words.push(filler);
        }
        n += 1;
    }
    words
}

/// Deterministic stand-in when the process gives nothing usable. The count
/// is derived from the code point so it varies across emoji but never
/// across runs.
pub fn fallback_words(emoji: &Emoji, min_words: usize, max_words: usize) -> WordList {
    let span = max_words.saturating_sub(min_words) + 1;
    let count = min_words + (emoji.code_point() as usize % span);
    (1..=count).map(|n| placeholder(emoji, n)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dice() -> Emoji {
        Emoji::new("🎲").unwrap()
    }

    #[test]
    fn prompt_names_bounds_and_shape() {
        let prompt = build_prompt(&dice(), 10, 20);
        assert!(prompt.contains("between 10 and 20"));
        assert!(prompt.contains("U+1F3B2"));
        assert!(prompt.contains("JSON array of strings"));
    }

    #[test]
    fn parses_plain_and_fenced_arrays() {
        assert_eq!(parse_word_array(r#"["Dice", " game "]"#), Some(vec!["dice".into(), "game".into()]));
        let fenced = "```json\n[\"luck\", \"chance\"]\n```";
        assert_eq!(parse_word_array(fenced), Some(vec!["luck".into(), "chance".into()]));
        let chatty = "Sure! Here you go: [\"roll\"] Hope that helps.";
        assert_eq!(parse_word_array(chatty), Some(vec!["roll".into()]));
    }

    #[test]
    fn rejects_wrong_shapes() {
        assert_eq!(parse_word_array(r#"{"words": ["a"]}"#), None);
        assert_eq!(parse_word_array(r#"["a", 3]"#), None);
        assert_eq!(parse_word_array("[]"), None);
        assert_eq!(parse_word_array(r#"["  ", ""]"#), None);
        assert_eq!(parse_word_array("no array here"), None);
        assert_eq!(parse_word_array("] backwards ["), None);
    }

    #[test]
    fn normalize_dedups_and_lowercases() {
        let words = normalize(vec!["Game".into(), "game".into(), "Board  Game".into()]);
        assert_eq!(words, vec!["game".to_string(), "board game".to_string()]);
    }

    #[test]
    fn fit_pads_and_truncates() {
        let padded = fit_to_bounds(&dice(), vec!["dice".into()], 3, 5);
        assert_eq!(padded, vec!["dice", "emoji-1f3b2-1", "emoji-1f3b2-2"]);

        let long: WordList = (0..30).map(|i| format!("w{i}")).collect();
        assert_eq!(fit_to_bounds(&dice(), long, 3, 5).len(), 5);
    }

    #[test]
    fn fallback_is_deterministic_and_bounded() {
        for cp in [0x1F600u32, 0x1F3B2, 0x2600, 0x1FAFF] {
            let emoji = Emoji::from_char(char::from_u32(cp).unwrap());
            let first = fallback_words(&emoji, 10, 20);
            assert_eq!(first, fallback_words(&emoji, 10, 20));
            assert!((10..=20).contains(&first.len()));
            assert!(first.iter().all(|w| !w.is_empty() && w.contains(&emoji.hex_label())));
        }
        assert_eq!(fallback_words(&dice(), 4, 4).len(), 4);
    }
}
