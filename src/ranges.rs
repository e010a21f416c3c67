// File: src/ranges.rs
//! Enumerates candidate emoji from fixed code-point ranges and reads/writes
//! the ordered universe file that the batch generator consumes.
//!
//! Classification is a heuristic over std's character properties; there is
//! no emoji property table here, so some symbols slip through and some
//! pictographs may be dropped.

use crate::core::types::Emoji;
use crate::persistence::{read_json, write_json_atomic};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Range;
use std::path::Path;
use tracing::warn;

/// An inclusive code-point range with a human-readable label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmojiRange {
    pub start: u32,
    pub end: u32,
    pub category: &'static str,
}

impl EmojiRange {
    pub const fn new(start: u32, end: u32, category: &'static str) -> Self {
        Self { start, end, category }
    }
}

pub const DEFAULT_RANGES: &[EmojiRange] = &[
    EmojiRange::new(0x1F600, 0x1F64F, "Emoticons"),
    EmojiRange::new(0x1F300, 0x1F5FF, "Miscellaneous Symbols and Pictographs"),
    EmojiRange::new(0x1F680, 0x1F6FF, "Transport and Map Symbols"),
    EmojiRange::new(0x1F900, 0x1F9FF, "Supplemental Symbols and Pictographs"),
    EmojiRange::new(0x1FA70, 0x1FAFF, "Symbols and Pictographs Extended-A"),
    EmojiRange::new(0x2600, 0x26FF, "Miscellaneous Symbols"),
    EmojiRange::new(0x2700, 0x27BF, "Dingbats"),
    EmojiRange::new(0x2300, 0x23FF, "Miscellaneous Technical"),
    EmojiRange::new(0x2B00, 0x2BFF, "Miscellaneous Symbols and Arrows"),
    EmojiRange::new(0x1F1E6, 0x1F1FF, "Regional Indicator Symbols"),
    EmojiRange::new(0x1F004, 0x1F004, "Mahjong Tiles"),
    EmojiRange::new(0x1F0CF, 0x1F0CF, "Playing Cards"),
];

/// One element of the universe, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniverseItem {
    pub emoji: Emoji,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codepoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl UniverseItem {
    pub fn bare(emoji: Emoji) -> Self {
        Self { emoji, codepoint: None, category: None }
    }
}

/// The ordered universe as read from disk. Every position in the file
/// keeps its slot, so offsets and batch file names count file positions
/// even when an item there is unusable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Universe {
    slots: Vec<Option<UniverseItem>>,
}

impl Universe {
    pub fn from_slots(slots: Vec<Option<UniverseItem>>) -> Self {
        Self { slots }
    }

    /// Number of positions, unusable ones included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of positions holding an emoji.
    pub fn usable(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn get(&self, position: usize) -> Option<&UniverseItem> {
        self.slots.get(position)?.as_ref()
    }

    /// Usable items inside `window`, in order. The window is clamped to the
    /// universe.
    pub fn items_in(&self, window: Range<usize>) -> impl Iterator<Item = &UniverseItem> {
        let end = window.end.min(self.slots.len());
        let start = window.start.min(end);
        self.slots[start..end].iter().flatten()
    }
}

impl From<Vec<UniverseItem>> for Universe {
    fn from(items: Vec<UniverseItem>) -> Self {
        Self::from_slots(items.into_iter().map(Some).collect())
    }
}

/// The universe file accepts bare strings or objects carrying `emoji`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawItem {
    Bare(String),
    Object {
        emoji: String,
        #[serde(default)]
        category: Option<String>,
    },
}

/// True for code points that read as text rather than a pictograph:
/// letters, numbers, punctuation, separators and controls.
pub fn looks_like_text(c: char) -> bool {
    c.is_alphanumeric() || c.is_whitespace() || c.is_control() || is_punctuation(c)
}

fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
        || matches!(u32::from(c),
            0x00A1..=0x00BF            // Latin-1 punctuation and signs
            | 0x2010..=0x2027          // dashes, quotes, bullets
            | 0x2030..=0x205E          // per-mille, primes, brackets
            | 0x2E00..=0x2E7F          // Supplemental Punctuation
            | 0x3001..=0x3003          // CJK comma and stops
            | 0xFE10..=0xFE19          // vertical forms
            | 0xFF01..=0xFF0F)         // fullwidth punctuation
}

/// Walks `ranges` in order and yields every decodable code point, skipping
/// surrogates. With `filter_text`, text-like characters are dropped.
/// A code point listed by several ranges appears once, with the first
/// range's category.
pub fn enumerate(ranges: &[EmojiRange], filter_text: bool) -> Vec<UniverseItem> {
    let mut seen = HashSet::new();
    let mut items = Vec::new();
    for range in ranges {
        for cp in range.start..=range.end {
            let Some(c) = char::from_u32(cp) else { continue };
            if filter_text && looks_like_text(c) {
                continue;
            }
            if !seen.insert(cp) {
                continue;
            }
            items.push(UniverseItem {
                emoji: Emoji::from_char(c),
                codepoint: Some(format!("U+{:04X}", cp)),
                category: Some(range.category.to_string()),
            });
        }
    }
    items
}

pub fn write_universe(path: &Path, items: &[UniverseItem]) -> Result<()> {
    write_json_atomic(path, items)
}

/// Reads the ordered universe. The file itself is a prerequisite; an item
/// that carries no usable emoji leaves an empty slot and a warning.
pub fn load_universe(path: &Path) -> Result<Universe> {
    let raw: Vec<serde_json::Value> = read_json(path)?;
    let mut slots = Vec::with_capacity(raw.len());
    for (i, value) in raw.into_iter().enumerate() {
        let parsed = serde_json::from_value::<RawItem>(value)
            .ok()
            .and_then(|item| match item {
                RawItem::Bare(s) => Emoji::new(s).map(UniverseItem::bare),
                RawItem::Object { emoji, category } => Emoji::new(emoji)
                    .map(|emoji| UniverseItem { emoji, codepoint: None, category }),
            });
        if parsed.is_none() {
            warn!(index = i, path = %path.display(), "unusable universe item, its slot stays empty");
        }
        slots.push(parsed);
    }
    Ok(Universe::from_slots(slots))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn enumeration_is_stable_and_deduplicated() {
        let ranges = [
            EmojiRange::new(0x1F600, 0x1F602, "Emoticons"),
            EmojiRange::new(0x1F601, 0x1F603, "Overlap"),
        ];
        let first = enumerate(&ranges, true);
        let second = enumerate(&ranges, true);
        assert_eq!(first, second);

        let glyphs: Vec<&str> = first.iter().map(|i| i.emoji.as_str()).collect();
        assert_eq!(glyphs, vec!["😀", "😁", "😂", "😃"]);
        assert_eq!(first[1].category.as_deref(), Some("Emoticons"));
        assert_eq!(first[3].category.as_deref(), Some("Overlap"));
        assert_eq!(first[0].codepoint.as_deref(), Some("U+1F600"));
    }

    #[test]
    fn surrogates_are_skipped() {
        let items = enumerate(&[EmojiRange::new(0xD7FF, 0xE000, "Edge")], false);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn text_filter_drops_letters_digits_and_punctuation() {
        let items = enumerate(&[EmojiRange::new(0x20, 0x7E, "ASCII")], true);
        assert!(items.is_empty());
        assert!(looks_like_text('—'));
        assert!(!looks_like_text('🎲'));
        assert!(!looks_like_text('☀'));
    }

    #[test]
    fn default_table_yields_common_emoji() {
        let items = enumerate(DEFAULT_RANGES, true);
        assert!(items.iter().any(|i| i.emoji.as_str() == "🎲"));
        assert!(items.iter().any(|i| i.emoji.as_str() == "😀"));
    }

    #[test]
    fn universe_accepts_bare_and_object_items() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("emoji_list.json");
        std::fs::write(
            &path,
            r#"["😀", {"emoji": "🎲", "category": "Games"}, 42, {"name": "x"}, ""]"#,
        )
        .unwrap();

        let universe = load_universe(&path).unwrap();
        assert_eq!(universe.usable(), 2);
        assert_eq!(universe.get(0), Some(&UniverseItem::bare(Emoji::new("😀").unwrap())));
        assert_eq!(universe.get(1).unwrap().category.as_deref(), Some("Games"));
    }

    #[test]
    fn unusable_items_keep_their_positions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("emoji_list.json");
        std::fs::write(&path, r#"["😀", 42, "", "🎲", {"name": "x"}, "🍕"]"#).unwrap();

        let universe = load_universe(&path).unwrap();
        assert_eq!(universe.len(), 6);
        assert!(universe.get(1).is_none());
        assert_eq!(universe.get(3).unwrap().emoji.as_str(), "🎲");
        assert_eq!(universe.get(5).unwrap().emoji.as_str(), "🍕");

        let window: Vec<&str> = universe.items_in(2..6).map(|i| i.emoji.as_str()).collect();
        assert_eq!(window, vec!["🎲", "🍕"]);
        assert_eq!(universe.items_in(5..99).count(), 1);
        assert_eq!(universe.items_in(9..12).count(), 0);
    }

    #[test]
    fn written_universe_reads_back_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("emoji_list.json");
        let items = enumerate(&[EmojiRange::new(0x1F3B2, 0x1F3B4, "Games")], true);
        write_universe(&path, &items).unwrap();

        let loaded = load_universe(&path).unwrap();
        assert_eq!(loaded.len(), items.len());
        let glyphs: Vec<&Emoji> = loaded.items_in(0..loaded.len()).map(|i| &i.emoji).collect();
        let expected: Vec<&Emoji> = items.iter().map(|i| &i.emoji).collect();
        assert_eq!(glyphs, expected);
    }
}
