// File: src/generator/mod.rs
//! Batched word generation with a resumable offset.
//!
//! One run takes the slice `[offset, offset + batch_size)` of the universe,
//! asks the word source about each emoji in turn, and returns the batch
//! together with the next offset. Nothing here touches the offset file; the
//! caller persists the returned state.

pub mod source;
pub mod words;

use crate::config::LexiconConfig;
use crate::core::types::{Emoji, WordList};
use crate::offset::OffsetState;
use crate::persistence::{read_json, write_json_atomic};
use crate::ranges::Universe;
use crate::{Error, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub use source::{GenerateError, ProcessSource, WordSource};

/// Emoji -> words for one slice of the universe. Written once, never edited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    window: Range<usize>,
    entries: Vec<(Emoji, WordList)>,
}

impl Serialize for BatchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (emoji, words) in &self.entries {
            map.serialize_entry(emoji, words)?;
        }
        map.end()
    }
}

impl BatchResult {
    pub fn new(window: Range<usize>) -> Self {
        Self { window, entries: Vec::new() }
    }

    pub fn window(&self) -> &Range<usize> {
        &self.window
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds or replaces the words for `emoji`.
    pub fn insert(&mut self, emoji: Emoji, words: WordList) {
        match self.entries.iter_mut().find(|(e, _)| *e == emoji) {
            Some((_, existing)) => *existing = words,
            None => self.entries.push((emoji, words)),
        }
    }

    pub fn get(&self, emoji: &Emoji) -> Option<&WordList> {
        self.entries.iter().find(|(e, _)| e == emoji).map(|(_, w)| w)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Emoji, &WordList)> {
        self.entries.iter().map(|(e, w)| (e, w))
    }

    /// `batch_<start>-<end>.json`, end inclusive.
    pub fn file_name(&self) -> String {
        batch_file_name(&self.window)
    }

    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name());
        write_json_atomic(&path, self)?;
        Ok(path)
    }

    /// Reads a batch file. Entries that are not a non-empty list of strings
    /// are dropped with a warning; a file that is not a JSON object is an error.
    pub fn read(path: &Path) -> Result<Self> {
        let value: serde_json::Value = read_json(path)?;
        let serde_json::Value::Object(map) = value else {
            return Err(Error::Malformed {
                what: path.display().to_string(),
                reason: "expected a JSON object of emoji to word arrays".into(),
            });
        };

        let window = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(parse_batch_file_name)
            .unwrap_or_default();
        let mut batch = Self::new(window);
        for (key, value) in map {
            let words = value.as_array().and_then(|items| {
                items.iter().map(|v| v.as_str().map(str::to_string)).collect::<Option<Vec<_>>>()
            });
            match (Emoji::new(key.clone()), words) {
                (Some(emoji), Some(words)) if !words.is_empty() => batch.insert(emoji, words),
                _ => warn!(key = %key, path = %path.display(), "dropping malformed batch entry"),
            }
        }
        Ok(batch)
    }
}

pub fn batch_file_name(window: &Range<usize>) -> String {
    format!("batch_{}-{}.json", window.start, window.end.saturating_sub(1).max(window.start))
}

/// Inverse of `batch_file_name`.
pub fn parse_batch_file_name(name: &str) -> Option<Range<usize>> {
    let range = name.strip_prefix("batch_")?.strip_suffix(".json")?;
    let (start, end) = range.split_once('-')?;
    let start: usize = start.parse().ok()?;
    let end: usize = end.parse().ok()?;
    (end >= start).then_some(start..end + 1)
}

/// Every `batch_<start>-<end>.json` in `dir`, ordered by start offset.
pub fn batch_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::MissingFile(dir.to_path_buf()));
    }
    let mut found: Vec<(usize, PathBuf)> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let path = entry.path();
            let window = parse_batch_file_name(path.file_name()?.to_str()?)?;
            Some((window.start, path))
        })
        .collect();
    found.sort();
    Ok(found.into_iter().map(|(_, p)| p).collect())
}

/// Outcome of one generator run.
#[derive(Debug, Clone)]
pub struct BatchRun {
    pub batch: BatchResult,
    /// Offset to persist for the next run.
    pub next_state: OffsetState,
}

/// Drives a `WordSource` over batches, one emoji at a time.
pub struct BatchGenerator<S> {
    source: S,
    batch_size: usize,
    min_words: usize,
    max_words: usize,
}

impl<S: WordSource> BatchGenerator<S> {
    /// Bounds are clamped so that `1 <= min <= max` and the batch holds at least one item.
    pub fn new(source: S, batch_size: usize, min_words: usize, max_words: usize) -> Self {
        let min_words = min_words.max(1);
        Self {
            source,
            batch_size: batch_size.max(1),
            min_words,
            max_words: max_words.max(min_words),
        }
    }

    pub fn from_config(source: S, config: &LexiconConfig) -> Self {
        Self::new(source, config.batch_size, config.min_words, config.max_words)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Words for one emoji. Never fails: any source error or unusable output
    /// yields the deterministic placeholder list.
    pub async fn words_for(&self, emoji: &Emoji) -> WordList {
        let prompt = words::build_prompt(emoji, self.min_words, self.max_words);
        let parsed = match self.source.complete(&prompt).await {
            Ok(raw) => words::parse_word_array(&raw).ok_or(GenerateError::InvalidOutput),
            Err(e) => Err(e),
        };
        match parsed {
            Ok(found) => {
                debug!(emoji = %emoji, count = found.len(), "generated words");
                words::fit_to_bounds(emoji, found, self.min_words, self.max_words)
            }
            Err(e) => {
                warn!(emoji = %emoji, error = %e, "word generation failed, using placeholders");
                words::fallback_words(emoji, self.min_words, self.max_words)
            }
        }
    }

    /// Generates words for `emojis` sequentially. `window` names the slice
    /// of the universe they came from.
    pub async fn generate(&self, window: Range<usize>, emojis: &[Emoji]) -> BatchResult {
        let mut batch = BatchResult::new(window);
        for (i, emoji) in emojis.iter().enumerate() {
            info!(emoji = %emoji, item = i + 1, of = emojis.len(), "generating words");
            let words = self.words_for(emoji).await;
            batch.insert(emoji.clone(), words);
        }
        batch
    }

    /// Processes the batch starting at `state` and returns it with the next
    /// state. An offset at or past the end of the universe wraps to 0 first.
    /// Empty slots in the window are passed over but still counted.
    pub async fn run_batch(&self, universe: &Universe, state: OffsetState) -> BatchRun {
        let state = state.resolve(universe.len());
        let window = state.window(self.batch_size, universe.len());
        let emojis: Vec<Emoji> = universe.items_in(window.clone()).map(|item| item.emoji.clone()).collect();

        info!(
            start = window.start,
            end = window.end,
            universe = universe.len(),
            "processing batch"
        );
        let batch = self.generate(window.clone(), &emojis).await;
        BatchRun { batch, next_state: state.advanced_by(window.len()) }
    }
}
