// File: src/dictionary.rs
//! The persisted emoji -> words mapping and the merge that feeds it.

use crate::core::types::{DictionaryEntry, Emoji, WordList};
use crate::generator::BatchResult;
use crate::persistence::{backup, read_json, write_json_atomic};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const DICTIONARY_VERSION: u32 = 1;

/// On-disk layout of the dictionary file.
#[derive(Clone, Serialize, Deserialize)]
struct SerializableDictionary {
    version: u32,
    entries: Vec<DictionaryEntry>,
}

/// Emoji -> words, unique keys. Entry order only groups rows for humans.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: Vec<DictionaryEntry>,
    index: HashMap<Emoji, usize>,
}

/// How to treat keys that already exist when merging.
#[derive(Debug, Clone, Default)]
pub struct MergePolicy {
    pub overwrite: bool,
    /// Category recorded on newly inserted entries.
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    pub added: Vec<Emoji>,
    pub replaced: Vec<Emoji>,
    pub skipped: Vec<Emoji>,
    /// Batch files that could not be read and were left out.
    pub unreadable: Vec<PathBuf>,
}

impl MergeReport {
    pub fn changed(&self) -> bool {
        !self.added.is_empty() || !self.replaced.is_empty()
    }

    pub fn absorb(&mut self, other: MergeReport) {
        self.added.extend(other.added);
        self.replaced.extend(other.replaced);
        self.skipped.extend(other.skipped);
        self.unreadable.extend(other.unreadable);
    }
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps rows in the given order. A repeated emoji folds into its
    /// first row, taking the later words.
    pub fn from_entries(entries: impl IntoIterator<Item = DictionaryEntry>) -> Self {
        let mut dictionary = Self::new();
        for entry in entries {
            match dictionary.index.get(&entry.emoji) {
                Some(&i) => {
                    debug!(emoji = %entry.emoji, "duplicate dictionary row folded into the first");
                    dictionary.entries[i].words = entry.words;
                }
                None => {
                    dictionary.index.insert(entry.emoji.clone(), dictionary.entries.len());
                    dictionary.entries.push(entry);
                }
            }
        }
        dictionary
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, emoji: &Emoji) -> bool {
        self.index.contains_key(emoji)
    }

    pub fn get(&self, emoji: &Emoji) -> Option<&WordList> {
        self.index.get(emoji).map(|&i| &self.entries[i].words)
    }

    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }

    /// Inserts a new entry after its category group, or replaces the words
    /// of an existing one. A replaced entry keeps its position and category.
    fn upsert(&mut self, entry: DictionaryEntry) {
        if let Some(&i) = self.index.get(&entry.emoji) {
            self.entries[i].words = entry.words;
            return;
        }
        let pos = self.insertion_point(entry.category.as_deref());
        for slot in self.index.values_mut() {
            if *slot >= pos {
                *slot += 1;
            }
        }
        self.index.insert(entry.emoji.clone(), pos);
        self.entries.insert(pos, entry);
    }

    /// New rows go after the last row of their category, so groups stay together.
    fn insertion_point(&self, category: Option<&str>) -> usize {
        match category {
            Some(label) => self
                .entries
                .iter()
                .rposition(|e| e.category.as_deref() == Some(label))
                .map(|i| i + 1)
                .unwrap_or(self.entries.len()),
            None => self.entries.len(),
        }
    }

    /// Folds a batch into the dictionary. Existing keys are only replaced
    /// under `policy.overwrite`; otherwise they are skipped and reported.
    pub fn merge(&mut self, batch: &BatchResult, policy: &MergePolicy) -> MergeReport {
        let mut report = MergeReport::default();
        for (emoji, words) in batch.iter() {
            if self.contains(emoji) {
                if !policy.overwrite {
                    debug!(emoji = %emoji, "skipping existing entry");
                    report.skipped.push(emoji.clone());
                    continue;
                }
                report.replaced.push(emoji.clone());
            } else {
                report.added.push(emoji.clone());
            }
            self.upsert(DictionaryEntry {
                emoji: emoji.clone(),
                category: policy.category.clone(),
                words: words.clone(),
            });
        }
        report
    }

    /// Merges each batch file in order. A file that cannot be read or is
    /// not a JSON object is logged and skipped; the rest still merge.
    pub fn merge_files(&mut self, files: &[PathBuf], policy: &MergePolicy) -> MergeReport {
        let mut report = MergeReport::default();
        for file in files {
            let batch = match BatchResult::read(file) {
                Ok(b) => b,
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "skipping unreadable batch file");
                    report.unreadable.push(file.clone());
                    continue;
                }
            };
            let merged = self.merge(&batch, policy);
            info!(
                file = %file.display(),
                added = merged.added.len(),
                replaced = merged.replaced.len(),
                skipped = merged.skipped.len(),
                "merged batch"
            );
            report.absorb(merged);
        }
        report
    }

    /// Loads the dictionary file; an absent file is `Error::MissingFile`.
    pub fn load(path: &Path) -> Result<Self> {
        let state: SerializableDictionary = read_json(path)?;
        Ok(Self::from_entries(state.entries))
    }

    /// Like [`Dictionary::load`], but an absent file yields an empty
    /// dictionary when `create` is set.
    pub fn load_or_create(path: &Path, create: bool) -> Result<Self> {
        match Self::load(path) {
            Err(Error::MissingFile(_)) if create => {
                info!(path = %path.display(), "creating new dictionary");
                Ok(Self::new())
            }
            other => other,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let state = SerializableDictionary {
            version: DICTIONARY_VERSION,
            entries: self.entries.clone(),
        };
        write_json_atomic(path, &state)
    }

    /// Backs up the current file, then writes the dictionary atomically.
    pub fn save_with_backup(&self, path: &Path) -> Result<Option<PathBuf>> {
        let backup_file = backup(path)?;
        if let Some(bak) = &backup_file {
            info!(backup = %bak.display(), "wrote pre-merge backup");
        }
        self.save(path)?;
        Ok(backup_file)
    }
}
