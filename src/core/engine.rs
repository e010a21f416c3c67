use crate::core::converter::{normalize_phrase, EmojiConverter, SubstitutionMode};
use crate::core::trie::WordTrie;
use crate::core::types::Emoji;
use crate::dictionary::Dictionary;
use crate::fuzzy::symspell::SymSpell;
use crate::Error;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

const MAX_EDIT_DISTANCE: usize = 1;
/// Shorter words produce too many false fuzzy matches.
const MIN_FUZZY_WORD_CHARS: usize = 4;
/// Score of a word listed first; each later position scores one less.
const TOP_WORD_SCORE: u64 = 100;

/// A ranked emoji suggestion for a typed prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub emoji: Emoji,
    pub word: String,
    pub score: u64,
}

/// Substitution over a loaded dictionary: exact phrases via the converter,
/// prefix suggestions via the trie, typo tolerance via SymSpell.
pub struct EmojiEngine {
    pub dictionary: Dictionary,
    pub trie: WordTrie,
    pub converter: EmojiConverter,
    symspell: SymSpell,
}

impl Default for EmojiEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EmojiEngine {
    pub fn new() -> Self {
        Self::from_dictionary(Dictionary::new())
    }

    pub fn from_dictionary(dictionary: Dictionary) -> Self {
        let mut trie = WordTrie::new();
        let mut converter = EmojiConverter::new();
        let mut symspell = SymSpell::new(MAX_EDIT_DISTANCE);

        for entry in dictionary.entries() {
            for (pos, word) in entry.words.iter().enumerate() {
                let key = normalize_phrase(word);
                if key.is_empty() {
                    continue;
                }
                let score = TOP_WORD_SCORE.saturating_sub(pos as u64).max(1);
                converter.add_phrase(&key, &entry.emoji);
                trie.insert(&key, &entry.emoji, score);
            }
        }
        for (id, meta) in trie.metadata_store.iter().enumerate() {
            if !meta.word.contains(' ') && meta.word.chars().count() >= MIN_FUZZY_WORD_CHARS {
                symspell.add_word(&meta.word, id);
            }
        }
        debug!(entries = dictionary.len(), words = trie.len(), "built emoji index");

        Self { dictionary, trie, converter, symspell }
    }

    /// Loads the dictionary at `path`, or starts empty if it is missing or unreadable.
    pub fn from_file_or_new(path: &Path) -> Self {
        match Dictionary::load(path) {
            Ok(dictionary) => Self::from_dictionary(dictionary),
            Err(Error::MissingFile(_)) => {
                debug!(path = %path.display(), "no dictionary yet, starting empty");
                Self::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not load dictionary, starting empty");
                Self::new()
            }
        }
    }

    /// Emoji for an exact word or phrase.
    pub fn lookup(&self, phrase: &str) -> Option<&Emoji> {
        self.converter.lookup(phrase)
    }

    /// Closest dictionary word within the edit distance, best score first.
    pub fn fuzzy_lookup(&self, word: &str) -> Option<&Emoji> {
        let word = word.to_lowercase();
        if word.chars().count() < MIN_FUZZY_WORD_CHARS {
            return None;
        }
        let best = self
            .symspell
            .lookup(&word)
            .into_iter()
            .map(|id| &self.trie.metadata_store[id])
            .max_by(|a, b| {
                a.best_score()
                    .cmp(&b.best_score())
                    .then_with(|| b.word.cmp(&a.word))
            })?;
        self.converter.lookup(&best.word)
    }

    pub fn emojify(&self, text: &str, mode: SubstitutionMode, fuzzy: bool) -> String {
        self.converter.convert(text, mode, |word| {
            if fuzzy {
                self.fuzzy_lookup(word).cloned()
            } else {
                None
            }
        })
    }

    /// Top `count` emoji for words beginning with `prefix`.
    pub fn suggest(&self, prefix: &str, count: usize) -> Vec<Suggestion> {
        let prefix = normalize_phrase(prefix);
        if prefix.is_empty() || count == 0 {
            return vec![];
        }

        // Several emoji can share a word; over-fetch so ranking has room.
        let mut best: HashMap<Emoji, Suggestion> = HashMap::new();
        for (id, _) in self.trie.get_top_k_suggestions(&prefix, count * 2) {
            let meta = &self.trie.metadata_store[id];
            for (emoji, score) in &meta.emojis {
                let candidate = Suggestion { emoji: emoji.clone(), word: meta.word.clone(), score: *score };
                match best.get(emoji) {
                    Some(existing) if existing.score >= *score => {}
                    _ => {
                        best.insert(emoji.clone(), candidate);
                    }
                }
            }
        }

        let mut suggestions: Vec<Suggestion> = best.into_values().collect();
        suggestions.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.word.cmp(&b.word))
                .then_with(|| a.emoji.cmp(&b.emoji))
        });
        suggestions.truncate(count);
        suggestions
    }
}
