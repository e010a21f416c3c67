// File: src/fuzzy/symspell.rs
use crate::core::types::WordId;
use std::collections::{HashMap, HashSet};

/// Misspelling tolerance for dictionary words, based on the Symmetric Delete
/// (SymSpell) algorithm. Delete variants are precomputed per word so a lookup
/// costs O(k^2) in the input length, independent of dictionary size.
#[derive(Clone)]
pub struct SymSpell {
    /// Maps a delete variant (e.g., "hppy") to the words it could have come from.
    deletes: HashMap<String, HashSet<WordId>>,
    words: HashMap<WordId, String>,
    max_edit_distance: usize,
}

impl SymSpell {
    pub fn new(max_edit_distance: usize) -> Self {
        Self {
            deletes: HashMap::new(),
            words: HashMap::new(),
            max_edit_distance,
        }
    }

    pub fn add_word(&mut self, word: &str, word_id: WordId) {
        for edit in self.generate_edits(word) {
            self.deletes.entry(edit).or_default().insert(word_id);
        }
        self.words.insert(word_id, word.to_string());
    }

    /// Words within max_edit_distance of `input`.
    ///
    /// Shared delete variants only bound the distance by twice the maximum
    /// ("love" and "oven" both reduce to "ove"), so every candidate is
    /// checked against the real distance before it is returned.
    pub fn lookup(&self, input: &str) -> HashSet<WordId> {
        let mut candidates = HashSet::new();
        for edit in self.generate_edits(input) {
            if let Some(word_ids) = self.deletes.get(&edit) {
                candidates.extend(word_ids.iter().copied());
            }
        }
        candidates.retain(|id| {
            self.words
                .get(id)
                .is_some_and(|word| edit_distance(input, word) <= self.max_edit_distance)
        });
        candidates
    }

    /// All variants within max_edit_distance deletions, the word included.
    fn generate_edits(&self, word: &str) -> HashSet<String> {
        let mut edits = HashSet::new();
        edits.insert(word.to_string());

        let mut current_edits = edits.clone();
        for _ in 0..self.max_edit_distance {
            let mut next_edits = HashSet::new();
            for edit in &current_edits {
                for (i, _) in edit.char_indices() {
                    let mut deleted_variant = edit.clone();
                    deleted_variant.remove(i);
                    next_edits.insert(deleted_variant);
                }
            }
            edits.extend(next_edits.iter().cloned());
            current_edits = next_edits;
        }

        edits
    }
}

/// Optimal string alignment distance over chars: insertions, deletions,
/// substitutions and adjacent transpositions each cost one.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev2 = vec![0; b.len() + 1];
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                curr[j] = curr[j].min(prev2[j - 2] + 1);
            }
        }
        std::mem::swap(&mut prev2, &mut prev);
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
