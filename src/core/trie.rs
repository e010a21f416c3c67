// --- File: src/core/trie.rs
use crate::core::types::{Emoji, WordId, WordMetadata};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

#[derive(Clone)]
struct TrieNode {
    /// Ordered so a depth-first walk yields words in byte (= str) order.
    children: BTreeMap<u8, usize>,
    word_id: Option<WordId>,
    max_score_in_subtree: u64,
}

impl TrieNode {
    fn new() -> Self {
        Self { children: BTreeMap::new(), word_id: None, max_score_in_subtree: 0 }
    }
}

/// A byte-keyed trie over dictionary words, pruned by the best score
/// reachable below each node so prefix queries only visit promising branches.
#[derive(Clone)]
pub struct WordTrie {
    nodes: Vec<TrieNode>,
    pub metadata_store: Vec<WordMetadata>,
}

impl Default for WordTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl WordTrie {
    pub fn new() -> Self {
        Self { nodes: vec![TrieNode::new()], metadata_store: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.metadata_store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metadata_store.is_empty()
    }

    fn walk(&self, key: &str) -> Option<usize> {
        let mut node_idx = 0;
        for &byte in key.as_bytes() {
            node_idx = *self.nodes[node_idx].children.get(&byte)?;
        }
        Some(node_idx)
    }

    /// Finds the WordId of an exact word.
    pub fn find_word_id(&self, word: &str) -> Option<WordId> {
        self.walk(word).and_then(|idx| self.nodes[idx].word_id)
    }

    /// Records that `emoji` lists `word` with the given score.
    /// O(k) where k is the word length.
    pub fn insert(&mut self, word: &str, emoji: &Emoji, score: u64) {
        let mut node_idx = 0;
        let mut path = vec![0];
        for &byte in word.as_bytes() {
            let next_idx = if let Some(&id) = self.nodes[node_idx].children.get(&byte) {
                id
            } else {
                let new_node_id = self.nodes.len();
                self.nodes.push(TrieNode::new());
                self.nodes[node_idx].children.insert(byte, new_node_id);
                new_node_id
            };
            node_idx = next_idx;
            path.push(node_idx);
        }

        let word_id = match self.nodes[node_idx].word_id {
            Some(id) => id,
            None => {
                self.metadata_store.push(WordMetadata { word: word.to_string(), emojis: Vec::new() });
                let id = self.metadata_store.len() - 1;
                self.nodes[node_idx].word_id = Some(id);
                id
            }
        };

        let metadata = &mut self.metadata_store[word_id];
        match metadata.emojis.iter_mut().find(|(e, _)| e == emoji) {
            Some((_, existing)) => *existing = (*existing).max(score),
            None => metadata.emojis.push((emoji.clone(), score)),
        }
        let best = metadata.best_score();

        // Scores only grow, so stop at the first ancestor that already covers it.
        for &idx in path.iter().rev() {
            if self.nodes[idx].max_score_in_subtree >= best {
                break;
            }
            self.nodes[idx].max_score_in_subtree = best;
        }
    }

    /// Get top K words under `prefix`, best first. Ties go to the
    /// alphabetically smaller word, so the result does not depend on
    /// insertion order.
    /// O(p + S log K) where S is the number of nodes visited.
    pub fn get_top_k_suggestions(&self, prefix: &str, k: usize) -> Vec<(WordId, u64)> {
        if k == 0 {
            return vec![];
        }
        let Some(node_idx) = self.walk(prefix) else {
            return vec![];
        };

        let mut heap = BinaryHeap::new();
        self.dfs_search(node_idx, k, &mut heap);

        let mut found: Vec<(WordId, u64)> =
            heap.into_iter().map(|Reverse((score, _, id))| (id, score)).collect();
        found.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| {
            self.metadata_store[a.0].word.cmp(&self.metadata_store[b.0].word)
        }));
        found
    }

    // The heap's minimum is the lowest score and, among equal scores, the
    // greatest word. Words arrive in ascending order, so a later word with
    // the minimum score can never displace it, and a subtree whose best
    // score does not exceed the minimum is skipped.
    fn dfs_search<'a>(
        &'a self,
        node_idx: usize,
        k: usize,
        heap: &mut BinaryHeap<Reverse<(u64, Reverse<&'a str>, WordId)>>,
    ) {
        let node = &self.nodes[node_idx];
        if let Some(id) = node.word_id {
            let meta = &self.metadata_store[id];
            let entry = Reverse((meta.best_score(), Reverse(meta.word.as_str()), id));
            if heap.len() < k {
                heap.push(entry);
            } else if heap.peek().is_some_and(|min| entry < *min) {
                heap.pop();
                heap.push(entry);
            }
        }

        for &child_idx in node.children.values() {
            let min_score_in_heap = match heap.peek() {
                Some(Reverse((min, _, _))) if heap.len() == k => *min,
                _ => 0,
            };
            let child = &self.nodes[child_idx];
            if heap.len() < k || child.max_score_in_subtree > min_score_in_heap {
                self.dfs_search(child_idx, k, heap);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emoji(s: &str) -> Emoji {
        Emoji::new(s).unwrap()
    }

    #[test]
    fn exact_lookup_and_shared_words() {
        let mut trie = WordTrie::new();
        trie.insert("happy", &emoji("😀"), 20);
        trie.insert("happy", &emoji("😊"), 18);
        trie.insert("hat", &emoji("🎩"), 20);

        let id = trie.find_word_id("happy").unwrap();
        assert_eq!(trie.metadata_store[id].emojis.len(), 2);
        assert!(trie.find_word_id("hap").is_none());
        assert_eq!(trie.len(), 2);
    }

    #[test]
    fn top_k_is_ordered_and_bounded() {
        let mut trie = WordTrie::new();
        trie.insert("cat", &emoji("🐱"), 5);
        trie.insert("car", &emoji("🚗"), 9);
        trie.insert("cake", &emoji("🍰"), 7);
        trie.insert("dog", &emoji("🐶"), 10);

        let top = trie.get_top_k_suggestions("ca", 2);
        let words: Vec<&str> = top.iter().map(|(id, _)| trie.metadata_store[*id].word.as_str()).collect();
        assert_eq!(words, vec!["car", "cake"]);
        assert!(trie.get_top_k_suggestions("x", 3).is_empty());
        assert!(trie.get_top_k_suggestions("ca", 0).is_empty());
    }

    #[test]
    fn tied_scores_keep_the_alphabetically_first_words() {
        let words = ["arrow", "anchor", "apple", "alien", "apron", "axe", "atom", "avocado", "alarm", "ant", "art", "aqua"];
        let mut expected: Vec<&str> = words.to_vec();
        expected.sort();

        // Every insertion order must give the same answer.
        for shift in 0..words.len() {
            let mut trie = WordTrie::new();
            for (i, word) in words.iter().cycle().skip(shift).take(words.len()).enumerate() {
                trie.insert(word, &Emoji::from_char(char::from_u32(0x1F600 + i as u32).unwrap()), 100);
            }
            for k in [1, 2, 5] {
                let top = trie.get_top_k_suggestions("a", k);
                let got: Vec<&str> = top.iter().map(|(id, _)| trie.metadata_store[*id].word.as_str()).collect();
                assert_eq!(got, expected[..k].to_vec());
            }
        }
    }

    #[test]
    fn higher_score_beats_earlier_word() {
        let mut trie = WordTrie::new();
        trie.insert("able", &emoji("💪"), 50);
        trie.insert("acorn", &emoji("🌰"), 50);
        trie.insert("zebra", &emoji("🦓"), 10);
        trie.insert("azure", &emoji("🔵"), 99);

        let top = trie.get_top_k_suggestions("a", 2);
        let words: Vec<&str> = top.iter().map(|(id, _)| trie.metadata_store[*id].word.as_str()).collect();
        assert_eq!(words, vec!["azure", "able"]);
    }
}
