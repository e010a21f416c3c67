// File: src/config.rs
use crate::persistence::read_json;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BATCH_SIZE: usize = 4;
pub const DEFAULT_MIN_WORDS: usize = 10;
pub const DEFAULT_MAX_WORDS: usize = 20;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_KILL_GRACE_SECS: u64 = 2;

/// Settings for the maintenance tooling. Every field has a default, so a
/// config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LexiconConfig {
    /// Ordered emoji list consumed by `generate`
    pub universe_path: PathBuf,
    /// Where `batch_<start>-<end>.json` files are written
    pub batch_dir: PathBuf,
    /// Offset state file
    pub state_path: PathBuf,
    /// Dictionary the merge writes into
    pub dictionary_path: PathBuf,

    pub batch_size: usize,
    pub min_words: usize,
    pub max_words: usize,

    /// Per-emoji limit on the generation process
    pub timeout_secs: u64,
    /// Wait between SIGTERM and SIGKILL after a timeout
    pub kill_grace_secs: u64,

    /// External generation program and its fixed arguments
    pub program: String,
    pub args: Vec<String>,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            universe_path: PathBuf::from("emoji_list.json"),
            batch_dir: PathBuf::from("batches"),
            state_path: PathBuf::from("offset_state.json"),
            dictionary_path: PathBuf::from("dictionary.json"),
            batch_size: DEFAULT_BATCH_SIZE,
            min_words: DEFAULT_MIN_WORDS,
            max_words: DEFAULT_MAX_WORDS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            kill_grace_secs: DEFAULT_KILL_GRACE_SECS,
            program: "claude".to_string(),
            args: vec!["-p".to_string()],
        }
    }
}

impl LexiconConfig {
    /// Reads a JSON config file. Unlike data files, a named config that does
    /// not exist is an error.
    pub fn from_file(path: &Path) -> Result<Self> {
        let config: Self = read_json(path)?;
        config.validate()?;
        Ok(config)
    }

    /// `from_file` when a path is given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batchSize must be at least 1".into()));
        }
        if self.min_words == 0 {
            return Err(Error::InvalidConfig("minWords must be at least 1".into()));
        }
        if self.min_words > self.max_words {
            return Err(Error::InvalidConfig(format!(
                "minWords ({}) exceeds maxWords ({})",
                self.min_words, self.max_words
            )));
        }
        if self.program.trim().is_empty() {
            return Err(Error::InvalidConfig("program must not be empty".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn kill_grace(&self) -> Duration {
        Duration::from_secs(self.kill_grace_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_are_valid() {
        let config = LexiconConfig::default();
        config.validate().unwrap();
        assert_eq!(config.batch_size, 4);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.kill_grace(), Duration::from_secs(2));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lexicon.json");
        std::fs::write(&path, r#"{ "batchSize": 8, "program": "llm" }"#).unwrap();

        let config = LexiconConfig::load(Some(&path)).unwrap();
        assert_eq!(config.batch_size, 8);
        assert_eq!(config.program, "llm");
        assert_eq!(config.min_words, DEFAULT_MIN_WORDS);
    }

    #[test]
    fn rejects_inverted_word_bounds() {
        let config = LexiconConfig { min_words: 5, max_words: 3, ..Default::default() };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(LexiconConfig::load(Some(&dir.path().join("absent.json"))).is_err());
    }
}
