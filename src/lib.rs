// src/lib.rs
//! Text-to-emoji substitution plus the offline tooling that builds its
//! dictionary: range enumeration, batched word generation through an
//! external process, and merging batch results into the dictionary.

pub mod config;
pub mod core;
pub mod dictionary;
pub mod fuzzy;
pub mod generator;
pub mod offset;
pub mod persistence;
pub mod ranges;

pub use crate::config::LexiconConfig;
pub use crate::core::engine::EmojiEngine;
pub use crate::core::types::{Emoji, WordList};
pub use crate::dictionary::{Dictionary, MergePolicy, MergeReport};
pub use crate::generator::{BatchGenerator, BatchResult};
pub use crate::offset::{OffsetState, OffsetStore};
pub use crate::ranges::{Universe, UniverseItem};

use std::path::PathBuf;

/// Result type for emoji lexicon operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, generating or merging
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Required file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Malformed {what}: {reason}")]
    Malformed { what: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl Error {
    /// Missing prerequisites are the only errors that end a run.
    pub fn is_missing_prerequisite(&self) -> bool {
        matches!(self, Error::MissingFile(_))
    }
}
