// File: src/offset.rs
//! Resumable cursor into the emoji universe.

use crate::persistence::{read_json, write_json_atomic};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// The cursor as persisted between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetState {
    pub current_offset: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl OffsetState {
    pub fn at(offset: usize) -> Self {
        Self { current_offset: offset, last_updated: None }
    }

    /// Offsets at or past the end of the universe wrap to 0.
    pub fn resolve(self, universe_len: usize) -> Self {
        if self.current_offset >= universe_len {
            if self.current_offset > 0 {
                info!(
                    offset = self.current_offset,
                    universe_len, "offset reached the end of the universe, wrapping to 0"
                );
            }
            Self::at(0)
        } else {
            self
        }
    }

    /// The half-open slice `[offset, offset + batch_size)` clamped to the universe.
    pub fn window(&self, batch_size: usize, universe_len: usize) -> std::ops::Range<usize> {
        let start = self.current_offset.min(universe_len);
        let end = start.saturating_add(batch_size).min(universe_len);
        start..end
    }

    pub fn advanced_by(self, processed: usize) -> Self {
        Self::at(self.current_offset + processed)
    }
}

/// Owns the offset state file. Single writer; concurrent runs race and the
/// last writer wins.
pub struct OffsetStore {
    path: PathBuf,
}

impl OffsetStore {
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The persisted state, or `None` when absent or unreadable.
    pub fn read(&self) -> Option<OffsetState> {
        match read_json::<OffsetState>(&self.path) {
            Ok(state) => Some(state),
            Err(Error::MissingFile(_)) => {
                debug!(path = %self.path.display(), "no offset state yet");
                None
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable offset state");
                None
            }
        }
    }

    /// Explicit argument if it is a valid non-negative integer, else the
    /// persisted offset, else 0.
    pub fn load(&self, arg: Option<&str>) -> OffsetState {
        if let Some(raw) = arg {
            match raw.trim().parse::<usize>() {
                Ok(offset) => return OffsetState::at(offset),
                Err(_) => warn!(arg = raw, "ignoring invalid offset argument"),
            }
        }
        self.read().unwrap_or(OffsetState::at(0))
    }

    /// Overwrites the state file with `offset` and the current time.
    pub fn save(&self, offset: usize) -> Result<OffsetState> {
        let state = OffsetState { current_offset: offset, last_updated: Some(Utc::now()) };
        write_json_atomic(&self.path, &state)?;
        debug!(offset, path = %self.path.display(), "saved offset");
        Ok(state)
    }
}
