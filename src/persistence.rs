// File: src/persistence.rs
//! JSON file helpers shared by every artifact the tooling writes.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Serializes `value` as pretty JSON into a temp file next to `path`, then
/// renames it over `path`. Readers never observe a half-written file.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let parent_dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }

    temp_file.persist(path).map_err(|e| Error::IoError(e.error))?;
    Ok(())
}

/// Reads a JSON document, reporting an absent file as `Error::MissingFile`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::MissingFile(path.to_path_buf()),
        _ => Error::IoError(e),
    })?;
    let value = serde_json::from_reader(BufReader::new(file))?;
    Ok(value)
}

/// `dictionary.json` -> `dictionary.json.bak`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".bak");
    path.with_file_name(name)
}

/// Copies `path` to its backup location. Returns `None` when there is
/// nothing to back up yet.
pub fn backup(path: &Path) -> Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }
    let target = backup_path(path);
    fs::copy(path, &target)?;
    Ok(Some(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    #[test]
    fn atomic_write_then_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("data.json");

        let mut value = BTreeMap::new();
        value.insert("🎲".to_string(), vec!["dice".to_string()]);
        write_json_atomic(&path, &value).unwrap();

        let loaded: BTreeMap<String, Vec<String>> = read_json(&path).unwrap();
        assert_eq!(loaded, value);
        // only the target file is left behind
        assert_eq!(fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);
    }

    #[test]
    fn missing_file_is_reported_as_such() {
        let dir = tempdir().unwrap();
        let err = read_json::<serde_json::Value>(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.is_missing_prerequisite());
    }

    #[test]
    fn backup_copies_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dictionary.json");
        assert!(backup(&path).unwrap().is_none());

        fs::write(&path, "{}").unwrap();
        let bak = backup(&path).unwrap().unwrap();
        assert_eq!(bak, dir.path().join("dictionary.json.bak"));
        assert_eq!(fs::read_to_string(bak).unwrap(), "{}");
    }
}
