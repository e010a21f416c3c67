// tests/lexicon_cli.rs
//! Runs the `lexicon` binary end to end against a scratch directory.

use emoji_core::{Dictionary, OffsetStore};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn lexicon(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lexicon"))
        .current_dir(dir)
        .args(["--universe", "emoji_list.json"])
        .args(["--batch-dir", "batches"])
        .args(["--state", "offset_state.json"])
        .args(["--dictionary", "dictionary.json"])
        .args(args)
        .output()
        .expect("failed to run lexicon")
}

fn write_universe(dir: &Path, n: u32) {
    let items: Vec<String> = (0..n).map(|i| char::from_u32(0x1F600 + i).unwrap().to_string()).collect();
    std::fs::write(dir.join("emoji_list.json"), serde_json::to_string(&items).unwrap()).unwrap();
}

#[test]
fn generate_without_universe_exits_with_1() {
    let dir = tempdir().unwrap();
    let out = lexicon(dir.path(), &["generate"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(!dir.path().join("offset_state.json").exists());
}

#[test]
fn merge_needs_a_dictionary_unless_create() {
    let dir = tempdir().unwrap();
    std::fs::create_dir(dir.path().join("batches")).unwrap();
    std::fs::write(dir.path().join("batches/batch_0-1.json"), r#"{"😀": ["happy"], "😁": ["grin"]}"#).unwrap();
    std::fs::write(dir.path().join("batches/batch_2-3.json"), "not json").unwrap();

    let out = lexicon(dir.path(), &["merge"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(!dir.path().join("dictionary.json").exists());

    let out = lexicon(dir.path(), &["merge", "--create"]);
    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("batch_2-3.json"), "stdout: {stdout}");

    let dictionary = Dictionary::load(&dir.path().join("dictionary.json")).unwrap();
    assert_eq!(dictionary.len(), 2);
}

#[test]
fn four_generate_runs_walk_and_wrap_the_universe() {
    let dir = tempdir().unwrap();
    write_universe(dir.path(), 10);
    let store = OffsetStore::at_path(dir.path().join("offset_state.json"));

    let mut offsets = Vec::new();
    for _ in 0..4 {
        let out = lexicon(
            dir.path(),
            &[
                "generate",
                "--batch-size", "4",
                "--min-words", "1",
                "--max-words", "2",
                "--program", "definitely-not-an-installed-program-7f3a",
            ],
        );
        assert_eq!(out.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&out.stderr));
        offsets.push(store.read().unwrap().current_offset);
    }
    assert_eq!(offsets, vec![4, 8, 10, 4]);

    let mut names: Vec<String> = std::fs::read_dir(dir.path().join("batches"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["batch_0-3.json", "batch_4-7.json", "batch_8-9.json"]);
}
