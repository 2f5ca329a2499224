use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;


/// Writes `contents` to `<name>.txt` in a fresh directory.
///
/// The directory lives as long as the returned guard.
fn fixture(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(format!("{name}.txt"));
    fs::write(&path, contents).unwrap();
    (dir, path)
}

fn argv(args: &[&str]) -> Vec<String> {
    std::iter::once("runner")
        .chain(args.iter().copied())
        .map(String::from)
        .collect()
}
