//! Byte-identity checks for published output directories.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::Path;

/// BLAKE3 hashes of the regular files directly inside a directory, by name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DirectorySnapshot {
    pub files: BTreeMap<String, String>,
}

impl DirectorySnapshot {
    /// Names of files whose hashes differ, or that exist on one side only.
    pub fn differences(&self, other: &DirectorySnapshot) -> Vec<String> {
        let names: BTreeSet<&String> = self.files.keys().chain(other.files.keys()).collect();
        names
            .into_iter()
            .filter(|name| self.files.get(*name) != other.files.get(*name))
            .cloned()
            .collect()
    }
}

/// Hashes every `.wav` file in `dir`.
pub fn snapshot_dir(dir: &Path) -> io::Result<DirectorySnapshot> {
    let mut snapshot = DirectorySnapshot::default();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_wav = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
        if !entry.file_type()?.is_file() || !is_wav {
            continue;
        }
        let bytes = fs::read(&path)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        snapshot
            .files
            .insert(name, blake3::hash(&bytes).to_hex().to_string());
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_ignores_non_wav() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.wav"), b"one").unwrap();
        fs::write(dir.path().join("notes.txt"), b"two").unwrap();
        let snapshot = snapshot_dir(dir.path()).unwrap();
        assert_eq!(snapshot.files.len(), 1);
        assert!(snapshot.files.contains_key("a.wav"));
    }

    #[test]
    fn test_differences() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.wav"), b"one").unwrap();
        fs::write(dir.path().join("b.wav"), b"two").unwrap();
        let before = snapshot_dir(dir.path()).unwrap();
        assert!(before.differences(&before).is_empty());

        fs::write(dir.path().join("b.wav"), b"three").unwrap();
        fs::write(dir.path().join("c.wav"), b"four").unwrap();
        let after = snapshot_dir(dir.path()).unwrap();
        assert_eq!(before.differences(&after), vec!["b.wav", "c.wav"]);
    }
}
