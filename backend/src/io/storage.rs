//! Text storage collaborator
//!
//! Whole-file read, write and append over a path. The filesystem
//! implementation is used by drivers; `MemoryStorage` backs tests.

use crate::error::SequencerError;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Read/write whole text files
pub trait TextStorage: Send + Sync {
    /// Read the entire file as a string
    fn read(&self, path: &str) -> Result<String, SequencerError>;

    /// Replace the file's contents; a trailing newline is ensured
    fn write(&self, path: &str, content: &str) -> Result<(), SequencerError>;

    /// Append `content` followed by a newline
    fn append(&self, path: &str, content: &str) -> Result<(), SequencerError>;
}

fn with_trailing_newline(content: &str) -> String {
    if content.ends_with('\n') {
        content.to_string()
    } else {
        format!("{}\n", content)
    }
}

/// Local filesystem storage
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStorage;

impl TextStorage for FsStorage {
    fn read(&self, path: &str) -> Result<String, SequencerError> {
        fs::read_to_string(path).map_err(|e| SequencerError::io(path, e))
    }

    fn write(&self, path: &str, content: &str) -> Result<(), SequencerError> {
        fs::write(path, with_trailing_newline(content)).map_err(|e| SequencerError::io(path, e))
    }

    fn append(&self, path: &str, content: &str) -> Result<(), SequencerError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| SequencerError::io(path, e))?;
        writeln!(file, "{}", content).map_err(|e| SequencerError::io(path, e))
    }
}

/// In-memory storage; clones share the same files
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    files: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file
    pub fn insert(&self, path: &str, content: &str) {
        self.lock().insert(path.to_string(), content.to_string());
    }

    /// Current contents of a file, if present
    pub fn contents(&self, path: &str) -> Option<String> {
        self.lock().get(path).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map still holds consistent strings
        self.files.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TextStorage for MemoryStorage {
    fn read(&self, path: &str) -> Result<String, SequencerError> {
        self.lock()
            .get(path)
            .cloned()
            .ok_or_else(|| SequencerError::io(path, "file not found"))
    }

    fn write(&self, path: &str, content: &str) -> Result<(), SequencerError> {
        self.lock()
            .insert(path.to_string(), with_trailing_newline(content));
        Ok(())
    }

    fn append(&self, path: &str, content: &str) -> Result<(), SequencerError> {
        let mut files = self.lock();
        let entry = files.entry(path.to_string()).or_default();
        entry.push_str(content);
        entry.push('\n');
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_write_adds_newline_once() {
        let storage = MemoryStorage::new();
        storage.write("a.txt", "hello").unwrap();
        assert_eq!(storage.contents("a.txt").unwrap(), "hello\n");
        storage.write("a.txt", "bye\n").unwrap();
        assert_eq!(storage.contents("a.txt").unwrap(), "bye\n");
    }

    #[test]
    fn test_memory_append_creates_file() {
        let storage = MemoryStorage::new();
        storage.append("log.txt", "one").unwrap();
        storage.append("log.txt", "two").unwrap();
        assert_eq!(storage.read("log.txt").unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_memory_missing_file_is_io_error() {
        let storage = MemoryStorage::new();
        assert!(matches!(
            storage.read("missing.csv"),
            Err(SequencerError::Io { .. })
        ));
    }

    #[test]
    fn test_fs_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.csv");
        let path = path.to_str().unwrap();

        FsStorage.write(path, "header").unwrap();
        FsStorage.append(path, "row").unwrap();
        assert_eq!(FsStorage.read(path).unwrap(), "header\nrow\n");
    }

    #[test]
    fn test_fs_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.csv");
        let err = FsStorage.read(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, SequencerError::Io { .. }));
    }
}
