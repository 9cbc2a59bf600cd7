//! ============================================================================
//! Chat Store - Single JSON document holding every conversation
//! ============================================================================
//! `load` and `save` never fail their caller: a document that cannot be read
//! loads as empty, and a write that fails is logged and dropped. The in-memory
//! collection stays the source of truth for the rest of the process.
//! ============================================================================

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use super::types::ChatData;

/// Storage failures, surfaced only through `try_load` / `try_save`
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed chat document {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize chat document: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Durable storage for the conversation collection
#[derive(Debug, Clone)]
pub struct ChatStore {
    path: PathBuf,
}

impl ChatStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document, falling back to an empty collection on any failure
    pub fn load(&self) -> ChatData {
        match self.try_load() {
            Ok(data) => {
                debug!(
                    "Chat data loaded from {} ({} conversations)",
                    self.path.display(),
                    data.conversations.len()
                );
                data
            }
            Err(StoreError::Io { ref source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                info!("No chat document at {}, starting empty", self.path.display());
                ChatData::default()
            }
            Err(e) => {
                warn!("Error loading chat data: {} - starting empty", e);
                ChatData::default()
            }
        }
    }

    /// Write the full collection; failures are logged and swallowed
    pub fn save(&self, data: &ChatData) {
        match self.try_save(data) {
            Ok(()) => debug!(
                "Chat data saved to {} ({} conversations)",
                self.path.display(),
                data.conversations.len()
            ),
            Err(e) => error!("Error saving chat data: {}", e),
        }
    }

    pub fn try_load(&self) -> Result<ChatData, StoreError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;

        serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Serialize and replace the document in one rename so a reader never
    /// sees a half-written file. Each save writes its own temp file next to
    /// the document, so concurrent savers never touch each other's data.
    pub fn try_save(&self, data: &ChatData) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(data).map_err(StoreError::Serialize)?;

        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
                parent.to_path_buf()
            }
            None => PathBuf::from("."),
        };

        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(&self.tmp_prefix())
            .suffix(".tmp")
            .tempfile_in(&dir)
            .map_err(io_err)?;
        tmp.write_all(json.as_bytes()).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;

        // On failure the temp file is dropped, which removes it
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(())
    }

    fn tmp_prefix(&self) -> String {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "chat.data.json".to_string());
        format!(".{}.", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::types::{Conversation, Message};
    use chrono::DateTime;
    use tempfile::tempdir;

    fn sample() -> ChatData {
        let now = DateTime::from_timestamp(1_700_000_000, 123_000_000).unwrap();
        let mut approved = Conversation::new("1700000000123".into(), "Approved".into(), now);
        approved
            .access_request_mut()
            .unwrap()
            .approve("sig1", "0xABC");
        approved.messages.push(Message::user("hi"));
        approved.messages.push(Message::bot("reply"));

        let mut rejected = Conversation::new("1700000000124".into(), "Rejected".into(), now);
        rejected.access_request_mut().unwrap().reject();

        ChatData {
            conversations: vec![
                approved,
                rejected,
                Conversation::new("1700000000125".into(), "Pending".into(), now),
            ],
        }
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let store = ChatStore::new(dir.path().join("chat.data.json"));
        let data = sample();

        store.try_save(&data).unwrap();
        assert_eq!(store.load(), data);
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = ChatStore::new(dir.path().join("absent.json"));

        assert!(matches!(store.try_load(), Err(StoreError::Io { .. })));
        assert_eq!(store.load(), ChatData::default());
    }

    #[test]
    fn test_malformed_file_loads_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chat.data.json");
        fs::write(&path, "{ not json").unwrap();
        let store = ChatStore::new(&path);

        assert!(matches!(store.try_load(), Err(StoreError::Parse { .. })));
        assert!(store.load().conversations.is_empty());
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let store = ChatStore::new(dir.path().join("nested/deeper/chat.data.json"));

        store.save(&sample());
        assert_eq!(store.load().conversations.len(), 3);
    }

    fn leftover_tmp_files(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.extension().map(|x| x == "tmp").unwrap_or(false))
            .collect()
    }

    #[test]
    fn test_round_trip_leaves_no_tmp_files() {
        let dir = tempdir().unwrap();
        let store = ChatStore::new(dir.path().join("chat.data.json"));

        store.save(&sample());
        store.save(&sample());
        assert!(leftover_tmp_files(dir.path()).is_empty());
    }

    #[test]
    fn test_failed_save_cleans_up() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chat.data.json");
        // A non-empty directory squatting on the document path makes the rename fail
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();
        let store = ChatStore::new(&path);

        assert!(matches!(store.try_save(&sample()), Err(StoreError::Io { .. })));
        store.save(&sample());

        assert_eq!(fs::read_to_string(path.join("keep")).unwrap(), "x");
        assert!(leftover_tmp_files(dir.path()).is_empty());
    }

    #[test]
    fn test_concurrent_savers_all_succeed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chat.data.json");
        let first = sample();
        let mut second = sample();
        second.conversations.truncate(1);

        let handles: Vec<_> = [first.clone(), second.clone()]
            .into_iter()
            .map(|data| {
                // Separate stores, as two CLI processes would have
                let store = ChatStore::new(&path);
                std::thread::spawn(move || {
                    (0..200)
                        .filter(|_| store.try_save(&data).is_err())
                        .count()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 0);
        }

        let last = ChatStore::new(&path).try_load().unwrap();
        assert!(last == first || last == second);
        assert!(leftover_tmp_files(dir.path()).is_empty());
    }

    #[test]
    fn test_document_is_pretty_json() {
        let dir = tempdir().unwrap();
        let store = ChatStore::new(dir.path().join("chat.data.json"));
        store.save(&sample());

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.starts_with("{\n  \"conversations\": ["));
    }
}
