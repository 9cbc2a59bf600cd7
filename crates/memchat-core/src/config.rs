// ============================================================================
// ChatConfig — where the chat document lives
// ============================================================================
// Resolution order: explicit path, MEMCHAT_DATA_PATH env var,
// ~/.memchat/chat.data.json
// ============================================================================

use std::path::PathBuf;
use tracing::debug;

use crate::chat::ChatStore;

/// Environment variable overriding the document location
pub const DATA_PATH_ENV: &str = "MEMCHAT_DATA_PATH";

/// Default document file name inside `~/.memchat`
pub const DEFAULT_FILE_NAME: &str = "chat.data.json";

/// Runtime configuration for the chat core
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    pub data_path: PathBuf,
}

impl ChatConfig {
    /// Resolve the document path. Returns None only when no explicit path or
    /// env override is given and the home directory cannot be determined.
    pub fn resolve(explicit: Option<&str>) -> Option<Self> {
        let data_path = if let Some(p) = explicit {
            PathBuf::from(p)
        } else if let Some(env_path) = std::env::var_os(DATA_PATH_ENV).filter(|p| !p.is_empty()) {
            PathBuf::from(env_path)
        } else {
            dirs::home_dir()?.join(".memchat").join(DEFAULT_FILE_NAME)
        };

        debug!("Chat document path: {}", data_path.display());
        Some(Self { data_path })
    }

    /// Store backed by the configured document
    pub fn store(&self) -> ChatStore {
        ChatStore::new(self.data_path.clone())
    }
}
