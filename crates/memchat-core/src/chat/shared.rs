//! ============================================================================
//! Shared Engine - Thread-safe handle for multi-threaded hosts
//! ============================================================================
//! One mutex guards the whole collection, so every read-modify-persist
//! sequence (and `get_messages`'s reload-then-read) runs without interleaving.
//!
//! Pattern: Clone handle -> tokio::spawn -> await operation
//! ============================================================================

use std::sync::Arc;
use tokio::sync::Mutex;

use super::engine::ConversationEngine;
use super::types::{Conversation, Message};

/// Cloneable handle to a single `ConversationEngine`
#[derive(Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<ConversationEngine>>,
}

impl SharedEngine {
    pub fn new(engine: ConversationEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    pub async fn list_conversations(&self) -> Vec<Conversation> {
        self.inner.lock().await.list_conversations().to_vec()
    }

    pub async fn get_messages(&self, id: &str) -> Vec<Message> {
        self.inner.lock().await.get_messages(id)
    }

    pub async fn create_conversation(&self, title: &str) -> Conversation {
        self.inner.lock().await.create_conversation(title)
    }

    pub async fn send_message(&self, id: &str, content: &str) -> Vec<Message> {
        self.inner.lock().await.send_message(id, content)
    }

    pub async fn approve_memory_access(
        &self,
        id: &str,
        signature: &str,
        wallet_address: &str,
    ) -> Vec<Message> {
        self.inner
            .lock()
            .await
            .approve_memory_access(id, signature, wallet_address)
    }

    pub async fn reject_memory_access(&self, id: &str) -> Vec<Message> {
        self.inner.lock().await.reject_memory_access(id)
    }
}
