//! ============================================================================
//! Conversation Engine - Message flow and memory access consent
//! ============================================================================
//! Owns the in-memory conversation collection and decides when it is written
//! to the `ChatStore`:
//! - creating a conversation, approving and rejecting access always save
//! - ordinary messages are saved only once access has been approved
//!
//! No operation fails its caller. Unknown ids and conversations without an
//! access request come back as empty or unchanged message lists.
//! ============================================================================

use std::sync::Arc;
use tracing::{debug, info};

use super::clock::{Clock, SystemClock};
use super::responder::{CannedResponder, ResponderOracle};
use super::store::ChatStore;
use super::types::{
    ChatData, Conversation, MemoryAccessRequest, Message, APPROVAL_ACK, REJECTION_ACK,
};

/// Single owner of all conversations for the lifetime of the process
pub struct ConversationEngine {
    store: ChatStore,
    data: ChatData,
    responder: Arc<dyn ResponderOracle>,
    clock: Arc<dyn Clock>,
}

impl ConversationEngine {
    /// Load the store's document and start serving from it
    pub fn open(store: ChatStore) -> Self {
        let data = store.load();
        info!(
            "Conversation engine ready ({} conversations from {})",
            data.conversations.len(),
            store.path().display()
        );

        Self {
            store,
            data,
            responder: Arc::new(CannedResponder),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the reply generator
    pub fn with_responder(mut self, responder: Arc<dyn ResponderOracle>) -> Self {
        self.responder = responder;
        self
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &ChatStore {
        &self.store
    }

    /// All conversations in creation order, as currently held in memory
    pub fn list_conversations(&self) -> &[Conversation] {
        &self.data.conversations
    }

    /// Look up a conversation without touching storage
    pub fn get_conversation(&self, id: &str) -> Option<&Conversation> {
        self.data.find(id)
    }

    /// Re-read the document, then return the conversation's messages.
    ///
    /// The reload replaces the whole in-memory collection, so unsaved
    /// messages of conversations that are not approved are dropped here.
    pub fn get_messages(&mut self, id: &str) -> Vec<Message> {
        self.data = self.store.load();
        self.messages_of(id)
    }

    /// Start a conversation with the greeting and a pending access request
    pub fn create_conversation(&mut self, title: &str) -> Conversation {
        let now = self.clock.now();
        let id = self.next_id(now.timestamp_millis());
        let conversation = Conversation::new(id, title.to_string(), now);

        self.data.conversations.push(conversation.clone());
        self.store.save(&self.data);

        info!("Created conversation {} ({:?})", conversation.id, conversation.title);
        conversation
    }

    /// Append the user's message and the bot's reply
    pub fn send_message(&mut self, id: &str, content: &str) -> Vec<Message> {
        let Some(conversation) = self.data.find_mut(id) else {
            debug!("send_message: no conversation {}", id);
            return Vec::new();
        };

        conversation.messages.push(Message::user(content));
        let reply = self.responder.generate_reply(content);
        conversation.messages.push(Message::bot(reply));

        if conversation.memory_approved() {
            conversation.touch(self.clock.now());
            let messages = conversation.messages.clone();
            self.store.save(&self.data);
            messages
        } else {
            debug!("Conversation {} not approved, keeping messages in memory only", id);
            conversation.messages.clone()
        }
    }

    /// Grant memory access with the user's wallet proof
    pub fn approve_memory_access(
        &mut self,
        id: &str,
        signature: &str,
        wallet_address: &str,
    ) -> Vec<Message> {
        self.resolve(id, APPROVAL_ACK, |request| {
            request.approve(signature, wallet_address)
        })
    }

    /// Decline memory access
    pub fn reject_memory_access(&mut self, id: &str) -> Vec<Message> {
        self.resolve(id, REJECTION_ACK, |request| request.reject())
    }

    /// Shared approve/reject path. `apply` only changes a pending request;
    /// the acknowledgement and the save happen on every call.
    fn resolve<F>(&mut self, id: &str, ack: &str, apply: F) -> Vec<Message>
    where
        F: FnOnce(&mut MemoryAccessRequest) -> bool,
    {
        let now = self.clock.now();
        let Some(conversation) = self.data.find_mut(id) else {
            debug!("No conversation {} to resolve", id);
            return Vec::new();
        };
        let Some(request) = conversation.access_request_mut() else {
            debug!("Conversation {} has no memory access request", id);
            return conversation.messages.clone();
        };

        if apply(&mut *request) {
            info!("Memory access for conversation {} is now {}", id, request.status);
        } else {
            debug!(
                "Memory access for conversation {} already {}, acknowledging again",
                id, request.status
            );
        }

        conversation.messages.push(Message::bot(ack));
        conversation.touch(now);
        let messages = conversation.messages.clone();
        self.store.save(&self.data);
        messages
    }

    fn messages_of(&self, id: &str) -> Vec<Message> {
        self.data
            .find(id)
            .map(|c| c.messages.clone())
            .unwrap_or_default()
    }

    /// Millisecond timestamp as id, bumped past any id already taken
    fn next_id(&self, millis: i64) -> String {
        let mut candidate = millis;
        while self.data.contains(&candidate.to_string()) {
            candidate += 1;
        }
        candidate.to_string()
    }
}
