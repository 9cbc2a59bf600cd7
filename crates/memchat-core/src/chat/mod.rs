//! ============================================================================
//! Chat Module - Conversations gated by memory access consent
//! ============================================================================
//! Every conversation opens with a bot greeting asking for access to the
//! user's memory. Until the user approves (with a wallet signature), chat
//! traffic lives in memory only; once approved, each exchange is written to
//! the chat document.
//!
//! ## Flow
//! ```text
//! create_conversation ─→ [greeting, access: pending]        (saved)
//! send_message        ─→ + user, + bot                       (saved iff approved)
//! approve / reject    ─→ status resolved, + acknowledgement  (saved)
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use memchat_core::chat::{ChatStore, ConversationEngine};
//!
//! let mut engine = ConversationEngine::open(ChatStore::new("chat.data.json"));
//! let conv = engine.create_conversation("Trip planning");
//! engine.approve_memory_access(&conv.id, signature, wallet_address);
//! let messages = engine.send_message(&conv.id, "Remember I like window seats");
//! ```
//! ============================================================================

mod clock;
mod engine;
mod responder;
mod shared;
mod store;
mod types;

// Re-export public types
pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::ConversationEngine;
pub use responder::{CannedResponder, FixedResponder, ResponderOracle, CANNED_REPLIES};
pub use shared::SharedEngine;
pub use store::{ChatStore, StoreError};
pub use types::{
    AccessStatus, AccessType, ChatData, Conversation, MemoryAccessRequest, Message, Role,
    APPROVAL_ACK, GREETING, REJECTION_ACK,
};
