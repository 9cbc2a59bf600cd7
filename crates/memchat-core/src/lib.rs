//! ============================================================================
//! MEMCHAT-CORE: Conversation engine with memory access consent
//! ============================================================================
//! This crate holds everything behind the chat surface:
//! - Conversation / message data model and its JSON document layout
//! - ChatStore: best-effort load/save of the whole document
//! - ConversationEngine: message flow and the access approval state machine
//! - SharedEngine: single-mutex handle for multi-threaded hosts
//! ============================================================================

pub mod chat;
pub mod config;

// Re-export main types for convenience
pub use chat::*;
pub use config::ChatConfig;
