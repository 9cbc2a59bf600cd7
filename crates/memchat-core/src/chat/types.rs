//! ============================================================================
//! Chat Types - Conversations, messages and memory access requests
//! ============================================================================
//! These types are the durable document layout as well as the values handed
//! back to callers. Field names are camelCase on the wire.
//! ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Greeting placed at index 0 of every new conversation
pub const GREETING: &str = "你好，我是AI助手。我需要访问你的记忆来更好地为你服务。";

/// Acknowledgement appended when memory access is approved
pub const APPROVAL_ACK: &str = "感谢你允许我访问你的记忆。我现在可以更好地为你服务了。";

/// Acknowledgement appended when memory access is rejected
pub const REJECTION_ACK: &str = "我理解你的顾虑。我会在不访问记忆的情况下继续为你服务。";

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Bot,
    User,
}

/// What the assistant wants to do with the user's memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    Create,
    Retrieve,
    Access,
}

/// Resolution state of a memory access request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccessStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl AccessStatus {
    /// Approved and rejected are final
    pub fn is_resolved(&self) -> bool {
        !matches!(self, AccessStatus::Pending)
    }
}

impl std::fmt::Display for AccessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AccessStatus::Pending => "pending",
            AccessStatus::Approved => "approved",
            AccessStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// Consent gate embedded in the first message of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryAccessRequest {
    #[serde(rename = "type")]
    pub access_type: AccessType,
    #[serde(default)]
    pub status: AccessStatus,
    /// Wallet signature supplied at approval time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Wallet address supplied at approval time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
}

impl MemoryAccessRequest {
    /// A fresh request awaiting the user's decision
    pub fn pending(access_type: AccessType) -> Self {
        Self {
            access_type,
            status: AccessStatus::Pending,
            signature: None,
            wallet_address: None,
        }
    }

    /// Move a pending request to approved, recording the wallet proof.
    /// Returns false (and changes nothing) if already resolved.
    pub fn approve(&mut self, signature: &str, wallet_address: &str) -> bool {
        if self.status.is_resolved() {
            return false;
        }
        self.status = AccessStatus::Approved;
        self.signature = Some(signature.to_string());
        self.wallet_address = Some(wallet_address.to_string());
        true
    }

    /// Move a pending request to rejected.
    /// Returns false (and changes nothing) if already resolved.
    pub fn reject(&mut self) -> bool {
        if self.status.is_resolved() {
            return false;
        }
        self.status = AccessStatus::Rejected;
        true
    }
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_access: Option<MemoryAccessRequest>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            memory_access: None,
        }
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            content: content.into(),
            memory_access: None,
        }
    }

    /// The greeting that opens every conversation, carrying a pending request
    pub fn greeting() -> Self {
        Self {
            role: Role::Bot,
            content: GREETING.to_string(),
            memory_access: Some(MemoryAccessRequest::pending(AccessType::Access)),
        }
    }
}

/// A titled, ordered thread of messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Build a conversation with its mandatory greeting
    pub fn new(id: String, title: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            messages: vec![Message::greeting()],
            created_at: now,
            updated_at: now,
        }
    }

    /// The access request on the first message, if any
    pub fn access_request(&self) -> Option<&MemoryAccessRequest> {
        self.messages.first()?.memory_access.as_ref()
    }

    pub fn access_request_mut(&mut self) -> Option<&mut MemoryAccessRequest> {
        self.messages.first_mut()?.memory_access.as_mut()
    }

    /// Whether ordinary message traffic may be persisted
    pub fn memory_approved(&self) -> bool {
        self.access_request()
            .map(|r| r.status == AccessStatus::Approved)
            .unwrap_or(false)
    }

    /// Record a mutation time, never moving before creation
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }
}

/// The whole durable document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatData {
    #[serde(default)]
    pub conversations: Vec<Conversation>,
}

impl ChatData {
    pub fn find(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Total messages across all conversations
    pub fn message_count(&self) -> usize {
        self.conversations.iter().map(|c| c.messages.len()).sum()
    }
}
