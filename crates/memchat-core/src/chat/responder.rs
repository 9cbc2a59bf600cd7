//! ============================================================================
//! Responder - Reply text for user messages
//! ============================================================================
//! The engine asks a `ResponderOracle` for the bot's answer to each user
//! message. The default picks one of a few canned replies at random.
//! ============================================================================

use rand::seq::SliceRandom;

/// Produces the assistant's reply to a user message
pub trait ResponderOracle: Send + Sync {
    fn generate_reply(&self, user_text: &str) -> String;
}

/// Canned replies used by `CannedResponder`
pub const CANNED_REPLIES: [&str; 5] = [
    "这是一个很有趣的观点，能详细说说吗？",
    "我明白你的意思了，让我想想...",
    "确实如此，我们可以进一步讨论这个话题。",
    "这让我想到了一些相关的内容...",
    "你说得对，还有什么想法吗？",
];

/// Picks a random canned reply, ignoring the user's text
#[derive(Debug, Clone, Copy, Default)]
pub struct CannedResponder;

impl ResponderOracle for CannedResponder {
    fn generate_reply(&self, _user_text: &str) -> String {
        CANNED_REPLIES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(CANNED_REPLIES[0])
            .to_string()
    }
}

/// Always answers with the same text
#[derive(Debug, Clone)]
pub struct FixedResponder {
    reply: String,
}

impl FixedResponder {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

impl ResponderOracle for FixedResponder {
    fn generate_reply(&self, _user_text: &str) -> String {
        self.reply.clone()
    }
}
