use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// One unit on the wire: a JSON object with exactly these four fields.
///
/// Inbound frames may omit any of them (the remote runs its own id scheme),
/// so everything defaults. Outbound messages get their `id` stamped from the
/// shared [`MessageSequence`] just before the send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub id: u64,
    /// Message kind, `"type"` on the wire (`message`, `presence_change`, ...).
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Conversation the message belongs to.
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub text: String,
}

impl Message {
    /// A plain-text reply into the same conversation. The id stays 0 until
    /// the dispatch loop assigns one at send time.
    pub fn reply(&self, text: impl Into<String>) -> Self {
        Self {
            id: 0,
            kind: "message".to_string(),
            channel: self.channel.clone(),
            text: text.into(),
        }
    }
}

/// Shared outbound-id source.
///
/// Every bot constructed with a clone of the same `Arc<MessageSequence>`
/// draws from one atomic counter, which keeps outbound ids unique and
/// strictly increasing in send order across all concurrently sending bots
/// in the process.
#[derive(Debug)]
pub struct MessageSequence(AtomicU64);

impl MessageSequence {
    pub fn new() -> Self {
        Self(AtomicU64::new(1))
    }

    /// Next outbound id. The first call returns 1.
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst)
    }
}

impl Default for MessageSequence {
    fn default() -> Self {
        Self::new()
    }
}
