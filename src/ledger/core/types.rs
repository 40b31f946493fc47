//! Chat and message records.

use serde::{Deserialize, Serialize};

use crate::ledger::core::ids::{ChatId, MessageId, UserId};

/// A single message owned by a chat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message identifier.
    pub id: MessageId,
    /// Message content; the only field an edit may change.
    pub text: String,
    /// Author of the message.
    pub sender_id: UserId,
    /// Addressee of the message.
    pub recipient_id: UserId,
    /// Soft-delete flag. Never reset once set.
    pub is_deleted: bool,
    /// Set when the message is returned by a read query. Never reset.
    pub is_read: bool,
}

impl Message {
    /// Create a fresh, unread, active message.
    #[must_use]
    pub fn new(
        id: MessageId,
        sender_id: UserId,
        recipient_id: UserId,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            sender_id,
            recipient_id,
            is_deleted: false,
            is_read: false,
        }
    }

    /// A message that has not been deleted.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

/// A conversation between two participants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    /// Unique chat identifier.
    pub id: ChatId,
    /// Sender of the message that opened the chat.
    pub participant_a: UserId,
    /// Recipient of the message that opened the chat.
    pub participant_b: UserId,
    /// Messages in insertion order.
    pub messages: Vec<Message>,
    /// Soft-delete flag.
    pub is_deleted: bool,
    /// Coarse "something new" marker, independent of per-message read state.
    pub has_unread: bool,
}

impl Chat {
    /// Open a chat with its first message.
    #[must_use]
    pub fn open(id: ChatId, first: Message) -> Self {
        Self {
            id,
            participant_a: first.sender_id,
            participant_b: first.recipient_id,
            messages: vec![first],
            is_deleted: false,
            has_unread: true,
        }
    }

    /// Whether this chat is between `a` and `b`, in either direction.
    #[must_use]
    pub fn is_between(&self, a: UserId, b: UserId) -> bool {
        (self.participant_a == a && self.participant_b == b)
            || (self.participant_a == b && self.participant_b == a)
    }

    /// Iterate over messages that have not been deleted.
    pub fn active_messages(&self) -> impl DoubleEndedIterator<Item = &Message> {
        self.messages.iter().filter(|m| m.is_active())
    }

    /// Whether at least one message has not been deleted.
    #[must_use]
    pub fn has_active_messages(&self) -> bool {
        self.messages.iter().any(Message::is_active)
    }

    /// Whether any message, deleted or not, is still unread.
    #[must_use]
    pub fn has_unread_messages(&self) -> bool {
        self.messages.iter().any(|m| !m.is_read)
    }

    /// Most recent message that has not been deleted.
    #[must_use]
    pub fn last_active_message(&self) -> Option<&Message> {
        self.active_messages().next_back()
    }
}

/// Counters describing the ledger contents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStats {
    /// Stored chats, soft-deleted ones included.
    pub chats: usize,
    /// Soft-deleted chats still in storage.
    pub deleted_chats: usize,
    /// Stored messages, soft-deleted ones included.
    pub messages: usize,
    /// Soft-deleted messages.
    pub deleted_messages: usize,
    /// Chats holding at least one unread message.
    pub unread_chats: usize,
}

impl LedgerStats {
    /// Chats visible through `get_chats`.
    #[must_use]
    pub const fn active_chats(&self) -> usize {
        self.chats.saturating_sub(self.deleted_chats)
    }

    /// Messages that have not been deleted.
    #[must_use]
    pub const fn active_messages(&self) -> usize {
        self.messages.saturating_sub(self.deleted_messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: u64, from: u64, to: u64, text: &str) -> Message {
        Message::new(MessageId(id), UserId(from), UserId(to), text)
    }

    #[test]
    fn test_open_chat_records_first_direction() {
        let chat = Chat::open(ChatId(1), msg(1, 2, 3, "hi"));
        assert_eq!(chat.participant_a, UserId(2));
        assert_eq!(chat.participant_b, UserId(3));
        assert!(chat.has_unread);
        assert!(!chat.is_deleted);
        assert!(chat.is_between(UserId(3), UserId(2)));
        assert!(!chat.is_between(UserId(2), UserId(4)));
    }

    #[test]
    fn test_last_active_message_skips_deleted() {
        let mut chat = Chat::open(ChatId(1), msg(1, 2, 3, "first"));
        let mut tail = msg(2, 3, 2, "second");
        tail.is_deleted = true;
        chat.messages.push(tail);

        assert_eq!(chat.last_active_message().map(|m| m.id), Some(MessageId(1)));
        assert!(chat.has_active_messages());

        chat.messages[0].is_deleted = true;
        assert!(chat.last_active_message().is_none());
        assert!(!chat.has_active_messages());
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(msg(5, 1, 2, "x")).unwrap_or_default();
        assert_eq!(json["senderId"], 1);
        assert_eq!(json["isRead"], false);
    }

    #[test]
    fn test_stats_derived_counts() {
        let stats = LedgerStats {
            chats: 3,
            deleted_chats: 1,
            messages: 10,
            deleted_messages: 4,
            unread_chats: 2,
        };
        assert_eq!(stats.active_chats(), 2);
        assert_eq!(stats.active_messages(), 6);
    }

    #[test]
    fn test_stats_derived_counts_never_underflow() {
        let stats = LedgerStats {
            chats: 0,
            deleted_chats: 1,
            messages: 2,
            deleted_messages: 5,
            unread_chats: 0,
        };
        assert_eq!(stats.active_chats(), 0);
        assert_eq!(stats.active_messages(), 0);
    }
}
