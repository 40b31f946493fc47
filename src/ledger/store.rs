//! In-memory chat ledger.
//!
//! [`ChatLedger`] owns every chat and message and assigns their identifiers.
//! Chats are kept in creation order; messages live inside their chat in
//! insertion order. Lookups by participant pair are linear scans, lookups by
//! message id go through an optional id index.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::ledger::core::config::StoreConfig;
use crate::ledger::core::errors::{LedgerError, LedgerResult};
use crate::ledger::core::ids::{ChatId, IdCounter, MessageId, UserId};
use crate::ledger::core::types::{Chat, LedgerStats, Message};

/// Single-owner store of chats and messages.
#[derive(Debug, Clone)]
pub struct ChatLedger {
    chats: Vec<Chat>,
    /// Message id -> owning chat. `None` when indexing is disabled.
    index: Option<HashMap<MessageId, ChatId>>,
    next_chat_id: IdCounter,
    next_message_id: IdCounter,
}

impl Default for ChatLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatLedger {
    /// Create an empty ledger with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&StoreConfig::default())
    }

    /// Create an empty ledger.
    #[must_use]
    pub fn with_config(config: &StoreConfig) -> Self {
        Self {
            chats: Vec::new(),
            index: config.index_messages.then(HashMap::new),
            next_chat_id: IdCounter::new(),
            next_message_id: IdCounter::new(),
        }
    }

    /// Drop every chat and message and restart both id sequences at 1.
    pub fn clear(&mut self) {
        let dropped = self.chats.len();
        self.chats.clear();
        if let Some(index) = self.index.as_mut() {
            index.clear();
        }
        self.next_chat_id.reset();
        self.next_message_id.reset();
        info!("Ledger cleared ({dropped} chats dropped)");
    }

    /// Append a message to the chat between `sender_id` and `recipient_id`,
    /// opening the chat if the pair has none.
    ///
    /// Pair lookup ignores the chat's deleted flag: a soft-deleted chat
    /// receives the message but stays hidden from [`Self::get_chats`].
    pub fn add_message(
        &mut self,
        sender_id: UserId,
        recipient_id: UserId,
        text: impl Into<String>,
    ) -> Message {
        let message = Message::new(
            MessageId(self.next_message_id.allocate()),
            sender_id,
            recipient_id,
            text,
        );

        let chat_id = if let Some(chat) = self
            .chats
            .iter_mut()
            .find(|c| c.is_between(sender_id, recipient_id))
        {
            chat.messages.push(message.clone());
            chat.has_unread = true;
            debug!(
                "Appended message {} to chat {} (deleted: {})",
                message.id, chat.id, chat.is_deleted
            );
            chat.id
        } else {
            let chat = Chat::open(ChatId(self.next_chat_id.allocate()), message.clone());
            let chat_id = chat.id;
            self.chats.push(chat);
            info!("Opened chat {chat_id} between {sender_id} and {recipient_id}");
            chat_id
        };

        if let Some(index) = self.index.as_mut() {
            index.insert(message.id, chat_id);
        }

        message
    }

    /// Soft-delete a message anywhere in the ledger, deleted chats included.
    ///
    /// Returns `false` only when no such message exists. Deleting twice is fine.
    pub fn delete_message(&mut self, message_id: MessageId) -> bool {
        match self.message_mut(message_id) {
            Some(message) => {
                message.is_deleted = true;
                debug!("Deleted message {message_id}");
                true
            }
            None => {
                debug!("Delete skipped, message {message_id} does not exist");
                false
            }
        }
    }

    /// Replace the text of an active message.
    ///
    /// # Errors
    /// Returns [`LedgerError::MessageNotFound`] if the message does not exist
    /// or has been deleted.
    pub fn edit_message(
        &mut self,
        message_id: MessageId,
        new_text: impl Into<String>,
    ) -> LedgerResult<Message> {
        match self.message_mut(message_id) {
            Some(message) if message.is_active() => {
                message.text = new_text.into();
                debug!("Edited message {message_id}");
                Ok(message.clone())
            }
            _ => {
                warn!("Edit rejected, message {message_id} not found");
                Err(LedgerError::MessageNotFound(message_id))
            }
        }
    }

    /// Delete a chat.
    ///
    /// A chat with at least one active message is only flagged as deleted. A
    /// chat whose messages are all deleted (or that has none) is removed from
    /// storage together with its messages. Returns `false` if the chat does
    /// not exist.
    pub fn delete_chat(&mut self, chat_id: ChatId) -> bool {
        let Some(pos) = self.chats.iter().position(|c| c.id == chat_id) else {
            debug!("Delete skipped, chat {chat_id} does not exist");
            return false;
        };

        if self.chats[pos].has_active_messages() {
            self.chats[pos].is_deleted = true;
            debug!("Soft-deleted chat {chat_id}");
        } else {
            let removed = self.chats.remove(pos);
            if let Some(index) = self.index.as_mut() {
                for message in &removed.messages {
                    index.remove(&message.id);
                }
            }
            info!(
                "Purged chat {chat_id} ({} deleted messages)",
                removed.messages.len()
            );
        }

        true
    }

    /// Chats that have not been deleted, in creation order.
    #[must_use]
    pub fn get_chats(&self) -> Vec<Chat> {
        self.chats
            .iter()
            .filter(|c| !c.is_deleted)
            .cloned()
            .collect()
    }

    /// Read the last `count` active messages of the chat between the pair.
    ///
    /// Returned messages are marked read and the chat's unread marker is
    /// cleared. Nothing is marked when the chat is missing, deleted, or has no
    /// active message; the result is then empty.
    pub fn get_messages(
        &mut self,
        sender_id: UserId,
        recipient_id: UserId,
        count: usize,
    ) -> Vec<Message> {
        let Some(chat) = self
            .chats
            .iter_mut()
            .find(|c| c.is_between(sender_id, recipient_id))
        else {
            return Vec::new();
        };

        if chat.is_deleted || !chat.has_active_messages() {
            return Vec::new();
        }

        let mut selected: Vec<Message> = chat
            .messages
            .iter_mut()
            .rev()
            .filter(|m| m.is_active())
            .take(count)
            .map(|m| {
                m.is_read = true;
                m.clone()
            })
            .collect();
        selected.reverse();

        chat.has_unread = false;
        debug!("Read {} messages from chat {}", selected.len(), chat.id);

        selected
    }

    /// Number of chats, deleted ones included, holding an unread message.
    #[must_use]
    pub fn get_unread_chats_count(&self) -> usize {
        self.chats.iter().filter(|c| c.has_unread_messages()).count()
    }

    /// Latest active message of every chat that has not been deleted.
    ///
    /// Chats without an active message are skipped.
    #[must_use]
    pub fn get_last_messages_from_all_chats(&self) -> Vec<Message> {
        self.chats
            .iter()
            .filter(|c| !c.is_deleted)
            .filter_map(Chat::last_active_message)
            .cloned()
            .collect()
    }

    /// Look up a chat by id, deleted ones included.
    #[must_use]
    pub fn chat(&self, chat_id: ChatId) -> Option<&Chat> {
        self.chats.iter().find(|c| c.id == chat_id)
    }

    /// Look up a message by id, deleted ones included.
    #[must_use]
    pub fn message(&self, message_id: MessageId) -> Option<&Message> {
        let (chat_pos, message_pos) = self.locate(message_id)?;
        Some(&self.chats[chat_pos].messages[message_pos])
    }

    /// Snapshot of the ledger counters.
    #[must_use]
    pub fn stats(&self) -> LedgerStats {
        self.chats
            .iter()
            .fold(LedgerStats::default(), |mut stats, chat| {
                stats.chats += 1;
                stats.deleted_chats += usize::from(chat.is_deleted);
                stats.messages += chat.messages.len();
                stats.deleted_messages += chat.messages.iter().filter(|m| m.is_deleted).count();
                stats.unread_chats += usize::from(chat.has_unread_messages());
                stats
            })
    }

    fn message_mut(&mut self, message_id: MessageId) -> Option<&mut Message> {
        let (chat_pos, message_pos) = self.locate(message_id)?;
        Some(&mut self.chats[chat_pos].messages[message_pos])
    }

    /// Position of a message as (chat, message) offsets.
    fn locate(&self, message_id: MessageId) -> Option<(usize, usize)> {
        match &self.index {
            Some(index) => {
                let chat_id = index.get(&message_id)?;
                let chat_pos = self.chats.iter().position(|c| c.id == *chat_id)?;
                let message_pos = self.chats[chat_pos]
                    .messages
                    .iter()
                    .position(|m| m.id == message_id)?;
                Some((chat_pos, message_pos))
            }
            None => self.chats.iter().enumerate().find_map(|(chat_pos, chat)| {
                chat.messages
                    .iter()
                    .position(|m| m.id == message_id)
                    .map(|message_pos| (chat_pos, message_pos))
            }),
        }
    }

    /// Store a hand-built chat as-is. Counters are left untouched.
    #[cfg(test)]
    pub(crate) fn insert_chat(&mut self, chat: Chat) {
        if let Some(index) = self.index.as_mut() {
            for message in &chat.messages {
                index.insert(message.id, chat.id);
            }
        }
        self.chats.push(chat);
    }
}
