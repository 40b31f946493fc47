//! Thread-safe ledger handle for transports.
//!
//! A transport (HTTP handler, RPC service, CLI) codes against [`ChatService`].
//! [`SharedChatLedger`] implements it by serializing every call through one
//! mutex around a [`ChatLedger`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::ledger::core::config::{LedgerConfig, StoreConfig};
use crate::ledger::core::errors::LedgerResult;
use crate::ledger::core::ids::{ChatId, MessageId, UserId};
use crate::ledger::core::types::{Chat, LedgerStats, Message};
use crate::ledger::store::ChatLedger;

/// Boxed future type for service operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Chat operations exposed to transports.
pub trait ChatService: Send + Sync {
    /// Chats that have not been deleted, in creation order.
    fn get_chats(&self) -> StoreFuture<'_, Vec<Chat>>;

    /// Soft-delete or purge a chat. `false` if it does not exist.
    fn delete_chat(&self, chat_id: ChatId) -> StoreFuture<'_, bool>;

    /// Read and mark as read the last `count` active messages between two users.
    fn get_messages(
        &self,
        sender_id: UserId,
        recipient_id: UserId,
        count: usize,
    ) -> StoreFuture<'_, Vec<Message>>;

    /// Number of chats holding at least one unread message.
    fn get_unread_chats_count(&self) -> StoreFuture<'_, usize>;

    /// Send a message, opening the chat if needed.
    fn add_message(
        &self,
        sender_id: UserId,
        recipient_id: UserId,
        text: String,
    ) -> StoreFuture<'_, Message>;

    /// Soft-delete a message. `false` if it does not exist.
    fn delete_message(&self, message_id: MessageId) -> StoreFuture<'_, bool>;

    /// Replace the text of an active message.
    fn edit_message(
        &self,
        message_id: MessageId,
        new_text: String,
    ) -> StoreFuture<'_, LedgerResult<Message>>;

    /// Latest active message of every visible chat.
    fn get_last_messages_from_all_chats(&self) -> StoreFuture<'_, Vec<Message>>;
}

/// Cloneable handle to a mutex-guarded [`ChatLedger`].
#[derive(Debug, Clone)]
pub struct SharedChatLedger {
    inner: Arc<Mutex<ChatLedger>>,
    default_window: usize,
}

impl Default for SharedChatLedger {
    fn default() -> Self {
        let store = StoreConfig::default();
        Self::wrap(ChatLedger::with_config(&store), store.default_window)
    }
}

impl SharedChatLedger {
    /// Create an empty shared ledger.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: &LedgerConfig) -> LedgerResult<Self> {
        config.validate()?;
        Ok(Self::wrap(
            ChatLedger::with_config(&config.store),
            config.store.default_window,
        ))
    }

    /// Wrap an existing ledger.
    ///
    /// # Errors
    /// Returns an error if the store configuration is invalid.
    pub fn from_ledger(ledger: ChatLedger, config: &StoreConfig) -> LedgerResult<Self> {
        config.validate()?;
        Ok(Self::wrap(ledger, config.default_window))
    }

    fn wrap(ledger: ChatLedger, default_window: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
            default_window,
        }
    }

    /// Reset hook for test isolation: empties the ledger and restarts ids at 1.
    pub async fn clear(&self) {
        self.inner.lock().await.clear();
    }

    /// [`ChatService::get_messages`] with the configured default window.
    pub async fn get_recent_messages(
        &self,
        sender_id: UserId,
        recipient_id: UserId,
    ) -> Vec<Message> {
        debug!("Reading recent messages (window {})", self.default_window);
        self.inner
            .lock()
            .await
            .get_messages(sender_id, recipient_id, self.default_window)
    }

    /// Copy of a chat, deleted ones included.
    pub async fn chat(&self, chat_id: ChatId) -> Option<Chat> {
        self.inner.lock().await.chat(chat_id).cloned()
    }

    /// Snapshot of the ledger counters.
    pub async fn stats(&self) -> LedgerStats {
        self.inner.lock().await.stats()
    }
}

impl ChatService for SharedChatLedger {
    fn get_chats(&self) -> StoreFuture<'_, Vec<Chat>> {
        Box::pin(async move { self.inner.lock().await.get_chats() })
    }

    fn delete_chat(&self, chat_id: ChatId) -> StoreFuture<'_, bool> {
        Box::pin(async move { self.inner.lock().await.delete_chat(chat_id) })
    }

    fn get_messages(
        &self,
        sender_id: UserId,
        recipient_id: UserId,
        count: usize,
    ) -> StoreFuture<'_, Vec<Message>> {
        Box::pin(async move {
            self.inner
                .lock()
                .await
                .get_messages(sender_id, recipient_id, count)
        })
    }

    fn get_unread_chats_count(&self) -> StoreFuture<'_, usize> {
        Box::pin(async move { self.inner.lock().await.get_unread_chats_count() })
    }

    fn add_message(
        &self,
        sender_id: UserId,
        recipient_id: UserId,
        text: String,
    ) -> StoreFuture<'_, Message> {
        Box::pin(async move {
            self.inner
                .lock()
                .await
                .add_message(sender_id, recipient_id, text)
        })
    }

    fn delete_message(&self, message_id: MessageId) -> StoreFuture<'_, bool> {
        Box::pin(async move { self.inner.lock().await.delete_message(message_id) })
    }

    fn edit_message(
        &self,
        message_id: MessageId,
        new_text: String,
    ) -> StoreFuture<'_, LedgerResult<Message>> {
        Box::pin(async move { self.inner.lock().await.edit_message(message_id, new_text) })
    }

    fn get_last_messages_from_all_chats(&self) -> StoreFuture<'_, Vec<Message>> {
        Box::pin(async move { self.inner.lock().await.get_last_messages_from_all_chats() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::core::errors::LedgerError;

    const A: UserId = UserId(1);
    const B: UserId = UserId(2);

    #[tokio::test]
    async fn test_service_round_trip() {
        let service = SharedChatLedger::default();

        service.add_message(A, B, "hi".to_string()).await;
        let second = service.add_message(B, A, "yo".to_string()).await;

        let chats = service.get_chats().await;
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].messages.len(), 2);
        assert_eq!(service.get_unread_chats_count().await, 1);

        let read = service.get_messages(A, B, 1).await;
        assert_eq!(read, vec![Message { is_read: true, ..second.clone() }]);

        let previews = service.get_last_messages_from_all_chats().await;
        assert_eq!(previews.iter().map(|m| m.id).collect::<Vec<_>>(), vec![second.id]);
    }

    #[tokio::test]
    async fn test_edit_and_delete_through_trait() {
        let service: Arc<dyn ChatService> = Arc::new(SharedChatLedger::default());

        let message = service.add_message(A, B, "draft".to_string()).await;
        let edited = service.edit_message(message.id, "final".to_string()).await;
        assert_eq!(edited.map(|m| m.text), Ok("final".to_string()));

        assert!(service.delete_message(message.id).await);
        let rejected = service.edit_message(message.id, "again".to_string()).await;
        assert_eq!(rejected, Err(LedgerError::MessageNotFound(message.id)));

        assert!(service.delete_chat(ChatId(1)).await);
        assert!(service.get_chats().await.is_empty());
        assert!(!service.delete_chat(ChatId(1)).await);
    }

    #[tokio::test]
    async fn test_recent_messages_use_default_window() -> LedgerResult<()> {
        let config = LedgerConfig::new().with_default_window(2);
        let service = SharedChatLedger::new(&config)?;
        for text in ["one", "two", "three"] {
            service.add_message(A, B, text.to_string()).await;
        }

        let recent = service.get_recent_messages(B, A).await;

        let texts: Vec<&str> = recent.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["two", "three"]);
        assert_eq!(service.stats().await.unread_chats, 1);
        Ok(())
    }

    #[test]
    fn test_new_rejects_zero_window() {
        let config = LedgerConfig::new().with_default_window(0);

        let result = SharedChatLedger::new(&config);

        assert!(matches!(result, Err(LedgerError::InvalidConfig(_))));
    }

    #[test]
    fn test_new_rejects_bad_log_filter() {
        let config = LedgerConfig::new().with_log_filter("  ");
        assert!(SharedChatLedger::new(&config).is_err());
    }

    #[test]
    fn test_from_ledger_rejects_zero_window() {
        let store = StoreConfig {
            default_window: 0,
            ..StoreConfig::default()
        };

        let result = SharedChatLedger::from_ledger(ChatLedger::new(), &store);

        assert!(matches!(result, Err(LedgerError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_from_ledger_keeps_existing_state() -> LedgerResult<()> {
        let mut ledger = ChatLedger::new();
        ledger.add_message(A, B, "kept");

        let service = SharedChatLedger::from_ledger(ledger, &StoreConfig::default())?;

        assert_eq!(service.stats().await.messages, 1);
        let next = service.add_message(B, A, "next".to_string()).await;
        assert_eq!(next.id, MessageId(2));
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_resets_shared_state() {
        let service = SharedChatLedger::default();
        service.add_message(A, B, "before".to_string()).await;
        let clone = service.clone();

        clone.clear().await;

        assert!(service.chat(ChatId(1)).await.is_none());
        let message = service.add_message(A, B, "after".to_string()).await;
        assert_eq!(message.id, MessageId(1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_get_unique_ids() {
        let service = SharedChatLedger::default();

        let handles: Vec<_> = (0..32u64)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .add_message(UserId(i % 4), UserId(100), format!("msg {i}"))
                        .await
                        .id
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            if let Ok(id) = handle.await {
                ids.push(id.get());
            }
        }
        ids.sort_unstable();

        assert_eq!(ids, (1..=32).collect::<Vec<u64>>());
        let stats = service.stats().await;
        assert_eq!(stats.chats, 4);
        assert_eq!(stats.messages, 32);
    }
}
