//! Chat ledger subsystem.
//!
//! - `core`: configuration, errors, identifiers, and chat/message records
//! - `store`: the single-owner [`ChatLedger`] implementing every operation
//! - `service`: the [`ChatService`] seam and its mutex-backed implementation
//! - `logging`: tracing subscriber setup

pub mod core;
pub mod logging;
pub mod service;
pub mod store;

// Re-export commonly used types for convenience
pub use self::core::{
    Chat, ChatId, LedgerConfig, LedgerError, LedgerResult, LedgerStats, LoggingConfig, Message,
    MessageId, StoreConfig, UserId,
};
pub use logging::init_tracing;
pub use service::{ChatService, SharedChatLedger, StoreFuture};
pub use store::ChatLedger;
