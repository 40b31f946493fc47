//! Core ledger types and identifiers.

pub mod config;
pub mod errors;
pub mod ids;
pub mod types;

pub use config::{LedgerConfig, LoggingConfig, StoreConfig};
pub use errors::{LedgerError, LedgerResult};
pub use ids::{ChatId, MessageId, UserId};
pub use types::{Chat, LedgerStats, Message};
