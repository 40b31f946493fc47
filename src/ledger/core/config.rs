//! Configuration for the chat ledger.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::ledger::core::errors::{LedgerError, LedgerResult};

/// Environment variable holding the tracing filter directive.
pub const ENV_LOG: &str = "CHAT_LEDGER_LOG";
/// Environment variable overriding [`StoreConfig::default_window`].
pub const ENV_DEFAULT_WINDOW: &str = "CHAT_LEDGER_DEFAULT_WINDOW";
/// Environment variable overriding [`StoreConfig::index_messages`].
pub const ENV_INDEX_MESSAGES: &str = "CHAT_LEDGER_INDEX_MESSAGES";

/// Top-level configuration for the ledger.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Store settings.
    pub store: StoreConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl LedgerConfig {
    /// Create a new config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a config from defaults overlaid with `CHAT_LEDGER_*` variables.
    ///
    /// Values that fail to parse are ignored.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from defaults overlaid with values returned by `lookup`
    /// for the `CHAT_LEDGER_*` keys.
    ///
    /// Values that fail to parse are ignored.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(filter) = lookup(ENV_LOG) {
            config.logging.filter = filter;
        }

        if let Some(window) = lookup(ENV_DEFAULT_WINDOW).and_then(|w| w.trim().parse().ok()) {
            config.store.default_window = window;
        }

        if let Some(index) = lookup(ENV_INDEX_MESSAGES).and_then(|v| parse_flag(&v)) {
            config.store.index_messages = index;
        }

        config
    }

    /// Set the default read window.
    #[must_use]
    pub const fn with_default_window(mut self, window: usize) -> Self {
        self.store.default_window = window;
        self
    }

    /// Enable or disable the message id index.
    #[must_use]
    pub const fn with_message_index(mut self, enabled: bool) -> Self {
        self.store.index_messages = enabled;
        self
    }

    /// Set the tracing filter directive.
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.logging.filter = filter.into();
        self
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> LedgerResult<()> {
        self.store.validate()?;

        if self.logging.filter.trim().is_empty() {
            return Err(LedgerError::InvalidConfig(
                "logging.filter must not be empty".to_string(),
            ));
        }

        EnvFilter::try_new(&self.logging.filter).map_err(|e| {
            LedgerError::InvalidConfig(format!("logging.filter is not a valid directive: {e}"))
        })?;

        Ok(())
    }
}

/// Store settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Keep a message id index instead of scanning every chat on lookup.
    pub index_messages: bool,
    /// Message count used by `get_recent_messages`.
    pub default_window: usize,
}

impl StoreConfig {
    /// Validate store invariants.
    ///
    /// # Errors
    /// Returns an error if `default_window` is zero.
    pub fn validate(&self) -> LedgerResult<()> {
        if self.default_window == 0 {
            return Err(LedgerError::InvalidConfig(
                "store.default_window must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            index_messages: true,
            default_window: 20,
        }
    }
}

/// Logging settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `chat_ledger=debug`.
    pub filter: String,
    /// Colored output.
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            ansi: true,
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
