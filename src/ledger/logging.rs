//! Tracing setup for binaries and tests embedding the ledger.

use tracing_subscriber::EnvFilter;

use crate::ledger::core::config::LoggingConfig;
use crate::ledger::core::errors::{LedgerError, LedgerResult};

/// Install a global `fmt` subscriber filtered by `config.filter`.
///
/// Returns `Ok(false)` when a global subscriber was already installed, which
/// makes repeated calls (e.g. from several tests) harmless.
///
/// # Errors
/// Returns an error if the filter directive cannot be parsed.
pub fn init_tracing(config: &LoggingConfig) -> LedgerResult<bool> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| LedgerError::InvalidConfig(format!("invalid log filter: {e}")))?;

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.ansi)
        .with_target(true)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("Chat ledger v{} logging initialized", env!("CARGO_PKG_VERSION"));
    }

    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        let config = LoggingConfig::default();
        assert!(init_tracing(&config).is_ok());
        assert_eq!(init_tracing(&config), Ok(false));
    }

    #[test]
    fn test_init_tracing_rejects_bad_filter() {
        let config = LoggingConfig {
            filter: "chat_ledger=notalevel".to_string(),
            ansi: false,
        };
        assert!(matches!(
            init_tracing(&config),
            Err(LedgerError::InvalidConfig(_))
        ));
    }
}
