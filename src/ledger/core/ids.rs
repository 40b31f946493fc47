// File: src/ledger/core/ids.rs

//! Identifier types for the chat ledger.
//!
//! Strongly-typed integer newtypes so a chat id can never be passed where a
//! message id is expected. Chat and message ids are handed out by the ledger's
//! counters; user ids come from the caller.

use core::fmt;
use core::num::ParseIntError;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Declare a `u64` newtype with a consistent API.
macro_rules! define_numeric_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[repr(transparent)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Wrap a raw integer.
            #[inline]
            #[must_use]
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Extract the underlying integer.
            #[inline]
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            #[inline]
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u64 {
            #[inline]
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            #[inline]
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }
    };
}

define_numeric_id!(
    /// Identifier of a conversation participant.
    UserId
);

define_numeric_id!(
    /// Identifier of a chat, assigned monotonically by the ledger.
    ChatId
);

define_numeric_id!(
    /// Identifier of a message, assigned monotonically by the ledger.
    ///
    /// Unique across all chats, never reused until the ledger is cleared.
    MessageId
);

/// Monotonic id source. Starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IdCounter(u64);

impl IdCounter {
    pub(crate) const fn new() -> Self {
        Self(1)
    }

    /// Hand out the current value and advance.
    pub(crate) const fn allocate(&mut self) -> u64 {
        let id = self.0;
        self.0 += 1;
        id
    }

    pub(crate) const fn reset(&mut self) {
        self.0 = 1;
    }
}

impl Default for IdCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_starts_at_one_and_resets() {
        let mut counter = IdCounter::new();
        assert_eq!(counter.allocate(), 1);
        assert_eq!(counter.allocate(), 2);
        counter.reset();
        assert_eq!(counter.allocate(), 1);
    }

    #[test]
    fn test_parse_and_display() {
        let id: MessageId = " 42 ".parse().unwrap_or(MessageId(0));
        assert_eq!(id, MessageId(42));
        assert_eq!(id.to_string(), "42");
        assert!("abc".parse::<ChatId>().is_err());
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&UserId(7)).unwrap_or_default();
        assert_eq!(json, "7");
        let back: UserId = serde_json::from_str("7").unwrap_or(UserId(0));
        assert_eq!(back, UserId(7));
    }
}
