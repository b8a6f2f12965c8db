//! Typed aggregate identifiers.
//!
//! Each aggregate has its own id type, so a `RecordId` can never be passed
//! where an `AccountId` is expected. Ids are issued by per-aggregate store
//! sequences and are always positive; zero is rejected on construction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Raised when a raw value is not a valid identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{kind} must be a positive integer")]
pub struct InvalidId {
    kind: &'static str,
}

impl InvalidId {
    /// Name of the id type that rejected the value.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(try_from = "u64", into = "u64")]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw value, rejecting zero.
            pub const fn new(raw: u64) -> Result<Self, InvalidId> {
                if raw == 0 {
                    Err(InvalidId {
                        kind: stringify!($name),
                    })
                } else {
                    Ok(Self(raw))
                }
            }

            /// The raw value.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl TryFrom<u64> for $name {
            type Error = InvalidId;

            fn try_from(value: u64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for u64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl FromStr for $name {
            type Err = InvalidId;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map_err(|_| InvalidId {
                        kind: stringify!($name),
                    })
                    .and_then(Self::new)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`crate::domain::User`].
    UserId
);
entity_id!(
    /// Identifier of a [`crate::domain::Account`].
    AccountId
);
entity_id!(
    /// Identifier of a [`crate::domain::Category`].
    CategoryId
);
entity_id!(
    /// Identifier of a [`crate::domain::Record`].
    RecordId
);
entity_id!(
    /// Identifier of a [`crate::domain::Budget`].
    BudgetId
);
