//! Strongly-typed identifiers.
//!
//! Both identifiers are opaque strings issued by external collaborators: goal
//! ids by the remote store, user ids by the session provider. The client never
//! interprets their contents.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a persisted goal (assigned by the remote store).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalId(String);

/// Identifier of an authenticated user (goal owner).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

macro_rules! impl_string_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Wrap a raw identifier, rejecting blank values.
            pub fn parse(raw: impl Into<String>) -> Result<Self, DomainError> {
                let raw = raw.into();
                if raw.trim().is_empty() {
                    return Err(DomainError::invalid_id(format!("{} must not be empty", $name)));
                }
                Ok(Self(raw))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// True for values that slipped past `parse` via deserialization.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

impl_string_newtype!(GoalId, "GoalId");
impl_string_newtype!(UserId, "UserId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_blank_ids() {
        assert!(matches!(GoalId::parse("  "), Err(DomainError::InvalidId(_))));
        assert!(matches!(UserId::parse(""), Err(DomainError::InvalidId(_))));
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = GoalId::parse("64f1c0ffee").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"64f1c0ffee\"");

        let back: GoalId = serde_json::from_str("\"64f1c0ffee\"").unwrap();
        assert_eq!(back, id);
        assert_eq!(back.to_string(), "64f1c0ffee");
    }

    #[test]
    fn deserialized_blank_id_is_detectable() {
        let id: UserId = serde_json::from_str("\"\"").unwrap();
        assert!(id.is_blank());
    }
}
