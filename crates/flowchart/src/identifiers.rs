//! Newtype identifiers.
//!
//! Every concept that has an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging, for example,
//! a [`ChatId`] with a [`UserId`] even though both are `i64` under the hood.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Returned when an empty string is decoded into a string identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("identifier must not be empty")]
pub struct EmptyIdError;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display, and
// serde conversions that reject the empty string just like new().
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = EmptyIdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value).ok_or(EmptyIdError)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Macro for i64-wrapped newtypes (messaging-platform-assigned integers).
// Generates: struct (Copy), new(), as_i64(), Display.
// ---------------------------------------------------------------------------
macro_rules! i64_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates a new identifier from a raw integer.
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the underlying integer value.
            pub fn as_i64(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers — messaging platform
// ---------------------------------------------------------------------------

i64_id! {
    /// Identifies the user who sent a command. Key of the rate-limit map.
    UserId
}

i64_id! {
    /// Identifies a chat (private or group). Group chats have negative ids.
    ChatId
}

i64_id! {
    /// Identifies a message within a chat.
    MessageId
}

// ---------------------------------------------------------------------------
// Identifiers — graph description
// ---------------------------------------------------------------------------

string_id! {
    /// Identifies a node within one graph description.
    ///
    /// Edges refer to nodes by this id. References are not checked against the
    /// declared nodes; the renderer creates undeclared nodes implicitly.
    NodeId
}

// ---------------------------------------------------------------------------
// Generation attempts
// ---------------------------------------------------------------------------

/// One-based index of a diagram generation attempt within a single command.
///
/// Used for logging and for the caption of the delivered image, so the user
/// sees which attempt produced which picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AttemptIndex(u8);

impl AttemptIndex {
    /// Creates an [`AttemptIndex`], returning `None` for zero.
    pub fn new(value: u8) -> Option<Self> {
        if value == 0 {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Returns the attempt indices `1..=count` in order.
    pub fn sequence(count: u8) -> impl Iterator<Item = AttemptIndex> {
        (1..=count).map(Self)
    }

    /// Returns the underlying one-based value.
    pub fn get(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for AttemptIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------

/// File name for a downloaded flowchart image, unique per attempt.
///
/// Formatted as `flowchart_<uuid-hex>.jpg` so concurrent commands never
/// overwrite each other's images.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TempFileName(Uuid);

impl TempFileName {
    /// Generates a new random file name.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for TempFileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "flowchart_{}.jpg", self.0.simple())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_id_rejects_empty() {
        assert!(NodeId::new("").is_none());
        assert_eq!(NodeId::new("A").unwrap().as_str(), "A");
    }

    #[test]
    fn test_string_id_decoding_rejects_empty() {
        let err = serde_json::from_str::<NodeId>(r#""""#).unwrap_err();
        assert!(err.to_string().contains("identifier must not be empty"));

        let id: NodeId = serde_json::from_str(r#""B""#).unwrap();
        assert_eq!(id.as_str(), "B");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""B""#);
    }

    #[test]
    fn test_attempt_index_sequence_is_one_based() {
        let values: Vec<u8> = AttemptIndex::sequence(3).map(AttemptIndex::get).collect();
        assert_eq!(values, vec![1, 2, 3]);
        assert!(AttemptIndex::new(0).is_none());
    }

    #[test]
    fn test_temp_file_name_format() {
        let name = TempFileName::new_random().to_string();
        assert!(name.starts_with("flowchart_"));
        assert!(name.ends_with(".jpg"));
        // 10 prefix chars + 32 hex chars + 4 suffix chars.
        assert_eq!(name.len(), 46);
        assert_ne!(name, TempFileName::new_random().to_string());
    }
}
