//! Opaque catalog identifiers
//!
//! The catalog hands these out; we only compare, hash and pass them back.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

opaque_id!(
    /// Catalog track identifier
    TrackId
);
opaque_id!(
    /// Catalog artist identifier
    ArtistId
);
opaque_id!(
    /// Remote playlist identifier
    PlaylistId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_as_str_agree() {
        let id = TrackId::new("4uLU6hMCjMI75M1A2tKUQC");
        assert_eq!(id.to_string(), "4uLU6hMCjMI75M1A2tKUQC");
        assert_eq!(id.as_str(), "4uLU6hMCjMI75M1A2tKUQC");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = ArtistId::from("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
        let back: ArtistId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(back, id);
    }
}
