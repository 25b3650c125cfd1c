//! The named document collections.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown collection name.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown collection: {0}")]
pub struct UnknownCollection(pub String);

/// A document collection in the contest database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// Registered users.
    Users,
    /// Contests.
    Contests,
    /// Shopping-cart items.
    Carts,
}

impl Collection {
    /// All collections, in declaration order.
    pub const ALL: [Self; 3] = [Self::Users, Self::Contests, Self::Carts];

    /// The collection name as stored.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Contests => "contests",
            Self::Carts => "carts",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = UnknownCollection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCollection(s.to_owned()))
    }
}
