//! Store-assigned document identity.
//!
//! Identities are opaque to the service: they are minted by the document store
//! on insert and only ever parsed back out of a request path to be forwarded as
//! an equality filter.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error returned when a path segment is not a well-formed [`DocumentId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed document id {input:?}: {reason}")]
pub struct DocumentIdError {
    /// The rejected input.
    pub input: String,
    /// Why the input was rejected.
    pub reason: String,
}

/// Identity of a stored document.
///
/// ## Examples
///
/// ```
/// use contest_hub_core::DocumentId;
///
/// let id = DocumentId::parse("3f2b8c1e-9a4d-4e2f-8b7a-1c2d3e4f5a6b").unwrap();
/// assert_eq!(id.to_string(), "3f2b8c1e-9a4d-4e2f-8b7a-1c2d3e4f5a6b");
///
/// assert!(DocumentId::parse("not-an-id").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Wrap an existing UUID.
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Mint a fresh random identity. Only stores call this.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identity from its textual form.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentIdError`] if the input is not a UUID.
    pub fn parse(s: &str) -> Result<Self, DocumentIdError> {
        Uuid::parse_str(s).map(Self).map_err(|e| DocumentIdError {
            input: s.to_owned(),
            reason: e.to_string(),
        })
    }

    /// Get the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for DocumentId {
    type Err = DocumentIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Uuid> for DocumentId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<DocumentId> for Uuid {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}

#[cfg(feature = "postgres")]
impl ::sqlx::Type<::sqlx::Postgres> for DocumentId {
    fn type_info() -> ::sqlx::postgres::PgTypeInfo {
        <Uuid as ::sqlx::Type<::sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
        <Uuid as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for DocumentId {
    fn decode(
        value: ::sqlx::postgres::PgValueRef<'r>,
    ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
        let id = <Uuid as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
        Ok(Self(id))
    }
}

#[cfg(feature = "postgres")]
impl ::sqlx::Encode<'_, ::sqlx::Postgres> for DocumentId {
    fn encode_by_ref(
        &self,
        buf: &mut ::sqlx::postgres::PgArgumentBuffer,
    ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
        <Uuid as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
