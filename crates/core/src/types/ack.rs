//! Store acknowledgements returned verbatim to callers.

use serde::{Deserialize, Serialize};

use super::id::DocumentId;

/// Acknowledgement of a single-document insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResult {
    /// Whether the store acknowledged the write.
    pub acknowledged: bool,
    /// Identity the store assigned to the new document.
    pub inserted_id: DocumentId,
}

impl InsertOneResult {
    /// An acknowledged insert of `inserted_id`.
    #[must_use]
    pub const fn acknowledged(inserted_id: DocumentId) -> Self {
        Self {
            acknowledged: true,
            inserted_id,
        }
    }
}

/// Acknowledgement of a single-document delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    /// Whether the store acknowledged the write.
    pub acknowledged: bool,
    /// Number of documents removed (0 or 1).
    pub deleted_count: u64,
}

impl DeleteResult {
    /// An acknowledged delete that removed `deleted_count` documents.
    #[must_use]
    pub const fn acknowledged(deleted_count: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count,
        }
    }
}
