//! Document store client.
//!
//! The service never holds documents beyond a single request; everything lives
//! in an external store reached through [`DocumentStore`]. Two backends exist:
//!
//! - [`PgDocumentStore`] - `PostgreSQL` with one `JSONB` row per document
//! - [`MemoryDocumentStore`] - process-local, for development and tests
//!
//! [`AnyStore`] picks one at startup. The handle is created once and shared
//! read-only by every request for the life of the process.

pub mod memory;
pub mod postgres;

use std::future::Future;

use contest_hub_core::{Collection, DeleteResult, Document, DocumentId, InsertOneResult};
use thiserror::Error;

use crate::config::StoreConfig;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// Errors raised by document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Applying the schema migration failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A document could not be serialized for storage.
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// The store cannot be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Operations every document store backend provides.
///
/// Identity is owned by the store: `insert_one` assigns it, and every document
/// returned by a read carries it as its `_id` field.
pub trait DocumentStore: Send + Sync {
    /// Every document in `collection`, in insertion order.
    fn find_all(
        &self,
        collection: Collection,
    ) -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send;

    /// The document in `collection` whose identity is `id`.
    fn find_one(
        &self,
        collection: Collection,
        id: DocumentId,
    ) -> impl Future<Output = Result<Option<Document>, StoreError>> + Send;

    /// Documents in `collection` whose `field` is the string `value`.
    fn find_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send;

    /// Insert `document` verbatim as a new document in `collection`.
    fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> impl Future<Output = Result<InsertOneResult, StoreError>> + Send;

    /// Remove the document in `collection` whose identity is `id`, if any.
    fn delete_one(
        &self,
        collection: Collection,
        id: DocumentId,
    ) -> impl Future<Output = Result<DeleteResult, StoreError>> + Send;

    /// Round-trip to the store without touching any collection.
    fn ping(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// The store backend selected by configuration.
///
/// `DocumentStore` uses return-position `impl Trait`, so it is not object-safe;
/// this enum dispatches instead.
pub enum AnyStore {
    Postgres(PgDocumentStore),
    Memory(MemoryDocumentStore),
}

impl AnyStore {
    /// Connect to the configured backend and confirm it answers.
    ///
    /// Called once at startup. There is no retry: a store that is down at
    /// boot fails the process.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the connection or the initial ping fails.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let store = match config {
            StoreConfig::Postgres(database) => {
                Self::Postgres(PgDocumentStore::connect(database).await?)
            }
            StoreConfig::Memory => {
                tracing::warn!("Using in-memory document store; data is lost on restart");
                Self::Memory(MemoryDocumentStore::new())
            }
        };

        store.ping().await?;
        tracing::info!(backend = store.backend_name(), "Document store ping succeeded");
        Ok(store)
    }

    /// Short backend name for logs.
    #[must_use]
    pub const fn backend_name(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory(_) => "memory",
        }
    }
}

impl From<MemoryDocumentStore> for AnyStore {
    fn from(store: MemoryDocumentStore) -> Self {
        Self::Memory(store)
    }
}

impl From<PgDocumentStore> for AnyStore {
    fn from(store: PgDocumentStore) -> Self {
        Self::Postgres(store)
    }
}

impl DocumentStore for AnyStore {
    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        match self {
            Self::Postgres(s) => s.find_all(collection).await,
            Self::Memory(s) => s.find_all(collection).await,
        }
    }

    async fn find_one(
        &self,
        collection: Collection,
        id: DocumentId,
    ) -> Result<Option<Document>, StoreError> {
        match self {
            Self::Postgres(s) => s.find_one(collection, id).await,
            Self::Memory(s) => s.find_one(collection, id).await,
        }
    }

    async fn find_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, StoreError> {
        match self {
            Self::Postgres(s) => s.find_by_field(collection, field, value).await,
            Self::Memory(s) => s.find_by_field(collection, field, value).await,
        }
    }

    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<InsertOneResult, StoreError> {
        match self {
            Self::Postgres(s) => s.insert_one(collection, document).await,
            Self::Memory(s) => s.insert_one(collection, document).await,
        }
    }

    async fn delete_one(
        &self,
        collection: Collection,
        id: DocumentId,
    ) -> Result<DeleteResult, StoreError> {
        match self {
            Self::Postgres(s) => s.delete_one(collection, id).await,
            Self::Memory(s) => s.delete_one(collection, id).await,
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        match self {
            Self::Postgres(s) => s.ping().await,
            Self::Memory(s) => s.ping().await,
        }
    }
}
