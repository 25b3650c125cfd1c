//! `PostgreSQL` document store.
//!
//! # Table: `documents`
//!
//! | Column | Type | Notes |
//! |---|---|---|
//! | `seq` | `BIGINT` identity | natural (insertion) order |
//! | `id` | `UUID` | store-assigned identity, `gen_random_uuid()` |
//! | `collection` | `TEXT` | `users`, `contests` or `carts` |
//! | `body` | `JSON` | the document exactly as submitted, minus any `_id` |
//! | `created_at` | `TIMESTAMPTZ` | |
//!
//! Bodies are written as text and stored as `JSON`, which keeps the caller's
//! field order. Containment filters cast to `JSONB` (`body::jsonb @> ...`),
//! backed by an expression index.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p contest-hub-cli -- migrate
//! ```

use std::str::FromStr;
use std::time::Duration;

use contest_hub_core::{
    Collection, DeleteResult, Document, DocumentId, ID_FIELD, InsertOneResult, with_identity,
};
use secrecy::ExposeSecret;
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::instrument;

use super::{DocumentStore, StoreError};
use crate::config::DatabaseConfig;

/// Schema migrations for the document table.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(FromRow)]
struct DocumentRow {
    id: DocumentId,
    body: Json<Document>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        with_identity(row.id, row.body.0)
    }
}

/// Document store backed by a `PostgreSQL` connection pool.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the connection pool.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the connection cannot be established.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let options = match config {
            DatabaseConfig::Url(url) => PgConnectOptions::from_str(url.expose_secret())?,
            DatabaseConfig::Parts {
                host,
                port,
                name,
                user,
                password,
            } => PgConnectOptions::new()
                .host(host)
                .port(*port)
                .database(name)
                .username(user)
                .password(password.expose_secret()),
        };

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?;

        tracing::info!("Database pool created");
        Ok(Self { pool })
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Migration` if a migration fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }
}

impl DocumentStore for PgDocumentStore {
    #[instrument(skip(self))]
    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r"
            SELECT id, body
            FROM documents
            WHERE collection = $1
            ORDER BY seq
            ",
        )
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Document::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_one(
        &self,
        collection: Collection,
        id: DocumentId,
    ) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r"
            SELECT id, body
            FROM documents
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Document::from))
    }

    #[instrument(skip(self))]
    async fn find_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r"
            SELECT id, body
            FROM documents
            WHERE collection = $1 AND body::jsonb @> jsonb_build_object($2::text, $3::text)
            ORDER BY seq
            ",
        )
        .bind(collection.as_str())
        .bind(field)
        .bind(value)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Document::from).collect())
    }

    #[instrument(skip(self, document))]
    async fn insert_one(
        &self,
        collection: Collection,
        mut document: Document,
    ) -> Result<InsertOneResult, StoreError> {
        document.shift_remove(ID_FIELD);
        // Sent as text: a JSONB parameter would be normalised before the cast.
        let body = serde_json::to_string(&document)?;

        let id = sqlx::query_scalar::<_, DocumentId>(
            r"
            INSERT INTO documents (collection, body)
            VALUES ($1, $2::json)
            RETURNING id
            ",
        )
        .bind(collection.as_str())
        .bind(body)
        .fetch_one(&self.pool)
        .await?;

        Ok(InsertOneResult::acknowledged(id))
    }

    #[instrument(skip(self))]
    async fn delete_one(
        &self,
        collection: Collection,
        id: DocumentId,
    ) -> Result<DeleteResult, StoreError> {
        let result = sqlx::query(
            r"
            DELETE FROM documents
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(collection.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(DeleteResult::acknowledged(result.rows_affected()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
