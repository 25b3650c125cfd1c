//! Seed a collection from a JSON file.
//!
//! The file holds either a single JSON object or an array of objects. Every
//! object is inserted as-is; the store assigns each one a fresh `_id`, so
//! any `_id` in the file is ignored.

use std::path::Path;

use serde_json::Value;
use thiserror::Error;
use tracing::info;

use contest_hub_core::{Collection, Document};
use contest_hub_server::config::DatabaseConfig;
use contest_hub_server::store::{DocumentStore, PgDocumentStore};

/// Problems with the seed file itself.
#[derive(Debug, Error)]
pub enum SeedFileError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("entry {0} is not a JSON object")]
    NotAnObject(usize),
    #[error("expected an object or an array of objects")]
    UnexpectedShape,
}

/// Parse seed file contents into documents.
///
/// # Errors
///
/// Returns `SeedFileError` if the content is not JSON, or not an object or
/// array of objects.
pub fn parse_documents(content: &str) -> Result<Vec<Document>, SeedFileError> {
    match serde_json::from_str::<Value>(content)? {
        Value::Object(doc) => Ok(vec![doc]),
        Value::Array(entries) => entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| match entry {
                Value::Object(doc) => Ok(doc),
                _ => Err(SeedFileError::NotAnObject(index)),
            })
            .collect(),
        _ => Err(SeedFileError::UnexpectedShape),
    }
}

/// Insert every document in `path` into `collection`.
///
/// The whole file is validated before connecting to the database.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, configuration is
/// missing, or an insert fails.
pub async fn from_file(
    collection: Collection,
    path: &Path,
) -> Result<usize, Box<dyn std::error::Error>> {
    info!(path = %path.display(), "Loading seed documents");
    let content = tokio::fs::read_to_string(path).await?;
    let documents = parse_documents(&content)?;
    info!(count = documents.len(), "Parsed seed file");

    let config = DatabaseConfig::from_env()?;
    let store = PgDocumentStore::connect(&config).await?;

    let mut inserted = 0;
    for doc in documents {
        let ack = store.insert_one(collection, doc).await?;
        info!(id = %ack.inserted_id, "Inserted");
        inserted += 1;
    }

    Ok(inserted)
}
