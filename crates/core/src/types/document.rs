//! Schema-less documents.
//!
//! A document is an ordered mapping from field names to JSON values, stored
//! exactly as the caller submitted it. The store adds one field, [`ID_FIELD`],
//! when the document is read back.

use serde_json::{Map, Value};

use super::id::DocumentId;

/// Field carrying the store-assigned identity.
pub const ID_FIELD: &str = "_id";

/// An untyped document: field name to dynamically typed value.
///
/// Field order is preserved (the workspace enables `serde_json/preserve_order`).
pub type Document = Map<String, Value>;

/// Build the stored view of `body`: the identity first, followed by the
/// caller's fields in their original order.
///
/// A caller-supplied `_id` is dropped; identity belongs to the store.
///
/// ```
/// use contest_hub_core::{DocumentId, with_identity};
/// use serde_json::json;
///
/// let id = DocumentId::generate();
/// let body = json!({"title": "Spring Fest"}).as_object().cloned().unwrap();
/// let doc = with_identity(id, body);
///
/// assert_eq!(doc["_id"], json!(id.to_string()));
/// assert_eq!(doc["title"], json!("Spring Fest"));
/// ```
#[must_use]
pub fn with_identity(id: DocumentId, body: Document) -> Document {
    let mut doc = Document::with_capacity(body.len() + 1);
    doc.insert(ID_FIELD.to_owned(), Value::String(id.to_string()));
    doc.extend(body.into_iter().filter(|(key, _)| key != ID_FIELD));
    doc
}
