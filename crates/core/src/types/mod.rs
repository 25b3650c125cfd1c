//! Core types for Contest Hub.

pub mod ack;
pub mod collection;
pub mod document;
pub mod id;

pub use ack::{DeleteResult, InsertOneResult};
pub use collection::{Collection, UnknownCollection};
pub use document::{Document, ID_FIELD, with_identity};
pub use id::{DocumentId, DocumentIdError};
