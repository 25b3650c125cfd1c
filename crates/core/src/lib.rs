//! Contest Hub Core - Shared document types.
//!
//! This crate provides the types shared by the Contest Hub components:
//! - `server` - HTTP service exposing the users, contests and carts collections
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP. Records are schema-less [`Document`]s; the only structure the
//! system relies on is the store-assigned [`DocumentId`] carried in the
//! [`ID_FIELD`] of every document read back from a store.
//!
//! # Modules
//!
//! - [`types`] - Documents, identities, collections and store acknowledgements

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
