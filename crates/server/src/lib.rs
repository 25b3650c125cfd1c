//! Contest Hub server library.
//!
//! Everything the `contest-hub-server` binary runs lives here so it can be
//! exercised in tests without a network listener:
//!
//! - [`store`] - document store client (`PostgreSQL` or in-memory)
//! - [`gateway`] - declarative collection routes and their executors
//! - [`session`] - session token signing and cookies
//! - [`routes`] - the assembled router and middleware stack

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod gateway;
pub mod middleware;
pub mod payload;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;
