//! The collection endpoints served by the contest service.
//!
//! ```text
//! GET    /users          users.list          suppress
//! POST   /users          users.create        suppress
//! DELETE /users/{id}     users.delete-by-id  propagate
//!
//! GET    /contests       contests.list       suppress
//! POST   /contests       contests.create     suppress
//! GET    /contests/{id}  contests.get-by-id  propagate
//! DELETE /contests/{id}  contests.delete-by-id propagate
//!
//! POST   /carts          carts.create        propagate
//! GET    /carts          carts.filter-by-email (shadowed)
//! GET    /carts          carts.list          propagate
//! DELETE /carts/{id}     carts.delete-by-id  propagate
//! ```

use contest_hub_core::Collection;

use super::{FaultPolicy, Operation, RouteTable, Verb};

/// Field the cart filter binding matches on.
pub const CART_FILTER_FIELD: &str = "email";

/// Build the route table for users, contests and carts.
///
/// `GET /carts` is declared twice. The email filter comes first and is
/// shadowed by the bulk listing declared after it.
#[must_use]
pub fn contest_routes() -> RouteTable {
    use FaultPolicy::{Propagate, Suppress};

    RouteTable::new()
        // Users
        .bind(Verb::Get, "/users", Collection::Users, Operation::List, Suppress)
        .bind(Verb::Post, "/users", Collection::Users, Operation::Create, Suppress)
        .bind(
            Verb::Delete,
            "/users/{id}",
            Collection::Users,
            Operation::DeleteById,
            Propagate,
        )
        // Contests
        .bind(Verb::Get, "/contests", Collection::Contests, Operation::List, Suppress)
        .bind(Verb::Post, "/contests", Collection::Contests, Operation::Create, Suppress)
        .bind(
            Verb::Get,
            "/contests/{id}",
            Collection::Contests,
            Operation::GetById,
            Propagate,
        )
        .bind(
            Verb::Delete,
            "/contests/{id}",
            Collection::Contests,
            Operation::DeleteById,
            Propagate,
        )
        // Carts
        .bind(Verb::Post, "/carts", Collection::Carts, Operation::Create, Propagate)
        .bind(
            Verb::Get,
            "/carts",
            Collection::Carts,
            Operation::FilterByField {
                field: CART_FILTER_FIELD.to_string(),
            },
            Propagate,
        )
        .bind(Verb::Get, "/carts", Collection::Carts, Operation::List, Propagate)
        .bind(
            Verb::Delete,
            "/carts/{id}",
            Collection::Carts,
            Operation::DeleteById,
            Propagate,
        )
}
