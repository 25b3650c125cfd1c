//! Resource gateway.
//!
//! Every collection endpoint is a [`Binding`]: an HTTP verb and path mapped to
//! one generic [`Operation`] on one [`Collection`]. Bindings are declared in an
//! ordered [`RouteTable`] and turned into an axum router by
//! [`RouteTable::into_router`].
//!
//! # Shadowing
//!
//! Two bindings may share a verb and path. The table resolves them
//! last-registration-wins: the later binding is routed, the earlier one is
//! reported as shadowed and never runs. axum itself panics on overlapping
//! method routes, so resolution happens here, explicitly, before any route is
//! registered.

pub mod bindings;
pub mod handlers;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::{MethodFilter, MethodRouter},
};
use contest_hub_core::Collection;

use crate::error::AppError;
use crate::state::AppState;

pub use bindings::contest_routes;

/// HTTP verbs a binding can be declared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    const fn filter(self) -> MethodFilter {
        match self {
            Self::Get => MethodFilter::GET,
            Self::Post => MethodFilter::POST,
            Self::Put => MethodFilter::PUT,
            Self::Patch => MethodFilter::PATCH,
            Self::Delete => MethodFilter::DELETE,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The generic operations a binding can perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Every document in the collection.
    List,
    /// Insert the JSON request body as a new document.
    Create,
    /// The document whose identity is the `{id}` path segment.
    GetById,
    /// Remove the document whose identity is the `{id}` path segment.
    DeleteById,
    /// Documents whose `field` equals the query parameter of the same name.
    FilterByField { field: String },
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => f.write_str("list"),
            Self::Create => f.write_str("create"),
            Self::GetById => f.write_str("get-by-id"),
            Self::DeleteById => f.write_str("delete-by-id"),
            Self::FilterByField { field } => write!(f, "filter-by-{field}"),
        }
    }
}

/// What a binding does with a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPolicy {
    /// Log the fault and never answer; the request stays open until the
    /// client gives up.
    Suppress,
    /// Answer with the generic `500` fault response.
    Propagate,
}

impl FaultPolicy {
    /// Turn an operation outcome into the response this policy calls for.
    ///
    /// Under [`FaultPolicy::Suppress`] a failed outcome never resolves.
    pub async fn settle<T: IntoResponse>(
        self,
        binding: &Binding,
        outcome: Result<T, AppError>,
    ) -> Response {
        match (outcome, self) {
            (Ok(body), _) => body.into_response(),
            (Err(err), Self::Propagate) => err.into_response(),
            (Err(err), Self::Suppress) => {
                tracing::error!(binding = %binding, error = %err, "Fault suppressed, no response sent");
                std::future::pending().await
            }
        }
    }
}

/// One declared route: verb + path to an operation on a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub verb: Verb,
    pub path: String,
    pub collection: Collection,
    pub operation: Operation,
    pub policy: FaultPolicy,
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {}.{}",
            self.verb, self.path, self.collection, self.operation
        )
    }
}

/// Bindings split into the ones that get routed and the ones that lost to a
/// later declaration.
#[derive(Debug, Default)]
pub struct Resolution<'a> {
    /// Routed bindings, in order of first declaration of their verb + path.
    pub active: Vec<&'a Binding>,
    /// Bindings replaced by a later binding with the same verb + path.
    pub shadowed: Vec<&'a Binding>,
}

/// Ordered list of bindings.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    bindings: Vec<Binding>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a binding after every binding declared so far.
    #[must_use]
    pub fn bind(
        mut self,
        verb: Verb,
        path: impl Into<String>,
        collection: Collection,
        operation: Operation,
        policy: FaultPolicy,
    ) -> Self {
        self.bindings.push(Binding {
            verb,
            path: path.into(),
            collection,
            operation,
            policy,
        });
        self
    }

    /// All bindings, in declaration order.
    #[must_use]
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Resolve duplicate verb + path pairs, last registration wins.
    #[must_use]
    pub fn resolve(&self) -> Resolution<'_> {
        let mut resolution = Resolution::default();
        let mut slots: HashMap<(Verb, &str), usize> = HashMap::new();

        for binding in &self.bindings {
            let key = (binding.verb, binding.path.as_str());
            if let Some(&slot) = slots.get(&key) {
                if let Some(active) = resolution.active.get_mut(slot) {
                    resolution.shadowed.push(std::mem::replace(active, binding));
                }
            } else {
                slots.insert(key, resolution.active.len());
                resolution.active.push(binding);
            }
        }

        resolution
    }

    /// The binding that actually serves `verb path`, if any.
    #[must_use]
    pub fn route_for(&self, verb: Verb, path: &str) -> Option<&Binding> {
        self.bindings
            .iter()
            .rev()
            .find(|b| b.verb == verb && b.path == path)
    }

    /// Build the router for the active bindings.
    ///
    /// Shadowed bindings are logged at warn level and left out.
    #[must_use]
    pub fn into_router(self) -> Router<AppState> {
        let resolution = self.resolve();

        for binding in &resolution.shadowed {
            tracing::warn!(binding = %binding, "Binding shadowed by a later declaration; unreachable");
        }

        let mut paths: Vec<(&str, Vec<Arc<Binding>>)> = Vec::new();
        for binding in resolution.active {
            let path = binding.path.as_str();
            let binding = Arc::new(binding.clone());
            match paths.iter_mut().find(|(p, _)| *p == path) {
                Some((_, group)) => group.push(binding),
                None => paths.push((path, vec![binding])),
            }
        }

        paths
            .into_iter()
            .fold(Router::new(), |router, (path, group)| {
                router.route(path, group.into_iter().fold(MethodRouter::new(), attach))
            })
    }
}

/// Add `binding`'s handler to `methods` under the binding's verb.
fn attach(methods: MethodRouter<AppState>, binding: Arc<Binding>) -> MethodRouter<AppState> {
    let filter = binding.verb.filter();
    let operation = binding.operation.clone();

    match operation {
        Operation::List => methods.on(filter, move |State(state): State<AppState>| {
            let binding = Arc::clone(&binding);
            async move { handlers::list(&state, &binding).await }
        }),
        Operation::Create => methods.on(
            filter,
            move |State(state): State<AppState>, headers: HeaderMap, body: Bytes| {
                let binding = Arc::clone(&binding);
                async move { handlers::create(&state, &binding, &headers, &body).await }
            },
        ),
        Operation::GetById => methods.on(
            filter,
            move |State(state): State<AppState>, Path(id): Path<String>| {
                let binding = Arc::clone(&binding);
                async move { handlers::get_by_id(&state, &binding, &id).await }
            },
        ),
        Operation::DeleteById => methods.on(
            filter,
            move |State(state): State<AppState>, Path(id): Path<String>| {
                let binding = Arc::clone(&binding);
                async move { handlers::delete_by_id(&state, &binding, &id).await }
            },
        ),
        Operation::FilterByField { field } => methods.on(
            filter,
            move |State(state): State<AppState>,
                  Query(params): Query<HashMap<String, String>>| {
                let binding = Arc::clone(&binding);
                let field = field.clone();
                async move { handlers::filter_by_field(&state, &binding, &field, &params).await }
            },
        ),
    }
}
