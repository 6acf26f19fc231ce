//! # pleme-graphql-resolvers
//!
//! GraphQL resolver layer for Pleme platform services.
//!
//! Resolvers translate GraphQL queries, mutations and subscriptions into calls
//! against the service catalog and marshal the results back into connections,
//! mutation payloads and problem objects.
//!
//! ## Features
//!
//! - **Cursor Pagination** - Relay-style connections with versioned, sort-aware cursors
//! - **DataLoader** - Request-scoped batch loading for N+1 prevention
//! - **Polymorphic Unions** - Initiator, Target, Member and activity payload unions
//! - **Problems** - Closed mapping from domain errors to user-facing problems
//! - **Global IDs** - Opaque, type-tagged node identifiers
//!
//! ## Usage
//!
//! ```rust,no_run
//! use axum::{routing::post, Extension, Router};
//! use pleme_graphql_resolvers::{build_schema, graphql_handler, LoaderFactory, ResolverConfig, ServiceCatalog};
//!
//! # fn example(catalog: ServiceCatalog) {
//! let config = ResolverConfig::default();
//! let schema = build_schema(catalog.clone(), config.clone());
//! let app: Router = Router::new()
//!     .route("/graphql", post(graphql_handler))
//!     .layer(Extension(schema))
//!     .layer(Extension(LoaderFactory::new(catalog, config.loaders)));
//! # }
//! ```

pub mod config;
pub mod cursor;
pub mod dataloaders;
pub mod errors;
pub mod gid;
pub mod handler;
pub mod models;
pub mod pagination;
pub mod payloads;
pub mod problems;
pub mod resolvers;
pub mod schema;
pub mod services;
pub mod sorting;
pub mod subscriptions;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::ResolverConfig;
pub use cursor::{Cursor, CursorCodec, Paginated, SortDirection, SortKey};
pub use dataloaders::{BatchLoader, DataLoader, LoaderRegistry};
pub use errors::{ErrorCode, ServiceError, ServiceResult};
pub use gid::{GlobalId, ModelType};
pub use handler::{graphql_handler, LoaderFactory};
pub use pagination::{Connection, Edge, Page, PageInfo, PaginationInput, PaginationOptions};
pub use problems::{build_problem, Problem, ProblemType};
pub use schema::{build_schema, ApiSchema};
pub use services::ServiceCatalog;
pub use types::DateTime;

use thiserror::Error;

/// GraphQL errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphQLError {
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    #[error("Pagination error: {0}")]
    PaginationError(String),

    #[error("Invalid ID: {0}")]
    InvalidGlobalId(String),

    #[error("Unsupported combination of action {action} and target type {target_type}")]
    UnsupportedCombination { action: String, target_type: String },

    #[error("Failed to decode {shape}: {reason}")]
    Decode { shape: &'static str, reason: String },
}

/// Result type for GraphQL operations
pub type Result<T> = std::result::Result<T, GraphQLError>;
