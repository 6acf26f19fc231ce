//! GraphQL resolvers, one module per area of the API
//!
//! Root queries talk to the service catalog directly. Nested fields that
//! point at another entity go through the request's [`LoaderRegistry`] so a
//! page of N parents costs one batch call rather than N lookups.

use async_graphql::{Context, ErrorExtensions, ID};

use crate::config::ResolverConfig;
use crate::cursor::SortKey;
use crate::dataloaders::LoaderRegistry;
use crate::errors::{ServiceError, ServiceResult, ServiceResultExt};
use crate::gid::{GlobalId, ModelType};
use crate::handler::LoaderFactory;
use crate::pagination::{PaginationInput, PaginationOptions};
use crate::problems::{problem_payload, MutationPayload};
use crate::services::ServiceCatalog;

/// Declare a mutation payload carrying one optional result object
macro_rules! mutation_payload {
    ($(#[$meta:meta])* $name:ident { $field:ident: $node:ty }) => {
        $(#[$meta])*
        #[derive(async_graphql::SimpleObject)]
        pub struct $name {
            pub client_mutation_id: Option<String>,
            pub $field: Option<$node>,
            pub problems: Vec<crate::problems::Problem>,
        }

        impl crate::problems::MutationPayload for $name {
            fn from_problems(
                client_mutation_id: Option<String>,
                problems: Vec<crate::problems::Problem>,
            ) -> Self {
                Self {
                    client_mutation_id,
                    $field: None,
                    problems,
                }
            }
        }

        impl $name {
            pub(crate) fn ok(client_mutation_id: Option<String>, $field: $node) -> Self {
                Self {
                    client_mutation_id,
                    $field: Some($field),
                    problems: Vec::new(),
                }
            }
        }
    };
}

pub mod activity;
pub mod loaders;
pub mod membership;
pub mod namespace;
pub mod node;
pub mod registry;
pub mod run;
pub mod team;
pub mod user;
pub mod vcs;

pub(crate) fn catalog<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a ServiceCatalog> {
    ctx.data::<ServiceCatalog>()
        .map_err(|_| ServiceError::internal("service catalog missing from schema data").extend())
}

pub(crate) fn registry<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a LoaderRegistry> {
    ctx.data::<LoaderRegistry>().map_err(|_| {
        tracing::error!("request executed without a loader registry");
        ServiceError::internal("loader registry missing from request data").extend()
    })
}

pub(crate) fn loader_factory<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a LoaderFactory> {
    ctx.data::<LoaderFactory>()
        .map_err(|_| ServiceError::internal("loader factory missing from schema data").extend())
}

pub(crate) fn config<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a ResolverConfig> {
    ctx.data::<ResolverConfig>()
        .map_err(|_| ServiceError::internal("resolver config missing from schema data").extend())
}

/// Lift a local decoding result to a GraphQL result with its error code
pub(crate) fn checked<T>(result: crate::Result<T>) -> async_graphql::Result<T> {
    result.map_err(ServiceError::from).into_gql()
}

/// Validate connection arguments against the active sort order
pub(crate) fn window<S: SortKey>(
    ctx: &Context<'_>,
    sort: S,
    input: PaginationInput,
) -> async_graphql::Result<PaginationOptions> {
    checked(input.into_options(sort, &config(ctx)?.pagination))
}

/// How a caller identified a namespaced resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Locator {
    Id(String),
    Path(String),
}

/// Accept exactly one of a global ID or a resource path
pub(crate) fn locate(
    kind: ModelType,
    id: Option<ID>,
    path: Option<String>,
) -> ServiceResult<Locator> {
    match (id, path) {
        (Some(id), None) => Ok(Locator::Id(
            GlobalId::decode_as(&id, kind).map_err(|e| ServiceError::from(e).on_field("id"))?,
        )),
        (None, Some(path)) => Ok(Locator::Path(path)),
        (Some(_), Some(_)) => Err(ServiceError::invalid_input(format!(
            "only one of the {} ID or path may be specified",
            kind
        ))
        .on_field("id")),
        (None, None) => Err(ServiceError::invalid_input(format!(
            "either the {} ID or path must be specified",
            kind
        ))
        .on_field("id")),
    }
}

pub(crate) fn decode_id(id: &ID, kind: ModelType) -> ServiceResult<String> {
    Ok(GlobalId::decode_as(id, kind)?)
}

/// Resolve a mutation outcome into its payload
pub(crate) fn settle<T, P: MutationPayload>(
    result: ServiceResult<T>,
    client_mutation_id: Option<String>,
    ok: impl FnOnce(Option<String>, T) -> P,
) -> async_graphql::Result<P> {
    match result {
        Ok(value) => Ok(ok(client_mutation_id, value)),
        Err(err) => problem_payload(err, client_mutation_id),
    }
}
