//! Schema assembly

use async_graphql::{MergedObject, Schema};

use crate::config::ResolverConfig;
use crate::handler::LoaderFactory;
use crate::resolvers::activity::ActivityQuery;
use crate::resolvers::membership::{MembershipMutation, MembershipQuery};
use crate::resolvers::namespace::{NamespaceMutation, NamespaceQuery};
use crate::resolvers::node::NodeQuery;
use crate::resolvers::registry::{RegistryMutation, RegistryQuery};
use crate::resolvers::run::{RunMutation, RunQuery, RunSubscription};
use crate::resolvers::team::TeamQuery;
use crate::resolvers::user::UserQuery;
use crate::resolvers::vcs::{VcsMutation, VcsQuery};
use crate::services::ServiceCatalog;

#[derive(MergedObject, Default)]
pub struct QueryRoot(
    NodeQuery,
    UserQuery,
    NamespaceQuery,
    MembershipQuery,
    TeamQuery,
    RunQuery,
    RegistryQuery,
    VcsQuery,
    ActivityQuery,
);

#[derive(MergedObject, Default)]
pub struct MutationRoot(
    NamespaceMutation,
    MembershipMutation,
    RunMutation,
    RegistryMutation,
    VcsMutation,
);

pub type ApiSchema = Schema<QueryRoot, MutationRoot, RunSubscription>;

/// Build the schema shared by every request
///
/// The catalog and config are schema-wide. Loader registries are not: each
/// request must carry its own, see [`crate::LoaderFactory`]. The schema keeps
/// a factory of its own so subscriptions can start a fresh registry for every
/// event they emit.
pub fn build_schema(catalog: ServiceCatalog, config: ResolverConfig) -> ApiSchema {
    let factory = LoaderFactory::new(catalog.clone(), config.loaders);
    Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        RunSubscription,
    )
    .data(catalog)
    .data(config)
    .data(factory)
    .finish()
}
