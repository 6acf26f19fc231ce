//! VCS providers

use async_graphql::{Context, InputObject, Object, Result, ID};

use crate::errors::{ServiceResult, ServiceResultExt};
use crate::gid::{to_gid, ModelType};
use crate::models::{Group, VcsProvider, VcsProviderType};
use crate::pagination::{Connection, PaginationInput};
use crate::resolvers::namespace::GroupNode;
use crate::resolvers::{catalog, checked, decode_id, registry, settle, window};
use crate::services::{DeleteVcsProviderInput, GetVcsProvidersInput, ServiceCatalog};
use crate::sorting::VcsProviderSort;
use crate::types::ResourceMetadata;

#[derive(Debug, Clone)]
pub struct VcsProviderNode(pub VcsProvider);

#[Object(name = "VcsProvider")]
impl VcsProviderNode {
    async fn id(&self) -> ID {
        to_gid(ModelType::VcsProvider, &self.0.id)
    }

    async fn metadata(&self) -> ResourceMetadata {
        (&self.0.metadata).into()
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn description(&self) -> &str {
        &self.0.description
    }

    async fn resource_path(&self) -> &str {
        &self.0.resource_path
    }

    #[graphql(name = "type")]
    async fn provider_type(&self) -> VcsProviderType {
        self.0.provider_type
    }

    async fn url(&self) -> &str {
        &self.0.url
    }

    async fn auto_create_webhooks(&self) -> bool {
        self.0.auto_create_webhooks
    }

    async fn created_by(&self) -> &str {
        &self.0.created_by
    }

    async fn group(&self, ctx: &Context<'_>) -> Result<GroupNode> {
        registry(ctx)?
            .require::<Group>(ModelType::Group, &self.0.group_id)
            .await
            .map(GroupNode)
            .into_gql()
    }
}

#[derive(Default)]
pub struct VcsQuery;

#[Object]
impl VcsQuery {
    async fn vcs_providers(
        &self,
        ctx: &Context<'_>,
        namespace_path: String,
        #[graphql(default)] include_inherited: bool,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
        sort: Option<VcsProviderSort>,
        search: Option<String>,
    ) -> Result<Connection<VcsProviderNode>> {
        let sort = sort.unwrap_or_default();
        let pagination = window(ctx, sort, PaginationInput::new(first, last, after, before))?;
        let page = catalog(ctx)?
            .vcs
            .get_vcs_providers(GetVcsProvidersInput {
                namespace_path,
                include_inherited,
                sort,
                pagination,
                search,
            })
            .await
            .into_gql()?;
        checked(Connection::build(page, sort, VcsProviderNode))
    }
}

#[derive(InputObject)]
#[graphql(name = "DeleteVcsProviderInput")]
pub struct DeleteVcsProviderMutation {
    pub client_mutation_id: Option<String>,
    pub id: ID,
    pub version: Option<i32>,
    #[graphql(default)]
    pub force: bool,
}

mutation_payload!(VcsProviderMutationPayload {
    vcs_provider: VcsProviderNode
});

async fn delete_vcs_provider(
    services: &ServiceCatalog,
    input: DeleteVcsProviderMutation,
) -> ServiceResult<VcsProvider> {
    let id = decode_id(&input.id, ModelType::VcsProvider)?;
    services
        .vcs
        .delete_vcs_provider(DeleteVcsProviderInput {
            id,
            version: input.version,
            force: input.force,
        })
        .await
}

#[derive(Default)]
pub struct VcsMutation;

#[Object]
impl VcsMutation {
    async fn delete_vcs_provider(
        &self,
        ctx: &Context<'_>,
        input: DeleteVcsProviderMutation,
    ) -> Result<VcsProviderMutationPayload> {
        let client_mutation_id = input.client_mutation_id.clone();
        let result = delete_vcs_provider(catalog(ctx)?, input).await;
        settle(result, client_mutation_id, |cmid, provider| {
            VcsProviderMutationPayload::ok(cmid, VcsProviderNode(provider))
        })
    }
}
