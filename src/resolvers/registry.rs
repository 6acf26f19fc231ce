//! Terraform module and provider registry

use async_graphql::{Context, InputObject, Object, Result, ID};

use crate::errors::{ServiceResult, ServiceResultExt};
use crate::gid::{to_gid, ModelType};
use crate::models::{
    Group, ModuleVersionStatus, TerraformModule, TerraformModuleVersion, TerraformProvider,
};
use crate::pagination::{Connection, PaginationInput};
use crate::resolvers::namespace::GroupNode;
use crate::resolvers::{catalog, checked, decode_id, registry, settle, window};
use crate::services::{
    DeleteModuleInput, GetModuleVersionsInput, GetModulesInput, GetProvidersInput, ServiceCatalog,
};
use crate::sorting::{TerraformModuleSort, TerraformModuleVersionSort, TerraformProviderSort};
use crate::types::ResourceMetadata;

#[derive(Debug, Clone)]
pub struct TerraformModuleNode(pub TerraformModule);

#[Object(name = "TerraformModule")]
impl TerraformModuleNode {
    async fn id(&self) -> ID {
        to_gid(ModelType::TerraformModule, &self.0.id)
    }

    async fn metadata(&self) -> ResourceMetadata {
        (&self.0.metadata).into()
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn system(&self) -> &str {
        &self.0.system
    }

    async fn resource_path(&self) -> &str {
        &self.0.resource_path
    }

    async fn private(&self) -> bool {
        self.0.private
    }

    async fn repository_url(&self) -> &str {
        &self.0.repository_url
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

    async fn versions(
        &self,
        ctx: &Context<'_>,
        latest: Option<bool>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
        sort: Option<TerraformModuleVersionSort>,
    ) -> Result<Connection<TerraformModuleVersionNode>> {
        let sort = sort.unwrap_or_default();
        let pagination = window(ctx, sort, PaginationInput::new(first, last, after, before))?;
        let page = catalog(ctx)?
            .modules
            .get_module_versions(GetModuleVersionsInput {
                module_id: self.0.id.clone(),
                latest,
                sort,
                pagination,
            })
            .await
            .into_gql()?;
        checked(Connection::build(page, sort, TerraformModuleVersionNode))
    }
}

#[derive(Debug, Clone)]
pub struct TerraformModuleVersionNode(pub TerraformModuleVersion);

#[Object(name = "TerraformModuleVersion")]
impl TerraformModuleVersionNode {
    async fn id(&self) -> ID {
        to_gid(ModelType::TerraformModuleVersion, &self.0.id)
    }

    async fn metadata(&self) -> ResourceMetadata {
        (&self.0.metadata).into()
    }

    async fn version(&self) -> &str {
        &self.0.semantic_version
    }

    async fn status(&self) -> ModuleVersionStatus {
        self.0.status
    }

    async fn latest(&self) -> bool {
        self.0.latest
    }

    async fn submodules(&self) -> &[String] {
        &self.0.submodules
    }

    async fn created_by(&self) -> &str {
        &self.0.created_by
    }

    async fn module(&self, ctx: &Context<'_>) -> Result<TerraformModuleNode> {
        registry(ctx)?
            .require::<TerraformModule>(ModelType::TerraformModule, &self.0.module_id)
            .await
            .map(TerraformModuleNode)
            .into_gql()
    }
}

#[derive(Debug, Clone)]
pub struct TerraformProviderNode(pub TerraformProvider);

#[Object(name = "TerraformProvider")]
impl TerraformProviderNode {
    async fn id(&self) -> ID {
        to_gid(ModelType::TerraformProvider, &self.0.id)
    }

    async fn metadata(&self) -> ResourceMetadata {
        (&self.0.metadata).into()
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn resource_path(&self) -> &str {
        &self.0.resource_path
    }

    async fn private(&self) -> bool {
        self.0.private
    }

    async fn repository_url(&self) -> &str {
        &self.0.repository_url
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
pub struct RegistryQuery;

#[Object]
impl RegistryQuery {
    async fn terraform_modules(
        &self,
        ctx: &Context<'_>,
        group_path: Option<String>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
        sort: Option<TerraformModuleSort>,
        search: Option<String>,
    ) -> Result<Connection<TerraformModuleNode>> {
        let sort = sort.unwrap_or_default();
        let pagination = window(ctx, sort, PaginationInput::new(first, last, after, before))?;
        let page = catalog(ctx)?
            .modules
            .get_modules(GetModulesInput {
                group_path,
                sort,
                pagination,
                search,
            })
            .await
            .into_gql()?;
        checked(Connection::build(page, sort, TerraformModuleNode))
    }

    async fn terraform_module(&self, ctx: &Context<'_>, id: ID) -> Result<TerraformModuleNode> {
        let id = decode_id(&id, ModelType::TerraformModule).into_gql()?;
        registry(ctx)?
            .require::<TerraformModule>(ModelType::TerraformModule, &id)
            .await
            .map(TerraformModuleNode)
            .into_gql()
    }

    async fn terraform_providers(
        &self,
        ctx: &Context<'_>,
        group_path: Option<String>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
        sort: Option<TerraformProviderSort>,
        search: Option<String>,
    ) -> Result<Connection<TerraformProviderNode>> {
        let sort = sort.unwrap_or_default();
        let pagination = window(ctx, sort, PaginationInput::new(first, last, after, before))?;
        let page = catalog(ctx)?
            .providers
            .get_providers(GetProvidersInput {
                group_path,
                sort,
                pagination,
                search,
            })
            .await
            .into_gql()?;
        checked(Connection::build(page, sort, TerraformProviderNode))
    }
}

#[derive(InputObject)]
#[graphql(name = "DeleteTerraformModuleInput")]
pub struct DeleteModuleMutation {
    pub client_mutation_id: Option<String>,
    pub id: ID,
    pub version: Option<i32>,
}

mutation_payload!(TerraformModuleMutationPayload {
    module: TerraformModuleNode
});

async fn delete_module(
    services: &ServiceCatalog,
    input: DeleteModuleMutation,
) -> ServiceResult<TerraformModule> {
    let id = decode_id(&input.id, ModelType::TerraformModule)?;
    services
        .modules
        .delete_module(DeleteModuleInput {
            id,
            version: input.version,
        })
        .await
}

#[derive(Default)]
pub struct RegistryMutation;

#[Object]
impl RegistryMutation {
    async fn delete_terraform_module(
        &self,
        ctx: &Context<'_>,
        input: DeleteModuleMutation,
    ) -> Result<TerraformModuleMutationPayload> {
        let client_mutation_id = input.client_mutation_id.clone();
        let result = delete_module(catalog(ctx)?, input).await;
        settle(result, client_mutation_id, |cmid, module| {
            TerraformModuleMutationPayload::ok(cmid, TerraformModuleNode(module))
        })
    }
}
