//! Groups and workspaces

use async_graphql::{Context, InputObject, Object, Result, ID};

use crate::errors::{ServiceResult, ServiceResultExt};
use crate::gid::{to_gid, ModelType};
use crate::models::{Group, Workspace};
use crate::pagination::{Connection, PaginationInput};
use crate::resolvers::run::RunNode;
use crate::resolvers::{catalog, checked, locate, registry, settle, window, Locator};
use crate::services::{
    self, GetGroupsInput, GetRunsInput, GetWorkspacesInput, ServiceCatalog,
};
use crate::sorting::{GroupSort, RunSort, WorkspaceSort};
use crate::types::ResourceMetadata;

#[derive(Debug, Clone)]
pub struct GroupNode(pub Group);

#[Object(name = "Group")]
impl GroupNode {
    async fn id(&self) -> ID {
        to_gid(ModelType::Group, &self.0.id)
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

    async fn full_path(&self) -> &str {
        &self.0.full_path
    }

    async fn created_by(&self) -> &str {
        &self.0.created_by
    }

    /// Parent group, `null` for top-level groups
    async fn parent(&self, ctx: &Context<'_>) -> Result<Option<GroupNode>> {
        let Some(parent_id) = &self.0.parent_id else {
            return Ok(None);
        };
        registry(ctx)?
            .load::<Group>(ModelType::Group, parent_id)
            .await
            .map(|group| group.map(GroupNode))
            .into_gql()
    }

    async fn workspaces(
        &self,
        ctx: &Context<'_>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
        sort: Option<WorkspaceSort>,
    ) -> Result<Connection<WorkspaceNode>> {
        let sort = sort.unwrap_or_default();
        let pagination = window(ctx, sort, PaginationInput::new(first, last, after, before))?;
        let page = catalog(ctx)?
            .workspaces
            .get_workspaces(GetWorkspacesInput {
                group_path: Some(self.0.full_path.clone()),
                sort,
                pagination,
                search: None,
            })
            .await
            .into_gql()?;
        checked(Connection::build(page, sort, WorkspaceNode))
    }
}

#[derive(Debug, Clone)]
pub struct WorkspaceNode(pub Workspace);

#[Object(name = "Workspace")]
impl WorkspaceNode {
    async fn id(&self) -> ID {
        to_gid(ModelType::Workspace, &self.0.id)
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

    async fn full_path(&self) -> &str {
        &self.0.full_path
    }

    async fn max_job_duration(&self) -> i32 {
        self.0.max_job_duration
    }

    async fn locked(&self) -> bool {
        self.0.locked
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

    async fn runs(
        &self,
        ctx: &Context<'_>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
        sort: Option<RunSort>,
    ) -> Result<Connection<RunNode>> {
        let sort = sort.unwrap_or_default();
        let pagination = window(ctx, sort, PaginationInput::new(first, last, after, before))?;
        let page = catalog(ctx)?
            .runs
            .get_runs(GetRunsInput {
                workspace_id: Some(self.0.id.clone()),
                sort,
                pagination,
            })
            .await
            .into_gql()?;
        checked(Connection::build(page, sort, RunNode::from))
    }
}

/// Local ID of a group named by ID or full path
pub(crate) async fn group_id(
    services: &ServiceCatalog,
    id: Option<ID>,
    path: Option<String>,
) -> ServiceResult<String> {
    match locate(ModelType::Group, id, path)? {
        Locator::Id(id) => Ok(id),
        Locator::Path(path) => Ok(services.groups.get_group_by_path(&path).await?.id),
    }
}

/// Local ID of a workspace named by ID or full path
pub(crate) async fn workspace_id(
    services: &ServiceCatalog,
    id: Option<ID>,
    path: Option<String>,
) -> ServiceResult<String> {
    match locate(ModelType::Workspace, id, path)? {
        Locator::Id(id) => Ok(id),
        Locator::Path(path) => Ok(services.workspaces.get_workspace_by_path(&path).await?.id),
    }
}

#[derive(Default)]
pub struct NamespaceQuery;

#[Object]
impl NamespaceQuery {
    /// Top-level groups, or the direct children of `parentPath`
    async fn groups(
        &self,
        ctx: &Context<'_>,
        parent_path: Option<String>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
        sort: Option<GroupSort>,
        search: Option<String>,
    ) -> Result<Connection<GroupNode>> {
        let sort = sort.unwrap_or_default();
        let pagination = window(ctx, sort, PaginationInput::new(first, last, after, before))?;
        let page = catalog(ctx)?
            .groups
            .get_groups(GetGroupsInput {
                parent_path,
                sort,
                pagination,
                search,
            })
            .await
            .into_gql()?;
        checked(Connection::build(page, sort, GroupNode))
    }

    async fn group(
        &self,
        ctx: &Context<'_>,
        id: Option<ID>,
        full_path: Option<String>,
    ) -> Result<GroupNode> {
        let services = catalog(ctx)?;
        let group = match locate(ModelType::Group, id, full_path).into_gql()? {
            Locator::Id(id) => registry(ctx)?.require::<Group>(ModelType::Group, &id).await,
            Locator::Path(path) => services.groups.get_group_by_path(&path).await,
        };
        group.map(GroupNode).into_gql()
    }

    async fn workspaces(
        &self,
        ctx: &Context<'_>,
        group_path: Option<String>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
        sort: Option<WorkspaceSort>,
        search: Option<String>,
    ) -> Result<Connection<WorkspaceNode>> {
        let sort = sort.unwrap_or_default();
        let pagination = window(ctx, sort, PaginationInput::new(first, last, after, before))?;
        let page = catalog(ctx)?
            .workspaces
            .get_workspaces(GetWorkspacesInput {
                group_path,
                sort,
                pagination,
                search,
            })
            .await
            .into_gql()?;
        checked(Connection::build(page, sort, WorkspaceNode))
    }

    async fn workspace(
        &self,
        ctx: &Context<'_>,
        id: Option<ID>,
        full_path: Option<String>,
    ) -> Result<WorkspaceNode> {
        let services = catalog(ctx)?;
        let workspace = match locate(ModelType::Workspace, id, full_path).into_gql()? {
            Locator::Id(id) => {
                registry(ctx)?
                    .require::<Workspace>(ModelType::Workspace, &id)
                    .await
            }
            Locator::Path(path) => services.workspaces.get_workspace_by_path(&path).await,
        };
        workspace.map(WorkspaceNode).into_gql()
    }
}

#[derive(InputObject)]
#[graphql(name = "UpdateGroupInput")]
pub struct UpdateGroupMutation {
    pub client_mutation_id: Option<String>,
    pub id: Option<ID>,
    pub group_path: Option<String>,
    pub version: Option<i32>,
    pub description: Option<String>,
}

#[derive(InputObject)]
#[graphql(name = "DeleteGroupInput")]
pub struct DeleteGroupMutation {
    pub client_mutation_id: Option<String>,
    pub id: Option<ID>,
    pub group_path: Option<String>,
    pub version: Option<i32>,
    #[graphql(default)]
    pub force: bool,
}

#[derive(InputObject)]
#[graphql(name = "UpdateWorkspaceInput")]
pub struct UpdateWorkspaceMutation {
    pub client_mutation_id: Option<String>,
    pub id: Option<ID>,
    pub workspace_path: Option<String>,
    pub version: Option<i32>,
    pub description: Option<String>,
    pub max_job_duration: Option<i32>,
}

#[derive(InputObject)]
#[graphql(name = "DeleteWorkspaceInput")]
pub struct DeleteWorkspaceMutation {
    pub client_mutation_id: Option<String>,
    pub id: Option<ID>,
    pub workspace_path: Option<String>,
    pub version: Option<i32>,
    #[graphql(default)]
    pub force: bool,
}

mutation_payload!(GroupMutationPayload { group: GroupNode });
mutation_payload!(WorkspaceMutationPayload { workspace: WorkspaceNode });

async fn update_group(services: &ServiceCatalog, input: UpdateGroupMutation) -> ServiceResult<Group> {
    let id = group_id(services, input.id, input.group_path).await?;
    services
        .groups
        .update_group(services::UpdateGroupInput {
            id,
            version: input.version,
            description: input.description,
        })
        .await
}

async fn delete_group(services: &ServiceCatalog, input: DeleteGroupMutation) -> ServiceResult<Group> {
    let id = group_id(services, input.id, input.group_path).await?;
    services
        .groups
        .delete_group(services::DeleteGroupInput {
            id,
            version: input.version,
            force: input.force,
        })
        .await
}

async fn update_workspace(
    services: &ServiceCatalog,
    input: UpdateWorkspaceMutation,
) -> ServiceResult<Workspace> {
    let id = workspace_id(services, input.id, input.workspace_path).await?;
    services
        .workspaces
        .update_workspace(services::UpdateWorkspaceInput {
            id,
            version: input.version,
            description: input.description,
            max_job_duration: input.max_job_duration,
        })
        .await
}

async fn delete_workspace(
    services: &ServiceCatalog,
    input: DeleteWorkspaceMutation,
) -> ServiceResult<Workspace> {
    let id = workspace_id(services, input.id, input.workspace_path).await?;
    services
        .workspaces
        .delete_workspace(services::DeleteWorkspaceInput {
            id,
            version: input.version,
            force: input.force,
        })
        .await
}

#[derive(Default)]
pub struct NamespaceMutation;

#[Object]
impl NamespaceMutation {
    async fn update_group(
        &self,
        ctx: &Context<'_>,
        input: UpdateGroupMutation,
    ) -> Result<GroupMutationPayload> {
        let client_mutation_id = input.client_mutation_id.clone();
        let result = update_group(catalog(ctx)?, input).await;
        settle(result, client_mutation_id, |cmid, group| {
            GroupMutationPayload::ok(cmid, GroupNode(group))
        })
    }

    async fn delete_group(
        &self,
        ctx: &Context<'_>,
        input: DeleteGroupMutation,
    ) -> Result<GroupMutationPayload> {
        let client_mutation_id = input.client_mutation_id.clone();
        let result = delete_group(catalog(ctx)?, input).await;
        settle(result, client_mutation_id, |cmid, group| {
            GroupMutationPayload::ok(cmid, GroupNode(group))
        })
    }

    async fn update_workspace(
        &self,
        ctx: &Context<'_>,
        input: UpdateWorkspaceMutation,
    ) -> Result<WorkspaceMutationPayload> {
        let client_mutation_id = input.client_mutation_id.clone();
        let result = update_workspace(catalog(ctx)?, input).await;
        settle(result, client_mutation_id, |cmid, workspace| {
            WorkspaceMutationPayload::ok(cmid, WorkspaceNode(workspace))
        })
    }

    async fn delete_workspace(
        &self,
        ctx: &Context<'_>,
        input: DeleteWorkspaceMutation,
    ) -> Result<WorkspaceMutationPayload> {
        let client_mutation_id = input.client_mutation_id.clone();
        let result = delete_workspace(catalog(ctx)?, input).await;
        settle(result, client_mutation_id, |cmid, workspace| {
            WorkspaceMutationPayload::ok(cmid, WorkspaceNode(workspace))
        })
    }
}
