//! Lookup of any entity by its global ID

use async_graphql::{Context, Object, Result, Union, ID};

use crate::dataloaders::LoaderRegistry;
use crate::errors::{ServiceResult, ServiceResultExt};
use crate::gid::{GlobalId, ModelType};
use crate::models::{
    Group, NamespaceMembership, Role, Run, ServiceAccount, Team, TerraformModule,
    TerraformModuleVersion, TerraformProvider, User, VcsProvider, Workspace,
};
use crate::resolvers::membership::NamespaceMembershipNode;
use crate::resolvers::namespace::{GroupNode, WorkspaceNode};
use crate::resolvers::registry::{
    TerraformModuleNode, TerraformModuleVersionNode, TerraformProviderNode,
};
use crate::resolvers::run::RunNode;
use crate::resolvers::team::{RoleNode, TeamNode};
use crate::resolvers::user::{ServiceAccountNode, UserNode};
use crate::resolvers::vcs::VcsProviderNode;
use crate::resolvers::{checked, registry};

#[derive(Union)]
pub enum Node {
    User(UserNode),
    ServiceAccount(ServiceAccountNode),
    Group(GroupNode),
    Workspace(WorkspaceNode),
    NamespaceMembership(NamespaceMembershipNode),
    Team(TeamNode),
    Role(RoleNode),
    Run(RunNode),
    TerraformModule(TerraformModuleNode),
    TerraformModuleVersion(TerraformModuleVersionNode),
    TerraformProvider(TerraformProviderNode),
    VcsProvider(VcsProviderNode),
}

async fn load_node(loaders: &LoaderRegistry, gid: GlobalId) -> ServiceResult<Option<Node>> {
    let id = gid.id.as_str();
    let node = match gid.kind {
        ModelType::User => loaders
            .load::<User>(gid.kind, id)
            .await?
            .map(|v| Node::User(UserNode(v))),
        ModelType::ServiceAccount => loaders
            .load::<ServiceAccount>(gid.kind, id)
            .await?
            .map(|v| Node::ServiceAccount(ServiceAccountNode(v))),
        ModelType::Group => loaders
            .load::<Group>(gid.kind, id)
            .await?
            .map(|v| Node::Group(GroupNode(v))),
        ModelType::Workspace => loaders
            .load::<Workspace>(gid.kind, id)
            .await?
            .map(|v| Node::Workspace(WorkspaceNode(v))),
        ModelType::NamespaceMembership => loaders
            .load::<NamespaceMembership>(gid.kind, id)
            .await?
            .map(|v| Node::NamespaceMembership(NamespaceMembershipNode(v))),
        ModelType::Team => loaders
            .load::<Team>(gid.kind, id)
            .await?
            .map(|v| Node::Team(TeamNode(v))),
        ModelType::Role => loaders
            .load::<Role>(gid.kind, id)
            .await?
            .map(|v| Node::Role(RoleNode(v))),
        ModelType::Run => loaders
            .load::<Run>(gid.kind, id)
            .await?
            .map(|v| Node::Run(RunNode::from(v))),
        ModelType::TerraformModule => loaders
            .load::<TerraformModule>(gid.kind, id)
            .await?
            .map(|v| Node::TerraformModule(TerraformModuleNode(v))),
        ModelType::TerraformModuleVersion => loaders
            .load::<TerraformModuleVersion>(gid.kind, id)
            .await?
            .map(|v| Node::TerraformModuleVersion(TerraformModuleVersionNode(v))),
        ModelType::TerraformProvider => loaders
            .load::<TerraformProvider>(gid.kind, id)
            .await?
            .map(|v| Node::TerraformProvider(TerraformProviderNode(v))),
        ModelType::VcsProvider => loaders
            .load::<VcsProvider>(gid.kind, id)
            .await?
            .map(|v| Node::VcsProvider(VcsProviderNode(v))),
        // Activity events are only reachable through their connection.
        ModelType::ActivityEvent => {
            tracing::debug!(id, "node lookup for an activity event");
            None
        }
    };
    Ok(node)
}

#[derive(Default)]
pub struct NodeQuery;

#[Object]
impl NodeQuery {
    /// Fetch any entity by global ID; `null` when it does not exist
    async fn node(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Node>> {
        let gid = checked(GlobalId::decode(&id))?;
        load_node(registry(ctx)?, gid).await.into_gql()
    }
}
