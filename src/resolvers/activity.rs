//! Activity events and their polymorphic fields
//!
//! An event points at whoever initiated it and at the resource it touched.
//! Either may have been deleted since the event was recorded, so both
//! resolve to `null` rather than failing the whole page. The payload is
//! stricter: a payload that does not match the event's (action, target
//! type) pair is a data integrity problem and surfaces as an error.

use async_graphql::{Context, ErrorExtensions, Object, Result, Union, ID};

use crate::dataloaders::LoaderRegistry;
use crate::errors::{ServiceError, ServiceResult, ServiceResultExt};
use crate::gid::{to_gid, ModelType};
use crate::models::{
    ActivityEvent, ActivityEventAction, ActivityEventTargetType, Group, NamespaceMembership, Role,
    Run, ServiceAccount, Team, TerraformModule, TerraformModuleVersion, TerraformProvider, User,
    VcsProvider, Workspace,
};
use crate::pagination::{Connection, PaginationInput};
use crate::payloads::{decode_payload, ActivityEventPayload};
use crate::resolvers::membership::NamespaceMembershipNode;
use crate::resolvers::namespace::{GroupNode, WorkspaceNode};
use crate::resolvers::registry::{
    TerraformModuleNode, TerraformModuleVersionNode, TerraformProviderNode,
};
use crate::resolvers::run::RunNode;
use crate::resolvers::team::{RoleNode, TeamNode};
use crate::resolvers::user::{ServiceAccountNode, UserNode};
use crate::resolvers::vcs::VcsProviderNode;
use crate::resolvers::{catalog, checked, decode_id, registry, window};
use crate::services::GetActivityEventsInput;
use crate::sorting::ActivityEventSort;
use crate::types::ResourceMetadata;

#[derive(Union)]
pub enum Initiator {
    User(UserNode),
    ServiceAccount(ServiceAccountNode),
}

#[derive(Union)]
#[graphql(name = "ActivityEventTarget")]
pub enum Target {
    Group(GroupNode),
    Workspace(WorkspaceNode),
    NamespaceMembership(NamespaceMembershipNode),
    Team(TeamNode),
    Role(RoleNode),
    Run(RunNode),
    ServiceAccount(ServiceAccountNode),
    TerraformModule(TerraformModuleNode),
    TerraformModuleVersion(TerraformModuleVersionNode),
    TerraformProvider(TerraformProviderNode),
    VcsProvider(VcsProviderNode),
}

/// Load the target of an event; `None` when it no longer exists
async fn load_target(
    loaders: &LoaderRegistry,
    target_type: ActivityEventTargetType,
    id: &str,
) -> ServiceResult<Option<Target>> {
    use ActivityEventTargetType as T;

    let target = match target_type {
        T::Group => loaders
            .load::<Group>(ModelType::Group, id)
            .await?
            .map(|v| Target::Group(GroupNode(v))),
        T::Workspace => loaders
            .load::<Workspace>(ModelType::Workspace, id)
            .await?
            .map(|v| Target::Workspace(WorkspaceNode(v))),
        T::NamespaceMembership => loaders
            .load::<NamespaceMembership>(ModelType::NamespaceMembership, id)
            .await?
            .map(|v| Target::NamespaceMembership(NamespaceMembershipNode(v))),
        T::Team => loaders
            .load::<Team>(ModelType::Team, id)
            .await?
            .map(|v| Target::Team(TeamNode(v))),
        T::Role => loaders
            .load::<Role>(ModelType::Role, id)
            .await?
            .map(|v| Target::Role(RoleNode(v))),
        T::Run => loaders
            .load::<Run>(ModelType::Run, id)
            .await?
            .map(|v| Target::Run(RunNode::from(v))),
        T::ServiceAccount => loaders
            .load::<ServiceAccount>(ModelType::ServiceAccount, id)
            .await?
            .map(|v| Target::ServiceAccount(ServiceAccountNode(v))),
        T::TerraformModule => loaders
            .load::<TerraformModule>(ModelType::TerraformModule, id)
            .await?
            .map(|v| Target::TerraformModule(TerraformModuleNode(v))),
        T::TerraformModuleVersion => loaders
            .load::<TerraformModuleVersion>(ModelType::TerraformModuleVersion, id)
            .await?
            .map(|v| Target::TerraformModuleVersion(TerraformModuleVersionNode(v))),
        T::TerraformProvider => loaders
            .load::<TerraformProvider>(ModelType::TerraformProvider, id)
            .await?
            .map(|v| Target::TerraformProvider(TerraformProviderNode(v))),
        T::VcsProvider => loaders
            .load::<VcsProvider>(ModelType::VcsProvider, id)
            .await?
            .map(|v| Target::VcsProvider(VcsProviderNode(v))),
    };
    Ok(target)
}

#[derive(Debug, Clone)]
pub struct ActivityEventNode(pub ActivityEvent);

#[Object(name = "ActivityEvent")]
impl ActivityEventNode {
    async fn id(&self) -> ID {
        to_gid(ModelType::ActivityEvent, &self.0.id)
    }

    async fn metadata(&self) -> ResourceMetadata {
        (&self.0.metadata).into()
    }

    async fn namespace_path(&self) -> Option<&str> {
        self.0.namespace_path.as_deref()
    }

    async fn action(&self) -> ActivityEventAction {
        self.0.action
    }

    async fn target_type(&self) -> ActivityEventTargetType {
        self.0.target_type
    }

    async fn target_id(&self) -> ID {
        let kind = match self.0.target_type {
            ActivityEventTargetType::Group => ModelType::Group,
            ActivityEventTargetType::Workspace => ModelType::Workspace,
            ActivityEventTargetType::NamespaceMembership => ModelType::NamespaceMembership,
            ActivityEventTargetType::Team => ModelType::Team,
            ActivityEventTargetType::Role => ModelType::Role,
            ActivityEventTargetType::Run => ModelType::Run,
            ActivityEventTargetType::ServiceAccount => ModelType::ServiceAccount,
            ActivityEventTargetType::TerraformModule => ModelType::TerraformModule,
            ActivityEventTargetType::TerraformModuleVersion => ModelType::TerraformModuleVersion,
            ActivityEventTargetType::TerraformProvider => ModelType::TerraformProvider,
            ActivityEventTargetType::VcsProvider => ModelType::VcsProvider,
        };
        to_gid(kind, &self.0.target_id)
    }

    async fn initiator(&self, ctx: &Context<'_>) -> Result<Option<Initiator>> {
        let loaders = registry(ctx)?;
        let initiator = match (&self.0.user_id, &self.0.service_account_id) {
            (Some(id), _) => loaders
                .load::<User>(ModelType::User, id)
                .await
                .map(|user| user.map(|u| Initiator::User(UserNode(u)))),
            (None, Some(id)) => loaders
                .load::<ServiceAccount>(ModelType::ServiceAccount, id)
                .await
                .map(|sa| sa.map(|s| Initiator::ServiceAccount(ServiceAccountNode(s)))),
            (None, None) => Ok(None),
        };
        initiator.into_gql()
    }

    async fn target(&self, ctx: &Context<'_>) -> Result<Option<Target>> {
        load_target(registry(ctx)?, self.0.target_type, &self.0.target_id)
            .await
            .into_gql()
    }

    async fn payload(&self) -> Result<Option<ActivityEventPayload>> {
        let Some(raw) = &self.0.payload else {
            return Ok(None);
        };
        decode_payload(self.0.action, self.0.target_type, raw)
            .map(Some)
            .map_err(|err| {
                tracing::error!(
                    event = %self.0.id,
                    action = ?self.0.action,
                    target_type = ?self.0.target_type,
                    error = %err,
                    "activity event payload could not be resolved"
                );
                ServiceError::from(err).extend()
            })
    }
}

#[derive(Default)]
pub struct ActivityQuery;

#[Object]
impl ActivityQuery {
    async fn activity_events(
        &self,
        ctx: &Context<'_>,
        namespace_path: Option<String>,
        user_id: Option<ID>,
        service_account_id: Option<ID>,
        actions: Option<Vec<ActivityEventAction>>,
        target_types: Option<Vec<ActivityEventTargetType>>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
        sort: Option<ActivityEventSort>,
    ) -> Result<Connection<ActivityEventNode>> {
        let sort = sort.unwrap_or_default();
        let pagination = window(ctx, sort, PaginationInput::new(first, last, after, before))?;
        let user_id = user_id
            .map(|id| decode_id(&id, ModelType::User))
            .transpose()
            .into_gql()?;
        let service_account_id = service_account_id
            .map(|id| decode_id(&id, ModelType::ServiceAccount))
            .transpose()
            .into_gql()?;

        let page = catalog(ctx)?
            .activity_events
            .get_activity_events(GetActivityEventsInput {
                namespace_path,
                user_id,
                service_account_id,
                actions: actions.unwrap_or_default(),
                target_types: target_types.unwrap_or_default(),
                sort,
                pagination,
            })
            .await
            .into_gql()?;
        checked(Connection::build(page, sort, ActivityEventNode))
    }
}
