//! Namespace memberships

use async_graphql::{Context, InputObject, Object, Result, Union, ID};

use crate::errors::{ServiceError, ServiceResult, ServiceResultExt};
use crate::gid::{to_gid, ModelType};
use crate::models::{NamespaceMembership, Role, ServiceAccount, Team, User};
use crate::resolvers::team::{RoleNode, TeamNode};
use crate::resolvers::user::{ServiceAccountNode, UserNode};
use crate::resolvers::{catalog, decode_id, registry, settle};
use crate::services::{
    CreateNamespaceMembershipInput, DeleteNamespaceMembershipInput, MemberRef, ServiceCatalog,
    UpdateNamespaceMembershipInput,
};
use crate::types::ResourceMetadata;

/// Principal granted a role by a membership
#[derive(Union)]
pub enum Member {
    User(UserNode),
    ServiceAccount(ServiceAccountNode),
    Team(TeamNode),
}

#[derive(Debug, Clone)]
pub struct NamespaceMembershipNode(pub NamespaceMembership);

#[Object(name = "NamespaceMembership")]
impl NamespaceMembershipNode {
    async fn id(&self) -> ID {
        to_gid(ModelType::NamespaceMembership, &self.0.id)
    }

    async fn metadata(&self) -> ResourceMetadata {
        (&self.0.metadata).into()
    }

    async fn namespace_path(&self) -> &str {
        &self.0.namespace_path
    }

    async fn role(&self, ctx: &Context<'_>) -> Result<RoleNode> {
        registry(ctx)?
            .require::<Role>(ModelType::Role, &self.0.role_id)
            .await
            .map(RoleNode)
            .into_gql()
    }

    async fn member(&self, ctx: &Context<'_>) -> Result<Member> {
        let loaders = registry(ctx)?;
        let membership = &self.0;
        let member = match (
            &membership.user_id,
            &membership.service_account_id,
            &membership.team_id,
        ) {
            (Some(id), None, None) => loaders
                .require::<User>(ModelType::User, id)
                .await
                .map(|user| Member::User(UserNode(user))),
            (None, Some(id), None) => loaders
                .require::<ServiceAccount>(ModelType::ServiceAccount, id)
                .await
                .map(|sa| Member::ServiceAccount(ServiceAccountNode(sa))),
            (None, None, Some(id)) => loaders
                .require::<Team>(ModelType::Team, id)
                .await
                .map(|team| Member::Team(TeamNode(team))),
            _ => {
                tracing::error!(membership = %membership.id, "membership must reference exactly one member");
                Err(ServiceError::internal("membership has an invalid member"))
            }
        };
        member.into_gql()
    }
}

#[derive(Default)]
pub struct MembershipQuery;

#[Object]
impl MembershipQuery {
    /// Memberships of a namespace, including inherited ones
    async fn namespace_memberships(
        &self,
        ctx: &Context<'_>,
        namespace_path: String,
    ) -> Result<Vec<NamespaceMembershipNode>> {
        let memberships = catalog(ctx)?
            .memberships
            .get_namespace_memberships(&namespace_path)
            .await
            .into_gql()?;
        Ok(memberships.into_iter().map(NamespaceMembershipNode).collect())
    }
}

#[derive(InputObject)]
#[graphql(name = "CreateNamespaceMembershipInput")]
pub struct CreateMembershipMutation {
    pub client_mutation_id: Option<String>,
    pub namespace_path: String,
    pub user_id: Option<ID>,
    pub service_account_id: Option<ID>,
    pub team_id: Option<ID>,
    /// Role name
    pub role: String,
}

#[derive(InputObject)]
#[graphql(name = "UpdateNamespaceMembershipInput")]
pub struct UpdateMembershipMutation {
    pub client_mutation_id: Option<String>,
    pub id: ID,
    pub version: Option<i32>,
    pub role: String,
}

#[derive(InputObject)]
#[graphql(name = "DeleteNamespaceMembershipInput")]
pub struct DeleteMembershipMutation {
    pub client_mutation_id: Option<String>,
    pub id: ID,
    pub version: Option<i32>,
}

mutation_payload!(NamespaceMembershipMutationPayload {
    membership: NamespaceMembershipNode
});

/// Exactly one member reference is accepted
fn member_ref(
    user_id: Option<ID>,
    service_account_id: Option<ID>,
    team_id: Option<ID>,
) -> ServiceResult<MemberRef> {
    let decode = |id: ID, kind, field: &str| decode_id(&id, kind).map_err(|e| e.on_field(field));
    match (user_id, service_account_id, team_id) {
        (Some(id), None, None) => Ok(MemberRef::User(decode(id, ModelType::User, "userId")?)),
        (None, Some(id), None) => Ok(MemberRef::ServiceAccount(decode(
            id,
            ModelType::ServiceAccount,
            "serviceAccountId",
        )?)),
        (None, None, Some(id)) => Ok(MemberRef::Team(decode(id, ModelType::Team, "teamId")?)),
        _ => Err(ServiceError::invalid_input(
            "exactly one of userId, serviceAccountId or teamId must be specified",
        )),
    }
}

async fn role_by_name(services: &ServiceCatalog, name: &str) -> ServiceResult<Role> {
    services
        .roles
        .get_role_by_name(name)
        .await
        .map_err(|e| e.on_field("role"))
}

async fn create_membership(
    services: &ServiceCatalog,
    input: CreateMembershipMutation,
) -> ServiceResult<NamespaceMembership> {
    let member = member_ref(input.user_id, input.service_account_id, input.team_id)?;
    let role = role_by_name(services, &input.role).await?;
    services
        .memberships
        .create_namespace_membership(CreateNamespaceMembershipInput {
            namespace_path: input.namespace_path,
            member,
            role_id: role.id,
        })
        .await
}

async fn update_membership(
    services: &ServiceCatalog,
    input: UpdateMembershipMutation,
) -> ServiceResult<NamespaceMembership> {
    let id = decode_id(&input.id, ModelType::NamespaceMembership)?;
    let role = role_by_name(services, &input.role).await?;
    services
        .memberships
        .update_namespace_membership(UpdateNamespaceMembershipInput {
            id,
            version: input.version,
            role_id: role.id,
        })
        .await
}

async fn delete_membership(
    services: &ServiceCatalog,
    input: DeleteMembershipMutation,
) -> ServiceResult<NamespaceMembership> {
    let id = decode_id(&input.id, ModelType::NamespaceMembership)?;
    services
        .memberships
        .delete_namespace_membership(DeleteNamespaceMembershipInput {
            id,
            version: input.version,
        })
        .await
}

#[derive(Default)]
pub struct MembershipMutation;

#[Object]
impl MembershipMutation {
    async fn create_namespace_membership(
        &self,
        ctx: &Context<'_>,
        input: CreateMembershipMutation,
    ) -> Result<NamespaceMembershipMutationPayload> {
        let client_mutation_id = input.client_mutation_id.clone();
        let result = create_membership(catalog(ctx)?, input).await;
        settle(result, client_mutation_id, |cmid, membership| {
            NamespaceMembershipMutationPayload::ok(cmid, NamespaceMembershipNode(membership))
        })
    }

    async fn update_namespace_membership(
        &self,
        ctx: &Context<'_>,
        input: UpdateMembershipMutation,
    ) -> Result<NamespaceMembershipMutationPayload> {
        let client_mutation_id = input.client_mutation_id.clone();
        let result = update_membership(catalog(ctx)?, input).await;
        settle(result, client_mutation_id, |cmid, membership| {
            NamespaceMembershipMutationPayload::ok(cmid, NamespaceMembershipNode(membership))
        })
    }

    async fn delete_namespace_membership(
        &self,
        ctx: &Context<'_>,
        input: DeleteMembershipMutation,
    ) -> Result<NamespaceMembershipMutationPayload> {
        let client_mutation_id = input.client_mutation_id.clone();
        let result = delete_membership(catalog(ctx)?, input).await;
        settle(result, client_mutation_id, |cmid, membership| {
            NamespaceMembershipMutationPayload::ok(cmid, NamespaceMembershipNode(membership))
        })
    }
}
