//! Teams and roles

use async_graphql::{Context, Object, Result, ID};

use crate::errors::ServiceResultExt;
use crate::gid::{to_gid, ModelType};
use crate::models::{Role, Team};
use crate::pagination::{Connection, PaginationInput};
use crate::resolvers::{catalog, checked, decode_id, registry, window};
use crate::services::{GetRolesInput, GetTeamsInput};
use crate::sorting::{RoleSort, TeamSort};
use crate::types::ResourceMetadata;
use crate::ServiceError;

#[derive(Debug, Clone)]
pub struct TeamNode(pub Team);

#[Object(name = "Team")]
impl TeamNode {
    async fn id(&self) -> ID {
        to_gid(ModelType::Team, &self.0.id)
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

    /// Set when the team is managed by an identity provider
    async fn scim_external_id(&self) -> Option<&str> {
        self.0.scim_external_id.as_deref()
    }
}

#[derive(Debug, Clone)]
pub struct RoleNode(pub Role);

#[Object(name = "Role")]
impl RoleNode {
    async fn id(&self) -> ID {
        to_gid(ModelType::Role, &self.0.id)
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

    async fn permissions(&self) -> &[String] {
        &self.0.permissions
    }

    async fn created_by(&self) -> &str {
        &self.0.created_by
    }
}

#[derive(Default)]
pub struct TeamQuery;

#[Object]
impl TeamQuery {
    async fn teams(
        &self,
        ctx: &Context<'_>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
        sort: Option<TeamSort>,
        search: Option<String>,
    ) -> Result<Connection<TeamNode>> {
        let sort = sort.unwrap_or_default();
        let pagination = window(ctx, sort, PaginationInput::new(first, last, after, before))?;
        let page = catalog(ctx)?
            .teams
            .get_teams(GetTeamsInput {
                sort,
                pagination,
                search,
            })
            .await
            .into_gql()?;
        checked(Connection::build(page, sort, TeamNode))
    }

    async fn roles(
        &self,
        ctx: &Context<'_>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
        sort: Option<RoleSort>,
        search: Option<String>,
    ) -> Result<Connection<RoleNode>> {
        let sort = sort.unwrap_or_default();
        let pagination = window(ctx, sort, PaginationInput::new(first, last, after, before))?;
        let page = catalog(ctx)?
            .roles
            .get_roles(GetRolesInput {
                sort,
                pagination,
                search,
            })
            .await
            .into_gql()?;
        checked(Connection::build(page, sort, RoleNode))
    }

    async fn role(&self, ctx: &Context<'_>, id: Option<ID>, name: Option<String>) -> Result<RoleNode> {
        let role = match (id, name) {
            (Some(id), None) => {
                let id = decode_id(&id, ModelType::Role).into_gql()?;
                registry(ctx)?.require::<Role>(ModelType::Role, &id).await
            }
            (None, Some(name)) => catalog(ctx)?.roles.get_role_by_name(&name).await,
            _ => Err(ServiceError::invalid_input(
                "exactly one of the role ID or name must be specified",
            )),
        };
        role.map(RoleNode).into_gql()
    }
}
