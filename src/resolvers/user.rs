//! Users and service accounts

use async_graphql::{Context, Object, Result, ID};

use crate::errors::ServiceResultExt;
use crate::gid::{to_gid, ModelType};
use crate::models::{Group, ServiceAccount, User};
use crate::pagination::{Connection, PaginationInput};
use crate::resolvers::namespace::GroupNode;
use crate::resolvers::{catalog, checked, registry, window};
use crate::services::{GetServiceAccountsInput, GetUsersInput};
use crate::sorting::{ServiceAccountSort, UserSort};
use crate::types::ResourceMetadata;

#[derive(Debug, Clone)]
pub struct UserNode(pub User);

#[Object(name = "User")]
impl UserNode {
    async fn id(&self) -> ID {
        to_gid(ModelType::User, &self.0.id)
    }

    async fn metadata(&self) -> ResourceMetadata {
        (&self.0.metadata).into()
    }

    async fn username(&self) -> &str {
        &self.0.username
    }

    async fn email(&self) -> &str {
        &self.0.email
    }

    async fn admin(&self) -> bool {
        self.0.admin
    }

    async fn active(&self) -> bool {
        self.0.active
    }
}

#[derive(Debug, Clone)]
pub struct ServiceAccountNode(pub ServiceAccount);

#[Object(name = "ServiceAccount")]
impl ServiceAccountNode {
    async fn id(&self) -> ID {
        to_gid(ModelType::ServiceAccount, &self.0.id)
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
pub struct UserQuery;

#[Object]
impl UserQuery {
    async fn users(
        &self,
        ctx: &Context<'_>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
        sort: Option<UserSort>,
        search: Option<String>,
    ) -> Result<Connection<UserNode>> {
        let sort = sort.unwrap_or_default();
        let pagination = window(ctx, sort, PaginationInput::new(first, last, after, before))?;
        let page = catalog(ctx)?
            .users
            .get_users(GetUsersInput {
                sort,
                pagination,
                search,
            })
            .await
            .into_gql()?;
        checked(Connection::build(page, sort, UserNode))
    }

    async fn service_accounts(
        &self,
        ctx: &Context<'_>,
        namespace_path: String,
        #[graphql(default)] include_inherited: bool,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
        sort: Option<ServiceAccountSort>,
        search: Option<String>,
    ) -> Result<Connection<ServiceAccountNode>> {
        let sort = sort.unwrap_or_default();
        let pagination = window(ctx, sort, PaginationInput::new(first, last, after, before))?;
        let page = catalog(ctx)?
            .service_accounts
            .get_service_accounts(GetServiceAccountsInput {
                namespace_path,
                include_inherited,
                sort,
                pagination,
                search,
            })
            .await
            .into_gql()?;
        checked(Connection::build(page, sort, ServiceAccountNode))
    }
}
