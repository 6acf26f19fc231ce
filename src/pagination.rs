//! Relay-style cursor pagination

use async_graphql::{InputObject, OutputType, SimpleObject};

use crate::config::PaginationConfig;
use crate::cursor::{Cursor, Paginated, SortKey};
use crate::resolvers::activity::ActivityEventNode;
use crate::resolvers::namespace::{GroupNode, WorkspaceNode};
use crate::resolvers::registry::{TerraformModuleNode, TerraformModuleVersionNode, TerraformProviderNode};
use crate::resolvers::run::RunNode;
use crate::resolvers::team::{RoleNode, TeamNode};
use crate::resolvers::user::{ServiceAccountNode, UserNode};
use crate::resolvers::vcs::VcsProviderNode;
use crate::GraphQLError;

/// Page information
#[derive(SimpleObject, Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

/// Edge in a connection
#[derive(SimpleObject, Debug, Clone)]
#[graphql(concrete(name = "UserEdge", params(UserNode)))]
#[graphql(concrete(name = "ServiceAccountEdge", params(ServiceAccountNode)))]
#[graphql(concrete(name = "GroupEdge", params(GroupNode)))]
#[graphql(concrete(name = "WorkspaceEdge", params(WorkspaceNode)))]
#[graphql(concrete(name = "TeamEdge", params(TeamNode)))]
#[graphql(concrete(name = "RoleEdge", params(RoleNode)))]
#[graphql(concrete(name = "RunEdge", params(RunNode)))]
#[graphql(concrete(name = "TerraformModuleEdge", params(TerraformModuleNode)))]
#[graphql(concrete(name = "TerraformModuleVersionEdge", params(TerraformModuleVersionNode)))]
#[graphql(concrete(name = "TerraformProviderEdge", params(TerraformProviderNode)))]
#[graphql(concrete(name = "VcsProviderEdge", params(VcsProviderNode)))]
#[graphql(concrete(name = "ActivityEventEdge", params(ActivityEventNode)))]
pub struct Edge<T: OutputType> {
    pub cursor: String,
    pub node: T,
}

/// Connection (paginated result)
#[derive(SimpleObject, Debug, Clone)]
#[graphql(concrete(name = "UserConnection", params(UserNode)))]
#[graphql(concrete(name = "ServiceAccountConnection", params(ServiceAccountNode)))]
#[graphql(concrete(name = "GroupConnection", params(GroupNode)))]
#[graphql(concrete(name = "WorkspaceConnection", params(WorkspaceNode)))]
#[graphql(concrete(name = "TeamConnection", params(TeamNode)))]
#[graphql(concrete(name = "RoleConnection", params(RoleNode)))]
#[graphql(concrete(name = "RunConnection", params(RunNode)))]
#[graphql(concrete(name = "TerraformModuleConnection", params(TerraformModuleNode)))]
#[graphql(concrete(name = "TerraformModuleVersionConnection", params(TerraformModuleVersionNode)))]
#[graphql(concrete(name = "TerraformProviderConnection", params(TerraformProviderNode)))]
#[graphql(concrete(name = "VcsProviderConnection", params(VcsProviderNode)))]
#[graphql(concrete(name = "ActivityEventConnection", params(ActivityEventNode)))]
pub struct Connection<T: OutputType>
where
    Edge<T>: OutputType,
{
    pub edges: Vec<Edge<T>>,
    pub page_info: PageInfo,
    /// Size of the full filtered result set, independent of the page window
    pub total_count: i32,
}

/// One window of a service list call
#[derive(Debug, Clone, PartialEq)]
pub struct Page<M> {
    pub items: Vec<M>,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub total_count: i32,
}

impl<T: OutputType> Connection<T>
where
    Edge<T>: OutputType,
{
    /// Build a connection from a service page
    ///
    /// Each entity is zipped with the cursor produced by `cursor`. Page flags
    /// are taken from the backend as-is since it may look ahead by one row.
    pub fn from_page<M, C, N>(page: Page<M>, cursor: C, mut node: N) -> crate::Result<Self>
    where
        C: Fn(&M) -> crate::Result<String>,
        N: FnMut(M) -> T,
    {
        let edges = page
            .items
            .into_iter()
            .map(|item| {
                let cursor = cursor(&item)?;
                Ok(Edge {
                    cursor,
                    node: node(item),
                })
            })
            .collect::<crate::Result<Vec<_>>>()?;

        let start_cursor = edges.first().map(|e| e.cursor.clone());
        let end_cursor = edges.last().map(|e| e.cursor.clone());

        Ok(Self {
            edges,
            page_info: PageInfo {
                has_next_page: page.has_next_page,
                has_previous_page: page.has_previous_page,
                start_cursor,
                end_cursor,
            },
            total_count: page.total_count,
        })
    }

    /// Build a connection whose cursors follow the active sort order
    pub fn build<M, S, N>(page: Page<M>, sort: S, node: N) -> crate::Result<Self>
    where
        S: SortKey,
        M: Paginated<S>,
        N: FnMut(M) -> T,
    {
        Self::from_page(page, |item| Cursor::for_entity(item, sort).encode(), node)
    }

    /// Create empty connection
    pub fn empty() -> Self {
        Self {
            edges: Vec::new(),
            page_info: PageInfo::default(),
            total_count: 0,
        }
    }
}

/// Pagination input for GraphQL queries
///
/// Follows the Relay Cursor Connections Specification:
/// <https://relay.dev/graphql/connections.htm>
#[derive(InputObject, Debug, Clone, Default)]
pub struct PaginationInput {
    /// Number of items to return (forward pagination)
    pub first: Option<i32>,

    /// Cursor to start from (forward pagination)
    pub after: Option<String>,

    /// Number of items to return (backward pagination)
    pub last: Option<i32>,

    /// Cursor to start from (backward pagination)
    pub before: Option<String>,
}

/// Pagination window handed to the service layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationOptions {
    pub first: Option<i32>,
    pub last: Option<i32>,
    pub after: Option<Cursor>,
    pub before: Option<Cursor>,
}

impl PaginationInput {
    pub fn new(
        first: Option<i32>,
        last: Option<i32>,
        after: Option<String>,
        before: Option<String>,
    ) -> Self {
        Self {
            first,
            after,
            last,
            before,
        }
    }

    /// Validate pagination input
    pub fn validate(&self, config: &PaginationConfig) -> crate::Result<()> {
        if self.first.is_some() && self.last.is_some() {
            return Err(GraphQLError::PaginationError(
                "Cannot specify both 'first' and 'last'".to_string(),
            ));
        }

        if self.after.is_some() && self.before.is_some() {
            return Err(GraphQLError::PaginationError(
                "Cannot specify both 'after' and 'before'".to_string(),
            ));
        }

        if self.first.is_some() && self.before.is_some() {
            return Err(GraphQLError::PaginationError(
                "'before' can only be used with 'last'".to_string(),
            ));
        }

        if self.last.is_some() && self.after.is_some() {
            return Err(GraphQLError::PaginationError(
                "'after' can only be used with 'first'".to_string(),
            ));
        }

        for (name, value) in [("first", self.first), ("last", self.last)] {
            if let Some(value) = value {
                if value < 0 {
                    return Err(GraphQLError::PaginationError(format!(
                        "'{}' must be non-negative",
                        name
                    )));
                }
                if value > config.max_page_size {
                    return Err(GraphQLError::PaginationError(format!(
                        "'{}' cannot exceed {}",
                        name, config.max_page_size
                    )));
                }
            }
        }

        Ok(())
    }

    /// Translate into service options for the active sort order
    pub fn into_options<S: SortKey>(
        self,
        sort: S,
        config: &PaginationConfig,
    ) -> crate::Result<PaginationOptions> {
        self.validate(config)?;

        let decode = |raw: Option<String>| -> crate::Result<Option<Cursor>> {
            raw.map(|raw| {
                let cursor = Cursor::decode(&raw)?;
                cursor.check_sort(sort)?;
                Ok(cursor)
            })
            .transpose()
        };

        let after = decode(self.after)?;
        let before = decode(self.before)?;

        let (first, last) = match (self.first, self.last) {
            (None, None) if before.is_some() => (None, Some(config.default_page_size)),
            (None, None) => (Some(config.default_page_size), None),
            window => window,
        };

        Ok(PaginationOptions {
            first,
            last,
            after,
            before,
        })
    }
}

impl PaginationOptions {
    /// Upper bound on the number of items in the window
    pub fn limit(&self) -> Option<i32> {
        self.first.or(self.last)
    }
}
