//! Service collaborators consumed by the resolvers
//!
//! Implementations live outside this crate. Every service exposes a
//! paginated list call, a lookup by ID and a batch lookup by IDs; the batch
//! lookups back the request-scoped loaders.

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use std::sync::Arc;

use crate::errors::ServiceResult;
use crate::models::{
    ActivityEvent, ActivityEventAction, ActivityEventTargetType, Group, NamespaceMembership,
    Role, Run, RunEvent, ServiceAccount, Team, TerraformModule, TerraformModuleVersion,
    TerraformProvider, User, VcsProvider, Workspace,
};
use crate::pagination::{Page, PaginationOptions};
use crate::sorting::{
    ActivityEventSort, GroupSort, RoleSort, RunSort, ServiceAccountSort, TeamSort,
    TerraformModuleSort, TerraformModuleVersionSort, TerraformProviderSort, UserSort,
    VcsProviderSort, WorkspaceSort,
};

#[derive(Debug, Clone, Default)]
pub struct GetUsersInput {
    pub sort: UserSort,
    pub pagination: PaginationOptions,
    pub search: Option<String>,
}

#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_users(&self, input: GetUsersInput) -> ServiceResult<Page<User>>;
    async fn get_user_by_id(&self, id: &str) -> ServiceResult<User>;
    async fn get_users_by_ids(&self, ids: &[String]) -> ServiceResult<Vec<User>>;
}

#[derive(Debug, Clone, Default)]
pub struct GetServiceAccountsInput {
    pub namespace_path: String,
    pub include_inherited: bool,
    pub sort: ServiceAccountSort,
    pub pagination: PaginationOptions,
    pub search: Option<String>,
}

#[async_trait]
pub trait ServiceAccountService: Send + Sync {
    async fn get_service_accounts(
        &self,
        input: GetServiceAccountsInput,
    ) -> ServiceResult<Page<ServiceAccount>>;
    async fn get_service_account_by_id(&self, id: &str) -> ServiceResult<ServiceAccount>;
    async fn get_service_accounts_by_ids(&self, ids: &[String]) -> ServiceResult<Vec<ServiceAccount>>;
}

#[derive(Debug, Clone, Default)]
pub struct GetGroupsInput {
    /// Restrict to direct children of this group; top-level groups when `None`
    pub parent_path: Option<String>,
    pub sort: GroupSort,
    pub pagination: PaginationOptions,
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateGroupInput {
    pub id: String,
    pub version: Option<i32>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteGroupInput {
    pub id: String,
    pub version: Option<i32>,
    pub force: bool,
}

#[async_trait]
pub trait GroupService: Send + Sync {
    async fn get_groups(&self, input: GetGroupsInput) -> ServiceResult<Page<Group>>;
    async fn get_group_by_id(&self, id: &str) -> ServiceResult<Group>;
    async fn get_group_by_path(&self, path: &str) -> ServiceResult<Group>;
    async fn get_groups_by_ids(&self, ids: &[String]) -> ServiceResult<Vec<Group>>;
    async fn update_group(&self, input: UpdateGroupInput) -> ServiceResult<Group>;
    async fn delete_group(&self, input: DeleteGroupInput) -> ServiceResult<Group>;
}

#[derive(Debug, Clone, Default)]
pub struct GetWorkspacesInput {
    pub group_path: Option<String>,
    pub sort: WorkspaceSort,
    pub pagination: PaginationOptions,
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateWorkspaceInput {
    pub id: String,
    pub version: Option<i32>,
    pub description: Option<String>,
    pub max_job_duration: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteWorkspaceInput {
    pub id: String,
    pub version: Option<i32>,
    pub force: bool,
}

#[async_trait]
pub trait WorkspaceService: Send + Sync {
    async fn get_workspaces(&self, input: GetWorkspacesInput) -> ServiceResult<Page<Workspace>>;
    async fn get_workspace_by_id(&self, id: &str) -> ServiceResult<Workspace>;
    async fn get_workspace_by_path(&self, path: &str) -> ServiceResult<Workspace>;
    async fn get_workspaces_by_ids(&self, ids: &[String]) -> ServiceResult<Vec<Workspace>>;
    async fn update_workspace(&self, input: UpdateWorkspaceInput) -> ServiceResult<Workspace>;
    async fn delete_workspace(&self, input: DeleteWorkspaceInput) -> ServiceResult<Workspace>;
}

/// Member of a namespace membership; exactly one is set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberRef {
    User(String),
    ServiceAccount(String),
    Team(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateNamespaceMembershipInput {
    pub namespace_path: String,
    pub member: MemberRef,
    pub role_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateNamespaceMembershipInput {
    pub id: String,
    pub version: Option<i32>,
    pub role_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteNamespaceMembershipInput {
    pub id: String,
    pub version: Option<i32>,
}

#[async_trait]
pub trait NamespaceMembershipService: Send + Sync {
    /// Memberships of a namespace, including those inherited from parents
    async fn get_namespace_memberships(
        &self,
        namespace_path: &str,
    ) -> ServiceResult<Vec<NamespaceMembership>>;
    async fn get_namespace_membership_by_id(&self, id: &str) -> ServiceResult<NamespaceMembership>;
    async fn get_namespace_memberships_by_ids(
        &self,
        ids: &[String],
    ) -> ServiceResult<Vec<NamespaceMembership>>;
    async fn create_namespace_membership(
        &self,
        input: CreateNamespaceMembershipInput,
    ) -> ServiceResult<NamespaceMembership>;
    async fn update_namespace_membership(
        &self,
        input: UpdateNamespaceMembershipInput,
    ) -> ServiceResult<NamespaceMembership>;
    async fn delete_namespace_membership(
        &self,
        input: DeleteNamespaceMembershipInput,
    ) -> ServiceResult<NamespaceMembership>;
}

#[derive(Debug, Clone, Default)]
pub struct GetTeamsInput {
    pub sort: TeamSort,
    pub pagination: PaginationOptions,
    pub search: Option<String>,
}

#[async_trait]
pub trait TeamService: Send + Sync {
    async fn get_teams(&self, input: GetTeamsInput) -> ServiceResult<Page<Team>>;
    async fn get_team_by_id(&self, id: &str) -> ServiceResult<Team>;
    async fn get_teams_by_ids(&self, ids: &[String]) -> ServiceResult<Vec<Team>>;
}

#[derive(Debug, Clone, Default)]
pub struct GetRolesInput {
    pub sort: RoleSort,
    pub pagination: PaginationOptions,
    pub search: Option<String>,
}

#[async_trait]
pub trait RoleService: Send + Sync {
    async fn get_roles(&self, input: GetRolesInput) -> ServiceResult<Page<Role>>;
    async fn get_role_by_id(&self, id: &str) -> ServiceResult<Role>;
    async fn get_role_by_name(&self, name: &str) -> ServiceResult<Role>;
    async fn get_roles_by_ids(&self, ids: &[String]) -> ServiceResult<Vec<Role>>;
}

#[derive(Debug, Clone, Default)]
pub struct GetRunsInput {
    pub workspace_id: Option<String>,
    pub sort: RunSort,
    pub pagination: PaginationOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateRunInput {
    pub workspace_id: String,
    pub is_destroy: bool,
    pub comment: Option<String>,
    pub module_source: Option<String>,
    pub module_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CancelRunInput {
    pub run_id: String,
    pub version: Option<i32>,
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunEventsInput {
    pub workspace_id: String,
    pub run_id: Option<String>,
}

#[async_trait]
pub trait RunService: Send + Sync {
    async fn get_runs(&self, input: GetRunsInput) -> ServiceResult<Page<Run>>;
    async fn get_run_by_id(&self, id: &str) -> ServiceResult<Run>;
    async fn get_runs_by_ids(&self, ids: &[String]) -> ServiceResult<Vec<Run>>;
    async fn create_run(&self, input: CreateRunInput) -> ServiceResult<Run>;
    async fn cancel_run(&self, input: CancelRunInput) -> ServiceResult<Run>;
    /// Stream of run changes; ends when the service shuts the feed down
    async fn subscribe_to_run_events(
        &self,
        input: RunEventsInput,
    ) -> ServiceResult<BoxStream<'static, ServiceResult<RunEvent>>>;
}

#[derive(Debug, Clone, Default)]
pub struct GetModulesInput {
    pub group_path: Option<String>,
    pub sort: TerraformModuleSort,
    pub pagination: PaginationOptions,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct GetModuleVersionsInput {
    pub module_id: String,
    pub latest: Option<bool>,
    pub sort: TerraformModuleVersionSort,
    pub pagination: PaginationOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteModuleInput {
    pub id: String,
    pub version: Option<i32>,
}

#[async_trait]
pub trait ModuleRegistryService: Send + Sync {
    async fn get_modules(&self, input: GetModulesInput) -> ServiceResult<Page<TerraformModule>>;
    async fn get_module_by_id(&self, id: &str) -> ServiceResult<TerraformModule>;
    async fn get_modules_by_ids(&self, ids: &[String]) -> ServiceResult<Vec<TerraformModule>>;
    async fn get_module_versions(
        &self,
        input: GetModuleVersionsInput,
    ) -> ServiceResult<Page<TerraformModuleVersion>>;
    async fn get_module_version_by_id(&self, id: &str) -> ServiceResult<TerraformModuleVersion>;
    async fn get_module_versions_by_ids(
        &self,
        ids: &[String],
    ) -> ServiceResult<Vec<TerraformModuleVersion>>;
    async fn delete_module(&self, input: DeleteModuleInput) -> ServiceResult<TerraformModule>;
}

#[derive(Debug, Clone, Default)]
pub struct GetProvidersInput {
    pub group_path: Option<String>,
    pub sort: TerraformProviderSort,
    pub pagination: PaginationOptions,
    pub search: Option<String>,
}

#[async_trait]
pub trait ProviderRegistryService: Send + Sync {
    async fn get_providers(&self, input: GetProvidersInput) -> ServiceResult<Page<TerraformProvider>>;
    async fn get_provider_by_id(&self, id: &str) -> ServiceResult<TerraformProvider>;
    async fn get_providers_by_ids(&self, ids: &[String]) -> ServiceResult<Vec<TerraformProvider>>;
}

#[derive(Debug, Clone, Default)]
pub struct GetVcsProvidersInput {
    pub namespace_path: String,
    pub include_inherited: bool,
    pub sort: VcsProviderSort,
    pub pagination: PaginationOptions,
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteVcsProviderInput {
    pub id: String,
    pub version: Option<i32>,
    pub force: bool,
}

#[async_trait]
pub trait VcsService: Send + Sync {
    async fn get_vcs_providers(&self, input: GetVcsProvidersInput) -> ServiceResult<Page<VcsProvider>>;
    async fn get_vcs_provider_by_id(&self, id: &str) -> ServiceResult<VcsProvider>;
    async fn get_vcs_providers_by_ids(&self, ids: &[String]) -> ServiceResult<Vec<VcsProvider>>;
    async fn delete_vcs_provider(&self, input: DeleteVcsProviderInput) -> ServiceResult<VcsProvider>;
}

#[derive(Debug, Clone, Default)]
pub struct GetActivityEventsInput {
    pub namespace_path: Option<String>,
    pub user_id: Option<String>,
    pub service_account_id: Option<String>,
    pub actions: Vec<ActivityEventAction>,
    pub target_types: Vec<ActivityEventTargetType>,
    pub sort: ActivityEventSort,
    pub pagination: PaginationOptions,
}

#[async_trait]
pub trait ActivityEventService: Send + Sync {
    async fn get_activity_events(
        &self,
        input: GetActivityEventsInput,
    ) -> ServiceResult<Page<ActivityEvent>>;
}

/// Every service the resolvers call, shared by all requests
#[derive(Clone)]
pub struct ServiceCatalog {
    pub users: Arc<dyn UserService>,
    pub service_accounts: Arc<dyn ServiceAccountService>,
    pub groups: Arc<dyn GroupService>,
    pub workspaces: Arc<dyn WorkspaceService>,
    pub memberships: Arc<dyn NamespaceMembershipService>,
    pub teams: Arc<dyn TeamService>,
    pub roles: Arc<dyn RoleService>,
    pub runs: Arc<dyn RunService>,
    pub modules: Arc<dyn ModuleRegistryService>,
    pub providers: Arc<dyn ProviderRegistryService>,
    pub vcs: Arc<dyn VcsService>,
    pub activity_events: Arc<dyn ActivityEventService>,
}
