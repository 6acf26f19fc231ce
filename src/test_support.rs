//! In-memory services and fixtures for tests

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};
use std::sync::{Arc, Mutex};

use crate::config::ResolverConfig;
use crate::cursor::{Cursor, Paginated, SortDirection, SortKey};
use crate::errors::{ServiceError, ServiceResult};
use crate::handler::LoaderFactory;
use crate::models::*;
use crate::pagination::{Page, PaginationOptions};
use crate::schema::{build_schema, ApiSchema};
use crate::services::*;

/// Window `items` the way a storage backend would
pub(crate) fn paginate<M, S>(
    mut items: Vec<M>,
    sort: S,
    options: &PaginationOptions,
) -> ServiceResult<Page<M>>
where
    M: Paginated<S>,
    S: SortKey,
{
    items.sort_by(|a, b| {
        let ordering = (a.sort_value(sort), a.cursor_id()).cmp(&(b.sort_value(sort), b.cursor_id()));
        match sort.direction() {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    let position = |cursor: &Cursor| {
        items
            .iter()
            .position(|item| item.cursor_id() == cursor.id)
            .ok_or_else(|| ServiceError::invalid_input("cursor does not match any item"))
    };

    let total = items.len();
    let mut start = 0;
    let mut end = total;
    if let Some(after) = &options.after {
        start = position(after)? + 1;
    }
    if let Some(before) = &options.before {
        end = position(before)?;
    }
    if let Some(first) = options.first {
        end = end.min(start + first as usize);
    }
    if let Some(last) = options.last {
        start = start.max(end.saturating_sub(last as usize));
    }

    let has_next_page = end < total;
    let has_previous_page = start > 0;
    let window = items.drain(..).skip(start).take(end.saturating_sub(start)).collect();

    Ok(Page {
        items: window,
        has_next_page,
        has_previous_page,
        total_count: total as i32,
    })
}

pub(crate) mod fixtures {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    pub fn id() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn metadata() -> ResourceMetadata {
        let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        ResourceMetadata {
            created_at,
            updated_at: created_at + Duration::minutes(5),
            version: 1,
        }
    }

    pub fn user(username: &str) -> User {
        User {
            id: id(),
            username: username.to_string(),
            email: format!("{}@example.com", username),
            admin: false,
            active: true,
            metadata: metadata(),
        }
    }

    pub fn service_account(name: &str, group: &Group) -> ServiceAccount {
        ServiceAccount {
            id: id(),
            name: name.to_string(),
            description: String::new(),
            group_id: group.id.clone(),
            resource_path: format!("{}/{}", group.full_path, name),
            created_by: "admin".to_string(),
            metadata: metadata(),
        }
    }

    pub fn group(full_path: &str, parent: Option<&Group>) -> Group {
        let name = full_path.rsplit('/').next().unwrap_or(full_path);
        Group {
            id: id(),
            name: name.to_string(),
            description: String::new(),
            full_path: full_path.to_string(),
            parent_id: parent.map(|p| p.id.clone()),
            created_by: "admin".to_string(),
            metadata: metadata(),
        }
    }

    pub fn workspace(name: &str, group: &Group) -> Workspace {
        Workspace {
            id: id(),
            name: name.to_string(),
            description: String::new(),
            full_path: format!("{}/{}", group.full_path, name),
            group_id: group.id.clone(),
            max_job_duration: 720,
            locked: false,
            created_by: "admin".to_string(),
            metadata: metadata(),
        }
    }

    pub fn team(name: &str) -> Team {
        Team {
            id: id(),
            name: name.to_string(),
            description: String::new(),
            scim_external_id: None,
            metadata: metadata(),
        }
    }

    pub fn role(name: &str) -> Role {
        Role {
            id: id(),
            name: name.to_string(),
            description: String::new(),
            permissions: vec!["workspace:view".to_string()],
            created_by: "system".to_string(),
            metadata: metadata(),
        }
    }

    pub fn membership(namespace: &str, role: &Role, user: &User) -> NamespaceMembership {
        NamespaceMembership {
            id: id(),
            namespace_path: namespace.to_string(),
            role_id: role.id.clone(),
            user_id: Some(user.id.clone()),
            service_account_id: None,
            team_id: None,
            metadata: metadata(),
        }
    }

    pub fn run(workspace: &Workspace, minutes: i64) -> Run {
        let mut metadata = metadata();
        metadata.created_at = metadata.created_at + Duration::minutes(minutes);
        metadata.updated_at = metadata.created_at;
        Run {
            id: id(),
            workspace_id: workspace.id.clone(),
            status: RunStatus::Applied,
            is_destroy: false,
            comment: None,
            module_source: None,
            module_version: None,
            force_canceled: false,
            created_by: "admin".to_string(),
            metadata,
        }
    }

    pub fn module(name: &str, group: &Group) -> TerraformModule {
        TerraformModule {
            id: id(),
            name: name.to_string(),
            system: "aws".to_string(),
            group_id: group.id.clone(),
            resource_path: format!("{}/{}/aws", group.full_path, name),
            private: true,
            repository_url: String::new(),
            created_by: "admin".to_string(),
            metadata: metadata(),
        }
    }

    pub fn module_version(module: &TerraformModule, semver: &str, latest: bool) -> TerraformModuleVersion {
        TerraformModuleVersion {
            id: id(),
            module_id: module.id.clone(),
            semantic_version: semver.to_string(),
            status: ModuleVersionStatus::Uploaded,
            latest,
            submodules: Vec::new(),
            created_by: "admin".to_string(),
            metadata: metadata(),
        }
    }

    pub fn provider(name: &str, group: &Group) -> TerraformProvider {
        TerraformProvider {
            id: id(),
            name: name.to_string(),
            group_id: group.id.clone(),
            resource_path: format!("{}/{}", group.full_path, name),
            private: false,
            repository_url: String::new(),
            created_by: "admin".to_string(),
            metadata: metadata(),
        }
    }

    pub fn vcs_provider(name: &str, group: &Group) -> VcsProvider {
        VcsProvider {
            id: id(),
            name: name.to_string(),
            description: String::new(),
            group_id: group.id.clone(),
            resource_path: format!("{}/{}", group.full_path, name),
            provider_type: VcsProviderType::Gitlab,
            url: "https://gitlab.example.com".to_string(),
            auto_create_webhooks: true,
            created_by: "admin".to_string(),
            metadata: metadata(),
        }
    }

    pub fn activity_event(
        action: ActivityEventAction,
        target_type: ActivityEventTargetType,
        target_id: &str,
        payload: Option<&str>,
    ) -> ActivityEvent {
        ActivityEvent {
            id: id(),
            user_id: None,
            service_account_id: None,
            namespace_path: None,
            action,
            target_type,
            target_id: target_id.to_string(),
            payload: payload.map(|p| p.as_bytes().to_vec()),
            metadata: metadata(),
        }
    }
}

#[derive(Default)]
pub(crate) struct Store {
    pub users: Vec<User>,
    pub service_accounts: Vec<ServiceAccount>,
    pub groups: Vec<Group>,
    pub workspaces: Vec<Workspace>,
    pub memberships: Vec<NamespaceMembership>,
    pub teams: Vec<Team>,
    pub roles: Vec<Role>,
    pub runs: Vec<Run>,
    pub modules: Vec<TerraformModule>,
    pub module_versions: Vec<TerraformModuleVersion>,
    pub providers: Vec<TerraformProvider>,
    pub vcs_providers: Vec<VcsProvider>,
    pub activity_events: Vec<ActivityEvent>,
}

/// Every service trait backed by one in-memory store
#[derive(Default)]
pub(crate) struct InMemory {
    pub store: Mutex<Store>,
    calls: Mutex<Vec<String>>,
    failures: Mutex<Vec<(&'static str, ServiceError)>>,
    run_events: Mutex<Vec<ServiceResult<RunEvent>>>,
}

impl InMemory {
    pub fn new(store: Store) -> Arc<Self> {
        Arc::new(Self {
            store: Mutex::new(store),
            ..Self::default()
        })
    }

    pub fn catalog(self: &Arc<Self>) -> ServiceCatalog {
        ServiceCatalog {
            users: self.clone(),
            service_accounts: self.clone(),
            groups: self.clone(),
            workspaces: self.clone(),
            memberships: self.clone(),
            teams: self.clone(),
            roles: self.clone(),
            runs: self.clone(),
            modules: self.clone(),
            providers: self.clone(),
            vcs: self.clone(),
            activity_events: self.clone(),
        }
    }

    /// Names of the service methods called so far
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Fail the next service call with `err`
    pub fn fail_next(&self, err: ServiceError) {
        self.fail_on("", err);
    }

    /// Fail the next call to a method whose name starts with `method`
    pub fn fail_on(&self, method: &'static str, err: ServiceError) {
        self.failures.lock().unwrap().push((method, err));
    }

    pub fn push_run_event(&self, event: ServiceResult<RunEvent>) {
        self.run_events.lock().unwrap().push(event);
    }

    fn call(&self, name: &str) -> ServiceResult<()> {
        self.calls.lock().unwrap().push(name.to_string());
        let mut failures = self.failures.lock().unwrap();
        match failures.iter().position(|(method, _)| name.starts_with(method)) {
            Some(index) => Err(failures.remove(index).1),
            None => Ok(()),
        }
    }

    fn batch_call(&self, name: &str, ids: &[String]) -> ServiceResult<()> {
        let mut sorted = ids.to_vec();
        sorted.sort();
        self.call(&format!("{}({})", name, sorted.join(",")))
    }

    fn read<T>(&self, f: impl FnOnce(&Store) -> T) -> T {
        f(&self.store.lock().unwrap())
    }

    fn write<T>(&self, f: impl FnOnce(&mut Store) -> T) -> T {
        f(&mut self.store.lock().unwrap())
    }
}

fn find<T: Clone>(items: &[T], kind: &str, id: &str, key: impl Fn(&T) -> &str) -> ServiceResult<T> {
    items
        .iter()
        .find(|item| key(item) == id)
        .cloned()
        .ok_or_else(|| ServiceError::not_found(format!("{} {} not found", kind, id)))
}

fn select<T: Clone>(items: &[T], ids: &[String], key: impl Fn(&T) -> &str) -> Vec<T> {
    items
        .iter()
        .filter(|item| ids.iter().any(|id| id == key(item)))
        .cloned()
        .collect()
}

fn matches_search(value: &str, search: &Option<String>) -> bool {
    search.as_ref().map_or(true, |s| value.contains(s.as_str()))
}

fn check_version(current: &ResourceMetadata, expected: Option<i32>) -> ServiceResult<()> {
    match expected {
        Some(version) if version != current.version => Err(ServiceError::conflict(
            "resource version does not match the specified version",
        )),
        _ => Ok(()),
    }
}

fn bump(metadata: &mut ResourceMetadata) {
    metadata.version += 1;
    metadata.updated_at = metadata.updated_at + chrono::Duration::seconds(1);
}

#[async_trait]
impl UserService for InMemory {
    async fn get_users(&self, input: GetUsersInput) -> ServiceResult<Page<User>> {
        self.call("get_users")?;
        let items = self.read(|s| {
            s.users
                .iter()
                .filter(|u| matches_search(&u.username, &input.search))
                .cloned()
                .collect()
        });
        paginate(items, input.sort, &input.pagination)
    }

    async fn get_user_by_id(&self, id: &str) -> ServiceResult<User> {
        self.call("get_user_by_id")?;
        self.read(|s| find(&s.users, "user", id, |u| &u.id))
    }

    async fn get_users_by_ids(&self, ids: &[String]) -> ServiceResult<Vec<User>> {
        self.batch_call("get_users_by_ids", ids)?;
        Ok(self.read(|s| select(&s.users, ids, |u| &u.id)))
    }
}

#[async_trait]
impl ServiceAccountService for InMemory {
    async fn get_service_accounts(
        &self,
        input: GetServiceAccountsInput,
    ) -> ServiceResult<Page<ServiceAccount>> {
        self.call("get_service_accounts")?;
        let prefix = format!("{}/", input.namespace_path);
        let items = self.read(|s| {
            s.service_accounts
                .iter()
                .filter(|sa| sa.resource_path.starts_with(&prefix))
                .filter(|sa| matches_search(&sa.name, &input.search))
                .cloned()
                .collect()
        });
        paginate(items, input.sort, &input.pagination)
    }

    async fn get_service_account_by_id(&self, id: &str) -> ServiceResult<ServiceAccount> {
        self.call("get_service_account_by_id")?;
        self.read(|s| find(&s.service_accounts, "service account", id, |sa| &sa.id))
    }

    async fn get_service_accounts_by_ids(&self, ids: &[String]) -> ServiceResult<Vec<ServiceAccount>> {
        self.batch_call("get_service_accounts_by_ids", ids)?;
        Ok(self.read(|s| select(&s.service_accounts, ids, |sa| &sa.id)))
    }
}

#[async_trait]
impl GroupService for InMemory {
    async fn get_groups(&self, input: GetGroupsInput) -> ServiceResult<Page<Group>> {
        self.call("get_groups")?;
        let items = self.read(|s| {
            let parent_id = input
                .parent_path
                .as_ref()
                .and_then(|path| s.groups.iter().find(|g| &g.full_path == path))
                .map(|g| g.id.clone());
            s.groups
                .iter()
                .filter(|g| g.parent_id == parent_id)
                .filter(|g| matches_search(&g.full_path, &input.search))
                .cloned()
                .collect()
        });
        paginate(items, input.sort, &input.pagination)
    }

    async fn get_group_by_id(&self, id: &str) -> ServiceResult<Group> {
        self.call("get_group_by_id")?;
        self.read(|s| find(&s.groups, "group", id, |g| &g.id))
    }

    async fn get_group_by_path(&self, path: &str) -> ServiceResult<Group> {
        self.call("get_group_by_path")?;
        self.read(|s| find(&s.groups, "group", path, |g| &g.full_path))
    }

    async fn get_groups_by_ids(&self, ids: &[String]) -> ServiceResult<Vec<Group>> {
        self.batch_call("get_groups_by_ids", ids)?;
        Ok(self.read(|s| select(&s.groups, ids, |g| &g.id)))
    }

    async fn update_group(&self, input: UpdateGroupInput) -> ServiceResult<Group> {
        self.call("update_group")?;
        self.write(|s| {
            let group = s
                .groups
                .iter_mut()
                .find(|g| g.id == input.id)
                .ok_or_else(|| ServiceError::not_found("group not found"))?;
            check_version(&group.metadata, input.version)?;
            if let Some(description) = input.description {
                group.description = description;
            }
            bump(&mut group.metadata);
            Ok(group.clone())
        })
    }

    async fn delete_group(&self, input: DeleteGroupInput) -> ServiceResult<Group> {
        self.call("delete_group")?;
        self.write(|s| {
            let group = find(&s.groups, "group", &input.id, |g| &g.id)?;
            check_version(&group.metadata, input.version)?;
            if !input.force && s.workspaces.iter().any(|w| w.group_id == group.id) {
                return Err(ServiceError::conflict("group is not empty"));
            }
            s.groups.retain(|g| g.id != group.id);
            Ok(group)
        })
    }
}

#[async_trait]
impl WorkspaceService for InMemory {
    async fn get_workspaces(&self, input: GetWorkspacesInput) -> ServiceResult<Page<Workspace>> {
        self.call("get_workspaces")?;
        let items = self.read(|s| {
            s.workspaces
                .iter()
                .filter(|w| {
                    input
                        .group_path
                        .as_ref()
                        .map_or(true, |path| w.full_path.starts_with(&format!("{}/", path)))
                })
                .filter(|w| matches_search(&w.full_path, &input.search))
                .cloned()
                .collect()
        });
        paginate(items, input.sort, &input.pagination)
    }

    async fn get_workspace_by_id(&self, id: &str) -> ServiceResult<Workspace> {
        self.call("get_workspace_by_id")?;
        self.read(|s| find(&s.workspaces, "workspace", id, |w| &w.id))
    }

    async fn get_workspace_by_path(&self, path: &str) -> ServiceResult<Workspace> {
        self.call("get_workspace_by_path")?;
        self.read(|s| find(&s.workspaces, "workspace", path, |w| &w.full_path))
    }

    async fn get_workspaces_by_ids(&self, ids: &[String]) -> ServiceResult<Vec<Workspace>> {
        self.batch_call("get_workspaces_by_ids", ids)?;
        Ok(self.read(|s| select(&s.workspaces, ids, |w| &w.id)))
    }

    async fn update_workspace(&self, input: UpdateWorkspaceInput) -> ServiceResult<Workspace> {
        self.call("update_workspace")?;
        self.write(|s| {
            let workspace = s
                .workspaces
                .iter_mut()
                .find(|w| w.id == input.id)
                .ok_or_else(|| ServiceError::not_found("workspace not found"))?;
            check_version(&workspace.metadata, input.version)?;
            if let Some(description) = input.description {
                workspace.description = description;
            }
            if let Some(duration) = input.max_job_duration {
                workspace.max_job_duration = duration;
            }
            bump(&mut workspace.metadata);
            Ok(workspace.clone())
        })
    }

    async fn delete_workspace(&self, input: DeleteWorkspaceInput) -> ServiceResult<Workspace> {
        self.call("delete_workspace")?;
        self.write(|s| {
            let workspace = find(&s.workspaces, "workspace", &input.id, |w| &w.id)?;
            check_version(&workspace.metadata, input.version)?;
            s.workspaces.retain(|w| w.id != workspace.id);
            Ok(workspace)
        })
    }
}

#[async_trait]
impl NamespaceMembershipService for InMemory {
    async fn get_namespace_memberships(
        &self,
        namespace_path: &str,
    ) -> ServiceResult<Vec<NamespaceMembership>> {
        self.call("get_namespace_memberships")?;
        Ok(self.read(|s| {
            s.memberships
                .iter()
                .filter(|m| {
                    namespace_path == m.namespace_path
                        || namespace_path.starts_with(&format!("{}/", m.namespace_path))
                })
                .cloned()
                .collect()
        }))
    }

    async fn get_namespace_membership_by_id(&self, id: &str) -> ServiceResult<NamespaceMembership> {
        self.call("get_namespace_membership_by_id")?;
        self.read(|s| find(&s.memberships, "namespace membership", id, |m| &m.id))
    }

    async fn get_namespace_memberships_by_ids(
        &self,
        ids: &[String],
    ) -> ServiceResult<Vec<NamespaceMembership>> {
        self.batch_call("get_namespace_memberships_by_ids", ids)?;
        Ok(self.read(|s| select(&s.memberships, ids, |m| &m.id)))
    }

    async fn create_namespace_membership(
        &self,
        input: CreateNamespaceMembershipInput,
    ) -> ServiceResult<NamespaceMembership> {
        self.call("create_namespace_membership")?;
        let (user_id, service_account_id, team_id) = match input.member {
            MemberRef::User(id) => (Some(id), None, None),
            MemberRef::ServiceAccount(id) => (None, Some(id), None),
            MemberRef::Team(id) => (None, None, Some(id)),
        };
        let membership = NamespaceMembership {
            id: fixtures::id(),
            namespace_path: input.namespace_path,
            role_id: input.role_id,
            user_id,
            service_account_id,
            team_id,
            metadata: fixtures::metadata(),
        };
        self.write(|s| s.memberships.push(membership.clone()));
        Ok(membership)
    }

    async fn update_namespace_membership(
        &self,
        input: UpdateNamespaceMembershipInput,
    ) -> ServiceResult<NamespaceMembership> {
        self.call("update_namespace_membership")?;
        self.write(|s| {
            let membership = s
                .memberships
                .iter_mut()
                .find(|m| m.id == input.id)
                .ok_or_else(|| ServiceError::not_found("namespace membership not found"))?;
            check_version(&membership.metadata, input.version)?;
            membership.role_id = input.role_id;
            bump(&mut membership.metadata);
            Ok(membership.clone())
        })
    }

    async fn delete_namespace_membership(
        &self,
        input: DeleteNamespaceMembershipInput,
    ) -> ServiceResult<NamespaceMembership> {
        self.call("delete_namespace_membership")?;
        self.write(|s| {
            let membership = find(&s.memberships, "namespace membership", &input.id, |m| &m.id)?;
            check_version(&membership.metadata, input.version)?;
            s.memberships.retain(|m| m.id != membership.id);
            Ok(membership)
        })
    }
}

#[async_trait]
impl TeamService for InMemory {
    async fn get_teams(&self, input: GetTeamsInput) -> ServiceResult<Page<Team>> {
        self.call("get_teams")?;
        let items = self.read(|s| {
            s.teams
                .iter()
                .filter(|t| matches_search(&t.name, &input.search))
                .cloned()
                .collect()
        });
        paginate(items, input.sort, &input.pagination)
    }

    async fn get_team_by_id(&self, id: &str) -> ServiceResult<Team> {
        self.call("get_team_by_id")?;
        self.read(|s| find(&s.teams, "team", id, |t| &t.id))
    }

    async fn get_teams_by_ids(&self, ids: &[String]) -> ServiceResult<Vec<Team>> {
        self.batch_call("get_teams_by_ids", ids)?;
        Ok(self.read(|s| select(&s.teams, ids, |t| &t.id)))
    }
}

#[async_trait]
impl RoleService for InMemory {
    async fn get_roles(&self, input: GetRolesInput) -> ServiceResult<Page<Role>> {
        self.call("get_roles")?;
        let items = self.read(|s| {
            s.roles
                .iter()
                .filter(|r| matches_search(&r.name, &input.search))
                .cloned()
                .collect()
        });
        paginate(items, input.sort, &input.pagination)
    }

    async fn get_role_by_id(&self, id: &str) -> ServiceResult<Role> {
        self.call("get_role_by_id")?;
        self.read(|s| find(&s.roles, "role", id, |r| &r.id))
    }

    async fn get_role_by_name(&self, name: &str) -> ServiceResult<Role> {
        self.call("get_role_by_name")?;
        self.read(|s| find(&s.roles, "role", name, |r| &r.name))
    }

    async fn get_roles_by_ids(&self, ids: &[String]) -> ServiceResult<Vec<Role>> {
        self.batch_call("get_roles_by_ids", ids)?;
        Ok(self.read(|s| select(&s.roles, ids, |r| &r.id)))
    }
}

#[async_trait]
impl RunService for InMemory {
    async fn get_runs(&self, input: GetRunsInput) -> ServiceResult<Page<Run>> {
        self.call("get_runs")?;
        let items = self.read(|s| {
            s.runs
                .iter()
                .filter(|r| input.workspace_id.as_ref().map_or(true, |id| &r.workspace_id == id))
                .cloned()
                .collect()
        });
        paginate(items, input.sort, &input.pagination)
    }

    async fn get_run_by_id(&self, id: &str) -> ServiceResult<Run> {
        self.call("get_run_by_id")?;
        self.read(|s| find(&s.runs, "run", id, |r| &r.id))
    }

    async fn get_runs_by_ids(&self, ids: &[String]) -> ServiceResult<Vec<Run>> {
        self.batch_call("get_runs_by_ids", ids)?;
        Ok(self.read(|s| select(&s.runs, ids, |r| &r.id)))
    }

    async fn create_run(&self, input: CreateRunInput) -> ServiceResult<Run> {
        self.call("create_run")?;
        let run = Run {
            id: fixtures::id(),
            workspace_id: input.workspace_id,
            status: RunStatus::Pending,
            is_destroy: input.is_destroy,
            comment: input.comment,
            module_source: input.module_source,
            module_version: input.module_version,
            force_canceled: false,
            created_by: "admin".to_string(),
            metadata: fixtures::metadata(),
        };
        self.write(|s| s.runs.push(run.clone()));
        Ok(run)
    }

    async fn cancel_run(&self, input: CancelRunInput) -> ServiceResult<Run> {
        self.call("cancel_run")?;
        self.write(|s| {
            let run = s
                .runs
                .iter_mut()
                .find(|r| r.id == input.run_id)
                .ok_or_else(|| ServiceError::not_found("run not found"))?;
            check_version(&run.metadata, input.version)?;
            run.status = RunStatus::Canceled;
            run.force_canceled = input.force;
            bump(&mut run.metadata);
            Ok(run.clone())
        })
    }

    async fn subscribe_to_run_events(
        &self,
        input: RunEventsInput,
    ) -> ServiceResult<BoxStream<'static, ServiceResult<RunEvent>>> {
        self.call("subscribe_to_run_events")?;
        let events: Vec<_> = std::mem::take(&mut *self.run_events.lock().unwrap())
            .into_iter()
            .filter(|event| match event {
                Ok(event) => {
                    event.run.workspace_id == input.workspace_id
                        && input.run_id.as_ref().map_or(true, |id| &event.run.id == id)
                }
                Err(_) => true,
            })
            .collect();
        Ok(stream::iter(events).boxed())
    }
}

#[async_trait]
impl ModuleRegistryService for InMemory {
    async fn get_modules(&self, input: GetModulesInput) -> ServiceResult<Page<TerraformModule>> {
        self.call("get_modules")?;
        let items = self.read(|s| {
            s.modules
                .iter()
                .filter(|m| {
                    input
                        .group_path
                        .as_ref()
                        .map_or(true, |path| m.resource_path.starts_with(&format!("{}/", path)))
                })
                .filter(|m| matches_search(&m.name, &input.search))
                .cloned()
                .collect()
        });
        paginate(items, input.sort, &input.pagination)
    }

    async fn get_module_by_id(&self, id: &str) -> ServiceResult<TerraformModule> {
        self.call("get_module_by_id")?;
        self.read(|s| find(&s.modules, "module", id, |m| &m.id))
    }

    async fn get_modules_by_ids(&self, ids: &[String]) -> ServiceResult<Vec<TerraformModule>> {
        self.batch_call("get_modules_by_ids", ids)?;
        Ok(self.read(|s| select(&s.modules, ids, |m| &m.id)))
    }

    async fn get_module_versions(
        &self,
        input: GetModuleVersionsInput,
    ) -> ServiceResult<Page<TerraformModuleVersion>> {
        self.call("get_module_versions")?;
        let items = self.read(|s| {
            s.module_versions
                .iter()
                .filter(|v| v.module_id == input.module_id)
                .filter(|v| input.latest.map_or(true, |latest| v.latest == latest))
                .cloned()
                .collect()
        });
        paginate(items, input.sort, &input.pagination)
    }

    async fn get_module_version_by_id(&self, id: &str) -> ServiceResult<TerraformModuleVersion> {
        self.call("get_module_version_by_id")?;
        self.read(|s| find(&s.module_versions, "module version", id, |v| &v.id))
    }

    async fn get_module_versions_by_ids(
        &self,
        ids: &[String],
    ) -> ServiceResult<Vec<TerraformModuleVersion>> {
        self.batch_call("get_module_versions_by_ids", ids)?;
        Ok(self.read(|s| select(&s.module_versions, ids, |v| &v.id)))
    }

    async fn delete_module(&self, input: DeleteModuleInput) -> ServiceResult<TerraformModule> {
        self.call("delete_module")?;
        self.write(|s| {
            let module = find(&s.modules, "module", &input.id, |m| &m.id)?;
            check_version(&module.metadata, input.version)?;
            s.modules.retain(|m| m.id != module.id);
            s.module_versions.retain(|v| v.module_id != module.id);
            Ok(module)
        })
    }
}

#[async_trait]
impl ProviderRegistryService for InMemory {
    async fn get_providers(&self, input: GetProvidersInput) -> ServiceResult<Page<TerraformProvider>> {
        self.call("get_providers")?;
        let items = self.read(|s| {
            s.providers
                .iter()
                .filter(|p| {
                    input
                        .group_path
                        .as_ref()
                        .map_or(true, |path| p.resource_path.starts_with(&format!("{}/", path)))
                })
                .filter(|p| matches_search(&p.name, &input.search))
                .cloned()
                .collect()
        });
        paginate(items, input.sort, &input.pagination)
    }

    async fn get_provider_by_id(&self, id: &str) -> ServiceResult<TerraformProvider> {
        self.call("get_provider_by_id")?;
        self.read(|s| find(&s.providers, "provider", id, |p| &p.id))
    }

    async fn get_providers_by_ids(&self, ids: &[String]) -> ServiceResult<Vec<TerraformProvider>> {
        self.batch_call("get_providers_by_ids", ids)?;
        Ok(self.read(|s| select(&s.providers, ids, |p| &p.id)))
    }
}

#[async_trait]
impl VcsService for InMemory {
    async fn get_vcs_providers(&self, input: GetVcsProvidersInput) -> ServiceResult<Page<VcsProvider>> {
        self.call("get_vcs_providers")?;
        let prefix = format!("{}/", input.namespace_path);
        let items = self.read(|s| {
            s.vcs_providers
                .iter()
                .filter(|p| p.resource_path.starts_with(&prefix))
                .filter(|p| matches_search(&p.name, &input.search))
                .cloned()
                .collect()
        });
        paginate(items, input.sort, &input.pagination)
    }

    async fn get_vcs_provider_by_id(&self, id: &str) -> ServiceResult<VcsProvider> {
        self.call("get_vcs_provider_by_id")?;
        self.read(|s| find(&s.vcs_providers, "vcs provider", id, |p| &p.id))
    }

    async fn get_vcs_providers_by_ids(&self, ids: &[String]) -> ServiceResult<Vec<VcsProvider>> {
        self.batch_call("get_vcs_providers_by_ids", ids)?;
        Ok(self.read(|s| select(&s.vcs_providers, ids, |p| &p.id)))
    }

    async fn delete_vcs_provider(&self, input: DeleteVcsProviderInput) -> ServiceResult<VcsProvider> {
        self.call("delete_vcs_provider")?;
        self.write(|s| {
            let provider = find(&s.vcs_providers, "vcs provider", &input.id, |p| &p.id)?;
            check_version(&provider.metadata, input.version)?;
            s.vcs_providers.retain(|p| p.id != provider.id);
            Ok(provider)
        })
    }
}

#[async_trait]
impl ActivityEventService for InMemory {
    async fn get_activity_events(
        &self,
        input: GetActivityEventsInput,
    ) -> ServiceResult<Page<ActivityEvent>> {
        self.call("get_activity_events")?;
        let items = self.read(|s| {
            s.activity_events
                .iter()
                .filter(|e| {
                    input
                        .namespace_path
                        .as_ref()
                        .map_or(true, |path| e.namespace_path.as_ref() == Some(path))
                })
                .filter(|e| input.user_id.is_none() || e.user_id == input.user_id)
                .filter(|e| {
                    input.service_account_id.is_none()
                        || e.service_account_id == input.service_account_id
                })
                .filter(|e| input.actions.is_empty() || input.actions.contains(&e.action))
                .filter(|e| {
                    input.target_types.is_empty() || input.target_types.contains(&e.target_type)
                })
                .cloned()
                .collect()
        });
        paginate(items, input.sort, &input.pagination)
    }
}

/// Schema wired to `services`, plus the factory for request loaders
pub(crate) fn schema_for(services: &Arc<InMemory>) -> (ApiSchema, LoaderFactory) {
    let config = ResolverConfig::default();
    let catalog = services.catalog();
    let factory = LoaderFactory::new(catalog.clone(), config.loaders);
    (build_schema(catalog, config), factory)
}

/// Execute `query` as one inbound request and return the JSON response
pub(crate) async fn execute(
    services: &Arc<InMemory>,
    query: &str,
) -> async_graphql::Response {
    let (schema, factory) = schema_for(services);
    let request = async_graphql::Request::new(query).data(factory.registry());
    schema.execute(request).await
}

/// Group every test `Store` needs as a root namespace
pub(crate) fn store_with(f: impl FnOnce(&mut Store)) -> Store {
    let mut store = Store::default();
    f(&mut store);
    store
}

/// Collect a page of JSON edges' node field values
pub(crate) fn edge_values(data: &serde_json::Value, path: &[&str], field: &str) -> Vec<String> {
    let mut current = data;
    for key in path {
        current = &current[*key];
    }
    current["edges"]
        .as_array()
        .map(|edges| {
            edges
                .iter()
                .filter_map(|edge| edge["node"][field].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Render a response's data as JSON, panicking on errors
pub(crate) fn data(response: async_graphql::Response) -> serde_json::Value {
    assert!(response.errors.is_empty(), "unexpected errors: {:?}", response.errors);
    response.data.into_json().unwrap()
}
