//! Domain entities returned by the service layer

use async_graphql::Enum;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bookkeeping shared by every resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMetadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub admin: bool,
    pub active: bool,
    pub metadata: ResourceMetadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceAccount {
    pub id: String,
    pub name: String,
    pub description: String,
    pub group_id: String,
    pub resource_path: String,
    pub created_by: String,
    pub metadata: ResourceMetadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub description: String,
    pub full_path: String,
    pub parent_id: Option<String>,
    pub created_by: String,
    pub metadata: ResourceMetadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    pub description: String,
    pub full_path: String,
    pub group_id: String,
    /// Minutes a job may run before it is cancelled
    pub max_job_duration: i32,
    pub locked: bool,
    pub created_by: String,
    pub metadata: ResourceMetadata,
}

/// Grants a role on a namespace to exactly one kind of member
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceMembership {
    pub id: String,
    pub namespace_path: String,
    pub role_id: String,
    pub user_id: Option<String>,
    pub service_account_id: Option<String>,
    pub team_id: Option<String>,
    pub metadata: ResourceMetadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub description: String,
    pub scim_external_id: Option<String>,
    pub metadata: ResourceMetadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub description: String,
    pub permissions: Vec<String>,
    pub created_by: String,
    pub metadata: ResourceMetadata,
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum RunStatus {
    Pending,
    Planning,
    Planned,
    Applying,
    Applied,
    PlannedAndFinished,
    Canceled,
    Errored,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub id: String,
    pub workspace_id: String,
    pub status: RunStatus,
    pub is_destroy: bool,
    pub comment: Option<String>,
    pub module_source: Option<String>,
    pub module_version: Option<String>,
    pub force_canceled: bool,
    pub created_by: String,
    pub metadata: ResourceMetadata,
}

/// Run state change delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub struct RunEvent {
    pub action: String,
    pub run: Run,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TerraformModule {
    pub id: String,
    pub name: String,
    pub system: String,
    pub group_id: String,
    pub resource_path: String,
    pub private: bool,
    pub repository_url: String,
    pub created_by: String,
    pub metadata: ResourceMetadata,
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum ModuleVersionStatus {
    Pending,
    UploadInProgress,
    Errored,
    Uploaded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TerraformModuleVersion {
    pub id: String,
    pub module_id: String,
    pub semantic_version: String,
    pub status: ModuleVersionStatus,
    pub latest: bool,
    pub submodules: Vec<String>,
    pub created_by: String,
    pub metadata: ResourceMetadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TerraformProvider {
    pub id: String,
    pub name: String,
    pub group_id: String,
    pub resource_path: String,
    pub private: bool,
    pub repository_url: String,
    pub created_by: String,
    pub metadata: ResourceMetadata,
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum VcsProviderType {
    Github,
    Gitlab,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VcsProvider {
    pub id: String,
    pub name: String,
    pub description: String,
    pub group_id: String,
    pub resource_path: String,
    pub provider_type: VcsProviderType,
    pub url: String,
    pub auto_create_webhooks: bool,
    pub created_by: String,
    pub metadata: ResourceMetadata,
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Hash, Serialize, Deserialize)]
pub enum ActivityEventAction {
    Create,
    Update,
    DeleteChildResource,
    CreateMembership,
    RemoveMembership,
    Lock,
    Unlock,
    Migrate,
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Hash, Serialize, Deserialize)]
pub enum ActivityEventTargetType {
    Group,
    Workspace,
    NamespaceMembership,
    Team,
    Role,
    Run,
    ServiceAccount,
    TerraformModule,
    TerraformModuleVersion,
    TerraformProvider,
    VcsProvider,
}

/// Audit record of an action taken against a resource
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEvent {
    pub id: String,
    pub user_id: Option<String>,
    pub service_account_id: Option<String>,
    pub namespace_path: Option<String>,
    pub action: ActivityEventAction,
    pub target_type: ActivityEventTargetType,
    pub target_id: String,
    /// Serialized payload whose shape is chosen by (action, target_type)
    pub payload: Option<Vec<u8>>,
    pub metadata: ResourceMetadata,
}
