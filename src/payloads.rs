//! Activity event payload decoding
//!
//! An activity event stores its payload as an opaque blob. Which shape the
//! blob holds is decided by the event's (action, target type) pair; the
//! table in [`decode_payload`] is the only place that mapping lives.

use async_graphql::{SimpleObject, Union};
use serde::Deserialize;

use crate::models::{ActivityEventAction, ActivityEventTargetType};
use crate::{GraphQLError, Result};

#[derive(SimpleObject, Deserialize, Debug, Clone, PartialEq, Eq)]
#[graphql(name = "ActivityEventCreateNamespaceMembershipPayload")]
#[serde(rename_all = "camelCase")]
pub struct CreateNamespaceMembershipPayload {
    pub user_id: Option<String>,
    pub service_account_id: Option<String>,
    pub team_id: Option<String>,
    pub role: String,
}

#[derive(SimpleObject, Deserialize, Debug, Clone, PartialEq, Eq)]
#[graphql(name = "ActivityEventUpdateNamespaceMembershipPayload")]
#[serde(rename_all = "camelCase")]
pub struct UpdateNamespaceMembershipPayload {
    pub prev_role: String,
    pub new_role: String,
}

#[derive(SimpleObject, Deserialize, Debug, Clone, PartialEq, Eq)]
#[graphql(name = "ActivityEventRemoveNamespaceMembershipPayload")]
#[serde(rename_all = "camelCase")]
pub struct RemoveNamespaceMembershipPayload {
    pub user_id: Option<String>,
    pub service_account_id: Option<String>,
    pub team_id: Option<String>,
}

#[derive(SimpleObject, Deserialize, Debug, Clone, PartialEq, Eq)]
#[graphql(name = "ActivityEventDeleteChildResourcePayload")]
#[serde(rename_all = "camelCase")]
pub struct DeleteChildResourcePayload {
    pub name: String,
    pub id: String,
    #[serde(rename = "type")]
    #[graphql(name = "type")]
    pub resource_type: String,
}

#[derive(SimpleObject, Deserialize, Debug, Clone, PartialEq, Eq)]
#[graphql(name = "ActivityEventUpdateTeamPayload")]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeamPayload {
    pub user_id: String,
    pub change_type: String,
    pub maintainer: bool,
}

#[derive(SimpleObject, Deserialize, Debug, Clone, PartialEq, Eq)]
#[graphql(name = "ActivityEventMigrateNamespacePayload")]
#[serde(rename_all = "camelCase")]
pub struct MigrateNamespacePayload {
    pub previous_group_path: String,
}

/// Decoded activity event payload
#[derive(Union, Debug, Clone, PartialEq, Eq)]
pub enum ActivityEventPayload {
    CreateNamespaceMembership(CreateNamespaceMembershipPayload),
    UpdateNamespaceMembership(UpdateNamespaceMembershipPayload),
    RemoveNamespaceMembership(RemoveNamespaceMembershipPayload),
    DeleteChildResource(DeleteChildResourcePayload),
    UpdateTeam(UpdateTeamPayload),
    MigrateNamespace(MigrateNamespacePayload),
}

fn decode<'a, T: Deserialize<'a>>(shape: &'static str, raw: &'a [u8]) -> Result<T> {
    serde_json::from_slice(raw).map_err(|e| GraphQLError::Decode {
        shape,
        reason: e.to_string(),
    })
}

/// Decode `raw` into the shape registered for (action, target type)
pub fn decode_payload(
    action: ActivityEventAction,
    target_type: ActivityEventTargetType,
    raw: &[u8],
) -> Result<ActivityEventPayload> {
    use ActivityEventAction as A;
    use ActivityEventTargetType as T;

    match (action, target_type) {
        (A::CreateMembership, T::Group | T::Workspace) => {
            decode("CreateNamespaceMembershipPayload", raw)
                .map(ActivityEventPayload::CreateNamespaceMembership)
        }
        (A::RemoveMembership, T::Group | T::Workspace) => {
            decode("RemoveNamespaceMembershipPayload", raw)
                .map(ActivityEventPayload::RemoveNamespaceMembership)
        }
        (A::Update, T::NamespaceMembership) => decode("UpdateNamespaceMembershipPayload", raw)
            .map(ActivityEventPayload::UpdateNamespaceMembership),
        (A::DeleteChildResource, T::Group | T::Workspace) => {
            decode("DeleteChildResourcePayload", raw).map(ActivityEventPayload::DeleteChildResource)
        }
        (A::Update, T::Team) => {
            decode("UpdateTeamPayload", raw).map(ActivityEventPayload::UpdateTeam)
        }
        (A::Migrate, T::Group | T::Workspace) => {
            decode("MigrateNamespacePayload", raw).map(ActivityEventPayload::MigrateNamespace)
        }
        (action, target_type) => Err(GraphQLError::UnsupportedCombination {
            action: format!("{:?}", action),
            target_type: format!("{:?}", target_type),
        }),
    }
}

impl ActivityEventPayload {
    pub fn as_create_namespace_membership(&self) -> Option<&CreateNamespaceMembershipPayload> {
        match self {
            Self::CreateNamespaceMembership(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn as_update_namespace_membership(&self) -> Option<&UpdateNamespaceMembershipPayload> {
        match self {
            Self::UpdateNamespaceMembership(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn as_remove_namespace_membership(&self) -> Option<&RemoveNamespaceMembershipPayload> {
        match self {
            Self::RemoveNamespaceMembership(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn as_delete_child_resource(&self) -> Option<&DeleteChildResourcePayload> {
        match self {
            Self::DeleteChildResource(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn as_update_team(&self) -> Option<&UpdateTeamPayload> {
        match self {
            Self::UpdateTeam(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn as_migrate_namespace(&self) -> Option<&MigrateNamespacePayload> {
        match self {
            Self::MigrateNamespace(payload) => Some(payload),
            _ => None,
        }
    }
}
