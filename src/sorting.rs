//! Sort orders offered by each connection

use async_graphql::Enum;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::cursor::{Paginated, SortDirection, SortKey};
use crate::models::{
    ActivityEvent, Group, Role, Run, ServiceAccount, Team, TerraformModule,
    TerraformModuleVersion, TerraformProvider, User, VcsProvider, Workspace,
};

macro_rules! sort_key {
    ($sort:ident { $($variant:ident => ($field:literal, $dir:ident)),+ $(,)? }) => {
        impl SortKey for $sort {
            fn field_name(&self) -> &'static str {
                match self {
                    $($sort::$variant => $field,)+
                }
            }

            fn direction(&self) -> SortDirection {
                match self {
                    $($sort::$variant => SortDirection::$dir,)+
                }
            }
        }
    };
}

/// Fixed-width timestamp so cursor values order lexicographically
fn timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum UserSort {
    #[default]
    UsernameAsc,
    UsernameDesc,
    UpdatedAtAsc,
    UpdatedAtDesc,
}

sort_key!(UserSort {
    UsernameAsc => ("username", Asc),
    UsernameDesc => ("username", Desc),
    UpdatedAtAsc => ("updated_at", Asc),
    UpdatedAtDesc => ("updated_at", Desc),
});

impl Paginated<UserSort> for User {
    fn cursor_id(&self) -> &str {
        &self.id
    }

    fn sort_value(&self, sort: UserSort) -> String {
        match sort {
            UserSort::UsernameAsc | UserSort::UsernameDesc => self.username.clone(),
            UserSort::UpdatedAtAsc | UserSort::UpdatedAtDesc => timestamp(&self.metadata.updated_at),
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum ServiceAccountSort {
    CreatedAtAsc,
    CreatedAtDesc,
    UpdatedAtAsc,
    #[default]
    UpdatedAtDesc,
}

sort_key!(ServiceAccountSort {
    CreatedAtAsc => ("created_at", Asc),
    CreatedAtDesc => ("created_at", Desc),
    UpdatedAtAsc => ("updated_at", Asc),
    UpdatedAtDesc => ("updated_at", Desc),
});

impl Paginated<ServiceAccountSort> for ServiceAccount {
    fn cursor_id(&self) -> &str {
        &self.id
    }

    fn sort_value(&self, sort: ServiceAccountSort) -> String {
        match sort {
            ServiceAccountSort::CreatedAtAsc | ServiceAccountSort::CreatedAtDesc => {
                timestamp(&self.metadata.created_at)
            }
            ServiceAccountSort::UpdatedAtAsc | ServiceAccountSort::UpdatedAtDesc => {
                timestamp(&self.metadata.updated_at)
            }
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum GroupSort {
    #[default]
    FullPathAsc,
    FullPathDesc,
}

sort_key!(GroupSort {
    FullPathAsc => ("full_path", Asc),
    FullPathDesc => ("full_path", Desc),
});

impl Paginated<GroupSort> for Group {
    fn cursor_id(&self) -> &str {
        &self.id
    }

    fn sort_value(&self, _sort: GroupSort) -> String {
        self.full_path.clone()
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum WorkspaceSort {
    #[default]
    FullPathAsc,
    FullPathDesc,
    UpdatedAtAsc,
    UpdatedAtDesc,
}

sort_key!(WorkspaceSort {
    FullPathAsc => ("full_path", Asc),
    FullPathDesc => ("full_path", Desc),
    UpdatedAtAsc => ("updated_at", Asc),
    UpdatedAtDesc => ("updated_at", Desc),
});

impl Paginated<WorkspaceSort> for Workspace {
    fn cursor_id(&self) -> &str {
        &self.id
    }

    fn sort_value(&self, sort: WorkspaceSort) -> String {
        match sort {
            WorkspaceSort::FullPathAsc | WorkspaceSort::FullPathDesc => self.full_path.clone(),
            WorkspaceSort::UpdatedAtAsc | WorkspaceSort::UpdatedAtDesc => {
                timestamp(&self.metadata.updated_at)
            }
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum TeamSort {
    #[default]
    NameAsc,
    NameDesc,
    UpdatedAtAsc,
    UpdatedAtDesc,
}

sort_key!(TeamSort {
    NameAsc => ("name", Asc),
    NameDesc => ("name", Desc),
    UpdatedAtAsc => ("updated_at", Asc),
    UpdatedAtDesc => ("updated_at", Desc),
});

impl Paginated<TeamSort> for Team {
    fn cursor_id(&self) -> &str {
        &self.id
    }

    fn sort_value(&self, sort: TeamSort) -> String {
        match sort {
            TeamSort::NameAsc | TeamSort::NameDesc => self.name.clone(),
            TeamSort::UpdatedAtAsc | TeamSort::UpdatedAtDesc => timestamp(&self.metadata.updated_at),
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum RoleSort {
    #[default]
    NameAsc,
    NameDesc,
    UpdatedAtAsc,
    UpdatedAtDesc,
}

sort_key!(RoleSort {
    NameAsc => ("name", Asc),
    NameDesc => ("name", Desc),
    UpdatedAtAsc => ("updated_at", Asc),
    UpdatedAtDesc => ("updated_at", Desc),
});

impl Paginated<RoleSort> for Role {
    fn cursor_id(&self) -> &str {
        &self.id
    }

    fn sort_value(&self, sort: RoleSort) -> String {
        match sort {
            RoleSort::NameAsc | RoleSort::NameDesc => self.name.clone(),
            RoleSort::UpdatedAtAsc | RoleSort::UpdatedAtDesc => timestamp(&self.metadata.updated_at),
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum RunSort {
    CreatedAtAsc,
    #[default]
    CreatedAtDesc,
    UpdatedAtAsc,
    UpdatedAtDesc,
}

sort_key!(RunSort {
    CreatedAtAsc => ("created_at", Asc),
    CreatedAtDesc => ("created_at", Desc),
    UpdatedAtAsc => ("updated_at", Asc),
    UpdatedAtDesc => ("updated_at", Desc),
});

impl Paginated<RunSort> for Run {
    fn cursor_id(&self) -> &str {
        &self.id
    }

    fn sort_value(&self, sort: RunSort) -> String {
        match sort {
            RunSort::CreatedAtAsc | RunSort::CreatedAtDesc => timestamp(&self.metadata.created_at),
            RunSort::UpdatedAtAsc | RunSort::UpdatedAtDesc => timestamp(&self.metadata.updated_at),
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum TerraformModuleSort {
    #[default]
    NameAsc,
    NameDesc,
    UpdatedAtAsc,
    UpdatedAtDesc,
}

sort_key!(TerraformModuleSort {
    NameAsc => ("name", Asc),
    NameDesc => ("name", Desc),
    UpdatedAtAsc => ("updated_at", Asc),
    UpdatedAtDesc => ("updated_at", Desc),
});

impl Paginated<TerraformModuleSort> for TerraformModule {
    fn cursor_id(&self) -> &str {
        &self.id
    }

    fn sort_value(&self, sort: TerraformModuleSort) -> String {
        match sort {
            TerraformModuleSort::NameAsc | TerraformModuleSort::NameDesc => self.name.clone(),
            TerraformModuleSort::UpdatedAtAsc | TerraformModuleSort::UpdatedAtDesc => {
                timestamp(&self.metadata.updated_at)
            }
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum TerraformModuleVersionSort {
    CreatedAtAsc,
    #[default]
    CreatedAtDesc,
    UpdatedAtAsc,
    UpdatedAtDesc,
}

sort_key!(TerraformModuleVersionSort {
    CreatedAtAsc => ("created_at", Asc),
    CreatedAtDesc => ("created_at", Desc),
    UpdatedAtAsc => ("updated_at", Asc),
    UpdatedAtDesc => ("updated_at", Desc),
});

impl Paginated<TerraformModuleVersionSort> for TerraformModuleVersion {
    fn cursor_id(&self) -> &str {
        &self.id
    }

    fn sort_value(&self, sort: TerraformModuleVersionSort) -> String {
        match sort {
            TerraformModuleVersionSort::CreatedAtAsc | TerraformModuleVersionSort::CreatedAtDesc => {
                timestamp(&self.metadata.created_at)
            }
            TerraformModuleVersionSort::UpdatedAtAsc | TerraformModuleVersionSort::UpdatedAtDesc => {
                timestamp(&self.metadata.updated_at)
            }
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum TerraformProviderSort {
    #[default]
    NameAsc,
    NameDesc,
    UpdatedAtAsc,
    UpdatedAtDesc,
}

sort_key!(TerraformProviderSort {
    NameAsc => ("name", Asc),
    NameDesc => ("name", Desc),
    UpdatedAtAsc => ("updated_at", Asc),
    UpdatedAtDesc => ("updated_at", Desc),
});

impl Paginated<TerraformProviderSort> for TerraformProvider {
    fn cursor_id(&self) -> &str {
        &self.id
    }

    fn sort_value(&self, sort: TerraformProviderSort) -> String {
        match sort {
            TerraformProviderSort::NameAsc | TerraformProviderSort::NameDesc => self.name.clone(),
            TerraformProviderSort::UpdatedAtAsc | TerraformProviderSort::UpdatedAtDesc => {
                timestamp(&self.metadata.updated_at)
            }
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum VcsProviderSort {
    CreatedAtAsc,
    CreatedAtDesc,
    UpdatedAtAsc,
    #[default]
    UpdatedAtDesc,
}

sort_key!(VcsProviderSort {
    CreatedAtAsc => ("created_at", Asc),
    CreatedAtDesc => ("created_at", Desc),
    UpdatedAtAsc => ("updated_at", Asc),
    UpdatedAtDesc => ("updated_at", Desc),
});

impl Paginated<VcsProviderSort> for VcsProvider {
    fn cursor_id(&self) -> &str {
        &self.id
    }

    fn sort_value(&self, sort: VcsProviderSort) -> String {
        match sort {
            VcsProviderSort::CreatedAtAsc | VcsProviderSort::CreatedAtDesc => {
                timestamp(&self.metadata.created_at)
            }
            VcsProviderSort::UpdatedAtAsc | VcsProviderSort::UpdatedAtDesc => {
                timestamp(&self.metadata.updated_at)
            }
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum ActivityEventSort {
    CreatedAtAsc,
    #[default]
    CreatedAtDesc,
}

sort_key!(ActivityEventSort {
    CreatedAtAsc => ("created_at", Asc),
    CreatedAtDesc => ("created_at", Desc),
});

impl Paginated<ActivityEventSort> for ActivityEvent {
    fn cursor_id(&self) -> &str {
        &self.id
    }

    fn sort_value(&self, _sort: ActivityEventSort) -> String {
        timestamp(&self.metadata.created_at)
    }
}
