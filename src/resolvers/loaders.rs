//! Batch loaders backed by the service catalog

use async_trait::async_trait;
use futures_util::future::{BoxFuture, FutureExt};
use std::collections::HashMap;

use crate::config::LoaderConfig;
use crate::dataloaders::{BatchLoader, LoaderRegistry};
use crate::errors::ServiceResult;
use crate::gid::ModelType;
use crate::models::{
    Group, NamespaceMembership, Role, Run, ServiceAccount, Team, TerraformModule,
    TerraformModuleVersion, TerraformProvider, User, VcsProvider, Workspace,
};
use crate::services::ServiceCatalog;

/// Entity with a local ID
pub trait Identified {
    fn local_id(&self) -> &str;
}

macro_rules! identified {
    ($($model:ty),+ $(,)?) => {
        $(impl Identified for $model {
            fn local_id(&self) -> &str {
                &self.id
            }
        })+
    };
}

identified!(
    User,
    ServiceAccount,
    Group,
    Workspace,
    NamespaceMembership,
    Team,
    Role,
    Run,
    TerraformModule,
    TerraformModuleVersion,
    TerraformProvider,
    VcsProvider,
);

type Fetch<V> = Box<dyn Fn(Vec<String>) -> BoxFuture<'static, ServiceResult<Vec<V>>> + Send + Sync>;

/// Adapts a service's get-by-IDs call to [`BatchLoader`]
pub struct ServiceLoader<V> {
    fetch: Fetch<V>,
}

impl<V> ServiceLoader<V> {
    pub fn new<F>(fetch: F) -> Self
    where
        F: Fn(Vec<String>) -> BoxFuture<'static, ServiceResult<Vec<V>>> + Send + Sync + 'static,
    {
        Self {
            fetch: Box::new(fetch),
        }
    }
}

#[async_trait]
impl<V> BatchLoader<String, V> for ServiceLoader<V>
where
    V: Identified + Send + Sync + Clone + 'static,
{
    async fn load_batch(&self, keys: &[String]) -> ServiceResult<HashMap<String, V>> {
        let values = (self.fetch)(keys.to_vec()).await?;
        Ok(values
            .into_iter()
            .map(|value| (value.local_id().to_string(), value))
            .collect())
    }
}

macro_rules! register {
    ($registry:ident, $kind:expr, $service:expr, $method:ident, $model:ty) => {{
        let service = $service.clone();
        $registry.register::<$model, _>(
            $kind,
            ServiceLoader::new(move |ids: Vec<String>| {
                let service = service.clone();
                async move { service.$method(&ids).await }.boxed()
            }),
        );
    }};
}

/// Build a fresh registry for one inbound request
pub fn build_registry(catalog: &ServiceCatalog, config: LoaderConfig) -> LoaderRegistry {
    let mut registry = LoaderRegistry::new(config);

    register!(registry, ModelType::User, catalog.users, get_users_by_ids, User);
    register!(
        registry,
        ModelType::ServiceAccount,
        catalog.service_accounts,
        get_service_accounts_by_ids,
        ServiceAccount
    );
    register!(registry, ModelType::Group, catalog.groups, get_groups_by_ids, Group);
    register!(
        registry,
        ModelType::Workspace,
        catalog.workspaces,
        get_workspaces_by_ids,
        Workspace
    );
    register!(
        registry,
        ModelType::NamespaceMembership,
        catalog.memberships,
        get_namespace_memberships_by_ids,
        NamespaceMembership
    );
    register!(registry, ModelType::Team, catalog.teams, get_teams_by_ids, Team);
    register!(registry, ModelType::Role, catalog.roles, get_roles_by_ids, Role);
    register!(registry, ModelType::Run, catalog.runs, get_runs_by_ids, Run);
    register!(
        registry,
        ModelType::TerraformModule,
        catalog.modules,
        get_modules_by_ids,
        TerraformModule
    );
    register!(
        registry,
        ModelType::TerraformModuleVersion,
        catalog.modules,
        get_module_versions_by_ids,
        TerraformModuleVersion
    );
    register!(
        registry,
        ModelType::TerraformProvider,
        catalog.providers,
        get_providers_by_ids,
        TerraformProvider
    );
    register!(
        registry,
        ModelType::VcsProvider,
        catalog.vcs,
        get_vcs_providers_by_ids,
        VcsProvider
    );

    registry
}
