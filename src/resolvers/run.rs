//! Runs, run mutations and the run event subscription

use std::sync::Arc;

use async_graphql::{Context, InputObject, Object, Result, SimpleObject, Subscription, ID};
use futures_util::{Stream, StreamExt};

use crate::dataloaders::LoaderRegistry;

use crate::errors::{ServiceResult, ServiceResultExt};
use crate::gid::{to_gid, ModelType};
use crate::models::{Run, RunStatus, Workspace};
use crate::pagination::{Connection, PaginationInput};
use crate::resolvers::namespace::{workspace_id as resolve_workspace_id, WorkspaceNode};
use crate::resolvers::{catalog, checked, config, decode_id, loader_factory, registry, settle, window};
use crate::services::{CancelRunInput, CreateRunInput, GetRunsInput, RunEventsInput, ServiceCatalog};
use crate::sorting::RunSort;
use crate::subscriptions::pump;
use crate::types::ResourceMetadata;

#[derive(Clone)]
pub struct RunNode {
    pub run: Run,
    // Set for subscription events, which outlive any single registry.
    loaders: Option<Arc<LoaderRegistry>>,
}

impl From<Run> for RunNode {
    fn from(run: Run) -> Self {
        Self { run, loaders: None }
    }
}

impl std::fmt::Debug for RunNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RunNode").field(&self.run).finish()
    }
}

impl RunNode {
    /// Resolve nested entities through `loaders` rather than the request's registry
    fn scoped(run: Run, loaders: LoaderRegistry) -> Self {
        Self {
            run,
            loaders: Some(Arc::new(loaders)),
        }
    }

    fn loaders<'a>(&'a self, ctx: &'a Context<'_>) -> Result<&'a LoaderRegistry> {
        match &self.loaders {
            Some(loaders) => Ok(loaders),
            None => registry(ctx),
        }
    }
}

#[Object(name = "Run")]
impl RunNode {
    async fn id(&self) -> ID {
        to_gid(ModelType::Run, &self.run.id)
    }

    async fn metadata(&self) -> ResourceMetadata {
        (&self.run.metadata).into()
    }

    async fn status(&self) -> RunStatus {
        self.run.status
    }

    async fn is_destroy(&self) -> bool {
        self.run.is_destroy
    }

    async fn comment(&self) -> Option<&str> {
        self.run.comment.as_deref()
    }

    async fn module_source(&self) -> Option<&str> {
        self.run.module_source.as_deref()
    }

    async fn module_version(&self) -> Option<&str> {
        self.run.module_version.as_deref()
    }

    async fn force_canceled(&self) -> bool {
        self.run.force_canceled
    }

    async fn created_by(&self) -> &str {
        &self.run.created_by
    }

    async fn workspace(&self, ctx: &Context<'_>) -> Result<WorkspaceNode> {
        self.loaders(ctx)?
            .require::<Workspace>(ModelType::Workspace, &self.run.workspace_id)
            .await
            .map(WorkspaceNode)
            .into_gql()
    }
}

#[derive(SimpleObject)]
#[graphql(name = "RunEvent")]
pub struct RunEventNode {
    pub action: String,
    pub run: RunNode,
}

#[derive(Default)]
pub struct RunQuery;

#[Object]
impl RunQuery {
    /// Runs of one workspace, or of every workspace when neither is given
    async fn runs(
        &self,
        ctx: &Context<'_>,
        workspace_id: Option<ID>,
        workspace_path: Option<String>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
        sort: Option<RunSort>,
    ) -> Result<Connection<RunNode>> {
        let services = catalog(ctx)?;
        let sort = sort.unwrap_or_default();
        let pagination = window(ctx, sort, PaginationInput::new(first, last, after, before))?;
        let workspace_id = match (workspace_id, workspace_path) {
            (None, None) => None,
            (id, path) => Some(resolve_workspace_id(services, id, path).await.into_gql()?),
        };
        let page = services
            .runs
            .get_runs(GetRunsInput {
                workspace_id,
                sort,
                pagination,
            })
            .await
            .into_gql()?;
        checked(Connection::build(page, sort, RunNode::from))
    }

    async fn run(&self, ctx: &Context<'_>, id: ID) -> Result<RunNode> {
        let id = decode_id(&id, ModelType::Run).into_gql()?;
        registry(ctx)?
            .require::<Run>(ModelType::Run, &id)
            .await
            .map(RunNode::from)
            .into_gql()
    }
}

#[derive(InputObject)]
#[graphql(name = "CreateRunInput")]
pub struct CreateRunMutation {
    pub client_mutation_id: Option<String>,
    pub workspace_id: Option<ID>,
    pub workspace_path: Option<String>,
    #[graphql(default)]
    pub is_destroy: bool,
    pub comment: Option<String>,
    pub module_source: Option<String>,
    pub module_version: Option<String>,
}

#[derive(InputObject)]
#[graphql(name = "CancelRunInput")]
pub struct CancelRunMutation {
    pub client_mutation_id: Option<String>,
    pub run_id: ID,
    pub version: Option<i32>,
    #[graphql(default)]
    pub force: bool,
}

mutation_payload!(RunMutationPayload { run: RunNode });

async fn create_run(services: &ServiceCatalog, input: CreateRunMutation) -> ServiceResult<Run> {
    let workspace_id = resolve_workspace_id(services, input.workspace_id, input.workspace_path).await?;
    services
        .runs
        .create_run(CreateRunInput {
            workspace_id,
            is_destroy: input.is_destroy,
            comment: input.comment,
            module_source: input.module_source,
            module_version: input.module_version,
        })
        .await
}

async fn cancel_run(services: &ServiceCatalog, input: CancelRunMutation) -> ServiceResult<Run> {
    let run_id = decode_id(&input.run_id, ModelType::Run)?;
    services
        .runs
        .cancel_run(CancelRunInput {
            run_id,
            version: input.version,
            force: input.force,
        })
        .await
}

#[derive(Default)]
pub struct RunMutation;

#[Object]
impl RunMutation {
    async fn create_run(&self, ctx: &Context<'_>, input: CreateRunMutation) -> Result<RunMutationPayload> {
        let client_mutation_id = input.client_mutation_id.clone();
        let result = create_run(catalog(ctx)?, input).await;
        settle(result, client_mutation_id, |cmid, run| RunMutationPayload::ok(cmid, run.into()))
    }

    async fn cancel_run(&self, ctx: &Context<'_>, input: CancelRunMutation) -> Result<RunMutationPayload> {
        let client_mutation_id = input.client_mutation_id.clone();
        let result = cancel_run(catalog(ctx)?, input).await;
        settle(result, client_mutation_id, |cmid, run| RunMutationPayload::ok(cmid, run.into()))
    }
}

#[derive(Default)]
pub struct RunSubscription;

#[Subscription]
impl RunSubscription {
    /// Run changes within a workspace, optionally narrowed to one run
    async fn workspace_run_events(
        &self,
        ctx: &Context<'_>,
        workspace_id: Option<ID>,
        workspace_path: Option<String>,
        run_id: Option<ID>,
    ) -> Result<impl Stream<Item = Result<RunEventNode>>> {
        let services = catalog(ctx)?;
        let workspace_id = resolve_workspace_id(services, workspace_id, workspace_path)
            .await
            .into_gql()?;
        let run_id = run_id
            .map(|id| decode_id(&id, ModelType::Run))
            .transpose()
            .into_gql()?;

        tracing::debug!(workspace = %workspace_id, run = ?run_id, "subscribing to run events");
        let source = services
            .runs
            .subscribe_to_run_events(RunEventsInput {
                workspace_id,
                run_id,
            })
            .await
            .into_gql()?;

        let factory = loader_factory(ctx)?.clone();
        let (events, _producer) = pump(source, config(ctx)?.subscriptions.buffer_size);
        Ok(events.map(move |event| {
            event
                .map(|event| RunEventNode {
                    action: event.action,
                    run: RunNode::scoped(event.run, factory.registry()),
                })
                .into_gql()
        }))
    }
}
