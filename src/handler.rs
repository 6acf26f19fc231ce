//! Axum handler and per-request loader wiring

use async_graphql::{Request, Response};
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    Json,
};
use tracing::Instrument;

use crate::config::LoaderConfig;
use crate::dataloaders::LoaderRegistry;
use crate::errors::ErrorCode;
use crate::resolvers::loaders::build_registry;
use crate::schema::ApiSchema;
use crate::services::ServiceCatalog;

/// Builds one [`LoaderRegistry`] per inbound request
#[derive(Clone)]
pub struct LoaderFactory {
    catalog: ServiceCatalog,
    config: LoaderConfig,
}

impl LoaderFactory {
    pub fn new(catalog: ServiceCatalog, config: LoaderConfig) -> Self {
        Self { catalog, config }
    }

    pub fn registry(&self) -> LoaderRegistry {
        build_registry(&self.catalog, self.config)
    }
}

/// Extract the caller-supplied request ID, if any
pub fn extract_request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn is_unauthorized(response: &Response) -> bool {
    let code = ErrorCode::Unauthorized.as_extension();
    response.errors.iter().any(|err| {
        err.extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .map_or(false, |value| *value == async_graphql::Value::from(code))
    })
}

/// Standard GraphQL handler
///
/// Every request gets a fresh loader registry so batched and cached
/// entities never leak across callers. A response carrying an
/// `UNAUTHORIZED` error is answered with HTTP 401.
///
/// # Example
///
/// ```rust,no_run
/// use axum::{routing::post, Extension, Router};
/// use pleme_graphql_resolvers::{build_schema, graphql_handler, LoaderFactory, ResolverConfig, ServiceCatalog};
///
/// # fn example(catalog: ServiceCatalog) {
/// let config = ResolverConfig::default();
/// let app: Router = Router::new()
///     .route("/graphql", post(graphql_handler))
///     .layer(Extension(build_schema(catalog.clone(), config.clone())))
///     .layer(Extension(LoaderFactory::new(catalog, config.loaders)));
/// # }
/// ```
pub async fn graphql_handler(
    Extension(schema): Extension<ApiSchema>,
    Extension(factory): Extension<LoaderFactory>,
    headers: HeaderMap,
    req: Json<Request>,
) -> (StatusCode, Json<Response>) {
    let request_id = extract_request_id(&headers).unwrap_or_default();
    let span = tracing::info_span!(
        "graphql_request",
        request_id = %request_id,
        operation = req.0.operation_name.as_deref().unwrap_or("anonymous"),
    );

    let request = req.0.data(factory.registry());
    let response = schema.execute(request).instrument(span).await;

    let status = if is_unauthorized(&response) {
        tracing::debug!(request_id = %request_id, "request rejected as unauthorized");
        StatusCode::UNAUTHORIZED
    } else {
        StatusCode::OK
    };
    (status, Json(response))
}
