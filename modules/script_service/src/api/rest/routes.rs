//! Route registration

use super::{dto::*, error::Problem, handlers};
use crate::domain::Service;
use axum::{
    extract::{rejection::JsonRejection, Path},
    http::HeaderMap,
    routing::{get, post},
    Extension, Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

/// Register all REST routes
pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    router
        .route("/scripts/{script_id}", get(get_script_handler))
        .route("/scripts/{script_id}/elements", get(list_elements_handler))
        .route("/scripts/{script_id}/elements/batch", post(process_batch_handler))
        // Add service as extension for handlers
        .layer(Extension(service))
}

// ===== Handler wrappers that extract service from Extension =====

async fn get_script_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<Uuid>,
) -> Result<Json<ScriptDto>, Problem> {
    handlers::get_script(service, path).await
}

async fn list_elements_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<Uuid>,
) -> Result<Json<ScriptElementsListResponse>, Problem> {
    handlers::list_elements(service, path).await
}

async fn process_batch_handler(
    Extension(service): Extension<Arc<Service>>,
    headers: HeaderMap,
    path: Path<Uuid>,
    body: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchResultDto>, Problem> {
    handlers::process_batch(service, headers, path, body).await
}
