//! HTTP request handlers - thin layer that delegates to domain service

use super::{
    dto::*,
    error::{map_domain_error, Problem},
    mapper::decode_operation,
};
use crate::contract::ActingUser;
use crate::domain::Service;
use axum::{
    extract::{rejection::JsonRejection, Path},
    http::HeaderMap,
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

/// Header carrying the authenticated user id, set by the auth gateway
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the user's "auto-sort cues" preference
pub const AUTO_SORT_HEADER: &str = "x-auto-sort-cues";

/// Build the acting user from gateway headers
pub fn acting_user(headers: &HeaderMap) -> Result<ActingUser, Problem> {
    let unauthorized = |detail: &str| {
        Problem::new(StatusCode::UNAUTHORIZED, "Unauthorized").with_detail(detail.to_string())
    };

    let raw = headers
        .get(USER_ID_HEADER)
        .ok_or_else(|| unauthorized("missing user identity"))?
        .to_str()
        .map_err(|_| unauthorized("malformed user identity"))?;
    let user_id = Uuid::parse_str(raw.trim()).map_err(|_| unauthorized("malformed user identity"))?;

    let auto_sort = headers
        .get(AUTO_SORT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false);

    Ok(ActingUser::new(user_id).with_auto_sort(auto_sort))
}

// ===== Script Handlers =====

/// Get a script
pub async fn get_script(
    service: Arc<Service>,
    Path(script_id): Path<Uuid>,
) -> Result<Json<ScriptDto>, Problem> {
    let script = service
        .get_script(script_id)
        .await
        .map_err(|e| map_domain_error(e).with_instance(format!("/scripts/{}", script_id)))?;

    Ok(Json(script.into()))
}

/// List the elements of a script in sequence order
pub async fn list_elements(
    service: Arc<Service>,
    Path(script_id): Path<Uuid>,
) -> Result<Json<ScriptElementsListResponse>, Problem> {
    let elements = service.get_elements(script_id).await.map_err(|e| {
        map_domain_error(e).with_instance(format!("/scripts/{}/elements", script_id))
    })?;

    let items: Vec<ScriptElementDto> = elements.into_iter().map(Into::into).collect();
    let total = items.len();

    Ok(Json(ScriptElementsListResponse { items, total }))
}

// ===== Batch Handlers =====

/// Apply a batch of edit operations
pub async fn process_batch(
    service: Arc<Service>,
    headers: HeaderMap,
    Path(script_id): Path<Uuid>,
    body: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchResultDto>, Problem> {
    let instance = format!("/scripts/{}/elements/batch", script_id);
    let user = acting_user(&headers)?;
    let Json(req) = body.map_err(|rejection| {
        Problem::new(rejection.status(), "Malformed Request")
            .with_detail(rejection.body_text())
            .with_instance(instance.clone())
    })?;

    let operations = req
        .operations
        .into_iter()
        .enumerate()
        .map(|(index, raw)| decode_operation(index, raw))
        .collect();

    let result = service
        .process_decoded_batch(script_id, operations, &user)
        .await
        .map_err(|e| map_domain_error(e).with_instance(instance))?;

    Ok(Json(result.into()))
}
