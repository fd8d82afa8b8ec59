use crate::error::AppError;
use crate::extractors::{AdminUser, JsonBody, MaybeUser};
use crate::response::success_one_ok;
use crate::service::HomeService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::Value;

pub async fn page(State(state): State<AppState>, viewer: MaybeUser) -> Result<impl IntoResponse, AppError> {
    Ok(success_one_ok(HomeService::page(&state.pool, viewer.id()).await?))
}

pub async fn upsert_section(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(section): Path<String>,
    JsonBody(content): JsonBody<Value>,
) -> Result<impl IntoResponse, AppError> {
    Ok(success_one_ok(HomeService::upsert(&state.pool, &section, content).await?))
}

pub async fn delete_section(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(section): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    HomeService::delete(&state.pool, &section).await?;
    Ok(success_one_ok(serde_json::json!({ "section": section })))
}
