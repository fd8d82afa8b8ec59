use super::parse_id;
use crate::error::AppError;
use crate::extractors::{AdminUser, JsonBody};
use crate::models::{NewColor, NewMake};
use crate::response::{success_many, success_one, success_one_ok};
use crate::service::CatalogService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};

pub async fn list_makes(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(success_many(CatalogService::makes(&state.pool).await?))
}

pub async fn list_colors(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(success_many(CatalogService::colors(&state.pool).await?))
}

pub async fn create_make(
    State(state): State<AppState>,
    _admin: AdminUser,
    JsonBody(body): JsonBody<NewMake>,
) -> Result<impl IntoResponse, AppError> {
    Ok(success_one(CatalogService::create_make(&state.pool, &body).await?))
}

pub async fn create_color(
    State(state): State<AppState>,
    _admin: AdminUser,
    JsonBody(body): JsonBody<NewColor>,
) -> Result<impl IntoResponse, AppError> {
    Ok(success_one(CatalogService::create_color(&state.pool, &body).await?))
}

pub async fn delete_make(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    CatalogService::delete_make(&state.pool, id).await?;
    Ok(success_one_ok(serde_json::json!({ "id": id })))
}

pub async fn delete_color(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    CatalogService::delete_color(&state.pool, id).await?;
    Ok(success_one_ok(serde_json::json!({ "id": id })))
}
