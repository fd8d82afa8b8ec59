use crate::error::AppError;
use crate::extractors::{AdminUser, JsonBody};
use crate::models::{DealershipUpdate, WorkingHour};
use crate::response::success_one_ok;
use crate::service::{DealershipService, RequestValidator};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse};

pub async fn get(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(success_one_ok(DealershipService::get_or_create(&state.pool).await?))
}

pub async fn admin_get(State(state): State<AppState>, _admin: AdminUser) -> Result<impl IntoResponse, AppError> {
    Ok(success_one_ok(DealershipService::get_or_create(&state.pool).await?))
}

pub async fn update(
    State(state): State<AppState>,
    _admin: AdminUser,
    JsonBody(body): JsonBody<DealershipUpdate>,
) -> Result<impl IntoResponse, AppError> {
    RequestValidator::dealership(&body)?;
    Ok(success_one_ok(DealershipService::update(&state.pool, &body).await?))
}

pub async fn replace_hours(
    State(state): State<AppState>,
    _admin: AdminUser,
    JsonBody(hours): JsonBody<Vec<WorkingHour>>,
) -> Result<impl IntoResponse, AppError> {
    RequestValidator::working_hours(&hours)?;
    Ok(success_one_ok(DealershipService::replace_hours(&state.pool, &hours).await?))
}
