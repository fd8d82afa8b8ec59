//! Public car browsing: search, featured, details, filters, slot availability.

use super::{current_year, local_now, parse_date, parse_id};
use crate::error::AppError;
use crate::extractors::MaybeUser;
use crate::models::CarDetail;
use crate::response::{success_many, success_one_ok};
use crate::service::{
    query_parse, query_text, AvailabilityService, BookingService, CarSearchParams, CarService, DealershipService,
};
use crate::sql::PageWindow;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use std::collections::HashMap;

pub async fn search(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Query(query): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let params = CarSearchParams::from_query(&query)?;
    let page = CarService::search(&state.pool, &params, viewer.id(), current_year()).await?;
    Ok(success_one_ok(page))
}

pub async fn featured(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Query(query): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let limit = PageWindow::clamp_limit(query_parse(&query, "limit")?);
    let cars = CarService::featured(&state.pool, limit, viewer.id()).await?;
    Ok(success_many(cars))
}

pub async fn detail(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let car = CarService::get(&state.pool, id, viewer.id()).await?;
    let active_booking = match viewer.id() {
        Some(user_id) => BookingService::active_for_car(&state.pool, user_id, id).await?,
        None => None,
    };
    let dealership = DealershipService::get_or_create(&state.pool).await?;
    Ok(success_one_ok(CarDetail {
        car,
        active_booking,
        dealership,
    }))
}

pub async fn filters(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(success_one_ok(CarService::filters(&state.pool).await?))
}

pub async fn availability(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let date = query_text(&query, "date").ok_or_else(|| AppError::BadRequest("date is required".into()))?;
    let date = parse_date(&date)?;
    let availability = AvailabilityService::for_car(
        &state.pool,
        id,
        date,
        state.settings.booking.slot_minutes,
        local_now(),
    )
    .await?;
    Ok(success_one_ok(availability))
}
