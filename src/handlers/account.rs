//! Signed-in customer surface: profile, wishlist and own bookings.

use super::{local_now, parse_id};
use crate::error::AppError;
use crate::extractors::{CurrentUser, JsonBody};
use crate::models::{BookingRequest, WishlistToggle};
use crate::response::{success_many, success_one, success_one_ok};
use crate::service::{BookingService, WishlistService};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};

pub async fn me(CurrentUser(user): CurrentUser) -> Result<impl IntoResponse, AppError> {
    Ok(success_one_ok(user))
}

pub async fn toggle_wishlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(car_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let car_id = parse_id(&car_id)?;
    let saved = WishlistService::toggle(&state.pool, user.id, car_id).await?;
    Ok(success_one_ok(WishlistToggle { saved }))
}

pub async fn wishlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(success_many(WishlistService::list(&state.pool, user.id).await?))
}

pub async fn create_booking(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    JsonBody(body): JsonBody<BookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking = BookingService::create(
        &state.pool,
        user.id,
        &body,
        state.settings.booking.slot_minutes,
        local_now(),
    )
    .await?;
    Ok(success_one(booking))
}

pub async fn my_bookings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(success_many(BookingService::list_for_user(&state.pool, user.id).await?))
}

pub async fn cancel_booking(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    Ok(success_one_ok(BookingService::cancel(&state.pool, user.id, id).await?))
}
