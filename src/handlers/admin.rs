//! Back office: cars, bookings, users and the dashboard. Every handler requires an admin.

use super::{current_year, parse_id};
use crate::error::AppError;
use crate::extractors::{AdminUser, JsonBody};
use crate::models::{BookingStatus, CarPatch, CarStatus, RoleUpdate, StatusUpdate};
use crate::response::{success_many, success_one, success_one_ok};
use crate::service::{
    query_parse, query_text, BookingService, CarService, DashboardService, RequestValidator, UserService,
    MAX_IMAGES_PER_CAR,
};
use crate::sql::PageWindow;
use crate::state::AppState;
use crate::storage::ImageUpload;
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    response::IntoResponse,
};
use std::collections::HashMap;

/// Multipart field carrying image files; every other field is a text form value.
pub const IMAGES_FIELD: &str = "images";

fn window(query: &HashMap<String, String>) -> Result<PageWindow, AppError> {
    Ok(PageWindow::new(query_parse(query, "page")?, query_parse(query, "limit")?))
}

pub async fn list_cars(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let status = query_text(&query, "status").map(|s| s.parse::<CarStatus>()).transpose()?;
    let page = CarService::admin_list(&state.pool, query_text(&query, "search"), status, window(&query)?).await?;
    Ok(success_one_ok(page))
}

fn multipart_error(e: MultipartError) -> AppError {
    AppError::BadRequest(format!("multipart: {}", e.body_text()))
}

/// Split a car form into its text fields and image files.
async fn read_car_form(mut multipart: Multipart) -> Result<(HashMap<String, String>, Vec<ImageUpload>), AppError> {
    let mut fields = HashMap::new();
    let mut images = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == IMAGES_FIELD {
            let content_type = field.content_type().unwrap_or_default().to_string();
            if !content_type.starts_with("image/") {
                return Err(AppError::Validation(format!(
                    "images must be image files, got '{}'",
                    content_type
                )));
            }
            if images.len() == MAX_IMAGES_PER_CAR {
                return Err(AppError::Validation(format!("at most {} images per car", MAX_IMAGES_PER_CAR)));
            }
            let file_name = field.file_name().map(String::from);
            let bytes = field.bytes().await.map_err(multipart_error)?;
            if bytes.is_empty() {
                continue;
            }
            images.push(ImageUpload {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
        } else if !name.is_empty() {
            let value = field.text().await.map_err(multipart_error)?;
            fields.insert(name, value);
        }
    }
    Ok((fields, images))
}

pub async fn create_car(
    State(state): State<AppState>,
    _admin: AdminUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (fields, images) = read_car_form(multipart).await?;
    let car = RequestValidator::car_form(&fields, current_year())?;
    tracing::debug!(
        images = images.len(),
        files = ?images.iter().map(|i| i.file_name.as_deref().unwrap_or("")).collect::<Vec<_>>(),
        "car form received"
    );
    let created = CarService::create(&state.pool, state.storage.as_ref(), car, images).await?;
    Ok(success_one(created))
}

pub async fn update_car(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<CarPatch>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    RequestValidator::car_patch(&patch, current_year())?;
    Ok(success_one_ok(CarService::update(&state.pool, id, &patch).await?))
}

pub async fn delete_car(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    CarService::delete(&state.pool, state.storage.as_ref(), id).await?;
    Ok(success_one_ok(serde_json::json!({ "id": id })))
}

pub async fn list_bookings(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let status = query_text(&query, "status").map(|s| s.parse::<BookingStatus>()).transpose()?;
    let page = BookingService::admin_list(&state.pool, status, query_text(&query, "search"), window(&query)?).await?;
    Ok(success_one_ok(page))
}

pub async fn update_booking_status(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<StatusUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    Ok(success_one_ok(BookingService::update_status(&state.pool, id, body.status).await?))
}

pub async fn list_users(State(state): State<AppState>, _admin: AdminUser) -> Result<impl IntoResponse, AppError> {
    Ok(success_many(UserService::list(&state.pool).await?))
}

pub async fn set_user_role(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<RoleUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    Ok(success_one_ok(UserService::set_role(&state.pool, admin.id, id, body.role).await?))
}

pub async fn dashboard(State(state): State<AppState>, _admin: AdminUser) -> Result<impl IntoResponse, AppError> {
    Ok(success_one_ok(DashboardService::stats(&state.pool).await?))
}
