//! Test drive bookings and slot availability.

use crate::error::AppError;
use crate::models::{hhmm, BookingStatus};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Column list matching [`BookingRow`]; bookings `b`, cars `c`, makes `m`, users `u`.
pub const BOOKING_COLUMNS: &str = "b.id, b.car_id, b.user_id, b.booking_date, b.start_time, b.end_time, \
     b.status, b.notes, b.created_at, b.updated_at, m.name AS car_make, c.model AS car_model, \
     c.year AS car_year, c.images[1] AS car_image, u.name AS user_name, u.email AS user_email";

pub const BOOKING_FROM: &str = "test_drive_bookings b JOIN cars c ON c.id = b.car_id \
     JOIN car_makes m ON m.id = c.make_id JOIN users u ON u.id = b.user_id";

#[derive(Clone, Debug, FromRow)]
pub struct BookingRow {
    pub id: Uuid,
    pub car_id: Uuid,
    pub user_id: Uuid,
    pub booking_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub car_make: String,
    pub car_model: String,
    pub car_year: i32,
    pub car_image: Option<String>,
    pub user_name: Option<String>,
    pub user_email: String,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingCar {
    pub id: Uuid,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub image: Option<String>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingUser {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    #[schema(value_type = String, example = "2025-06-02")]
    pub booking_date: NaiveDate,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "10:00")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "11:00")]
    pub end_time: NaiveTime,
    pub status: BookingStatus,
    pub notes: Option<String>,
    pub car: BookingCar,
    pub user: BookingUser,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<BookingRow> for Booking {
    type Error = AppError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            booking_date: row.booking_date,
            start_time: row.start_time,
            end_time: row.end_time,
            status: row.status.parse().map_err(|e: AppError| AppError::Internal(e.to_string()))?,
            notes: row.notes,
            car: BookingCar {
                id: row.car_id,
                make: row.car_make,
                model: row.car_model,
                year: row.car_year,
                image: row.car_image,
            },
            user: BookingUser {
                id: row.user_id,
                name: row.user_name,
                email: row.user_email,
            },
            created_at: row.created_at.to_rfc3339(),
            updated_at: row.updated_at.to_rfc3339(),
        })
    }
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub car_id: Uuid,
    #[schema(value_type = String, example = "2025-06-02")]
    pub booking_date: NaiveDate,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "10:00")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "11:00")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct StatusUpdate {
    pub status: BookingStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "09:00")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "10:00")]
    pub end_time: NaiveTime,
    pub available: bool,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    #[schema(value_type = String, example = "2025-06-02")]
    pub date: NaiveDate,
    pub is_open: bool,
    pub slots: Vec<TimeSlot>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingPage {
    pub bookings: Vec<Booking>,
    pub pagination: crate::models::Pagination,
}
