//! Car rows as read from the database and their API shape.

use crate::error::AppError;
use crate::models::{BodyType, CarStatus, FuelType, Transmission};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Column list matching [`CarRow`]; cars aliased `c`, makes `m`, colors `col`.
pub const CAR_COLUMNS: &str = "c.id, c.make_id, m.name AS make_name, m.slug AS make_slug, c.model, c.year, \
     c.price::text AS price, c.mileage, c.color_id, col.name AS color_name, col.slug AS color_slug, \
     col.hex_code AS color_hex, c.fuel_type, c.transmission, c.body_type, c.seats, c.description, \
     c.status, c.featured, c.images, c.created_at, c.updated_at";

/// FROM clause joining makes and colors for [`CAR_COLUMNS`].
pub const CAR_FROM: &str = "cars c JOIN car_makes m ON m.id = c.make_id JOIN car_colors col ON col.id = c.color_id";

#[derive(Clone, Debug, FromRow)]
pub struct CarRow {
    pub id: Uuid,
    pub make_id: Uuid,
    pub make_name: String,
    pub make_slug: String,
    pub model: String,
    pub year: i32,
    /// NUMERIC selected as text.
    pub price: String,
    pub mileage: i32,
    pub color_id: Uuid,
    pub color_name: String,
    pub color_slug: String,
    pub color_hex: String,
    pub fuel_type: String,
    pub transmission: String,
    pub body_type: String,
    pub seats: Option<i32>,
    pub description: String,
    pub status: String,
    pub featured: bool,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarRef {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColorRef {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub hex_code: String,
}

/// Car as returned to clients.
#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: Uuid,
    pub make: CarRef,
    pub model: String,
    pub year: i32,
    pub price: f64,
    pub mileage: i32,
    pub color: ColorRef,
    pub fuel_type: FuelType,
    pub transmission: Transmission,
    pub body_type: BodyType,
    pub seats: Option<i32>,
    pub description: String,
    pub status: CarStatus,
    pub featured: bool,
    pub images: Vec<String>,
    pub wishlisted: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Convert a row into the client shape: numeric price text becomes a number, timestamps RFC 3339 strings.
pub fn serialize_car(row: CarRow, wishlisted: bool) -> Result<Car, AppError> {
    let price: f64 = row
        .price
        .trim()
        .parse()
        .map_err(|_| AppError::Internal(format!("car {}: unparsable price '{}'", row.id, row.price)))?;
    Ok(Car {
        id: row.id,
        make: CarRef {
            id: row.make_id,
            name: row.make_name,
            slug: row.make_slug,
        },
        model: row.model,
        year: row.year,
        price,
        mileage: row.mileage,
        color: ColorRef {
            id: row.color_id,
            name: row.color_name,
            slug: row.color_slug,
            hex_code: row.color_hex,
        },
        fuel_type: row.fuel_type.parse().map_err(stored_enum)?,
        transmission: row.transmission.parse().map_err(stored_enum)?,
        body_type: row.body_type.parse().map_err(stored_enum)?,
        seats: row.seats,
        description: row.description,
        status: row.status.parse().map_err(stored_enum)?,
        featured: row.featured,
        images: row.images,
        wishlisted,
        created_at: row.created_at.to_rfc3339(),
        updated_at: row.updated_at.to_rfc3339(),
    })
}

/// A stored value outside the CHECK list means the schema drifted; not the client's fault.
fn stored_enum(e: AppError) -> AppError {
    AppError::Internal(e.to_string())
}

/// Validated car form, ready to insert.
#[derive(Clone, Debug, PartialEq)]
pub struct NewCar {
    pub make_id: Uuid,
    pub model: String,
    pub year: i32,
    pub price: f64,
    pub mileage: i32,
    pub color_id: Uuid,
    pub fuel_type: FuelType,
    pub transmission: Transmission,
    pub body_type: BodyType,
    pub seats: Option<i32>,
    pub description: String,
    pub status: CarStatus,
    pub featured: bool,
}

/// Partial update from the admin edit form.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CarPatch {
    pub make_id: Option<Uuid>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub price: Option<f64>,
    pub mileage: Option<i32>,
    pub color_id: Option<Uuid>,
    pub fuel_type: Option<FuelType>,
    pub transmission: Option<Transmission>,
    pub body_type: Option<BodyType>,
    /// `null` clears the seat count.
    #[serde(default, deserialize_with = "crate::models::nullable::deserialize")]
    #[schema(value_type = Option<i32>)]
    pub seats: Option<Option<i32>>,
    pub description: Option<String>,
    pub status: Option<CarStatus>,
    pub featured: Option<bool>,
}

impl CarPatch {
    pub fn is_empty(&self) -> bool {
        self.make_id.is_none()
            && self.model.is_none()
            && self.year.is_none()
            && self.price.is_none()
            && self.mileage.is_none()
            && self.color_id.is_none()
            && self.fuel_type.is_none()
            && self.transmission.is_none()
            && self.body_type.is_none()
            && self.seats.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.featured.is_none()
    }
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub pages: u32,
}

impl Pagination {
    pub fn new(total: i64, page: u32, limit: u32) -> Self {
        let limit = limit.max(1);
        let total_u = total.max(0) as u64;
        let pages = total_u.div_ceil(limit as u64) as u32;
        Pagination { total, page, limit, pages }
    }
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarPage {
    pub cars: Vec<Car>,
    pub pagination: Pagination,
}

/// Car page payload: the car, the viewer's active booking for it and where to come see it.
#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarDetail {
    pub car: Car,
    pub active_booking: Option<crate::models::Booking>,
    pub dealership: crate::models::Dealership,
}

#[derive(Clone, Copy, Debug, Serialize, ToSchema)]
pub struct WishlistToggle {
    pub saved: bool,
}

#[cfg(test)]
pub(crate) fn sample_row() -> CarRow {
    use chrono::TimeZone;
    CarRow {
        id: Uuid::nil(),
        make_id: Uuid::from_u128(1),
        make_name: "Toyota".into(),
        make_slug: "toyota".into(),
        model: "Corolla".into(),
        year: 2021,
        price: "18999.50".into(),
        mileage: 25000,
        color_id: Uuid::from_u128(2),
        color_name: "Red".into(),
        color_slug: "red".into(),
        color_hex: "#FF0000".into(),
        fuel_type: "HYBRID".into(),
        transmission: "AUTOMATIC".into(),
        body_type: "SEDAN".into(),
        seats: Some(5),
        description: "One owner, full service history".into(),
        status: "AVAILABLE".into(),
        featured: false,
        images: vec!["https://cdn/cars/a.jpg".into()],
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_converts_numeric_strings_and_dates() {
        let car = serialize_car(sample_row(), true).unwrap();
        assert_eq!(car.price, 18999.5);
        assert_eq!(car.created_at, "2024-03-01T12:30:00+00:00");
        assert_eq!(car.fuel_type, FuelType::Hybrid);
        assert!(car.wishlisted);

        let v = serde_json::to_value(&car).unwrap();
        assert!(v["price"].is_number());
        assert_eq!(v["bodyType"], "SEDAN");
        assert_eq!(v["make"]["slug"], "toyota");
        assert_eq!(v["color"]["hexCode"], "#FF0000");
        assert_eq!(v["updatedAt"], "2024-03-02T08:00:00+00:00");
    }

    #[test]
    fn serialize_rejects_garbage_price() {
        let mut row = sample_row();
        row.price = "n/a".into();
        assert!(matches!(serialize_car(row, false), Err(AppError::Internal(_))));
    }

    #[test]
    fn pagination_rounds_pages_up() {
        assert_eq!(Pagination::new(13, 1, 6).pages, 3);
        assert_eq!(Pagination::new(12, 2, 6).pages, 2);
        assert_eq!(Pagination::new(0, 1, 6).pages, 0);
    }

    #[test]
    fn patch_rejects_unknown_fields() {
        let res: Result<CarPatch, _> = serde_json::from_value(serde_json::json!({ "colour": "red" }));
        assert!(res.is_err());
        let patch: CarPatch = serde_json::from_value(serde_json::json!({ "featured": true })).unwrap();
        assert!(!patch.is_empty());
        assert!(CarPatch::default().is_empty());
    }
}
