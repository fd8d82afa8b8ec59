//! Car search, details and admin CRUD.

use crate::error::AppError;
use crate::models::{
    serialize_car, BodyType, Car, CarFilters, CarPage, CarPatch, CarRow, CarStatus, FilterOption, FuelType, NewCar,
    Pagination, PriceRange, Transmission, CAR_COLUMNS, CAR_FROM,
};
use crate::sql::{count_cars, select_cars, select_wishlisted, years_from_ages, CarFilter, CarSort, PageWindow, PgBindValue, QueryBuf};
use crate::storage::{car_image_key, ImageUpload, ObjectStore};
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

pub const MAX_IMAGES_PER_CAR: usize = 10;

/// Query parameters of the public car search, parsed from the raw query map.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CarSearchParams {
    pub search: Option<String>,
    pub make: Option<String>,
    pub color: Option<String>,
    pub body_type: Option<BodyType>,
    pub fuel_type: Option<FuelType>,
    pub transmission: Option<Transmission>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_mileage: Option<i32>,
    pub max_mileage: Option<i32>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub sort: CarSort,
    pub window: PageWindow,
}

/// Non-empty trimmed value of `key`.
pub(crate) fn query_text(query: &HashMap<String, String>, key: &str) -> Option<String> {
    query.get(key).map(|s| s.trim()).filter(|s| !s.is_empty()).map(String::from)
}

/// Parse `key` when present; empty counts as absent.
pub(crate) fn query_parse<T: std::str::FromStr>(query: &HashMap<String, String>, key: &str) -> Result<Option<T>, AppError> {
    query_text(query, key)
        .map(|s| {
            s.parse::<T>()
                .map_err(|_| AppError::BadRequest(format!("invalid {}: '{}'", key, s)))
        })
        .transpose()
}

impl CarSearchParams {
    pub fn from_query(query: &HashMap<String, String>) -> Result<Self, AppError> {
        Ok(CarSearchParams {
            search: query_text(query, "search"),
            make: query_text(query, "make").map(|s| s.to_lowercase()),
            color: query_text(query, "color").map(|s| s.to_lowercase()),
            body_type: query_text(query, "bodyType").map(|s| s.parse()).transpose()?,
            fuel_type: query_text(query, "fuelType").map(|s| s.parse()).transpose()?,
            transmission: query_text(query, "transmission").map(|s| s.parse()).transpose()?,
            min_price: query_parse(query, "minPrice")?,
            max_price: query_parse(query, "maxPrice")?,
            min_mileage: query_parse(query, "minMileage")?,
            max_mileage: query_parse(query, "maxMileage")?,
            min_age: query_parse(query, "minAge")?,
            max_age: query_parse(query, "maxAge")?,
            sort: query_text(query, "sortBy").map(|s| CarSort::parse(&s)).unwrap_or_default(),
            window: PageWindow::new(query_parse(query, "page")?, query_parse(query, "limit")?),
        })
    }
}

pub struct CarService;

impl CarService {
    /// Public search over AVAILABLE cars. Unknown make/color slugs give an empty page.
    pub async fn search(
        pool: &PgPool,
        params: &CarSearchParams,
        viewer: Option<Uuid>,
        current_year: i32,
    ) -> Result<CarPage, AppError> {
        let make_id = match &params.make {
            Some(slug) => match Self::id_for_slug(pool, "car_makes", slug).await? {
                Some(id) => Some(id),
                None => return Ok(empty_page(params.window)),
            },
            None => None,
        };
        let color_id = match &params.color {
            Some(slug) => match Self::id_for_slug(pool, "car_colors", slug).await? {
                Some(id) => Some(id),
                None => return Ok(empty_page(params.window)),
            },
            None => None,
        };
        let (min_year, max_year) = years_from_ages(current_year, params.min_age, params.max_age);
        let filter = CarFilter {
            search: params.search.clone(),
            status: Some(CarStatus::Available),
            featured: None,
            make_id,
            color_id,
            body_type: params.body_type,
            fuel_type: params.fuel_type,
            transmission: params.transmission,
            min_price: params.min_price,
            max_price: params.max_price,
            min_mileage: params.min_mileage,
            max_mileage: params.max_mileage,
            min_year,
            max_year,
        };
        Self::page(pool, &filter, params.sort, params.window, viewer).await
    }

    /// Admin listing: any status, optional text search and status filter.
    pub async fn admin_list(
        pool: &PgPool,
        search: Option<String>,
        status: Option<CarStatus>,
        window: PageWindow,
    ) -> Result<CarPage, AppError> {
        let filter = CarFilter {
            search,
            status,
            ..Default::default()
        };
        Self::page(pool, &filter, CarSort::Newest, window, None).await
    }

    pub async fn featured(pool: &PgPool, limit: u32, viewer: Option<Uuid>) -> Result<Vec<Car>, AppError> {
        let filter = CarFilter {
            status: Some(CarStatus::Available),
            featured: Some(true),
            ..Default::default()
        };
        let q = select_cars(&filter, CarSort::Newest, PageWindow::new(Some(1), Some(i64::from(limit))));
        tracing::debug!(sql = %q.sql, "featured cars");
        let rows: Vec<CarRow> = q.query_as().fetch_all(pool).await?;
        Self::with_wishlist(pool, rows, viewer).await
    }

    pub async fn get(pool: &PgPool, id: Uuid, viewer: Option<Uuid>) -> Result<Car, AppError> {
        let row = Self::row(pool, id).await?.ok_or_else(|| AppError::NotFound(format!("car {}", id)))?;
        let mut cars = Self::with_wishlist(pool, vec![row], viewer).await?;
        cars.pop().ok_or_else(|| AppError::NotFound(format!("car {}", id)))
    }

    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM cars WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(exists)
    }

    pub async fn status(pool: &PgPool, id: Uuid) -> Result<Option<CarStatus>, AppError> {
        let status: Option<String> = sqlx::query_scalar("SELECT status FROM cars WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        status
            .map(|s| s.parse::<CarStatus>().map_err(|e| AppError::Internal(e.to_string())))
            .transpose()
    }

    /// Upload images, then insert. An upload failure aborts; objects already stored stay behind.
    pub async fn create(
        pool: &PgPool,
        storage: &dyn ObjectStore,
        car: NewCar,
        images: Vec<ImageUpload>,
    ) -> Result<Car, AppError> {
        if images.is_empty() {
            return Err(AppError::Validation("at least one image is required".into()));
        }
        if images.len() > MAX_IMAGES_PER_CAR {
            return Err(AppError::Validation(format!(
                "at most {} images per car",
                MAX_IMAGES_PER_CAR
            )));
        }
        Self::ensure_refs(pool, Some(car.make_id), Some(car.color_id)).await?;

        let id = Uuid::new_v4();
        let mut urls = Vec::with_capacity(images.len());
        for image in images {
            let key = car_image_key(id, &image.content_type)?;
            match storage.put(&key, image.bytes, &image.content_type).await {
                Ok(url) => urls.push(url),
                Err(e) => {
                    if !urls.is_empty() {
                        tracing::warn!(car_id = %id, orphaned = urls.len(), "image upload failed; uploaded images left in storage");
                    }
                    return Err(e);
                }
            }
        }

        sqlx::query(
            "INSERT INTO cars (id, make_id, model, year, price, mileage, color_id, fuel_type, transmission, \
             body_type, seats, description, status, featured, images) \
             VALUES ($1, $2, $3, $4, $5::numeric, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(id)
        .bind(car.make_id)
        .bind(car.model.trim())
        .bind(car.year)
        .bind(car.price)
        .bind(car.mileage)
        .bind(car.color_id)
        .bind(car.fuel_type.as_str())
        .bind(car.transmission.as_str())
        .bind(car.body_type.as_str())
        .bind(car.seats)
        .bind(car.description.trim())
        .bind(car.status.as_str())
        .bind(car.featured)
        .bind(&urls)
        .execute(pool)
        .await?;
        tracing::info!(car_id = %id, images = urls.len(), "car created");
        Self::get(pool, id, None).await
    }

    pub async fn update(pool: &PgPool, id: Uuid, patch: &CarPatch) -> Result<Car, AppError> {
        Self::ensure_refs(pool, patch.make_id, patch.color_id).await?;
        let q = update_car_query(id, patch);
        tracing::debug!(sql = %q.sql, "update car");
        let updated = q.query().execute(pool).await?.rows_affected();
        if updated == 0 {
            return Err(AppError::NotFound(format!("car {}", id)));
        }
        tracing::info!(car_id = %id, "car updated");
        Self::get(pool, id, None).await
    }

    /// Delete the row, then best-effort delete its images.
    pub async fn delete(pool: &PgPool, storage: &dyn ObjectStore, id: Uuid) -> Result<(), AppError> {
        let images: Option<Vec<String>> = sqlx::query_scalar("DELETE FROM cars WHERE id = $1 RETURNING images")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        let images = images.ok_or_else(|| AppError::NotFound(format!("car {}", id)))?;
        tracing::info!(car_id = %id, "car deleted");
        let keys: Vec<String> = images.iter().filter_map(|url| storage.key_for_url(url)).collect();
        if !keys.is_empty() {
            if let Err(e) = storage.delete(&keys).await {
                tracing::warn!(car_id = %id, error = %e, "failed to delete car images");
            }
        }
        Ok(())
    }

    /// Filter options derived from AVAILABLE cars.
    pub async fn filters(pool: &PgPool) -> Result<CarFilters, AppError> {
        let available = CarStatus::Available.as_str();
        let makes: Vec<FilterOption> = sqlx::query_as(
            "SELECT m.name, m.slug, COUNT(*) AS count FROM cars c JOIN car_makes m ON m.id = c.make_id \
             WHERE c.status = $1 GROUP BY m.name, m.slug ORDER BY m.name",
        )
        .bind(available)
        .fetch_all(pool)
        .await?;
        let colors: Vec<FilterOption> = sqlx::query_as(
            "SELECT col.name, col.slug, COUNT(*) AS count FROM cars c JOIN car_colors col ON col.id = c.color_id \
             WHERE c.status = $1 GROUP BY col.name, col.slug ORDER BY col.name",
        )
        .bind(available)
        .fetch_all(pool)
        .await?;
        let distinct = |column: &'static str| {
            format!("SELECT DISTINCT {column} FROM cars WHERE status = $1 ORDER BY {column}")
        };
        let body_types: Vec<String> = sqlx::query_scalar(&distinct("body_type")).bind(available).fetch_all(pool).await?;
        let fuel_types: Vec<String> = sqlx::query_scalar(&distinct("fuel_type")).bind(available).fetch_all(pool).await?;
        let transmissions: Vec<String> =
            sqlx::query_scalar(&distinct("transmission")).bind(available).fetch_all(pool).await?;
        let (min, max): (f64, f64) = sqlx::query_as(
            "SELECT COALESCE(MIN(price), 0)::float8, COALESCE(MAX(price), 0)::float8 FROM cars WHERE status = $1",
        )
        .bind(available)
        .fetch_one(pool)
        .await?;
        Ok(CarFilters {
            makes,
            colors,
            body_types,
            fuel_types,
            transmissions,
            price_range: PriceRange { min, max },
        })
    }

    /// Serialize rows, marking those the viewer has saved.
    pub async fn with_wishlist(pool: &PgPool, rows: Vec<CarRow>, viewer: Option<Uuid>) -> Result<Vec<Car>, AppError> {
        let saved = match viewer {
            Some(user_id) if !rows.is_empty() => {
                Self::wishlisted_ids(pool, user_id, rows.iter().map(|r| r.id).collect()).await?
            }
            _ => HashSet::new(),
        };
        rows.into_iter()
            .map(|row| {
                let wishlisted = saved.contains(&row.id);
                serialize_car(row, wishlisted)
            })
            .collect()
    }

    async fn wishlisted_ids(pool: &PgPool, user_id: Uuid, car_ids: Vec<Uuid>) -> Result<HashSet<Uuid>, AppError> {
        let q = select_wishlisted(user_id, car_ids);
        let ids: Vec<Uuid> = q.query_scalar().fetch_all(pool).await?;
        Ok(ids.into_iter().collect())
    }

    async fn page(
        pool: &PgPool,
        filter: &CarFilter,
        sort: CarSort,
        window: PageWindow,
        viewer: Option<Uuid>,
    ) -> Result<CarPage, AppError> {
        let count = count_cars(filter);
        tracing::debug!(sql = %count.sql, params = ?count.params, "count cars");
        let total: i64 = count.query_scalar().fetch_one(pool).await?;
        let page = select_cars(filter, sort, window);
        tracing::debug!(sql = %page.sql, "select cars");
        let rows: Vec<CarRow> = page.query_as().fetch_all(pool).await?;
        let cars = Self::with_wishlist(pool, rows, viewer).await?;
        Ok(CarPage {
            cars,
            pagination: Pagination::new(total, window.page, window.limit),
        })
    }

    async fn row(pool: &PgPool, id: Uuid) -> Result<Option<CarRow>, AppError> {
        let sql = format!("SELECT {} FROM {} WHERE c.id = $1", CAR_COLUMNS, CAR_FROM);
        Ok(sqlx::query_as::<_, CarRow>(&sql).bind(id).fetch_optional(pool).await?)
    }

    async fn id_for_slug(pool: &PgPool, table: &'static str, slug: &str) -> Result<Option<Uuid>, AppError> {
        let sql = format!("SELECT id FROM {} WHERE slug = $1", table);
        Ok(sqlx::query_scalar(&sql).bind(slug).fetch_optional(pool).await?)
    }

    async fn ensure_refs(pool: &PgPool, make_id: Option<Uuid>, color_id: Option<Uuid>) -> Result<(), AppError> {
        for (table, field, id) in [("car_makes", "makeId", make_id), ("car_colors", "colorId", color_id)] {
            let Some(id) = id else { continue };
            let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", table);
            let exists: bool = sqlx::query_scalar(&sql).bind(id).fetch_one(pool).await?;
            if !exists {
                return Err(AppError::Validation(format!("{} does not exist: {}", field, id)));
            }
        }
        Ok(())
    }
}

fn empty_page(window: PageWindow) -> CarPage {
    CarPage {
        cars: Vec::new(),
        pagination: Pagination::new(0, window.page, window.limit),
    }
}

/// `UPDATE cars SET ... WHERE id = $n` for the fields present in `patch`.
fn update_car_query(id: Uuid, patch: &CarPatch) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets: Vec<String> = Vec::new();
    let set = |q: &mut QueryBuf, sets: &mut Vec<String>, column: &str, value: Option<PgBindValue>| {
        if let Some(v) = value {
            let ph = q.push_param(v);
            sets.push(format!("{} = {}", column, ph));
        }
    };
    set(&mut q, &mut sets, "make_id", patch.make_id.map(PgBindValue::Uuid));
    set(&mut q, &mut sets, "model", patch.model.as_ref().map(|s| PgBindValue::Text(s.trim().to_string())));
    set(&mut q, &mut sets, "year", patch.year.map(PgBindValue::I32));
    set(&mut q, &mut sets, "price", patch.price.map(PgBindValue::F64));
    set(&mut q, &mut sets, "mileage", patch.mileage.map(PgBindValue::I32));
    set(&mut q, &mut sets, "color_id", patch.color_id.map(PgBindValue::Uuid));
    set(&mut q, &mut sets, "fuel_type", patch.fuel_type.map(|v| PgBindValue::Text(v.as_str().into())));
    set(&mut q, &mut sets, "transmission", patch.transmission.map(|v| PgBindValue::Text(v.as_str().into())));
    set(&mut q, &mut sets, "body_type", patch.body_type.map(|v| PgBindValue::Text(v.as_str().into())));
    match patch.seats {
        Some(Some(seats)) => set(&mut q, &mut sets, "seats", Some(PgBindValue::I32(seats))),
        Some(None) => sets.push("seats = NULL".into()),
        None => {}
    }
    set(&mut q, &mut sets, "description", patch.description.as_ref().map(|s| PgBindValue::Text(s.trim().to_string())));
    set(&mut q, &mut sets, "status", patch.status.map(|v| PgBindValue::Text(v.as_str().into())));
    set(&mut q, &mut sets, "featured", patch.featured.map(PgBindValue::Bool));
    sets.push("updated_at = NOW()".into());
    let id_ph = q.push_param(PgBindValue::Uuid(id));
    q.sql = format!("UPDATE cars SET {} WHERE id = {}", sets.join(", "), id_ph);
    q
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn parses_search_params() {
        let p = CarSearchParams::from_query(&query(&[
            ("search", " corolla "),
            ("make", "Toyota"),
            ("bodyType", "suv"),
            ("minPrice", "1000"),
            ("maxAge", "5"),
            ("sortBy", "priceDesc"),
            ("page", "2"),
            ("limit", "12"),
        ]))
        .unwrap();
        assert_eq!(p.search.as_deref(), Some("corolla"));
        assert_eq!(p.make.as_deref(), Some("toyota"));
        assert_eq!(p.body_type, Some(BodyType::Suv));
        assert_eq!(p.min_price, Some(1000.0));
        assert_eq!(p.max_age, Some(5));
        assert_eq!(p.sort, CarSort::PriceDesc);
        assert_eq!(p.window, PageWindow { page: 2, limit: 12 });
    }

    #[test]
    fn empty_params_are_absent() {
        let p = CarSearchParams::from_query(&query(&[("minPrice", ""), ("make", "  ")])).unwrap();
        assert_eq!(p, CarSearchParams::default());
    }

    #[test]
    fn negative_page_and_limit_clamp_to_one() {
        let p = CarSearchParams::from_query(&query(&[("page", "-2"), ("limit", "-5")])).unwrap();
        assert_eq!(p.window, PageWindow { page: 1, limit: 1 });
        let p = CarSearchParams::from_query(&query(&[("limit", "999")])).unwrap();
        assert_eq!(p.window.limit, crate::sql::MAX_PAGE_SIZE);
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let err = CarSearchParams::from_query(&query(&[("maxMileage", "lots")])).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(m) if m.contains("maxMileage")));
    }

    #[test]
    fn update_sets_only_present_fields() {
        let patch = CarPatch {
            price: Some(12000.0),
            status: Some(CarStatus::Sold),
            featured: Some(false),
            ..Default::default()
        };
        let q = update_car_query(Uuid::nil(), &patch);
        assert_eq!(
            q.sql,
            "UPDATE cars SET price = $1, status = $2, featured = $3, updated_at = NOW() WHERE id = $4"
        );
        assert_eq!(q.params[1], PgBindValue::Text("SOLD".into()));
        assert_eq!(q.params[3], PgBindValue::Uuid(Uuid::nil()));
    }

    #[test]
    fn null_seats_clears_the_column() {
        let patch: CarPatch = serde_json::from_str(r#"{"seats": null, "model": "Yaris"}"#).unwrap();
        assert_eq!(patch.seats, Some(None));
        let q = update_car_query(Uuid::nil(), &patch);
        assert_eq!(
            q.sql,
            "UPDATE cars SET model = $1, seats = NULL, updated_at = NOW() WHERE id = $2"
        );

        let patch: CarPatch = serde_json::from_str(r#"{"seats": 7}"#).unwrap();
        let q = update_car_query(Uuid::nil(), &patch);
        assert_eq!(q.sql, "UPDATE cars SET seats = $1, updated_at = NOW() WHERE id = $2");
        assert_eq!(q.params[0], PgBindValue::I32(7));

        let patch: CarPatch = serde_json::from_str(r#"{"model": "Yaris"}"#).unwrap();
        assert_eq!(patch.seats, None);
    }
}
