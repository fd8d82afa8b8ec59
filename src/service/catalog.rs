//! Makes and colors.

use crate::error::{is_foreign_key_violation, is_unique_violation, AppError};
use crate::models::{CarColor, CarMake, NewColor, NewMake};
use crate::service::{slugify, RequestValidator};
use sqlx::PgPool;
use uuid::Uuid;

pub struct CatalogService;

impl CatalogService {
    pub async fn makes(pool: &PgPool) -> Result<Vec<CarMake>, AppError> {
        Ok(sqlx::query_as("SELECT id, name, slug, logo_url, created_at FROM car_makes ORDER BY name")
            .fetch_all(pool)
            .await?)
    }

    pub async fn colors(pool: &PgPool) -> Result<Vec<CarColor>, AppError> {
        Ok(sqlx::query_as("SELECT id, name, slug, hex_code, created_at FROM car_colors ORDER BY name")
            .fetch_all(pool)
            .await?)
    }

    pub async fn create_make(pool: &PgPool, make: &NewMake) -> Result<CarMake, AppError> {
        RequestValidator::make_name(&make.name)?;
        let name = make.name.trim();
        let slug = slug_for(name)?;
        let logo_url = make.logo_url.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let created: CarMake = sqlx::query_as(
            "INSERT INTO car_makes (id, name, slug, logo_url) VALUES ($1, $2, $3, $4) \
             RETURNING id, name, slug, logo_url, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(&slug)
        .bind(logo_url)
        .fetch_one(pool)
        .await
        .map_err(|e| duplicate("make", name, e))?;
        tracing::info!(make_id = %created.id, slug = %created.slug, "make created");
        Ok(created)
    }

    pub async fn create_color(pool: &PgPool, color: &NewColor) -> Result<CarColor, AppError> {
        RequestValidator::color(&color.name, &color.hex_code)?;
        let name = color.name.trim();
        let slug = slug_for(name)?;
        let created: CarColor = sqlx::query_as(
            "INSERT INTO car_colors (id, name, slug, hex_code) VALUES ($1, $2, $3, $4) \
             RETURNING id, name, slug, hex_code, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(&slug)
        .bind(color.hex_code.trim().to_ascii_uppercase())
        .fetch_one(pool)
        .await
        .map_err(|e| duplicate("color", name, e))?;
        tracing::info!(color_id = %created.id, slug = %created.slug, "color created");
        Ok(created)
    }

    pub async fn delete_make(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
        Self::delete(pool, "car_makes", "make", id).await
    }

    pub async fn delete_color(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
        Self::delete(pool, "car_colors", "color", id).await
    }

    async fn delete(pool: &PgPool, table: &'static str, what: &str, id: Uuid) -> Result<(), AppError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", table);
        let deleted = sqlx::query(&sql)
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    AppError::Conflict(format!("{} is still used by cars", what))
                } else {
                    AppError::Db(e)
                }
            })?
            .rows_affected();
        if deleted == 0 {
            return Err(AppError::NotFound(format!("{} {}", what, id)));
        }
        tracing::info!(id = %id, what, "catalogue entry deleted");
        Ok(())
    }
}

fn slug_for(name: &str) -> Result<String, AppError> {
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(AppError::Validation("name must contain letters or digits".into()));
    }
    Ok(slug)
}

fn duplicate(what: &str, name: &str, e: sqlx::Error) -> AppError {
    if is_unique_violation(&e) {
        AppError::Conflict(format!("{} '{}' already exists", what, name))
    } else {
        AppError::Db(e)
    }
}
