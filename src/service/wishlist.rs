use crate::error::AppError;
use crate::models::{serialize_car, Car, CarRow, CAR_COLUMNS, CAR_FROM};
use crate::service::CarService;
use sqlx::PgPool;
use uuid::Uuid;

pub struct WishlistService;

impl WishlistService {
    /// Save the car if it is not saved yet, otherwise remove it. Returns whether it is saved now.
    pub async fn toggle(pool: &PgPool, user_id: Uuid, car_id: Uuid) -> Result<bool, AppError> {
        if !CarService::exists(pool, car_id).await? {
            return Err(AppError::NotFound(format!("car {}", car_id)));
        }
        let removed = sqlx::query("DELETE FROM user_saved_cars WHERE user_id = $1 AND car_id = $2")
            .bind(user_id)
            .bind(car_id)
            .execute(pool)
            .await?
            .rows_affected();
        if removed > 0 {
            tracing::debug!(user_id = %user_id, car_id = %car_id, "car unsaved");
            return Ok(false);
        }
        sqlx::query(
            "INSERT INTO user_saved_cars (id, user_id, car_id) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, car_id) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(car_id)
        .execute(pool)
        .await?;
        tracing::debug!(user_id = %user_id, car_id = %car_id, "car saved");
        Ok(true)
    }

    /// Saved cars, most recently saved first.
    pub async fn list(pool: &PgPool, user_id: Uuid) -> Result<Vec<Car>, AppError> {
        let sql = format!(
            "SELECT {} FROM {} JOIN user_saved_cars s ON s.car_id = c.id WHERE s.user_id = $1 \
             ORDER BY s.saved_at DESC, c.id",
            CAR_COLUMNS, CAR_FROM
        );
        let rows: Vec<CarRow> = sqlx::query_as(&sql).bind(user_id).fetch_all(pool).await?;
        rows.into_iter().map(|row| serialize_car(row, true)).collect()
    }
}
