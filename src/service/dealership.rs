//! The single dealership record and its weekly hours.

use crate::error::AppError;
use crate::models::{default_working_hours, Dealership, DealershipRow, DealershipUpdate, WorkingHour, WorkingHourRow};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

const DEALERSHIP_COLUMNS: &str = "id, name, address, phone, email, created_at, updated_at";

pub struct DealershipService;

impl DealershipService {
    /// The dealership with hours, creating the default one on first use.
    pub async fn get_or_create(pool: &PgPool) -> Result<Dealership, AppError> {
        let mut conn = pool.acquire().await?;
        if let Some(row) = Self::current_row(&mut conn).await? {
            let hours = Self::hours(&mut conn, row.id).await?;
            return Ok(assemble(row, hours));
        }
        drop(conn);
        Self::create_default(pool).await
    }

    /// Insert the default dealership unless a concurrent caller got there first.
    async fn create_default(pool: &PgPool) -> Result<Dealership, AppError> {
        let mut tx = pool.begin().await?;
        // Taken only on the empty-table path; serialises concurrent first inserts.
        sqlx::query("LOCK TABLE dealership_info IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;
        let row = match Self::current_row(&mut tx).await? {
            Some(row) => row,
            None => {
                let row = Self::insert_default(&mut tx).await?;
                tracing::info!(dealership_id = %row.id, "default dealership created");
                row
            }
        };
        let hours = Self::hours(&mut tx, row.id).await?;
        tx.commit().await?;
        Ok(assemble(row, hours))
    }

    pub async fn update(pool: &PgPool, update: &DealershipUpdate) -> Result<Dealership, AppError> {
        let current = Self::get_or_create(pool).await?;
        sqlx::query(
            "UPDATE dealership_info SET name = $1, address = $2, phone = $3, email = $4, updated_at = NOW() \
             WHERE id = $5",
        )
        .bind(update.name.trim())
        .bind(update.address.trim())
        .bind(update.phone.trim())
        .bind(update.email.trim())
        .bind(current.id)
        .execute(pool)
        .await?;
        tracing::info!(dealership_id = %current.id, "dealership updated");
        Self::get_or_create(pool).await
    }

    /// Replace the whole week: delete then insert in one transaction.
    pub async fn replace_hours(pool: &PgPool, hours: &[WorkingHour]) -> Result<Dealership, AppError> {
        let current = Self::get_or_create(pool).await?;
        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM working_hours WHERE dealership_id = $1")
            .bind(current.id)
            .execute(&mut *tx)
            .await?;
        Self::insert_hours(&mut tx, current.id, hours).await?;
        sqlx::query("UPDATE dealership_info SET updated_at = NOW() WHERE id = $1")
            .bind(current.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::info!(dealership_id = %current.id, days = hours.len(), "working hours replaced");
        Self::get_or_create(pool).await
    }

    async fn current_row(conn: &mut PgConnection) -> Result<Option<DealershipRow>, AppError> {
        let sql = format!(
            "SELECT {} FROM dealership_info ORDER BY created_at, id LIMIT 1",
            DEALERSHIP_COLUMNS
        );
        Ok(sqlx::query_as(&sql).fetch_optional(conn).await?)
    }

    async fn insert_default(conn: &mut PgConnection) -> Result<DealershipRow, AppError> {
        let sql = format!(
            "INSERT INTO dealership_info (id, name, address, phone, email) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            DEALERSHIP_COLUMNS
        );
        let row: DealershipRow = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind("Our Dealership")
            .bind("")
            .bind("")
            .bind("")
            .fetch_one(&mut *conn)
            .await?;
        Self::insert_hours(conn, row.id, &default_working_hours()).await?;
        Ok(row)
    }

    async fn insert_hours(conn: &mut PgConnection, dealership_id: Uuid, hours: &[WorkingHour]) -> Result<(), AppError> {
        for h in hours {
            sqlx::query(
                "INSERT INTO working_hours (id, dealership_id, day_of_week, open_time, close_time, is_open) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(Uuid::new_v4())
            .bind(dealership_id)
            .bind(h.day_of_week.as_str())
            .bind(h.open_time)
            .bind(h.close_time)
            .bind(h.is_open)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    async fn hours(conn: &mut PgConnection, dealership_id: Uuid) -> Result<Vec<WorkingHour>, AppError> {
        let rows: Vec<WorkingHourRow> = sqlx::query_as(
            "SELECT day_of_week, open_time, close_time, is_open FROM working_hours WHERE dealership_id = $1",
        )
        .bind(dealership_id)
        .fetch_all(conn)
        .await?;
        let mut hours = rows
            .into_iter()
            .map(|r| {
                Ok(WorkingHour {
                    day_of_week: r.day_of_week.parse().map_err(|e: AppError| AppError::Internal(e.to_string()))?,
                    open_time: r.open_time,
                    close_time: r.close_time,
                    is_open: r.is_open,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;
        hours.sort_by_key(|h| h.day_of_week.index());
        Ok(hours)
    }
}

fn assemble(row: DealershipRow, working_hours: Vec<WorkingHour>) -> Dealership {
    Dealership {
        id: row.id,
        name: row.name,
        address: row.address,
        phone: row.phone,
        email: row.email,
        working_hours,
        created_at: row.created_at.to_rfc3339(),
        updated_at: row.updated_at.to_rfc3339(),
    }
}
