use crate::error::AppError;
use crate::models::{CarStats, DashboardStats, TestDriveCounts};
use sqlx::PgPool;

const CAR_STATS_SQL: &str = "SELECT COUNT(*) AS total, \
     COUNT(*) FILTER (WHERE status = 'AVAILABLE') AS available, \
     COUNT(*) FILTER (WHERE status = 'SOLD') AS sold, \
     COUNT(*) FILTER (WHERE status = 'UNAVAILABLE') AS unavailable, \
     COUNT(*) FILTER (WHERE featured) AS featured \
     FROM cars";

const TEST_DRIVE_STATS_SQL: &str = "SELECT COUNT(*) AS total, \
     COUNT(*) FILTER (WHERE b.status = 'PENDING') AS pending, \
     COUNT(*) FILTER (WHERE b.status = 'CONFIRMED') AS confirmed, \
     COUNT(*) FILTER (WHERE b.status = 'COMPLETED') AS completed, \
     COUNT(*) FILTER (WHERE b.status = 'CANCELLED') AS cancelled, \
     COUNT(*) FILTER (WHERE b.status = 'NO_SHOW') AS no_show, \
     COUNT(*) FILTER (WHERE b.status = 'COMPLETED' AND c.status = 'SOLD') AS completed_sold \
     FROM test_drive_bookings b JOIN cars c ON c.id = b.car_id";

pub struct DashboardService;

impl DashboardService {
    pub async fn stats(pool: &PgPool) -> Result<DashboardStats, AppError> {
        let cars: CarStats = sqlx::query_as(CAR_STATS_SQL).fetch_one(pool).await?;
        let drives: TestDriveCounts = sqlx::query_as(TEST_DRIVE_STATS_SQL).fetch_one(pool).await?;
        Ok(DashboardStats {
            cars,
            test_drives: drives.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookingStatus, CarStatus};

    #[test]
    fn aggregates_use_stored_enum_values() {
        for s in CarStatus::ALL {
            assert!(CAR_STATS_SQL.contains(&format!("'{}'", s.as_str())));
        }
        for s in BookingStatus::ALL {
            assert!(TEST_DRIVE_STATS_SQL.contains(&format!("'{}'", s.as_str())));
        }
    }
}
