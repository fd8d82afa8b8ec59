//! Admin dashboard KPIs.

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Clone, Debug, Default, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarStats {
    pub total: i64,
    pub available: i64,
    pub sold: i64,
    pub unavailable: i64,
    pub featured: i64,
}

#[derive(Clone, Debug, Default, FromRow)]
pub struct TestDriveCounts {
    pub total: i64,
    pub pending: i64,
    pub confirmed: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub no_show: i64,
    /// Completed drives whose car has since been sold.
    pub completed_sold: i64,
}

#[derive(Clone, Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestDriveStats {
    pub total: i64,
    pub pending: i64,
    pub confirmed: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub no_show: i64,
    pub completion_rate: f64,
    pub conversion_rate: f64,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub cars: CarStats,
    pub test_drives: TestDriveStats,
}

/// Percentage rounded to one decimal; 0 when the denominator is 0.
pub fn percentage(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        return 0.0;
    }
    ((part as f64 / whole as f64) * 1000.0).round() / 10.0
}

impl From<TestDriveCounts> for TestDriveStats {
    fn from(c: TestDriveCounts) -> Self {
        TestDriveStats {
            total: c.total,
            pending: c.pending,
            confirmed: c.confirmed,
            completed: c.completed,
            cancelled: c.cancelled,
            no_show: c.no_show,
            completion_rate: percentage(c.completed, c.total),
            conversion_rate: percentage(c.completed_sold, c.completed),
        }
    }
}
