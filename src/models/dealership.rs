//! Dealership info and weekly working hours.

use crate::models::{hhmm, DayOfWeek};
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, FromRow)]
pub struct DealershipRow {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, FromRow)]
pub struct WorkingHourRow {
    pub day_of_week: String,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
    pub is_open: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkingHour {
    pub day_of_week: DayOfWeek,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "09:00")]
    pub open_time: NaiveTime,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "18:00")]
    pub close_time: NaiveTime,
    pub is_open: bool,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dealership {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub working_hours: Vec<WorkingHour>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DealershipUpdate {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

/// Week used when a dealership is first created: weekdays 09-18, Saturday 10-16, Sunday closed.
pub fn default_working_hours() -> Vec<WorkingHour> {
    let t = |h: u32| NaiveTime::from_hms_opt(h, 0, 0).unwrap_or(NaiveTime::MIN);
    DayOfWeek::ALL
        .iter()
        .map(|day| match day {
            DayOfWeek::Saturday => WorkingHour {
                day_of_week: *day,
                open_time: t(10),
                close_time: t(16),
                is_open: true,
            },
            DayOfWeek::Sunday => WorkingHour {
                day_of_week: *day,
                open_time: t(10),
                close_time: t(16),
                is_open: false,
            },
            _ => WorkingHour {
                day_of_week: *day,
                open_time: t(9),
                close_time: t(18),
                is_open: true,
            },
        })
        .collect()
}
