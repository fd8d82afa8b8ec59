//! HTTP handlers: parse and validate input, call services, wrap results in the envelope.

pub mod account;
pub mod admin;
pub mod cars;
pub mod catalog;
pub mod dealership;
pub mod home;

use crate::error::AppError;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use uuid::Uuid;

fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::BadRequest(format!("invalid id: '{}'", raw)))
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("invalid date '{}', expected YYYY-MM-DD", raw)))
}

/// Wall-clock time at the dealership.
fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

fn current_year() -> i32 {
    local_now().year()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_and_dates_are_bad_requests_when_malformed() {
        assert!(matches!(parse_id("nope"), Err(AppError::BadRequest(_))));
        assert_eq!(parse_id(" 00000000-0000-0000-0000-000000000000 ").unwrap(), Uuid::nil());
        assert!(matches!(parse_date("02/06/2025"), Err(AppError::BadRequest(_))));
        assert_eq!(parse_date("2025-06-02").unwrap(), NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
    }
}
