//! Test drive bookings for customers and the back office.

use crate::error::{is_unique_violation, AppError};
use crate::models::{
    Availability, Booking, BookingPage, BookingRequest, BookingRow, BookingStatus, CarStatus, Pagination, BOOKING_COLUMNS,
    BOOKING_FROM,
};
use crate::service::{AvailabilityService, CarService, RequestValidator};
use crate::sql::{count_bookings, select_bookings, BookingFilter, PageWindow};
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::PgPool;
use uuid::Uuid;

/// Car status and date rules: missing car 404, unbookable car 409, past date 422.
pub fn check_bookable(request: &BookingRequest, status: Option<CarStatus>, today: NaiveDate) -> Result<(), AppError> {
    match status {
        None => return Err(AppError::NotFound(format!("car {}", request.car_id))),
        Some(CarStatus::Available) => {}
        Some(other) => {
            return Err(AppError::Conflict(format!("car is {} and cannot be booked", other)));
        }
    }
    if request.booking_date < today {
        return Err(AppError::Validation("booking date is in the past".into()));
    }
    Ok(())
}

/// The requested times must match an offered slot exactly, and that slot must still be free.
pub fn check_slot(request: &BookingRequest, availability: &Availability) -> Result<(), AppError> {
    let slot = availability
        .slots
        .iter()
        .find(|s| s.start_time == request.start_time && s.end_time == request.end_time)
        .ok_or_else(|| AppError::Validation("requested time is not a bookable slot".into()))?;
    if !slot.available {
        return Err(AppError::Conflict("slot is no longer available".into()));
    }
    Ok(())
}

fn check_cancel(booking: &Booking, user_id: Uuid) -> Result<(), AppError> {
    if booking.user.id != user_id {
        return Err(AppError::NotFound(format!("booking {}", booking.id)));
    }
    if !booking.status.is_active() {
        return Err(AppError::Conflict(format!("a {} booking cannot be cancelled", booking.status)));
    }
    Ok(())
}

fn check_transition(from: BookingStatus, to: BookingStatus) -> Result<(), AppError> {
    if !from.can_transition_to(to) {
        return Err(AppError::Conflict(format!("cannot change booking from {} to {}", from, to)));
    }
    Ok(())
}

pub struct BookingService;

impl BookingService {
    /// Book a slot for `user_id`. The slot must be one currently offered for the car and date.
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        request: &BookingRequest,
        slot_minutes: u32,
        now: NaiveDateTime,
    ) -> Result<Booking, AppError> {
        let notes = RequestValidator::booking_notes(request.notes.as_deref())?;
        let status = CarService::status(pool, request.car_id).await?;
        check_bookable(request, status, now.date())?;
        let availability =
            AvailabilityService::for_car(pool, request.car_id, request.booking_date, slot_minutes, now).await?;
        check_slot(request, &availability)?;

        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO test_drive_bookings (id, car_id, user_id, booking_date, start_time, end_time, status, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(id)
        .bind(request.car_id)
        .bind(user_id)
        .bind(request.booking_date)
        .bind(request.start_time)
        .bind(request.end_time)
        .bind(BookingStatus::Pending.as_str())
        .bind(&notes)
        .execute(pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("slot already booked".into())
            } else {
                AppError::Db(e)
            }
        })?;
        tracing::info!(booking_id = %id, car_id = %request.car_id, date = %request.booking_date, "booking created");
        Self::get(pool, id).await
    }

    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Booking>, AppError> {
        let filter = BookingFilter {
            user_id: Some(user_id),
            ..Default::default()
        };
        let q = select_bookings(&filter, None);
        let rows: Vec<BookingRow> = q.query_as().fetch_all(pool).await?;
        rows.into_iter().map(Booking::try_from).collect()
    }

    /// The user's PENDING or CONFIRMED booking for a car, soonest first.
    pub async fn active_for_car(pool: &PgPool, user_id: Uuid, car_id: Uuid) -> Result<Option<Booking>, AppError> {
        let active: Vec<&str> = BookingStatus::ACTIVE.iter().map(BookingStatus::as_str).collect();
        let sql = format!(
            "SELECT {} FROM {} WHERE b.user_id = $1 AND b.car_id = $2 AND b.status = ANY($3) \
             ORDER BY b.booking_date, b.start_time LIMIT 1",
            BOOKING_COLUMNS, BOOKING_FROM
        );
        let row: Option<BookingRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(car_id)
            .bind(&active)
            .fetch_optional(pool)
            .await?;
        row.map(Booking::try_from).transpose()
    }

    /// Cancel one of the user's own bookings. Someone else's booking is reported as missing.
    pub async fn cancel(pool: &PgPool, user_id: Uuid, booking_id: Uuid) -> Result<Booking, AppError> {
        let current = Self::get(pool, booking_id).await?;
        check_cancel(&current, user_id)?;
        Self::set_status(pool, booking_id, current.status, BookingStatus::Cancelled).await
    }

    pub async fn admin_list(
        pool: &PgPool,
        status: Option<BookingStatus>,
        search: Option<String>,
        window: PageWindow,
    ) -> Result<BookingPage, AppError> {
        let filter = BookingFilter {
            user_id: None,
            status,
            search,
        };
        let count = count_bookings(&filter);
        tracing::debug!(sql = %count.sql, "count bookings");
        let total: i64 = count.query_scalar().fetch_one(pool).await?;
        let page = select_bookings(&filter, Some(window));
        tracing::debug!(sql = %page.sql, "select bookings");
        let rows: Vec<BookingRow> = page.query_as().fetch_all(pool).await?;
        Ok(BookingPage {
            bookings: rows.into_iter().map(Booking::try_from).collect::<Result<_, _>>()?,
            pagination: Pagination::new(total, window.page, window.limit),
        })
    }

    pub async fn update_status(pool: &PgPool, booking_id: Uuid, next: BookingStatus) -> Result<Booking, AppError> {
        let current = Self::get(pool, booking_id).await?;
        check_transition(current.status, next)?;
        Self::set_status(pool, booking_id, current.status, next).await
    }

    pub async fn get(pool: &PgPool, id: Uuid) -> Result<Booking, AppError> {
        let sql = format!("SELECT {} FROM {} WHERE b.id = $1", BOOKING_COLUMNS, BOOKING_FROM);
        let row: Option<BookingRow> = sqlx::query_as(&sql).bind(id).fetch_optional(pool).await?;
        row.ok_or_else(|| AppError::NotFound(format!("booking {}", id)))?.try_into()
    }

    /// Compare-and-set on the status so a concurrent change is not overwritten.
    async fn set_status(
        pool: &PgPool,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Booking, AppError> {
        let updated = sqlx::query(
            "UPDATE test_drive_bookings SET status = $1, updated_at = NOW() WHERE id = $2 AND status = $3",
        )
        .bind(to.as_str())
        .bind(id)
        .bind(from.as_str())
        .execute(pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("another active booking holds this slot".into())
            } else {
                AppError::Db(e)
            }
        })?
        .rows_affected();
        if updated == 0 {
            return Err(AppError::Conflict("booking changed concurrently; reload and retry".into()));
        }
        tracing::info!(booking_id = %id, from = %from, to = %to, "booking status changed");
        Self::get(pool, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookingCar, BookingUser, TimeSlot};
    use chrono::NaiveTime;

    fn t(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn request(day: u32, start: u32, end: u32) -> BookingRequest {
        BookingRequest {
            car_id: Uuid::new_v4(),
            booking_date: date(day),
            start_time: t(start),
            end_time: t(end),
            notes: None,
        }
    }

    fn availability() -> Availability {
        Availability {
            date: date(10),
            is_open: true,
            slots: vec![
                TimeSlot {
                    start_time: t(9),
                    end_time: t(10),
                    available: true,
                },
                TimeSlot {
                    start_time: t(10),
                    end_time: t(11),
                    available: false,
                },
            ],
        }
    }

    fn booking(user_id: Uuid, status: BookingStatus) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            booking_date: date(10),
            start_time: t(9),
            end_time: t(10),
            status,
            notes: None,
            car: BookingCar {
                id: Uuid::new_v4(),
                make: "Toyota".into(),
                model: "Corolla".into(),
                year: 2022,
                image: None,
            },
            user: BookingUser {
                id: user_id,
                name: None,
                email: "buyer@example.com".into(),
            },
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn only_available_cars_on_future_days_are_bookable() {
        let req = request(10, 9, 10);
        assert!(check_bookable(&req, Some(CarStatus::Available), date(10)).is_ok());
        assert!(matches!(check_bookable(&req, None, date(1)), Err(AppError::NotFound(_))));
        assert!(matches!(
            check_bookable(&req, Some(CarStatus::Unavailable), date(1)),
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            check_bookable(&req, Some(CarStatus::Sold), date(1)),
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            check_bookable(&req, Some(CarStatus::Available), date(11)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn requested_time_must_be_an_offered_free_slot() {
        let a = availability();
        assert!(check_slot(&request(10, 9, 10), &a).is_ok());
        assert!(matches!(check_slot(&request(10, 10, 11), &a), Err(AppError::Conflict(_))));
        assert!(matches!(check_slot(&request(10, 9, 11), &a), Err(AppError::Validation(_))));
        assert!(matches!(check_slot(&request(10, 13, 14), &a), Err(AppError::Validation(_))));
    }

    #[test]
    fn cancel_is_owner_only_and_active_only() {
        let owner = Uuid::new_v4();
        assert!(check_cancel(&booking(owner, BookingStatus::Pending), owner).is_ok());
        assert!(check_cancel(&booking(owner, BookingStatus::Confirmed), owner).is_ok());
        assert!(matches!(
            check_cancel(&booking(owner, BookingStatus::Pending), Uuid::new_v4()),
            Err(AppError::NotFound(_))
        ));
        for status in [BookingStatus::Cancelled, BookingStatus::Completed, BookingStatus::NoShow] {
            assert!(matches!(check_cancel(&booking(owner, status), owner), Err(AppError::Conflict(_))));
        }
    }

    #[test]
    fn terminal_statuses_refuse_transitions() {
        assert!(check_transition(BookingStatus::Pending, BookingStatus::Confirmed).is_ok());
        assert!(check_transition(BookingStatus::Confirmed, BookingStatus::Completed).is_ok());
        for from in [BookingStatus::Cancelled, BookingStatus::Completed, BookingStatus::NoShow] {
            assert!(matches!(
                check_transition(from, BookingStatus::Confirmed),
                Err(AppError::Conflict(_))
            ));
        }
    }
}
