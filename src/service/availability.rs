//! Test drive slots: the day's working hours cut into fixed slots, minus active bookings.

use crate::error::AppError;
use crate::models::{Availability, BookingStatus, DayOfWeek, TimeSlot, WorkingHour};
use crate::service::{CarService, DealershipService};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::PgPool;
use uuid::Uuid;

/// Slots for `date`. Days before `now` get none; today's slots that already started are unavailable.
pub fn compute_slots(
    date: NaiveDate,
    hours: Option<&WorkingHour>,
    slot_minutes: u32,
    booked: &[(NaiveTime, NaiveTime)],
    now: NaiveDateTime,
) -> Availability {
    let is_open = hours.map(|h| h.is_open).unwrap_or(false);
    let mut availability = Availability {
        date,
        is_open,
        slots: Vec::new(),
    };
    let Some(hours) = hours.filter(|h| h.is_open) else {
        return availability;
    };
    if date < now.date() || slot_minutes == 0 {
        return availability;
    }
    let step = Duration::minutes(i64::from(slot_minutes));
    let today = date == now.date();
    let mut start = hours.open_time;
    loop {
        let (end, wrapped) = start.overflowing_add_signed(step);
        if wrapped != 0 || end > hours.close_time {
            break;
        }
        let taken = booked.iter().any(|(b_start, b_end)| *b_start < end && *b_end > start);
        let started = today && start <= now.time();
        availability.slots.push(TimeSlot {
            start_time: start,
            end_time: end,
            available: !taken && !started,
        });
        start = end;
    }
    availability
}

pub struct AvailabilityService;

impl AvailabilityService {
    pub async fn for_car(
        pool: &PgPool,
        car_id: Uuid,
        date: NaiveDate,
        slot_minutes: u32,
        now: NaiveDateTime,
    ) -> Result<Availability, AppError> {
        if !CarService::exists(pool, car_id).await? {
            return Err(AppError::NotFound(format!("car {}", car_id)));
        }
        let dealership = DealershipService::get_or_create(pool).await?;
        let day = DayOfWeek::from(date.weekday());
        let hours = dealership.working_hours.iter().find(|h| h.day_of_week == day);
        let booked = Self::booked(pool, car_id, date).await?;
        Ok(compute_slots(date, hours, slot_minutes, &booked, now))
    }

    /// Start and end of every active booking for the car on `date`.
    async fn booked(pool: &PgPool, car_id: Uuid, date: NaiveDate) -> Result<Vec<(NaiveTime, NaiveTime)>, AppError> {
        let active: Vec<&str> = BookingStatus::ACTIVE.iter().map(BookingStatus::as_str).collect();
        let rows: Vec<(NaiveTime, NaiveTime)> = sqlx::query_as(
            "SELECT start_time, end_time FROM test_drive_bookings \
             WHERE car_id = $1 AND booking_date = $2 AND status = ANY($3)",
        )
        .bind(car_id)
        .bind(date)
        .bind(&active)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn open(open_time: NaiveTime, close_time: NaiveTime) -> WorkingHour {
        WorkingHour {
            day_of_week: DayOfWeek::Monday,
            open_time,
            close_time,
            is_open: true,
        }
    }

    fn earlier() -> NaiveDateTime {
        day(1).and_hms_opt(8, 0, 0).unwrap()
    }

    #[test]
    fn slots_fill_the_window_and_stop_before_close() {
        let hours = open(t(9, 0), t(12, 30));
        let a = compute_slots(day(2), Some(&hours), 60, &[], earlier());
        assert!(a.is_open);
        let starts: Vec<NaiveTime> = a.slots.iter().map(|s| s.start_time).collect();
        assert_eq!(starts, vec![t(9, 0), t(10, 0), t(11, 0)]);
        assert_eq!(a.slots[2].end_time, t(12, 0));
        assert!(a.slots.iter().all(|s| s.available));
    }

    #[test]
    fn overlapping_bookings_block_slots() {
        let hours = open(t(9, 0), t(12, 0));
        let booked = [(t(9, 30), t(10, 30))];
        let a = compute_slots(day(2), Some(&hours), 60, &booked, earlier());
        let avail: Vec<bool> = a.slots.iter().map(|s| s.available).collect();
        assert_eq!(avail, vec![false, false, true]);
    }

    #[test]
    fn adjacent_booking_does_not_block() {
        let hours = open(t(9, 0), t(11, 0));
        let booked = [(t(10, 0), t(11, 0))];
        let a = compute_slots(day(2), Some(&hours), 60, &booked, earlier());
        assert!(a.slots[0].available);
        assert!(!a.slots[1].available);
    }

    #[test]
    fn closed_or_missing_day_has_no_slots() {
        let mut hours = open(t(9, 0), t(17, 0));
        hours.is_open = false;
        let a = compute_slots(day(2), Some(&hours), 60, &[], earlier());
        assert!(!a.is_open);
        assert!(a.slots.is_empty());
        assert!(compute_slots(day(2), None, 60, &[], earlier()).slots.is_empty());
    }

    #[test]
    fn past_dates_have_no_slots() {
        let hours = open(t(9, 0), t(17, 0));
        let now = day(3).and_hms_opt(8, 0, 0).unwrap();
        assert!(compute_slots(day(2), Some(&hours), 60, &[], now).slots.is_empty());
    }

    #[test]
    fn started_slots_today_are_unavailable() {
        let hours = open(t(9, 0), t(12, 0));
        let now = day(2).and_hms_opt(10, 0, 0).unwrap();
        let a = compute_slots(day(2), Some(&hours), 60, &[], now);
        let avail: Vec<bool> = a.slots.iter().map(|s| s.available).collect();
        assert_eq!(avail, vec![false, false, true]);
    }

    #[test]
    fn late_close_does_not_wrap_past_midnight() {
        let hours = open(t(22, 0), t(23, 59));
        let a = compute_slots(day(2), Some(&hours), 90, &[], earlier());
        assert_eq!(a.slots.len(), 1);
        assert_eq!(a.slots[0].end_time, t(23, 30));
    }

    #[test]
    fn custom_slot_length() {
        let hours = open(t(9, 0), t(10, 0));
        let a = compute_slots(day(2), Some(&hours), 30, &[], earlier());
        assert_eq!(a.slots.len(), 2);
        assert_eq!(a.slots[1].start_time, t(9, 30));
    }
}
