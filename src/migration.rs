//! Apply the dealership schema: tables in dependency order, then indexes.
//! Every statement is idempotent so this runs on each startup.

use crate::error::AppError;
use crate::models::{check_list, BodyType, BookingStatus, CarStatus, DayOfWeek, FuelType, Role, Transmission};
use sqlx::PgPool;

/// Name of the partial unique index that stops two active bookings sharing a slot.
pub const ACTIVE_SLOT_INDEX: &str = "uniq_active_booking_slot";

fn values<T: Copy>(all: &[T], f: fn(&T) -> &'static str) -> String {
    let v: Vec<&str> = all.iter().map(f).collect();
    check_list(&v)
}

/// DDL statements in execution order.
pub fn schema_statements() -> Vec<String> {
    let roles = values(Role::ALL, Role::as_str);
    let fuel = values(FuelType::ALL, FuelType::as_str);
    let transmission = values(Transmission::ALL, Transmission::as_str);
    let body = values(BodyType::ALL, BodyType::as_str);
    let car_status = values(CarStatus::ALL, CarStatus::as_str);
    let days = values(DayOfWeek::ALL, DayOfWeek::as_str);
    let booking_status = values(BookingStatus::ALL, BookingStatus::as_str);
    let active: Vec<&str> = BookingStatus::ACTIVE.iter().map(BookingStatus::as_str).collect();
    let active = check_list(&active);

    vec![
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                name TEXT,
                image_url TEXT,
                phone TEXT,
                role TEXT NOT NULL DEFAULT 'USER' CHECK (role IN ({roles})),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#
        ),
        r#"
        CREATE TABLE IF NOT EXISTS car_makes (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            slug TEXT NOT NULL UNIQUE,
            logo_url TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#
        .to_string(),
        r#"
        CREATE TABLE IF NOT EXISTS car_colors (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            slug TEXT NOT NULL UNIQUE,
            hex_code TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#
        .to_string(),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS cars (
                id UUID PRIMARY KEY,
                make_id UUID NOT NULL REFERENCES car_makes(id) ON DELETE RESTRICT,
                model TEXT NOT NULL,
                year INTEGER NOT NULL,
                price NUMERIC(12, 2) NOT NULL,
                mileage INTEGER NOT NULL,
                color_id UUID NOT NULL REFERENCES car_colors(id) ON DELETE RESTRICT,
                fuel_type TEXT NOT NULL CHECK (fuel_type IN ({fuel})),
                transmission TEXT NOT NULL CHECK (transmission IN ({transmission})),
                body_type TEXT NOT NULL CHECK (body_type IN ({body})),
                seats INTEGER,
                description TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'AVAILABLE' CHECK (status IN ({car_status})),
                featured BOOLEAN NOT NULL DEFAULT FALSE,
                images TEXT[] NOT NULL DEFAULT '{{}}',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#
        ),
        "CREATE INDEX IF NOT EXISTS idx_cars_status_created ON cars (status, created_at DESC)".to_string(),
        "CREATE INDEX IF NOT EXISTS idx_cars_make ON cars (make_id)".to_string(),
        "CREATE INDEX IF NOT EXISTS idx_cars_color ON cars (color_id)".to_string(),
        "CREATE INDEX IF NOT EXISTS idx_cars_price ON cars (price)".to_string(),
        r#"
        CREATE TABLE IF NOT EXISTS dealership_info (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL,
            address TEXT NOT NULL,
            phone TEXT NOT NULL,
            email TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#
        .to_string(),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS working_hours (
                id UUID PRIMARY KEY,
                dealership_id UUID NOT NULL REFERENCES dealership_info(id) ON DELETE CASCADE,
                day_of_week TEXT NOT NULL CHECK (day_of_week IN ({days})),
                open_time TIME NOT NULL,
                close_time TIME NOT NULL,
                is_open BOOLEAN NOT NULL DEFAULT TRUE,
                UNIQUE (dealership_id, day_of_week)
            )
            "#
        ),
        r#"
        CREATE TABLE IF NOT EXISTS user_saved_cars (
            id UUID PRIMARY KEY,
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            car_id UUID NOT NULL REFERENCES cars(id) ON DELETE CASCADE,
            saved_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            UNIQUE (user_id, car_id)
        )
        "#
        .to_string(),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS test_drive_bookings (
                id UUID PRIMARY KEY,
                car_id UUID NOT NULL REFERENCES cars(id) ON DELETE CASCADE,
                user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                booking_date DATE NOT NULL,
                start_time TIME NOT NULL,
                end_time TIME NOT NULL,
                status TEXT NOT NULL DEFAULT 'PENDING' CHECK (status IN ({booking_status})),
                notes TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#
        ),
        "CREATE INDEX IF NOT EXISTS idx_bookings_user ON test_drive_bookings (user_id)".to_string(),
        "CREATE INDEX IF NOT EXISTS idx_bookings_car_date ON test_drive_bookings (car_id, booking_date)".to_string(),
        format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {ACTIVE_SLOT_INDEX} ON test_drive_bookings (car_id, booking_date, start_time) \
             WHERE status IN ({active})"
        ),
        r#"
        CREATE TABLE IF NOT EXISTS home_content (
            section TEXT PRIMARY KEY,
            content JSONB NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#
        .to_string(),
    ]
}

/// Create tables and indexes when missing.
pub async fn apply_migrations(pool: &PgPool) -> Result<(), AppError> {
    let statements = schema_statements();
    for sql in &statements {
        sqlx::query(sql).execute(pool).await?;
    }
    tracing::info!(statements = statements.len(), "schema applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_slot_index_is_partial_on_active_statuses() {
        let stmts = schema_statements();
        let idx = stmts.iter().find(|s| s.contains(ACTIVE_SLOT_INDEX)).unwrap();
        assert!(idx.contains("ON test_drive_bookings (car_id, booking_date, start_time)"));
        assert!(idx.ends_with("WHERE status IN ('PENDING', 'CONFIRMED')"));
    }

    #[test]
    fn tables_come_before_dependents() {
        let stmts = schema_statements();
        let pos = |needle: &str| stmts.iter().position(|s| s.contains(needle)).unwrap();
        assert!(pos("CREATE TABLE IF NOT EXISTS car_makes") < pos("CREATE TABLE IF NOT EXISTS cars"));
        assert!(pos("CREATE TABLE IF NOT EXISTS cars") < pos("CREATE TABLE IF NOT EXISTS test_drive_bookings"));
        assert!(pos("CREATE TABLE IF NOT EXISTS dealership_info") < pos("CREATE TABLE IF NOT EXISTS working_hours"));
    }

    #[test]
    fn enum_checks_use_stored_values() {
        let stmts = schema_statements();
        let cars = stmts.iter().find(|s| s.contains("CREATE TABLE IF NOT EXISTS cars")).unwrap();
        assert!(cars.contains("'PLUGIN_HYBRID'"));
        assert!(cars.contains("'SEMI_AUTOMATIC'"));
        assert!(cars.contains("images TEXT[] NOT NULL DEFAULT '{}'"));
    }
}
