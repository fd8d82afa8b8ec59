//! Request validation for admin forms and bookings.

use crate::error::AppError;
use crate::models::{CarPatch, CarStatus, DealershipUpdate, NewCar, WorkingHour};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;
use uuid::Uuid;

pub const MIN_CAR_YEAR: i32 = 1900;
pub const MAX_NOTES_LEN: usize = 500;
/// Largest value a NUMERIC(12, 2) price column holds.
pub const MAX_PRICE: f64 = 9_999_999_999.99;
const MAX_MODEL_LEN: usize = 100;
const MIN_DESCRIPTION_LEN: usize = 10;

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static regex"))
}

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?[0-9 ()\-]{7,20}$").expect("static regex"))
}

fn hex_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("static regex"))
}

fn section_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z][a-z0-9_]{0,63}$").expect("static regex"))
}

pub struct RequestValidator;

impl RequestValidator {
    /// Parse and validate the multipart car form. Field names are camelCase.
    pub fn car_form(fields: &HashMap<String, String>, current_year: i32) -> Result<NewCar, AppError> {
        let get = |name: &str| -> Result<&str, AppError> {
            fields
                .get(name)
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| AppError::Validation(format!("{} is required", name)))
        };
        let optional = |name: &str| fields.get(name).map(|s| s.trim()).filter(|s| !s.is_empty());

        let car = NewCar {
            make_id: parse_field::<Uuid>("makeId", get("makeId")?)?,
            model: get("model")?.to_string(),
            year: parse_field("year", get("year")?)?,
            price: parse_field("price", get("price")?)?,
            mileage: parse_field("mileage", get("mileage")?)?,
            color_id: parse_field::<Uuid>("colorId", get("colorId")?)?,
            fuel_type: get("fuelType")?.parse()?,
            transmission: get("transmission")?.parse()?,
            body_type: get("bodyType")?.parse()?,
            seats: optional("seats").map(|s| parse_field("seats", s)).transpose()?,
            description: get("description")?.to_string(),
            status: optional("status")
                .map(str::parse::<CarStatus>)
                .transpose()?
                .unwrap_or(CarStatus::Available),
            featured: optional("featured")
                .map(|s| parse_field::<bool>("featured", s))
                .transpose()?
                .unwrap_or(false),
        };
        check_model(&car.model)?;
        check_year(car.year, current_year)?;
        check_price(car.price)?;
        check_mileage(car.mileage)?;
        if let Some(seats) = car.seats {
            check_seats(seats)?;
        }
        check_description(&car.description)?;
        Ok(car)
    }

    /// Validate only the fields present in a patch.
    pub fn car_patch(patch: &CarPatch, current_year: i32) -> Result<(), AppError> {
        if patch.is_empty() {
            return Err(AppError::BadRequest("no fields to update".into()));
        }
        if let Some(model) = &patch.model {
            check_model(model)?;
        }
        if let Some(year) = patch.year {
            check_year(year, current_year)?;
        }
        if let Some(price) = patch.price {
            check_price(price)?;
        }
        if let Some(mileage) = patch.mileage {
            check_mileage(mileage)?;
        }
        if let Some(Some(seats)) = patch.seats {
            check_seats(seats)?;
        }
        if let Some(description) = &patch.description {
            check_description(description)?;
        }
        Ok(())
    }

    /// Trim notes; empty becomes None.
    pub fn booking_notes(notes: Option<&str>) -> Result<Option<String>, AppError> {
        let notes = notes.map(str::trim).filter(|s| !s.is_empty());
        if let Some(n) = notes {
            if n.chars().count() > MAX_NOTES_LEN {
                return Err(AppError::Validation(format!(
                    "notes must be at most {} characters",
                    MAX_NOTES_LEN
                )));
            }
        }
        Ok(notes.map(String::from))
    }

    pub fn dealership(update: &DealershipUpdate) -> Result<(), AppError> {
        required_text("name", &update.name, 200)?;
        required_text("address", &update.address, 500)?;
        if !email_re().is_match(update.email.trim()) {
            return Err(AppError::Validation("email must be a valid email".into()));
        }
        if !phone_re().is_match(update.phone.trim()) {
            return Err(AppError::Validation("phone must be a valid phone number".into()));
        }
        Ok(())
    }

    /// Each weekday at most once; open days need open < close.
    pub fn working_hours(hours: &[WorkingHour]) -> Result<(), AppError> {
        let mut seen = HashSet::new();
        for h in hours {
            if !seen.insert(h.day_of_week) {
                return Err(AppError::Validation(format!("{} listed more than once", h.day_of_week)));
            }
            if h.is_open && h.open_time >= h.close_time {
                return Err(AppError::Validation(format!(
                    "{}: opening time must be before closing time",
                    h.day_of_week
                )));
            }
        }
        Ok(())
    }

    pub fn make_name(name: &str) -> Result<(), AppError> {
        required_text("name", name, 100)
    }

    pub fn color(name: &str, hex_code: &str) -> Result<(), AppError> {
        required_text("name", name, 100)?;
        if !hex_re().is_match(hex_code.trim()) {
            return Err(AppError::Validation("hexCode must look like #RRGGBB".into()));
        }
        Ok(())
    }

    pub fn section_name(name: &str) -> Result<(), AppError> {
        if !section_re().is_match(name) {
            return Err(AppError::Validation(format!(
                "invalid section name '{}': lowercase letters, digits and underscores",
                name
            )));
        }
        Ok(())
    }
}

/// Lowercase, ASCII alphanumerics separated by single dashes: "Land Rover" -> "land-rover".
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut dash = false;
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            if dash && !out.is_empty() {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
            dash = false;
        } else {
            dash = true;
        }
    }
    out
}

fn parse_field<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, AppError> {
    raw.parse()
        .map_err(|_| AppError::Validation(format!("{} is not valid: '{}'", name, raw)))
}

fn required_text(name: &str, value: &str, max: usize) -> Result<(), AppError> {
    let len = value.trim().chars().count();
    if len == 0 {
        return Err(AppError::Validation(format!("{} is required", name)));
    }
    if len > max {
        return Err(AppError::Validation(format!("{} must be at most {} characters", name, max)));
    }
    Ok(())
}

fn check_model(model: &str) -> Result<(), AppError> {
    required_text("model", model, MAX_MODEL_LEN)
}

fn check_year(year: i32, current_year: i32) -> Result<(), AppError> {
    if year < MIN_CAR_YEAR || year > current_year + 1 {
        return Err(AppError::Validation(format!(
            "year must be between {} and {}",
            MIN_CAR_YEAR,
            current_year + 1
        )));
    }
    Ok(())
}

fn check_price(price: f64) -> Result<(), AppError> {
    if !price.is_finite() {
        return Err(AppError::Validation("price must be a number".into()));
    }
    // Stored as NUMERIC(12, 2): compare what the column will hold.
    let cents = (price * 100.0).round();
    if cents <= 0.0 {
        return Err(AppError::Validation("price must be at least 0.01".into()));
    }
    if cents / 100.0 > MAX_PRICE {
        return Err(AppError::Validation(format!("price must be at most {:.2}", MAX_PRICE)));
    }
    Ok(())
}

fn check_mileage(mileage: i32) -> Result<(), AppError> {
    if mileage < 0 {
        return Err(AppError::Validation("mileage cannot be negative".into()));
    }
    Ok(())
}

fn check_seats(seats: i32) -> Result<(), AppError> {
    if !(1..=20).contains(&seats) {
        return Err(AppError::Validation("seats must be between 1 and 20".into()));
    }
    Ok(())
}

fn check_description(description: &str) -> Result<(), AppError> {
    if description.trim().chars().count() < MIN_DESCRIPTION_LEN {
        return Err(AppError::Validation(format!(
            "description must be at least {} characters",
            MIN_DESCRIPTION_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BodyType, DayOfWeek, FuelType};
    use chrono::NaiveTime;

    fn form() -> HashMap<String, String> {
        [
            ("makeId", "00000000-0000-0000-0000-000000000001"),
            ("model", "Corolla"),
            ("year", "2021"),
            ("price", "18999.50"),
            ("mileage", "25000"),
            ("colorId", "00000000-0000-0000-0000-000000000002"),
            ("fuelType", "hybrid"),
            ("transmission", "AUTOMATIC"),
            ("bodyType", "sedan"),
            ("description", "One owner, full service history"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn accepts_a_complete_form_with_defaults() {
        let car = RequestValidator::car_form(&form(), 2025).unwrap();
        assert_eq!(car.fuel_type, FuelType::Hybrid);
        assert_eq!(car.body_type, BodyType::Sedan);
        assert_eq!(car.status, CarStatus::Available);
        assert!(!car.featured);
        assert_eq!(car.seats, None);
        assert_eq!(car.price, 18999.5);
    }

    #[test]
    fn rejects_year_before_1900() {
        let mut f = form();
        f.insert("year".into(), "1899".into());
        let err = RequestValidator::car_form(&f, 2025).unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m.contains("year")));
    }

    #[test]
    fn rejects_year_beyond_next_model_year() {
        let mut f = form();
        f.insert("year".into(), "2027".into());
        assert!(RequestValidator::car_form(&f, 2025).is_err());
        f.insert("year".into(), "2026".into());
        assert!(RequestValidator::car_form(&f, 2025).is_ok());
    }

    #[test]
    fn reports_missing_fields_by_name() {
        let mut f = form();
        f.remove("model");
        let err = RequestValidator::car_form(&f, 2025).unwrap_err();
        assert_eq!(err.to_string(), "validation: model is required");
    }

    #[test]
    fn rejects_non_positive_price_and_short_description() {
        let mut f = form();
        f.insert("price".into(), "0".into());
        assert!(RequestValidator::car_form(&f, 2025).is_err());
        let mut f = form();
        f.insert("description".into(), "short".into());
        assert!(RequestValidator::car_form(&f, 2025).is_err());
    }

    #[test]
    fn price_must_fit_the_stored_precision() {
        for bad in ["0.001", "100000000000", "10000000000", "NaN"] {
            let mut f = form();
            f.insert("price".into(), bad.into());
            assert!(
                matches!(RequestValidator::car_form(&f, 2025), Err(AppError::Validation(_))),
                "price {} accepted",
                bad
            );
        }
        let mut f = form();
        f.insert("price".into(), "9999999999.99".into());
        assert!(RequestValidator::car_form(&f, 2025).is_ok());
        let patch = CarPatch {
            price: Some(1e11),
            ..Default::default()
        };
        assert!(RequestValidator::car_patch(&patch, 2025).is_err());
    }

    #[test]
    fn invalid_enum_is_bad_request() {
        let mut f = form();
        f.insert("bodyType".into(), "tank".into());
        assert!(matches!(RequestValidator::car_form(&f, 2025), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn patch_checks_present_fields_only() {
        let patch = CarPatch {
            featured: Some(true),
            ..Default::default()
        };
        assert!(RequestValidator::car_patch(&patch, 2025).is_ok());
        let patch = CarPatch {
            seats: Some(Some(40)),
            ..Default::default()
        };
        assert!(RequestValidator::car_patch(&patch, 2025).is_err());
        assert!(RequestValidator::car_patch(&CarPatch::default(), 2025).is_err());
    }

    #[test]
    fn notes_are_trimmed_and_capped() {
        assert_eq!(RequestValidator::booking_notes(Some("  ")).unwrap(), None);
        assert_eq!(RequestValidator::booking_notes(Some(" hi ")).unwrap().as_deref(), Some("hi"));
        let long = "x".repeat(MAX_NOTES_LEN + 1);
        assert!(RequestValidator::booking_notes(Some(&long)).is_err());
    }

    #[test]
    fn working_hours_reject_duplicates_and_inverted_times() {
        let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
        let monday = WorkingHour {
            day_of_week: DayOfWeek::Monday,
            open_time: t(9),
            close_time: t(17),
            is_open: true,
        };
        assert!(RequestValidator::working_hours(&[monday.clone()]).is_ok());
        assert!(RequestValidator::working_hours(&[monday.clone(), monday.clone()]).is_err());
        let inverted = WorkingHour {
            open_time: t(18),
            ..monday.clone()
        };
        assert!(RequestValidator::working_hours(&[inverted.clone()]).is_err());
        let closed = WorkingHour {
            is_open: false,
            ..inverted
        };
        assert!(RequestValidator::working_hours(&[closed]).is_ok());
    }

    #[test]
    fn dealership_contact_formats() {
        let ok = DealershipUpdate {
            name: "Main Street Motors".into(),
            address: "1 Main St".into(),
            phone: "+1 (555) 010-2000".into(),
            email: "sales@example.com".into(),
        };
        assert!(RequestValidator::dealership(&ok).is_ok());
        let bad_email = DealershipUpdate {
            email: "sales-at-example".into(),
            ..ok.clone()
        };
        assert!(RequestValidator::dealership(&bad_email).is_err());
    }

    #[test]
    fn colors_need_hex_codes() {
        assert!(RequestValidator::color("Red", "#ff0000").is_ok());
        assert!(RequestValidator::color("Red", "red").is_err());
    }

    #[test]
    fn section_names() {
        assert!(RequestValidator::section_name("hero").is_ok());
        assert!(RequestValidator::section_name("faq_2").is_ok());
        assert!(RequestValidator::section_name("Hero").is_err());
        assert!(RequestValidator::section_name("../etc").is_err());
    }

    #[test]
    fn slugs() {
        assert_eq!(slugify("Land Rover"), "land-rover");
        assert_eq!(slugify("  Mercedes-Benz  "), "mercedes-benz");
        assert_eq!(slugify("Rolls--Royce!"), "rolls-royce");
    }
}
