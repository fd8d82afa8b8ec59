//! Text-backed enumerations. Stored as TEXT with CHECK constraints, parsed on read.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Declares an enum stored as upper-snake TEXT: serde names, `as_str`, `ALL`, and a lenient `FromStr`
/// (case-insensitive, `-` accepted for `_`).
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident, $label:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
                match normalized.as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(AppError::BadRequest(format!(
                        "invalid {}: {} (expected one of {})",
                        $label,
                        s,
                        [$($text),+].join(", ")
                    ))),
                }
            }
        }
    };
}

text_enum!(FuelType, "fuel type" {
    Petrol => "PETROL",
    Diesel => "DIESEL",
    Electric => "ELECTRIC",
    Hybrid => "HYBRID",
    PluginHybrid => "PLUGIN_HYBRID",
});

text_enum!(Transmission, "transmission" {
    Automatic => "AUTOMATIC",
    Manual => "MANUAL",
    SemiAutomatic => "SEMI_AUTOMATIC",
});

text_enum!(BodyType, "body type" {
    Suv => "SUV",
    Sedan => "SEDAN",
    Hatchback => "HATCHBACK",
    Convertible => "CONVERTIBLE",
    Coupe => "COUPE",
    Wagon => "WAGON",
    Pickup => "PICKUP",
    Van => "VAN",
});

text_enum!(CarStatus, "car status" {
    Available => "AVAILABLE",
    Unavailable => "UNAVAILABLE",
    Sold => "SOLD",
});

text_enum!(
    /// Test drive lifecycle. PENDING and CONFIRMED hold the slot.
    BookingStatus, "booking status" {
    Pending => "PENDING",
    Confirmed => "CONFIRMED",
    Completed => "COMPLETED",
    Cancelled => "CANCELLED",
    NoShow => "NO_SHOW",
});

text_enum!(Role, "role" {
    User => "USER",
    Admin => "ADMIN",
});

text_enum!(DayOfWeek, "day of week" {
    Monday => "MONDAY",
    Tuesday => "TUESDAY",
    Wednesday => "WEDNESDAY",
    Thursday => "THURSDAY",
    Friday => "FRIDAY",
    Saturday => "SATURDAY",
    Sunday => "SUNDAY",
});

impl BookingStatus {
    /// Active bookings occupy their slot.
    pub const ACTIVE: [BookingStatus; 2] = [BookingStatus::Pending, BookingStatus::Confirmed];

    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        match self {
            Pending => matches!(next, Confirmed | Completed | Cancelled | NoShow),
            Confirmed => matches!(next, Completed | Cancelled | NoShow),
            Completed | Cancelled | NoShow => false,
        }
    }
}

impl BodyType {
    /// Human label for quick links, e.g. "Hatchback".
    pub fn label(&self) -> &'static str {
        match self {
            BodyType::Suv => "SUV",
            BodyType::Sedan => "Sedan",
            BodyType::Hatchback => "Hatchback",
            BodyType::Convertible => "Convertible",
            BodyType::Coupe => "Coupe",
            BodyType::Wagon => "Wagon",
            BodyType::Pickup => "Pickup",
            BodyType::Van => "Van",
        }
    }
}

impl From<chrono::Weekday> for DayOfWeek {
    fn from(w: chrono::Weekday) -> Self {
        match w {
            chrono::Weekday::Mon => DayOfWeek::Monday,
            chrono::Weekday::Tue => DayOfWeek::Tuesday,
            chrono::Weekday::Wed => DayOfWeek::Wednesday,
            chrono::Weekday::Thu => DayOfWeek::Thursday,
            chrono::Weekday::Fri => DayOfWeek::Friday,
            chrono::Weekday::Sat => DayOfWeek::Saturday,
            chrono::Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl DayOfWeek {
    /// Monday = 0 .. Sunday = 6, for ordering the week.
    pub fn index(&self) -> usize {
        DayOfWeek::ALL.iter().position(|d| d == self).unwrap_or(0)
    }
}

/// Build a `CHECK (col IN (...))` list for DDL from an enum's values.
pub fn check_list(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| format!("'{}'", v))
        .collect::<Vec<_>>()
        .join(", ")
}
