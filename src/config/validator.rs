//! Settings validation: ranges and URL shapes checked before the server starts.

use crate::config::Settings;
use crate::error::ConfigError;

const SLOT_MINUTES_RANGE: std::ops::RangeInclusive<u32> = 15..=240;

pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    if !SLOT_MINUTES_RANGE.contains(&settings.booking.slot_minutes) {
        return Err(ConfigError::Validation(format!(
            "BOOKING_SLOT_MINUTES must be between {} and {}",
            SLOT_MINUTES_RANGE.start(),
            SLOT_MINUTES_RANGE.end()
        )));
    }
    if settings.db_max_connections == 0 {
        return Err(ConfigError::Validation("DB_MAX_CONNECTIONS must be at least 1".into()));
    }
    if settings.max_upload_bytes < 1024 {
        return Err(ConfigError::Validation("MAX_UPLOAD_BYTES must be at least 1024".into()));
    }
    for (name, url) in [
        ("SUPABASE_URL", &settings.auth.supabase_url),
        ("STORAGE_ENDPOINT", &settings.storage.endpoint),
        ("STORAGE_PUBLIC_URL", &settings.storage.public_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                name,
                reason: format!("expected http(s) URL, got '{}'", url),
            });
        }
    }
    if !settings.database_url.starts_with("postgres://") && !settings.database_url.starts_with("postgresql://") {
        return Err(ConfigError::Invalid {
            name: "DATABASE_URL",
            reason: "expected a postgres:// URL".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_from_map;
    use std::collections::HashMap;

    fn vars(extra: &[(&str, &str)]) -> HashMap<String, String> {
        let mut m: HashMap<String, String> = [
            ("SUPABASE_URL", "https://demo.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("STORAGE_ACCESS_KEY_ID", "key"),
            ("STORAGE_SECRET_ACCESS_KEY", "secret"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        for (k, v) in extra {
            m.insert(k.to_string(), v.to_string());
        }
        m
    }

    #[test]
    fn rejects_slot_length_out_of_range() {
        let err = load_from_map(&vars(&[("BOOKING_SLOT_MINUTES", "5")])).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn rejects_non_http_supabase_url() {
        let err = load_from_map(&vars(&[("SUPABASE_URL", "demo.supabase.co")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "SUPABASE_URL", .. }));
    }

    #[test]
    fn rejects_non_postgres_database_url() {
        let err = load_from_map(&vars(&[("DATABASE_URL", "mysql://localhost/db")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "DATABASE_URL", .. }));
    }
}
