//! Load settings from the process environment (after `.env`) or any key lookup.

use crate::config::{AuthSettings, BookingSettings, Settings, StorageSettings};
use crate::error::ConfigError;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::str::FromStr;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/dealership";
const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 3000);
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Load settings from the environment. Reads `.env` first when present.
pub fn load_from_env() -> Result<Settings, ConfigError> {
    dotenvy::dotenv().ok();
    load_with(|key| std::env::var(key).ok())
}

/// Load settings from a map; used by tests and tools that do not touch the process env.
pub fn load_from_map(vars: &HashMap<String, String>) -> Result<Settings, ConfigError> {
    load_with(|key| vars.get(key).cloned())
}

/// Load settings through `lookup`, applying defaults and then validating.
pub fn load_with<F>(lookup: F) -> Result<Settings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let supabase_url = get("SUPABASE_URL")
        .ok_or(ConfigError::Missing("SUPABASE_URL"))?
        .trim_end_matches('/')
        .to_string();
    let anon_key = get("SUPABASE_ANON_KEY").ok_or(ConfigError::Missing("SUPABASE_ANON_KEY"))?;

    let storage = StorageSettings {
        endpoint: get("STORAGE_ENDPOINT").unwrap_or_else(|| format!("{}/storage/v1/s3", supabase_url)),
        region: get("STORAGE_REGION").unwrap_or_else(|| "us-east-1".into()),
        bucket: get("STORAGE_BUCKET").unwrap_or_else(|| "car-images".into()),
        access_key_id: get("STORAGE_ACCESS_KEY_ID").ok_or(ConfigError::Missing("STORAGE_ACCESS_KEY_ID"))?,
        secret_access_key: get("STORAGE_SECRET_ACCESS_KEY")
            .ok_or(ConfigError::Missing("STORAGE_SECRET_ACCESS_KEY"))?,
        public_url: get("STORAGE_PUBLIC_URL")
            .unwrap_or_else(|| format!("{}/storage/v1/object/public", supabase_url))
            .trim_end_matches('/')
            .to_string(),
    };

    let settings = Settings {
        database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
        bind_addr: parse_or("BIND_ADDR", get("BIND_ADDR"), SocketAddr::from(DEFAULT_BIND_ADDR))?,
        db_max_connections: parse_or("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), 5)?,
        auth: AuthSettings { supabase_url, anon_key },
        storage,
        booking: BookingSettings {
            slot_minutes: parse_or("BOOKING_SLOT_MINUTES", get("BOOKING_SLOT_MINUTES"), BookingSettings::default().slot_minutes)?,
        },
        max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", get("MAX_UPLOAD_BYTES"), DEFAULT_MAX_UPLOAD_BYTES)?,
    };
    crate::config::validate(&settings)?;
    Ok(settings)
}

fn parse_or<T: FromStr>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(s) => s.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_vars() -> HashMap<String, String> {
        [
            ("SUPABASE_URL", "https://demo.supabase.co/"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("STORAGE_ACCESS_KEY_ID", "key"),
            ("STORAGE_SECRET_ACCESS_KEY", "secret"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn applies_defaults() {
        let s = load_from_map(&base_vars()).unwrap();
        assert_eq!(s.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(s.bind_addr.port(), 3000);
        assert_eq!(s.db_max_connections, 5);
        assert_eq!(s.booking.slot_minutes, 60);
        assert_eq!(s.auth.supabase_url, "https://demo.supabase.co");
        assert_eq!(s.storage.endpoint, "https://demo.supabase.co/storage/v1/s3");
        assert_eq!(s.storage.public_url, "https://demo.supabase.co/storage/v1/object/public");
        assert_eq!(s.storage.bucket, "car-images");
    }

    #[test]
    fn missing_anon_key_is_reported() {
        let mut vars = base_vars();
        vars.remove("SUPABASE_ANON_KEY");
        let err = load_from_map(&vars).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SUPABASE_ANON_KEY")));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let mut vars = base_vars();
        vars.insert("STORAGE_ACCESS_KEY_ID".into(), "   ".into());
        assert!(matches!(
            load_from_map(&vars).unwrap_err(),
            ConfigError::Missing("STORAGE_ACCESS_KEY_ID")
        ));
    }

    #[test]
    fn unparsable_number_is_invalid() {
        let mut vars = base_vars();
        vars.insert("DB_MAX_CONNECTIONS".into(), "many".into());
        assert!(matches!(
            load_from_map(&vars).unwrap_err(),
            ConfigError::Invalid { name: "DB_MAX_CONNECTIONS", .. }
        ));
    }

    #[test]
    fn overrides_are_used() {
        let mut vars = base_vars();
        vars.insert("BIND_ADDR".into(), "127.0.0.1:8080".into());
        vars.insert("BOOKING_SLOT_MINUTES".into(), "30".into());
        let s = load_from_map(&vars).unwrap();
        assert_eq!(s.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(s.booking.slot_minutes, 30);
    }
}
