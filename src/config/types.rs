//! Runtime settings, loaded once at startup.

use std::net::SocketAddr;

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub db_max_connections: u32,
    pub auth: AuthSettings,
    pub storage: StorageSettings,
    pub booking: BookingSettings,
    /// Request body cap, applies to multipart car uploads too.
    pub max_upload_bytes: usize,
}

#[derive(Clone, Debug)]
pub struct AuthSettings {
    /// Project URL, e.g. `https://abc.supabase.co`.
    pub supabase_url: String,
    pub anon_key: String,
}

#[derive(Clone, Debug)]
pub struct StorageSettings {
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Base for public object URLs; the bucket and key are appended.
    pub public_url: String,
}

#[derive(Clone, Debug)]
pub struct BookingSettings {
    pub slot_minutes: u32,
}

impl Default for BookingSettings {
    fn default() -> Self {
        BookingSettings { slot_minutes: 60 }
    }
}
