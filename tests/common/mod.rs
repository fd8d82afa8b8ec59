//! Router fixtures: settings from a map, a pool that never connects, stub auth and storage.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Response;
use dealership::config::load_from_map;
use dealership::models::ProviderUser;
use dealership::{app, AppError, AppState, AuthProvider, ObjectStore};
use sqlx::postgres::PgPoolOptions;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Token the stub provider fails on, as if the provider were down.
pub const BROKEN_TOKEN: &str = "provider-down";

pub struct StubAuth;

#[async_trait]
impl AuthProvider for StubAuth {
    async fn user_for_token(&self, token: &str) -> Result<Option<ProviderUser>, AppError> {
        if token == BROKEN_TOKEN {
            return Err(AppError::AuthProvider("stub provider unavailable".into()));
        }
        Ok(None)
    }
}

pub struct StubStore;

#[async_trait]
impl ObjectStore for StubStore {
    async fn put(&self, key: &str, _bytes: Vec<u8>, _content_type: &str) -> Result<String, AppError> {
        Ok(format!("https://storage.test/car-images/{}", key))
    }

    async fn delete(&self, _keys: &[String]) -> Result<(), AppError> {
        Ok(())
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        url.strip_prefix("https://storage.test/car-images/").map(String::from)
    }
}

pub fn test_router() -> axum::Router {
    let vars: HashMap<String, String> = [
        ("DATABASE_URL", "postgres://postgres@127.0.0.1:1/dealership_test"),
        ("SUPABASE_URL", "https://project.supabase.test"),
        ("SUPABASE_ANON_KEY", "anon"),
        ("STORAGE_ACCESS_KEY_ID", "key"),
        ("STORAGE_SECRET_ACCESS_KEY", "secret"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    let settings = load_from_map(&vars).expect("test settings");
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(500))
        .connect_lazy(&settings.database_url)
        .expect("lazy pool");
    app(AppState::new(pool, settings, Arc::new(StubAuth), Arc::new(StubStore)))
}

pub async fn body_json(resp: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}
