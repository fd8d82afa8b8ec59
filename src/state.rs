//! Shared application state for all routes.

use crate::auth::AuthProvider;
use crate::config::Settings;
use crate::storage::ObjectStore;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub settings: Arc<Settings>,
    pub auth: Arc<dyn AuthProvider>,
    pub storage: Arc<dyn ObjectStore>,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        settings: Settings,
        auth: Arc<dyn AuthProvider>,
        storage: Arc<dyn ObjectStore>,
    ) -> Self {
        AppState {
            pool,
            settings: Arc::new(settings),
            auth,
            storage,
        }
    }
}
