//! Car dealership backend: inventory search, test drive bookings, wishlists and a back office,
//! served over axum with PostgreSQL storage.

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod models;
pub mod openapi;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod storage;
pub mod store;
pub mod urls;

pub use auth::{AuthProvider, SupabaseAuth};
pub use config::{load_from_env, Settings};
pub use error::{AppError, ConfigError};
pub use migration::apply_migrations;
pub use response::{success_many, success_one, success_one_ok};
pub use routes::{app, API_PREFIX};
pub use state::AppState;
pub use storage::{ObjectStore, S3Store};
pub use store::{connect, ensure_database_exists};
