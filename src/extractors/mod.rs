//! Request extractors: the signed-in user and JSON bodies.

pub mod auth;
pub mod json;
pub use auth::{require_admin, AdminUser, CurrentUser, MaybeUser};
pub use json::JsonBody;
