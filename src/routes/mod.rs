//! Router builders per surface, and the assembled application.

mod account;
mod admin;
mod common;
mod public;

pub use account::account_routes;
pub use admin::admin_routes;
pub use common::common_routes;
pub use public::public_routes;

use crate::openapi::openapi_json;
use crate::state::AppState;
use axum::{routing::get, Router};

pub const API_PREFIX: &str = "/api/v1";

/// `/health`, `/ready`, `/version` at the root; everything else under [`API_PREFIX`].
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .route("/openapi.json", get(openapi_json))
        .merge(public_routes(state.clone()))
        .merge(account_routes(state.clone()))
        .nest("/admin", admin_routes(state.clone()));
    Router::new().merge(common_routes(state)).nest(API_PREFIX, api)
}
