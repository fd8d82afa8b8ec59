use crate::handlers::{admin, catalog, dealership, home};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post, put},
    Router,
};

/// Back-office routes, mounted under `/admin`. Car uploads may use the whole configured body size.
pub fn admin_routes(state: AppState) -> Router {
    let upload_limit = state.settings.max_upload_bytes;
    Router::new()
        .route(
            "/cars",
            get(admin::list_cars).post(admin::create_car).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/cars/:id", patch(admin::update_car).delete(admin::delete_car))
        .route("/makes", post(catalog::create_make))
        .route("/makes/:id", delete(catalog::delete_make))
        .route("/colors", post(catalog::create_color))
        .route("/colors/:id", delete(catalog::delete_color))
        .route("/bookings", get(admin::list_bookings))
        .route("/bookings/:id/status", patch(admin::update_booking_status))
        .route("/dealership", get(dealership::admin_get).put(dealership::update))
        .route("/dealership/hours", put(dealership::replace_hours))
        .route("/users", get(admin::list_users))
        .route("/users/:id/role", patch(admin::set_user_role))
        .route("/dashboard", get(admin::dashboard))
        .route("/home/:section", put(home::upsert_section).delete(home::delete_section))
        .with_state(state)
}
