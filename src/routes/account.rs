use crate::handlers::account;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

/// Routes for signed-in users.
pub fn account_routes(state: AppState) -> Router {
    Router::new()
        .route("/me", get(account::me))
        .route("/wishlist", get(account::wishlist))
        .route("/wishlist/:car_id", post(account::toggle_wishlist))
        .route("/bookings", get(account::my_bookings).post(account::create_booking))
        .route("/bookings/:id/cancel", post(account::cancel_booking))
        .with_state(state)
}
