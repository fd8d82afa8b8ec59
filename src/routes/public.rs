//! Anonymous browsing; a valid token only adds wishlist flags and the viewer's booking.

use crate::handlers::{cars, catalog, dealership, home};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn public_routes(state: AppState) -> Router {
    Router::new()
        .route("/makes", get(catalog::list_makes))
        .route("/colors", get(catalog::list_colors))
        .route("/cars", get(cars::search))
        .route("/cars/filters", get(cars::filters))
        .route("/cars/featured", get(cars::featured))
        .route("/cars/:id", get(cars::detail))
        .route("/cars/:id/availability", get(cars::availability))
        .route("/dealership", get(dealership::get))
        .route("/home", get(home::page))
        .with_state(state)
}
