//! Database work behind each surface. Services take a `&PgPool` and know nothing about HTTP.

mod availability;
mod bookings;
mod cars;
mod catalog;
mod dashboard;
mod dealership;
mod home;
mod users;
mod validation;
mod wishlist;

pub use availability::{compute_slots, AvailabilityService};
pub use bookings::BookingService;
pub(crate) use cars::{query_parse, query_text};
pub use cars::{CarSearchParams, CarService, MAX_IMAGES_PER_CAR};
pub use catalog::CatalogService;
pub use dashboard::DashboardService;
pub use dealership::DealershipService;
pub use home::{body_type_links, HomeService, HOME_FEATURED_LIMIT};
pub use users::UserService;
pub use validation::{slugify, RequestValidator, MAX_NOTES_LEN, MIN_CAR_YEAR};
pub use wishlist::WishlistService;
