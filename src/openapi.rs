//! OpenAPI document listing the API's request and response shapes.

use crate::models::{
    Availability, BodyType, BodyTypeLink, Booking, BookingCar, BookingPage, BookingRequest, BookingStatus, BookingUser,
    Car, CarColor, CarDetail, CarFilters, CarMake, CarPage, CarPatch, CarRef, CarStats, CarStatus, ColorRef,
    DashboardStats, DayOfWeek, Dealership, DealershipUpdate, FilterOption, FuelType, HomePage, HomeSection, MakeLink,
    NewColor, NewMake, Pagination, PriceRange, Role, RoleUpdate, StatusUpdate, TestDriveStats, TimeSlot,
    Transmission, User, WishlistToggle, WorkingHour,
};
use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "Dealership API", description = "Car inventory, test drive bookings and back office"),
    components(schemas(
        Car, CarRef, ColorRef, CarPage, CarDetail, CarPatch, Pagination, CarFilters, FilterOption, PriceRange,
        CarMake, CarColor, NewMake, NewColor, FuelType, Transmission, BodyType, CarStatus,
        Booking, BookingCar, BookingUser, BookingPage, BookingRequest, BookingStatus, StatusUpdate,
        Availability, TimeSlot, Dealership, DealershipUpdate, WorkingHour, DayOfWeek,
        User, Role, RoleUpdate, WishlistToggle, DashboardStats, CarStats, TestDriveStats,
        HomePage, HomeSection, MakeLink, BodyTypeLink
    ))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
