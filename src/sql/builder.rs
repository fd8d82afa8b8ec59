//! Builds the parameterized car and booking listing queries. Identifiers are fixed here; every
//! user-supplied value goes through a placeholder.

use crate::models::{
    BodyType, BookingStatus, CarStatus, FuelType, Transmission, BOOKING_COLUMNS, BOOKING_FROM, CAR_COLUMNS, CAR_FROM,
};
use crate::sql::{PgBindValue, QueryBuf};
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: u32 = 6;
pub const MAX_PAGE_SIZE: u32 = 50;

/// Sort keys accepted by car listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CarSort {
    #[default]
    Newest,
    Oldest,
    PriceAsc,
    PriceDesc,
    MileageAsc,
    YearDesc,
}

impl CarSort {
    /// Parse a sort key; unknown keys fall back to newest.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().replace(['_', '-'], "").as_str() {
            "oldest" => CarSort::Oldest,
            "priceasc" => CarSort::PriceAsc,
            "pricedesc" => CarSort::PriceDesc,
            "mileageasc" => CarSort::MileageAsc,
            "yeardesc" => CarSort::YearDesc,
            _ => CarSort::Newest,
        }
    }

    fn order_by(&self) -> &'static str {
        match self {
            CarSort::Newest => "c.created_at DESC, c.id",
            CarSort::Oldest => "c.created_at ASC, c.id",
            CarSort::PriceAsc => "c.price ASC, c.id",
            CarSort::PriceDesc => "c.price DESC, c.id",
            CarSort::MileageAsc => "c.mileage ASC, c.id",
            CarSort::YearDesc => "c.year DESC, c.id",
        }
    }
}

/// Page window: 1-based page, clamped limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub limit: u32,
}

impl PageWindow {
    /// Raw query values: page below 1 becomes 1, limit is held to `1..=MAX_PAGE_SIZE`.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        PageWindow {
            page: page.unwrap_or(1).clamp(1, i64::from(u32::MAX)) as u32,
            limit: Self::clamp_limit(limit),
        }
    }

    pub fn clamp_limit(limit: Option<i64>) -> u32 {
        limit
            .unwrap_or(i64::from(DEFAULT_PAGE_SIZE))
            .clamp(1, i64::from(MAX_PAGE_SIZE)) as u32
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    fn clause(&self) -> String {
        format!(" LIMIT {} OFFSET {}", self.limit, self.offset())
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        PageWindow::new(None, None)
    }
}

/// Car filters after slugs have been resolved to ids. All present filters combine with AND.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CarFilter {
    pub search: Option<String>,
    pub status: Option<CarStatus>,
    pub featured: Option<bool>,
    pub make_id: Option<Uuid>,
    pub color_id: Option<Uuid>,
    pub body_type: Option<BodyType>,
    pub fuel_type: Option<FuelType>,
    pub transmission: Option<Transmission>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_mileage: Option<i32>,
    pub max_mileage: Option<i32>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
}

/// Translate an age range in years into a model-year range relative to `current_year`.
/// Returns `(min_year, max_year)`.
pub fn years_from_ages(current_year: i32, min_age: Option<i32>, max_age: Option<i32>) -> (Option<i32>, Option<i32>) {
    let max_year = min_age.map(|a| current_year - a.max(0));
    let min_year = max_age.map(|a| current_year - a.max(0));
    (min_year, max_year)
}

/// `%term%` for ILIKE with LIKE metacharacters escaped.
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn car_where(filter: &CarFilter, q: &mut QueryBuf) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(term) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let ph = q.push_param(PgBindValue::Text(like_pattern(term)));
        parts.push(format!(
            "(c.model ILIKE {ph} OR c.description ILIKE {ph} OR m.name ILIKE {ph} OR col.name ILIKE {ph})"
        ));
    }
    if let Some(status) = filter.status {
        let ph = q.push_param(PgBindValue::Text(status.as_str().into()));
        parts.push(format!("c.status = {}", ph));
    }
    if let Some(featured) = filter.featured {
        let ph = q.push_param(PgBindValue::Bool(featured));
        parts.push(format!("c.featured = {}", ph));
    }
    if let Some(id) = filter.make_id {
        let ph = q.push_param(PgBindValue::Uuid(id));
        parts.push(format!("c.make_id = {}", ph));
    }
    if let Some(id) = filter.color_id {
        let ph = q.push_param(PgBindValue::Uuid(id));
        parts.push(format!("c.color_id = {}", ph));
    }
    if let Some(v) = filter.body_type {
        let ph = q.push_param(PgBindValue::Text(v.as_str().into()));
        parts.push(format!("c.body_type = {}", ph));
    }
    if let Some(v) = filter.fuel_type {
        let ph = q.push_param(PgBindValue::Text(v.as_str().into()));
        parts.push(format!("c.fuel_type = {}", ph));
    }
    if let Some(v) = filter.transmission {
        let ph = q.push_param(PgBindValue::Text(v.as_str().into()));
        parts.push(format!("c.transmission = {}", ph));
    }
    let ranges = [
        ("c.price >=", filter.min_price.map(PgBindValue::F64)),
        ("c.price <=", filter.max_price.map(PgBindValue::F64)),
        ("c.mileage >=", filter.min_mileage.map(PgBindValue::I32)),
        ("c.mileage <=", filter.max_mileage.map(PgBindValue::I32)),
        ("c.year >=", filter.min_year.map(PgBindValue::I32)),
        ("c.year <=", filter.max_year.map(PgBindValue::I32)),
    ];
    for (lhs, value) in ranges {
        if let Some(v) = value {
            let ph = q.push_param(v);
            parts.push(format!("{} {}", lhs, ph));
        }
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

/// COUNT(*) over the filtered cars.
pub fn count_cars(filter: &CarFilter) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = car_where(filter, &mut q);
    q.sql = format!("SELECT COUNT(*) FROM {}{}", CAR_FROM, where_clause);
    q
}

/// One page of filtered cars, selecting [`CAR_COLUMNS`].
pub fn select_cars(filter: &CarFilter, sort: CarSort, window: PageWindow) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = car_where(filter, &mut q);
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {}{}",
        CAR_COLUMNS,
        CAR_FROM,
        where_clause,
        sort.order_by(),
        window.clause()
    );
    q
}

/// Which of `car_ids` the user has saved. Binds `$1` user id, `$2` uuid array.
pub fn select_wishlisted(user_id: Uuid, car_ids: Vec<Uuid>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let user = q.push_param(PgBindValue::Uuid(user_id));
    let ids = q.push_param(PgBindValue::UuidArray(car_ids));
    q.sql = format!(
        "SELECT car_id FROM user_saved_cars WHERE user_id = {} AND car_id = ANY({})",
        user, ids
    );
    q
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BookingFilter {
    pub user_id: Option<Uuid>,
    pub status: Option<BookingStatus>,
    pub search: Option<String>,
}

fn booking_where(filter: &BookingFilter, q: &mut QueryBuf) -> String {
    let mut parts = Vec::new();
    if let Some(id) = filter.user_id {
        let ph = q.push_param(PgBindValue::Uuid(id));
        parts.push(format!("b.user_id = {}", ph));
    }
    if let Some(status) = filter.status {
        let ph = q.push_param(PgBindValue::Text(status.as_str().into()));
        parts.push(format!("b.status = {}", ph));
    }
    if let Some(term) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let ph = q.push_param(PgBindValue::Text(like_pattern(term)));
        parts.push(format!(
            "(u.name ILIKE {ph} OR u.email ILIKE {ph} OR m.name ILIKE {ph} OR c.model ILIKE {ph})"
        ));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

pub fn count_bookings(filter: &BookingFilter) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = booking_where(filter, &mut q);
    q.sql = format!("SELECT COUNT(*) FROM {}{}", BOOKING_FROM, where_clause);
    q
}

/// Bookings newest date first, selecting [`BOOKING_COLUMNS`]. No window means every match.
pub fn select_bookings(filter: &BookingFilter, window: Option<PageWindow>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = booking_where(filter, &mut q);
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY b.booking_date DESC, b.start_time DESC, b.id{}",
        BOOKING_COLUMNS,
        BOOKING_FROM,
        where_clause,
        window.map(|w| w.clause()).unwrap_or_default()
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_filters_means_no_where() {
        let q = count_cars(&CarFilter::default());
        assert!(q.sql.starts_with("SELECT COUNT(*) FROM cars c JOIN car_makes m"));
        assert!(!q.sql.contains("WHERE"));
        assert!(q.params.is_empty());
    }

    #[test]
    fn filters_combine_conjunctively_in_order() {
        let make = Uuid::from_u128(7);
        let filter = CarFilter {
            search: Some("corolla".into()),
            status: Some(CarStatus::Available),
            make_id: Some(make),
            body_type: Some(BodyType::Sedan),
            min_price: Some(5000.0),
            max_mileage: Some(60000),
            ..Default::default()
        };
        let q = select_cars(&filter, CarSort::PriceAsc, PageWindow::new(Some(2), Some(6)));
        assert!(q.sql.contains(
            " WHERE (c.model ILIKE $1 OR c.description ILIKE $1 OR m.name ILIKE $1 OR col.name ILIKE $1) \
             AND c.status = $2 AND c.make_id = $3 AND c.body_type = $4 AND c.price >= $5 AND c.mileage <= $6"
        ));
        assert!(q.sql.ends_with(" ORDER BY c.price ASC, c.id LIMIT 6 OFFSET 6"));
        assert_eq!(
            q.params,
            vec![
                PgBindValue::Text("%corolla%".into()),
                PgBindValue::Text("AVAILABLE".into()),
                PgBindValue::Uuid(make),
                PgBindValue::Text("SEDAN".into()),
                PgBindValue::F64(5000.0),
                PgBindValue::I32(60000),
            ]
        );
    }

    #[test]
    fn count_and_page_share_the_where_clause() {
        let filter = CarFilter {
            fuel_type: Some(FuelType::Electric),
            min_year: Some(2018),
            ..Default::default()
        };
        let count = count_cars(&filter);
        let page = select_cars(&filter, CarSort::default(), PageWindow::new(None, None));
        assert!(count.sql.ends_with("WHERE c.fuel_type = $1 AND c.year >= $2"));
        assert!(page.sql.contains("WHERE c.fuel_type = $1 AND c.year >= $2 ORDER BY c.created_at DESC"));
        assert_eq!(count.params, page.params);
    }

    #[test]
    fn blank_search_is_ignored() {
        let filter = CarFilter {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert!(count_cars(&filter).params.is_empty());
    }

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern(" 100%_off "), "%100\\%\\_off%");
    }

    #[test]
    fn ages_become_year_bounds() {
        assert_eq!(years_from_ages(2025, Some(2), Some(10)), (Some(2015), Some(2023)));
        assert_eq!(years_from_ages(2025, None, None), (None, None));
    }

    #[test]
    fn page_window_clamps() {
        assert_eq!(PageWindow::new(Some(0), Some(500)), PageWindow { page: 1, limit: MAX_PAGE_SIZE });
        assert_eq!(PageWindow::new(None, Some(0)).limit, 1);
        assert_eq!(PageWindow::new(Some(3), Some(10)).offset(), 20);
        assert_eq!(PageWindow::new(Some(-2), Some(-5)), PageWindow { page: 1, limit: 1 });
        assert_eq!(PageWindow::clamp_limit(None), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn sort_keys_parse_leniently() {
        assert_eq!(CarSort::parse("priceDesc"), CarSort::PriceDesc);
        assert_eq!(CarSort::parse("price_asc"), CarSort::PriceAsc);
        assert_eq!(CarSort::parse("bogus"), CarSort::Newest);
    }

    #[test]
    fn wishlist_lookup_binds_user_and_ids() {
        let q = select_wishlisted(Uuid::nil(), vec![Uuid::from_u128(1)]);
        assert_eq!(q.sql, "SELECT car_id FROM user_saved_cars WHERE user_id = $1 AND car_id = ANY($2)");
        assert_eq!(q.params.len(), 2);
    }

    #[test]
    fn booking_search_covers_user_and_car() {
        let filter = BookingFilter {
            status: Some(BookingStatus::Pending),
            search: Some("ana".into()),
            ..Default::default()
        };
        let q = select_bookings(&filter, Some(PageWindow::new(Some(1), Some(20))));
        assert!(q.sql.contains("WHERE b.status = $1 AND (u.name ILIKE $2 OR u.email ILIKE $2"));
        assert!(q.sql.ends_with("LIMIT 20 OFFSET 0"));
    }
}
