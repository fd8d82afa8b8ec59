//! Links into the public car search.

use reqwest::Url;

/// Parsing base only; the returned links are site-relative.
const BASE: &str = "http://localhost/cars";

fn is_blank(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || v == "0" || v.eq_ignore_ascii_case("false")
}

/// `/cars?…` with empty, zero and false values dropped. Pairs keep the given order.
pub fn car_search_url(params: &[(&str, &str)]) -> String {
    let kept: Vec<(&str, &str)> = params
        .iter()
        .filter(|(_, v)| !is_blank(v))
        .map(|(k, v)| (*k, v.trim()))
        .collect();
    let query = match Url::parse(BASE) {
        Ok(mut url) if !kept.is_empty() => {
            url.query_pairs_mut().extend_pairs(kept);
            url.query().map(String::from)
        }
        _ => None,
    };
    match query {
        Some(q) => format!("/cars?{}", q),
        None => "/cars".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omits_falsy_params() {
        let url = car_search_url(&[("make", "bmw"), ("minPrice", "0"), ("search", ""), ("featured", "false")]);
        assert_eq!(url, "/cars?make=bmw");
    }

    #[test]
    fn encodes_values_in_order() {
        let url = car_search_url(&[("search", "range rover"), ("bodyType", "SUV"), ("color", "a&b")]);
        assert_eq!(url, "/cars?search=range+rover&bodyType=SUV&color=a%26b");
    }

    #[test]
    fn no_params_is_the_bare_search_page() {
        assert_eq!(car_search_url(&[]), "/cars");
    }
}
