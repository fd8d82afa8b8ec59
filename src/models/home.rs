//! Home page: editable content sections plus catalogue-driven quick links.

use crate::models::Car;
use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HomeSection {
    pub section: String,
    #[schema(value_type = Object)]
    pub content: Value,
    pub updated_at: String,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MakeLink {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub logo_url: Option<String>,
    pub search_url: String,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BodyTypeLink {
    pub body_type: crate::models::BodyType,
    pub label: String,
    pub search_url: String,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HomePage {
    #[schema(value_type = Object)]
    pub sections: Map<String, Value>,
    pub featured_cars: Vec<Car>,
    pub makes: Vec<MakeLink>,
    pub body_types: Vec<BodyTypeLink>,
}
