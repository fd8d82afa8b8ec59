//! Home page content sections and quick links.

use crate::error::AppError;
use crate::models::{BodyType, BodyTypeLink, HomePage, HomeSection, MakeLink};
use crate::service::{CarService, CatalogService, RequestValidator};
use crate::urls::car_search_url;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

pub const HOME_FEATURED_LIMIT: u32 = 6;

pub struct HomeService;

impl HomeService {
    pub async fn sections(pool: &PgPool) -> Result<Map<String, Value>, AppError> {
        let rows: Vec<(String, Value)> = sqlx::query_as("SELECT section, content FROM home_content ORDER BY section")
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().collect())
    }

    pub async fn upsert(pool: &PgPool, section: &str, content: Value) -> Result<HomeSection, AppError> {
        RequestValidator::section_name(section)?;
        if !content.is_object() {
            return Err(AppError::Validation("section content must be a JSON object".into()));
        }
        let (section, content, updated_at): (String, Value, DateTime<Utc>) = sqlx::query_as(
            "INSERT INTO home_content (section, content) VALUES ($1, $2) \
             ON CONFLICT (section) DO UPDATE SET content = EXCLUDED.content, updated_at = NOW() \
             RETURNING section, content, updated_at",
        )
        .bind(section)
        .bind(&content)
        .fetch_one(pool)
        .await?;
        tracing::info!(section = %section, "home section saved");
        Ok(HomeSection {
            section,
            content,
            updated_at: updated_at.to_rfc3339(),
        })
    }

    pub async fn delete(pool: &PgPool, section: &str) -> Result<(), AppError> {
        RequestValidator::section_name(section)?;
        let deleted = sqlx::query("DELETE FROM home_content WHERE section = $1")
            .bind(section)
            .execute(pool)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(AppError::NotFound(format!("home section {}", section)));
        }
        tracing::info!(section, "home section deleted");
        Ok(())
    }

    pub async fn page(pool: &PgPool, viewer: Option<Uuid>) -> Result<HomePage, AppError> {
        let sections = Self::sections(pool).await?;
        let featured_cars = CarService::featured(pool, HOME_FEATURED_LIMIT, viewer).await?;
        let makes = CatalogService::makes(pool)
            .await?
            .into_iter()
            .map(|m| MakeLink {
                search_url: car_search_url(&[("make", m.slug.as_str())]),
                id: m.id,
                name: m.name,
                slug: m.slug,
                logo_url: m.logo_url,
            })
            .collect();
        Ok(HomePage {
            sections,
            featured_cars,
            makes,
            body_types: body_type_links(),
        })
    }
}

pub fn body_type_links() -> Vec<BodyTypeLink> {
    BodyType::ALL
        .iter()
        .map(|b| BodyTypeLink {
            body_type: *b,
            label: b.label().to_string(),
            search_url: car_search_url(&[("bodyType", b.as_str())]),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_body_type_links_to_search() {
        let links = body_type_links();
        assert_eq!(links.len(), BodyType::ALL.len());
        let suv = links.iter().find(|l| l.body_type == BodyType::Suv).unwrap();
        assert_eq!(suv.search_url, "/cars?bodyType=SUV");
    }
}
