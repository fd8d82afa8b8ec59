use crate::error::AppError;
use crate::models::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

pub const USER_COLUMNS: &str = "id, email, name, image_url, phone, role, created_at, updated_at";

#[derive(Clone, Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub phone: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            email: row.email,
            name: row.name,
            image_url: row.image_url,
            phone: row.phone,
            role: row.role.parse().map_err(|e: AppError| AppError::Internal(e.to_string()))?,
            created_at: row.created_at.to_rfc3339(),
            updated_at: row.updated_at.to_rfc3339(),
        })
    }
}

/// Identity as reported by the auth provider for a valid access token.
#[derive(Clone, Debug, PartialEq)]
pub struct ProviderUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct RoleUpdate {
    pub role: Role,
}
