use crate::error::{is_unique_violation, AppError};
use crate::models::{ProviderUser, Role, User, UserRow, USER_COLUMNS};
use sqlx::PgPool;
use uuid::Uuid;

pub struct UserService;

impl UserService {
    /// Insert the provider user on first sight; later calls refresh email, name and image.
    pub async fn sync(pool: &PgPool, provider: &ProviderUser) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (id, email, name, image_url) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (id) DO UPDATE SET email = EXCLUDED.email, \
             name = COALESCE(EXCLUDED.name, users.name), \
             image_url = COALESCE(EXCLUDED.image_url, users.image_url), \
             updated_at = CASE WHEN users.email IS DISTINCT FROM EXCLUDED.email \
                 OR users.name IS DISTINCT FROM COALESCE(EXCLUDED.name, users.name) \
                 OR users.image_url IS DISTINCT FROM COALESCE(EXCLUDED.image_url, users.image_url) \
                 THEN NOW() ELSE users.updated_at END \
             RETURNING {}",
            USER_COLUMNS
        );
        let row: UserRow = sqlx::query_as(&sql)
            .bind(provider.id)
            .bind(&provider.email)
            .bind(&provider.name)
            .bind(&provider.image_url)
            .fetch_one(pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict(format!("email {} belongs to another account", provider.email))
                } else {
                    AppError::Db(e)
                }
            })?;
        row.try_into()
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<User>, AppError> {
        let sql = format!("SELECT {} FROM users ORDER BY created_at DESC, id", USER_COLUMNS);
        let rows: Vec<UserRow> = sqlx::query_as(&sql).fetch_all(pool).await?;
        rows.into_iter().map(User::try_from).collect()
    }

    /// Change another user's role. Admins cannot demote or promote themselves.
    pub async fn set_role(pool: &PgPool, actor: Uuid, target: Uuid, role: Role) -> Result<User, AppError> {
        if actor == target {
            return Err(AppError::BadRequest("you cannot change your own role".into()));
        }
        let sql = format!(
            "UPDATE users SET role = $1, updated_at = NOW() WHERE id = $2 RETURNING {}",
            USER_COLUMNS
        );
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(role.as_str())
            .bind(target)
            .fetch_optional(pool)
            .await?;
        let user: User = row.ok_or_else(|| AppError::NotFound(format!("user {}", target)))?.try_into()?;
        tracing::info!(user_id = %target, role = %role, "role changed");
        Ok(user)
    }
}
