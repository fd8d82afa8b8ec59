//! Resolve the signed-in user from the access token on the request.

use crate::auth::access_token;
use crate::error::AppError;
use crate::models::User;
use crate::service::UserService;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

/// A signed-in user; 401 without a valid token.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// The signed-in user when there is one. Bad tokens count as anonymous.
#[derive(Clone, Debug)]
pub struct MaybeUser(pub Option<User>);

/// A signed-in user with the ADMIN role; 403 for everyone else.
#[derive(Clone, Debug)]
pub struct AdminUser(pub User);

impl MaybeUser {
    pub fn id(&self) -> Option<uuid::Uuid> {
        self.0.as_ref().map(|u| u.id)
    }
}

pub fn require_admin(user: User) -> Result<User, AppError> {
    if user.is_admin() {
        Ok(user)
    } else {
        Err(AppError::Forbidden("admin role required".into()))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = access_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("missing access token".into()))?;
        let provider_user = state
            .auth
            .user_for_token(&token)
            .await?
            .ok_or_else(|| AppError::Unauthorized("invalid or expired access token".into()))?;
        let user = UserService::sync(&state.pool, &provider_user).await?;
        Ok(CurrentUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = access_token(&parts.headers) else {
            return Ok(MaybeUser(None));
        };
        let provider_user = match state.auth.user_for_token(&token).await {
            Ok(Some(u)) => u,
            Ok(None) => return Ok(MaybeUser(None)),
            Err(e) => {
                tracing::warn!(error = %e, "auth lookup failed; continuing anonymously");
                return Ok(MaybeUser(None));
            }
        };
        let user = UserService::sync(&state.pool, &provider_user).await?;
        Ok(MaybeUser(Some(user)))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        require_admin(user).map(AdminUser)
    }
}
