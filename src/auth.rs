//! Access token resolution against the hosted auth provider.

use crate::config::AuthSettings;
use crate::error::AppError;
use crate::models::ProviderUser;
use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use reqwest::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

/// Cookie holding the access token for browser sessions.
pub const ACCESS_TOKEN_COOKIE: &str = "sb-access-token";

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The user owning `token`, or `None` when the provider rejects it.
    async fn user_for_token(&self, token: &str) -> Result<Option<ProviderUser>, AppError>;
}

/// Bearer token from `Authorization`, falling back to the session cookie.
pub fn access_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            let (scheme, token) = v.trim().split_once(' ')?;
            scheme.eq_ignore_ascii_case("bearer").then(|| token.trim().to_string())
        })
        .filter(|t| !t.is_empty());
    if bearer.is_some() {
        return bearer;
    }
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == ACCESS_TOKEN_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[derive(Debug, Deserialize)]
struct SupabaseUser {
    id: Uuid,
    email: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    full_name: Option<String>,
    name: Option<String>,
    avatar_url: Option<String>,
    picture: Option<String>,
}

impl SupabaseUser {
    fn into_provider_user(self) -> Result<ProviderUser, AppError> {
        let email = self
            .email
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AppError::AuthProvider(format!("user {} has no email", self.id)))?;
        let meta = self.user_metadata;
        Ok(ProviderUser {
            id: self.id,
            email,
            name: meta.full_name.or(meta.name),
            image_url: meta.avatar_url.or(meta.picture),
        })
    }
}

/// Supabase Auth: `GET {url}/auth/v1/user` with the project key and the user's token.
pub struct SupabaseAuth {
    client: reqwest::Client,
    user_url: String,
    anon_key: String,
}

impl SupabaseAuth {
    pub fn new(settings: &AuthSettings) -> Self {
        SupabaseAuth {
            client: reqwest::Client::new(),
            user_url: format!("{}/auth/v1/user", settings.supabase_url.trim_end_matches('/')),
            anon_key: settings.anon_key.clone(),
        }
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuth {
    async fn user_for_token(&self, token: &str) -> Result<Option<ProviderUser>, AppError> {
        let response = self
            .client
            .get(&self.user_url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::AuthProvider(e.to_string()))?;
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Ok(None),
            s if !s.is_success() => {
                return Err(AppError::AuthProvider(format!("user lookup returned {}", s)));
            }
            _ => {}
        }
        let user: SupabaseUser = response
            .json()
            .await
            .map_err(|e| AppError::AuthProvider(e.to_string()))?;
        user.into_provider_user().map(Some)
    }
}
