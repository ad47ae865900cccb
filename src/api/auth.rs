use axum::{
    Json,
    extract::{FromRequestParts, OptionalFromRequestParts, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::server::AppState;
use crate::db::models::User;
use crate::error::{AppError, AppResult};
use crate::services::{auth as auth_svc, tournaments};

/// Any signed-in, non-banned user.
pub struct AuthUser(pub User);

/// A signed-in user with admin status.
pub struct AdminUser(pub User);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| AppError::unauthorized("You must be logged in"))?;
        let user = auth_svc::authenticate(&state.db, &state.keys, token).await?;
        Ok(Self(user))
    }
}

/// Absent credentials give `None`; bad credentials are still an error.
impl OptionalFromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Option<Self>, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Ok(None);
        };
        let user = auth_svc::authenticate(&state.db, &state.keys, token).await?;
        Ok(Some(Self(user)))
    }
}

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = <AuthUser as FromRequestParts<_>>::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::forbidden("Admin access required"));
        }
        Ok(Self(user))
    }
}

#[derive(Deserialize)]
pub struct RegisterPayload {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub freefire_id: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterPayload>,
) -> AppResult<impl IntoResponse> {
    let session = auth_svc::register(
        &state.db,
        &state.keys,
        auth_svc::Registration {
            name: &payload.name,
            email: &payload.email,
            password: &payload.password,
            freefire_id: payload.freefire_id.as_deref(),
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginPayload>,
) -> AppResult<impl IntoResponse> {
    let session = auth_svc::login(&state.db, &state.keys, &payload.email, &payload.password).await?;
    Ok(Json(session))
}

/// Tokens are stateless; the client drops its copy.
pub async fn logout(AuthUser(user): AuthUser) -> StatusCode {
    tracing::info!(user_id = user.id, "logged out");
    StatusCode::NO_CONTENT
}

pub async fn me(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}

#[derive(Deserialize)]
pub struct ProfilePayload {
    #[serde(default)]
    pub freefire_id: Option<String>,
    #[serde(default)]
    pub whatsapp: Option<String>,
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<ProfilePayload>,
) -> AppResult<Json<User>> {
    let user = auth_svc::update_profile(
        &state.db,
        user.id,
        payload.freefire_id.as_deref(),
        payload.whatsapp.as_deref(),
    )
    .await?;
    Ok(Json(user))
}

#[derive(Deserialize)]
pub struct PasswordPayload {
    pub current_password: String,
    pub new_password: String,
}

pub async fn change_password(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<PasswordPayload>,
) -> AppResult<StatusCode> {
    auth_svc::change_password(
        &state.db,
        user.id,
        &payload.current_password,
        &payload.new_password,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn registrations(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> AppResult<impl IntoResponse> {
    Ok(Json(tournaments::registrations(&state.db, user.id).await?))
}
