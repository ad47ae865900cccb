use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::auth::AuthUser;
use crate::api::server::AppState;
use crate::db::models::{PaymentStatus, TournamentStatus};
use crate::error::{AppError, AppResult};
use crate::services::{settings, tournaments};

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<TournamentStatus>,
    pub search: Option<String>,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let found = tournaments::list(&state.db, query.status, query.search.as_deref()).await?;
    Ok(Json(found))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(tournaments::get(&state.db, id).await?))
}

pub async fn join(
    State(state): State<Arc<AppState>>,
    user: Option<AuthUser>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let AuthUser(user) =
        user.ok_or_else(|| AppError::unauthorized("You must be logged in to join a tournament"))?;
    Ok(Json(tournaments::join(&state.db, &user, id).await?))
}

#[derive(Deserialize)]
pub struct VerifyPayload {
    pub utr_number: String,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    pub status: PaymentStatus,
}

pub async fn verify_payment(
    State(state): State<Arc<AppState>>,
    user: Option<AuthUser>,
    Path(id): Path<i64>,
    Json(payload): Json<VerifyPayload>,
) -> AppResult<Json<VerifyResponse>> {
    let AuthUser(user) =
        user.ok_or_else(|| AppError::unauthorized("You must be logged in to verify a payment"))?;
    let status = tournaments::verify_payment(&state.db, &user, id, &payload.utr_number).await?;
    Ok(Json(VerifyResponse { status }))
}

pub async fn room(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(tournaments::room(&state.db, &user, id).await?))
}

pub async fn winners(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(tournaments::winners(&state.db, id).await?))
}

pub async fn legal(State(state): State<Arc<AppState>>) -> AppResult<impl IntoResponse> {
    Ok(Json(settings::legal(&state.db).await?))
}
