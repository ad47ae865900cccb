use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::auth::AdminUser;
use crate::api::server::AppState;
use crate::db::models::SiteSettings;
use crate::error::AppResult;
use crate::registration::lifecycle::Placement;
use crate::registration::payment::ReviewAction;
use crate::services::settings::{self, LegalDocument};
use crate::services::{payments, tournaments, users};

#[derive(Deserialize)]
pub struct CreateTournamentPayload {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub starts_at: i64,
    pub time: String,
    pub entry_fee: Option<i64>,
    pub prize_pool: i64,
    pub max_participants: Option<i64>,
    pub min_participants: Option<i64>,
    pub image: Option<String>,
}

pub async fn create_tournament(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateTournamentPayload>,
) -> AppResult<impl IntoResponse> {
    let tournament = tournaments::create(
        &state.db,
        tournaments::NewTournamentInput {
            name: &payload.name,
            description: &payload.description,
            starts_at: payload.starts_at,
            time: &payload.time,
            entry_fee: payload.entry_fee,
            prize_pool: payload.prize_pool,
            max_participants: payload.max_participants,
            min_participants: payload.min_participants,
            image: payload.image.as_deref(),
        },
    )
    .await?;
    tracing::info!(admin_id = admin.id, tournament_id = tournament.id, "admin created tournament");
    Ok((StatusCode::CREATED, Json(tournament)))
}

#[derive(Deserialize)]
pub struct StartPayload {
    #[serde(default)]
    pub room_id: String,
    #[serde(default)]
    pub password: String,
}

pub async fn start_tournament(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
    Json(payload): Json<StartPayload>,
) -> AppResult<impl IntoResponse> {
    let tournament = tournaments::start(&state.db, id, &payload.room_id, &payload.password).await?;
    Ok(Json(tournament))
}

#[derive(Deserialize)]
pub struct CompletePayload {
    pub winners: Vec<Placement>,
}

pub async fn complete_tournament(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
    Json(payload): Json<CompletePayload>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(tournaments::complete(&state.db, id, &payload.winners).await?))
}

pub async fn payment_queue(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
) -> AppResult<impl IntoResponse> {
    Ok(Json(payments::queue(&state.db).await?))
}

pub async fn approve_payment(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(payments::decide(&state.db, id, ReviewAction::Approve).await?))
}

pub async fn reject_payment(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(payments::decide(&state.db, id, ReviewAction::Reject).await?))
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(users::list(&state.db, query.search.as_deref()).await?))
}

pub async fn toggle_ban(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(users::toggle_ban(&state.db, id).await?))
}

pub async fn contact_user(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(users::contact(&state.db, id).await?))
}

#[derive(Deserialize)]
pub struct LegalPayload {
    pub text: String,
}

pub async fn update_terms(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    Json(payload): Json<LegalPayload>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(
        settings::update_legal(&state.db, LegalDocument::Terms, &payload.text).await?,
    ))
}

pub async fn update_privacy(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    Json(payload): Json<LegalPayload>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(
        settings::update_legal(&state.db, LegalDocument::Privacy, &payload.text).await?,
    ))
}

pub async fn compliance(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
) -> AppResult<impl IntoResponse> {
    Ok(Json(settings::compliance(&state.db).await?))
}

pub async fn toggle_compliance(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    Path(setting): Path<String>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(settings::toggle_compliance(&state.db, &setting).await?))
}

pub async fn site_settings(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
) -> AppResult<impl IntoResponse> {
    Ok(Json(settings::site(&state.db).await?))
}

pub async fn update_site_settings(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    Json(payload): Json<SiteSettings>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(settings::update_site(&state.db, &payload).await?))
}
