use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::{
    Payment, PaymentStatus, Registration, SiteSettings, Tournament, TournamentStatus, User, Winner,
    unix_now,
};
use crate::db::repo::{self, NewTournament};
use crate::error::{AppError, AppResult};
use crate::registration::RuleViolation;
use crate::registration::lifecycle::{self, Placement, TournamentDraft};
use crate::registration::payment::submit_utr;
use crate::services::settings;

#[derive(Debug, Serialize)]
pub struct JoinTicket {
    /// UPI payment URI to render as a QR code.
    pub qr_code: String,
    pub payment: Payment,
}

#[derive(Debug, Serialize)]
pub struct RoomDetails {
    pub tournament_id: i64,
    pub room_id: String,
    pub password: String,
    pub slot: Option<i64>,
}

pub async fn list(
    pool: &SqlitePool,
    status: Option<TournamentStatus>,
    search: Option<&str>,
) -> AppResult<Vec<Tournament>> {
    let search = search.map(str::trim).filter(|s| !s.is_empty());
    Ok(repo::list_tournaments(pool, status, search).await?)
}

pub async fn get(pool: &SqlitePool, id: i64) -> AppResult<Tournament> {
    repo::get_tournament(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Tournament not found"))
}

pub fn payment_uri(site: &SiteSettings, tournament: &Tournament, reference: &str) -> String {
    format!(
        "upi://pay?pa={}&pn={}&am={}&cu=INR&tn={}",
        urlencoding::encode(&site.upi_id),
        urlencoding::encode(&site.site_title),
        tournament.entry_fee,
        urlencoding::encode(reference),
    )
}

pub async fn join(pool: &SqlitePool, user: &User, tournament_id: i64) -> AppResult<JoinTicket> {
    let mut tx = pool.begin().await?;

    let tournament = repo::get_tournament(&mut *tx, tournament_id)
        .await?
        .ok_or_else(|| AppError::not_found("Tournament not found"))?;
    let existing = repo::find_payment(&mut *tx, user.id, tournament_id).await?;
    lifecycle::check_joinable(&tournament, existing.as_ref().map(|p| p.status))?;

    let payment = match existing {
        Some(payment) => payment,
        None => {
            let reference = Uuid::new_v4().to_string();
            let payment = repo::insert_payment(
                &mut *tx,
                user.id,
                tournament_id,
                tournament.entry_fee,
                &reference,
            )
            .await?;
            tracing::info!(user_id = user.id, tournament_id, payment_id = payment.id, "payment opened");
            payment
        }
    };

    let site = settings::site(&mut *tx).await?;
    tx.commit().await?;

    Ok(JoinTicket {
        qr_code: payment_uri(&site, &tournament, &payment.reference),
        payment,
    })
}

/// Records a UTR number for the user's entry and returns the resulting
/// payment status.
pub async fn verify_payment(
    pool: &SqlitePool,
    user: &User,
    tournament_id: i64,
    utr_number: &str,
) -> AppResult<PaymentStatus> {
    let utr_number = utr_number.trim();
    let mut tx = pool.begin().await?;

    let tournament = repo::get_tournament(&mut *tx, tournament_id)
        .await?
        .ok_or_else(|| AppError::not_found("Tournament not found"))?;

    let payment = match repo::find_payment(&mut *tx, user.id, tournament_id).await? {
        Some(payment) => payment,
        None => {
            let reference = Uuid::new_v4().to_string();
            repo::insert_payment(
                &mut *tx,
                user.id,
                tournament_id,
                tournament.entry_fee,
                &reference,
            )
            .await?
        }
    };

    // Already verified: keep the stored UTR untouched.
    if payment.status == PaymentStatus::Verified {
        return Ok(PaymentStatus::Verified);
    }

    let submission = submit_utr(payment.status, tournament_id, utr_number);
    if submission.takes_seat && !repo::take_seat(&mut *tx, tournament_id).await? {
        return Err(RuleViolation::Full.into());
    }
    repo::set_payment_status(&mut *tx, payment.id, submission.status, Some(utr_number)).await?;
    tx.commit().await?;

    tracing::info!(
        user_id = user.id,
        tournament_id,
        payment_id = payment.id,
        status = ?submission.status,
        "utr submitted"
    );
    Ok(submission.status)
}

pub async fn room(pool: &SqlitePool, user: &User, tournament_id: i64) -> AppResult<RoomDetails> {
    let tournament = get(pool, tournament_id).await?;
    let payment = repo::find_payment(pool, user.id, tournament_id).await?;

    let verified = payment
        .as_ref()
        .is_some_and(|p| p.status == PaymentStatus::Verified);
    if !user.is_admin() && !verified {
        return Err(AppError::forbidden(
            "Room details are only shared with verified participants",
        ));
    }

    match (tournament.status, tournament.room_id, tournament.password) {
        (TournamentStatus::Active, Some(room_id), Some(password)) => Ok(RoomDetails {
            tournament_id,
            room_id,
            password,
            slot: payment.and_then(|p| p.slot),
        }),
        _ => Err(AppError::bad_request("Room details are not available yet")),
    }
}

pub async fn winners(pool: &SqlitePool, tournament_id: i64) -> AppResult<Vec<Winner>> {
    get(pool, tournament_id).await?;
    Ok(repo::list_winners(pool, tournament_id).await?)
}

pub async fn registrations(pool: &SqlitePool, user_id: i64) -> AppResult<Vec<Registration>> {
    Ok(repo::registrations_for_user(pool, user_id).await?)
}

pub struct NewTournamentInput<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub starts_at: i64,
    pub time: &'a str,
    pub entry_fee: Option<i64>,
    pub prize_pool: i64,
    pub max_participants: Option<i64>,
    pub min_participants: Option<i64>,
    pub image: Option<&'a str>,
}

pub async fn create(pool: &SqlitePool, input: NewTournamentInput<'_>) -> AppResult<Tournament> {
    let site = settings::site(pool).await?;
    let entry_fee = input.entry_fee.unwrap_or(site.default_entry_fee);
    let max_participants = input.max_participants.unwrap_or(site.max_players);
    let min_participants = input.min_participants.or(Some(site.min_players));

    lifecycle::validate_draft(&TournamentDraft {
        name: input.name,
        entry_fee,
        prize_pool: input.prize_pool,
        max_participants,
        min_participants,
    })?;

    let id = repo::insert_tournament(
        pool,
        &NewTournament {
            name: input.name.trim(),
            description: input.description,
            starts_at: input.starts_at,
            time: input.time,
            entry_fee,
            prize_pool: input.prize_pool,
            participants: 0,
            max_participants,
            min_participants,
            status: TournamentStatus::Upcoming,
            room_id: None,
            password: None,
            image: input.image,
        },
    )
    .await?;

    tracing::info!(tournament_id = id, name = input.name, "tournament created");
    get(pool, id).await
}

pub async fn start(
    pool: &SqlitePool,
    tournament_id: i64,
    room_id: &str,
    password: &str,
) -> AppResult<Tournament> {
    let (room_id, password) = (room_id.trim(), password.trim());
    let mut tx = pool.begin().await?;

    let tournament = repo::get_tournament(&mut *tx, tournament_id)
        .await?
        .ok_or_else(|| AppError::not_found("Tournament not found"))?;
    lifecycle::check_startable(&tournament, room_id, password)?;

    repo::start_tournament(&mut *tx, tournament_id, room_id, password).await?;
    let verified = repo::verified_user_ids(&mut *tx, tournament_id).await?;
    for (user_id, slot) in lifecycle::assign_slots(verified) {
        repo::set_slot(&mut *tx, tournament_id, user_id, slot).await?;
    }
    tx.commit().await?;

    tracing::info!(tournament_id, "tournament started");
    get(pool, tournament_id).await
}

pub async fn complete(
    pool: &SqlitePool,
    tournament_id: i64,
    placements: &[Placement],
) -> AppResult<Vec<Winner>> {
    let mut tx = pool.begin().await?;

    let tournament = repo::get_tournament(&mut *tx, tournament_id)
        .await?
        .ok_or_else(|| AppError::not_found("Tournament not found"))?;
    if tournament.status != TournamentStatus::Active {
        return Err(RuleViolation::NotActive.into());
    }

    let verified = repo::verified_user_ids(&mut *tx, tournament_id).await?;
    lifecycle::validate_placements(placements, &verified, tournament.prize_pool)?;

    for p in placements {
        repo::insert_winner(&mut *tx, tournament_id, p.user_id, p.rank, p.prize_amount).await?;
        repo::credit_wallet(&mut *tx, p.user_id, p.prize_amount).await?;
    }
    repo::set_tournament_status(&mut *tx, tournament_id, TournamentStatus::Completed).await?;
    tx.commit().await?;

    tracing::info!(
        tournament_id,
        winners = placements.len(),
        completed_at = unix_now(),
        "tournament completed"
    );
    Ok(repo::list_winners(pool, tournament_id).await?)
}
