use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::models::{User, UserStatus};
use crate::db::repo;
use crate::error::{AppError, AppResult};
use crate::services::settings;

#[derive(Debug, Serialize)]
pub struct ContactLink {
    pub user_id: i64,
    pub whatsapp: String,
    pub url: String,
}

pub async fn list(pool: &SqlitePool, search: Option<&str>) -> AppResult<Vec<User>> {
    let search = search.map(str::trim).filter(|s| !s.is_empty());
    Ok(repo::list_users(pool, search).await?)
}

async fn get(pool: &SqlitePool, user_id: i64) -> AppResult<User> {
    repo::get_user(pool, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}

/// Flips a player between active and banned.
pub async fn toggle_ban(pool: &SqlitePool, user_id: i64) -> AppResult<User> {
    let user = get(pool, user_id).await?;
    let next = match user.status {
        UserStatus::Admin => return Err(AppError::bad_request("Admins cannot be banned")),
        UserStatus::Active => UserStatus::Banned,
        UserStatus::Banned => UserStatus::Active,
    };

    repo::set_user_status(pool, user_id, next).await?;
    tracing::warn!(user_id, status = ?next, "user ban toggled");
    get(pool, user_id).await
}

/// WhatsApp chat link for a user, falling back to the site contact number.
pub async fn contact(pool: &SqlitePool, user_id: i64) -> AppResult<ContactLink> {
    let user = get(pool, user_id).await?;
    let whatsapp = match user.whatsapp {
        Some(number) => number,
        None => settings::site(pool).await?.contact_whatsapp,
    };

    // wa.me only takes the bare international number.
    let digits: String = whatsapp.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(AppError::bad_request("No WhatsApp number on file"));
    }

    Ok(ContactLink {
        user_id,
        url: format!("https://wa.me/{digits}"),
        whatsapp,
    })
}
