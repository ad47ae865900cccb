use serde::Serialize;
use sqlx::SqlitePool;

use crate::auth::TokenKeys;
use crate::auth::password::{hash_password, validate_new_password, verify_password};
use crate::db::models::{User, UserStatus};
use crate::db::repo::{self, NewUser};
use crate::error::{AppError, AppResult};

/// A signed-in user and the bearer token that identifies them.
#[derive(Debug, Serialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

pub struct Registration<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub freefire_id: Option<&'a str>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub async fn register(
    pool: &SqlitePool,
    keys: &TokenKeys,
    input: Registration<'_>,
) -> AppResult<Session> {
    let name = input.name.trim();
    let email = normalize_email(input.email);
    if name.is_empty() || email.is_empty() {
        return Err(AppError::bad_request("Name and email are required"));
    }
    validate_new_password(input.password)?;

    if repo::email_exists(pool, &email).await? {
        return Err(AppError::conflict("Email already in use"));
    }

    let password_hash = hash_password(input.password)?;
    let inserted = repo::insert_user(
        pool,
        &NewUser {
            name,
            email: &email,
            password_hash: &password_hash,
            freefire_id: non_blank(input.freefire_id),
            whatsapp: None,
            wallet_balance: 0,
            status: UserStatus::Active,
        },
    )
    .await;

    let user_id = match inserted {
        Ok(id) => id,
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            return Err(AppError::conflict("Email already in use"));
        }
        Err(e) => return Err(e.into()),
    };

    let user = repo::get_user(pool, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    tracing::info!(user_id, email = %user.email, "user registered");

    Ok(Session {
        token: keys.issue(user.id)?,
        user,
    })
}

pub async fn login(
    pool: &SqlitePool,
    keys: &TokenKeys,
    email: &str,
    password: &str,
) -> AppResult<Session> {
    let email = normalize_email(email);
    let invalid = || AppError::unauthorized("Invalid email or password");

    let Some(credentials) = repo::credentials_by_email(pool, &email).await? else {
        tracing::warn!(%email, "login for unknown email");
        return Err(invalid());
    };
    if !verify_password(password, &credentials.password_hash)? {
        tracing::warn!(user_id = credentials.id, "login with wrong password");
        return Err(invalid());
    }

    let user = repo::get_user(pool, credentials.id)
        .await?
        .ok_or_else(invalid)?;
    if user.status == UserStatus::Banned {
        tracing::warn!(user_id = user.id, "banned user tried to log in");
        return Err(AppError::forbidden("Account is banned"));
    }

    tracing::info!(user_id = user.id, "login successful");
    Ok(Session {
        token: keys.issue(user.id)?,
        user,
    })
}

/// Resolves a bearer token to its user. The row is re-read on every call so
/// bans apply to tokens that are already out.
pub async fn authenticate(pool: &SqlitePool, keys: &TokenKeys, token: &str) -> AppResult<User> {
    let user_id = keys.verify(token)?;
    let user = repo::get_user(pool, user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("Account no longer exists"))?;

    if user.status == UserStatus::Banned {
        return Err(AppError::forbidden("Account is banned"));
    }
    Ok(user)
}

pub async fn update_profile(
    pool: &SqlitePool,
    user_id: i64,
    freefire_id: Option<&str>,
    whatsapp: Option<&str>,
) -> AppResult<User> {
    repo::update_profile(pool, user_id, non_blank(freefire_id), non_blank(whatsapp)).await?;
    repo::get_user(pool, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}

pub async fn change_password(
    pool: &SqlitePool,
    user_id: i64,
    current: &str,
    new: &str,
) -> AppResult<()> {
    let stored = repo::password_hash(pool, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    if !verify_password(current, &stored)? {
        return Err(AppError::unauthorized("Current password is incorrect"));
    }
    validate_new_password(new)?;

    let hash = hash_password(new)?;
    repo::set_password_hash(pool, user_id, &hash).await?;
    tracing::info!(user_id, "password changed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_pool;

    fn keys() -> TokenKeys {
        TokenKeys::new("test-secret", 1)
    }

    #[tokio::test]
    async fn test_login_demo_user() {
        let pool = test_pool().await;
        let session = login(&pool, &keys(), "demo@example.com", "password123")
            .await
            .unwrap();
        assert_eq!(session.user.name, "Demo User");
        assert_eq!(session.user.wallet_balance, 100);

        let user = authenticate(&pool, &keys(), &session.token).await.unwrap();
        assert_eq!(user.id, session.user.id);
    }

    #[tokio::test]
    async fn test_login_failures() {
        let pool = test_pool().await;
        let err = login(&pool, &keys(), "demo@example.com", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password");

        let err = login(&pool, &keys(), "nobody@example.com", "password123")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_register_new_user() {
        let pool = test_pool().await;
        let session = register(
            &pool,
            &keys(),
            Registration {
                name: "Rahul Sharma",
                email: " Rahul@Example.com ",
                password: "secret1",
                freefire_id: Some("FF123456"),
            },
        )
        .await
        .unwrap();

        assert_eq!(session.user.email, "rahul@example.com");
        assert_eq!(session.user.wallet_balance, 0);
        assert_eq!(session.user.status, UserStatus::Active);
        assert_eq!(session.user.freefire_id.as_deref(), Some("FF123456"));

        login(&pool, &keys(), "rahul@example.com", "secret1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let pool = test_pool().await;
        let err = register(
            &pool,
            &keys(),
            Registration {
                name: "Someone",
                email: "demo@example.com",
                password: "secret1",
                freefire_id: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Conflict(msg) if msg == "Email already in use"));
    }

    #[tokio::test]
    async fn test_banned_user_locked_out() {
        let pool = test_pool().await;
        let session = login(&pool, &keys(), "demo@example.com", "password123")
            .await
            .unwrap();
        repo::set_user_status(&pool, session.user.id, UserStatus::Banned)
            .await
            .unwrap();

        let err = authenticate(&pool, &keys(), &session.token).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        let err = login(&pool, &keys(), "demo@example.com", "password123")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_change_password() {
        let pool = test_pool().await;
        let session = login(&pool, &keys(), "demo@example.com", "password123")
            .await
            .unwrap();

        let err = change_password(&pool, session.user.id, "nope", "newpass1")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        change_password(&pool, session.user.id, "password123", "newpass1")
            .await
            .unwrap();
        login(&pool, &keys(), "demo@example.com", "newpass1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_profile_keeps_unset_fields() {
        let pool = test_pool().await;
        let user = update_profile(&pool, 1, None, Some("9427415370")).await.unwrap();
        assert_eq!(user.freefire_id.as_deref(), Some("12345678"));
        assert_eq!(user.whatsapp.as_deref(), Some("9427415370"));
    }
}
