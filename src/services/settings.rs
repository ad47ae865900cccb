use sqlx::{Executor, Sqlite, SqlitePool};

use crate::db::models::{ComplianceSettings, LegalDocuments, SiteSettings};
use crate::db::repo;
use crate::db::seed::{COMPLIANCE_KEY, LEGAL_KEY, SITE_KEY};
use crate::error::{AppError, AppResult};

pub async fn site<'e, E>(exec: E) -> AppResult<SiteSettings>
where
    E: Executor<'e, Database = Sqlite>,
{
    Ok(repo::get_setting(exec, SITE_KEY).await?.unwrap_or_default())
}

pub async fn update_site(pool: &SqlitePool, settings: &SiteSettings) -> AppResult<SiteSettings> {
    if settings.site_title.trim().is_empty() {
        return Err(AppError::bad_request("Site title is required"));
    }
    if settings.default_entry_fee <= 0 {
        return Err(AppError::bad_request("Entry fee must be positive"));
    }
    if settings.min_players < 0 || settings.max_players <= 0 {
        return Err(AppError::bad_request("Player limits must be positive"));
    }
    if settings.min_players > settings.max_players {
        return Err(AppError::bad_request(
            "Minimum players cannot exceed maximum players",
        ));
    }

    repo::put_setting(pool, SITE_KEY, settings).await?;
    tracing::info!(site_title = %settings.site_title, "site settings saved");
    Ok(settings.clone())
}

pub async fn legal(pool: &SqlitePool) -> AppResult<LegalDocuments> {
    Ok(repo::get_setting(pool, LEGAL_KEY).await?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy)]
pub enum LegalDocument {
    Terms,
    Privacy,
}

pub async fn update_legal(
    pool: &SqlitePool,
    document: LegalDocument,
    text: &str,
) -> AppResult<LegalDocuments> {
    if text.trim().is_empty() {
        return Err(AppError::bad_request("Document text cannot be empty"));
    }

    let mut docs = legal(pool).await?;
    match document {
        LegalDocument::Terms => docs.terms_of_service = text.to_string(),
        LegalDocument::Privacy => docs.privacy_policy = text.to_string(),
    }
    repo::put_setting(pool, LEGAL_KEY, &docs).await?;
    tracing::info!(?document, "legal document updated");
    Ok(docs)
}

pub async fn compliance(pool: &SqlitePool) -> AppResult<ComplianceSettings> {
    Ok(repo::get_setting(pool, COMPLIANCE_KEY)
        .await?
        .unwrap_or_default())
}

pub async fn toggle_compliance(pool: &SqlitePool, setting: &str) -> AppResult<ComplianceSettings> {
    let mut current = compliance(pool).await?;
    let value = current
        .toggle(setting)
        .ok_or_else(|| AppError::bad_request(format!("Unknown compliance setting: {setting}")))?;

    repo::put_setting(pool, COMPLIANCE_KEY, &current).await?;
    tracing::info!(setting, value, "compliance setting toggled");
    Ok(current)
}
