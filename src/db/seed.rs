use sqlx::SqlitePool;

use crate::auth::password::hash_password;
use crate::db::models::{
    ComplianceSettings, LegalDocuments, SiteSettings, TournamentStatus, UserStatus, unix_now,
};
use crate::db::repo::{self, NewTournament, NewUser};
use crate::error::AppResult;

pub const SITE_KEY: &str = "site";
pub const LEGAL_KEY: &str = "legal";
pub const COMPLIANCE_KEY: &str = "compliance";

const HOUR: i64 = 60 * 60;
const DAY: i64 = 24 * HOUR;

pub const TERMS_OF_SERVICE: &str = "Tournament Terms of Service

1. Eligibility: Players must be at least 18 years old to participate in tournaments with real money prizes.
2. Registration: Valid Free Fire ID and personal information are required for registration.
3. Entry Fee: The entry fee is non-refundable once verified.
4. Tournament Rules: All players must follow the game's terms of service and tournament rules.
5. Minimum Participants: Tournaments require the configured minimum number of participants to start.
6. Payment Verification: All payments require UTR number verification.
7. Room Details: Room ID and password will be shared with verified participants.
8. Disputes: All disputes will be resolved by the tournament administrator.
9. Refunds: Refunds will only be issued if a tournament is cancelled by administration.
10. Player Conduct: Harassment, cheating, or foul language will result in disqualification.";

pub const PRIVACY_POLICY: &str = "Privacy Policy

1. Information Collection: We collect personal information including name, email, Free Fire ID, and payment details.
2. Use of Information: Information is used for tournament registration, communication, and verification.
3. Data Security: We implement security measures to protect your personal information.
4. Third-Party Sharing: We do not share your information with third parties except as required by law.
5. User Rights: Users have the right to access, correct, or delete their personal information.
6. Contact Information: For privacy concerns, contact the tournament administrator.";

/// Loads the demo accounts, tournaments and default settings. Idempotent:
/// does nothing when users already exist.
pub async fn seed_demo_data(pool: &SqlitePool) -> AppResult<()> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        return Ok(());
    }

    let mut tx = pool.begin().await?;

    let demo_hash = hash_password("password123")?;
    repo::insert_user(
        &mut *tx,
        &NewUser {
            name: "Demo User",
            email: "demo@example.com",
            password_hash: &demo_hash,
            freefire_id: Some("12345678"),
            whatsapp: None,
            wallet_balance: 100,
            status: UserStatus::Active,
        },
    )
    .await?;

    let admin_hash = hash_password("admin123")?;
    repo::insert_user(
        &mut *tx,
        &NewUser {
            name: "Admin User",
            email: "admin@example.com",
            password_hash: &admin_hash,
            freefire_id: Some("87654321"),
            whatsapp: None,
            wallet_balance: 500,
            status: UserStatus::Admin,
        },
    )
    .await?;

    let now = unix_now();
    let tournaments = [
        NewTournament {
            name: "Solo Showdown",
            description: "Battle against the best solo players in this intense Free Fire showdown. Every kill counts!",
            starts_at: now + 2 * DAY,
            time: "8:00 PM",
            entry_fee: 30,
            prize_pool: 500,
            participants: 45,
            max_participants: 50,
            min_participants: None,
            status: TournamentStatus::Upcoming,
            room_id: None,
            password: None,
            image: Some(
                "https://images.unsplash.com/photo-1600861194942-f883de0dfe96?q=80&w=2069&auto=format&fit=crop",
            ),
        },
        NewTournament {
            name: "Squad Royale",
            description: "Team up with your friends and dominate the battlefield in this squad competition!",
            starts_at: now + 10 * 60,
            time: "6:30 PM",
            entry_fee: 50,
            prize_pool: 1000,
            participants: 20,
            max_participants: 20,
            min_participants: None,
            status: TournamentStatus::Active,
            room_id: Some("123456"),
            password: Some("freefire123"),
            image: Some(
                "https://images.unsplash.com/photo-1542751371-adc38448a05e?q=80&w=2070&auto=format&fit=crop",
            ),
        },
        NewTournament {
            name: "Duo Challenge",
            description: "Find a partner and test your synergy in this competitive duo tournament!",
            starts_at: now - 2 * DAY,
            time: "9:00 PM",
            entry_fee: 40,
            prize_pool: 800,
            participants: 30,
            max_participants: 30,
            min_participants: None,
            status: TournamentStatus::Completed,
            room_id: None,
            password: None,
            image: Some(
                "https://images.unsplash.com/photo-1511512578047-dfb367046420?q=80&w=2071&auto=format&fit=crop",
            ),
        },
    ];
    for tournament in &tournaments {
        repo::insert_tournament(&mut *tx, tournament).await?;
    }

    repo::put_setting(&mut *tx, SITE_KEY, &SiteSettings::default()).await?;
    repo::put_setting(
        &mut *tx,
        LEGAL_KEY,
        &LegalDocuments {
            terms_of_service: TERMS_OF_SERVICE.to_string(),
            privacy_policy: PRIVACY_POLICY.to_string(),
        },
    )
    .await?;
    repo::put_setting(&mut *tx, COMPLIANCE_KEY, &ComplianceSettings::default()).await?;

    tx.commit().await?;
    tracing::info!(
        users = 2,
        tournaments = tournaments.len(),
        "seeded demo data"
    );
    Ok(())
}
