use serde::{Serialize, de::DeserializeOwned};
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::db::models::{
    Payment, PaymentReview, PaymentStatus, Registration, Tournament, TournamentStatus, User,
    UserStatus, Winner, unix_now,
};

const USER_COLUMNS: &str =
    "id, name, email, freefire_id, whatsapp, wallet_balance, status, created_at";

pub async fn create_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            freefire_id TEXT,
            whatsapp TEXT,
            wallet_balance INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'active',
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tournaments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            starts_at INTEGER NOT NULL,
            time TEXT NOT NULL,
            entry_fee INTEGER NOT NULL,
            prize_pool INTEGER NOT NULL,
            participants INTEGER NOT NULL DEFAULT 0,
            max_participants INTEGER NOT NULL,
            min_participants INTEGER,
            status TEXT NOT NULL DEFAULT 'upcoming',
            room_id TEXT,
            password TEXT,
            image TEXT
        );

        CREATE TABLE IF NOT EXISTS payments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id),
            tournament_id INTEGER NOT NULL REFERENCES tournaments(id),
            amount INTEGER NOT NULL,
            utr_number TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            reference TEXT NOT NULL,
            slot INTEGER,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            UNIQUE (user_id, tournament_id)
        );

        CREATE TABLE IF NOT EXISTS winners (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tournament_id INTEGER NOT NULL REFERENCES tournaments(id),
            user_id INTEGER NOT NULL REFERENCES users(id),
            rank INTEGER NOT NULL,
            prize_amount INTEGER NOT NULL,
            UNIQUE (tournament_id, rank)
        );

        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub freefire_id: Option<&'a str>,
    pub whatsapp: Option<&'a str>,
    pub wallet_balance: i64,
    pub status: UserStatus,
}

#[derive(Debug, sqlx::FromRow)]
pub struct Credentials {
    pub id: i64,
    pub password_hash: String,
}

pub async fn insert_user<'e, E>(exec: E, user: &NewUser<'_>) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO users (name, email, password_hash, freefire_id, whatsapp, wallet_balance, status, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user.name)
    .bind(user.email)
    .bind(user.password_hash)
    .bind(user.freefire_id)
    .bind(user.whatsapp)
    .bind(user.wallet_balance)
    .bind(user.status)
    .bind(unix_now())
    .execute(exec)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn get_user<'e, E>(exec: E, id: i64) -> Result<Option<User>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(exec)
        .await
}

pub async fn email_exists<'e, E>(exec: E, email: &str) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(email)
        .fetch_one(exec)
        .await?;
    Ok(count > 0)
}

pub async fn credentials_by_email<'e, E>(
    exec: E,
    email: &str,
) -> Result<Option<Credentials>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Credentials>("SELECT id, password_hash FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(exec)
        .await
}

pub async fn password_hash<'e, E>(exec: E, user_id: i64) -> Result<Option<String>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar("SELECT password_hash FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(exec)
        .await
}

pub async fn set_password_hash<'e, E>(exec: E, user_id: i64, hash: &str) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
        .bind(hash)
        .bind(user_id)
        .execute(exec)
        .await?;
    Ok(())
}

pub async fn list_users<'e, E>(exec: E, search: Option<&str>) -> Result<Vec<User>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT {USER_COLUMNS} FROM users
        WHERE ?1 IS NULL
           OR instr(lower(name), lower(?1)) > 0
           OR instr(lower(email), lower(?1)) > 0
           OR instr(lower(coalesce(freefire_id, '')), lower(?1)) > 0
        ORDER BY created_at DESC, id DESC
        "#
    ))
    .bind(search)
    .fetch_all(exec)
    .await
}

pub async fn set_user_status<'e, E>(
    exec: E,
    user_id: i64,
    status: UserStatus,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE users SET status = ? WHERE id = ?")
        .bind(status)
        .bind(user_id)
        .execute(exec)
        .await?;
    Ok(())
}

pub async fn update_profile<'e, E>(
    exec: E,
    user_id: i64,
    freefire_id: Option<&str>,
    whatsapp: Option<&str>,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        UPDATE users
        SET freefire_id = coalesce(?, freefire_id),
            whatsapp = coalesce(?, whatsapp)
        WHERE id = ?
        "#,
    )
    .bind(freefire_id)
    .bind(whatsapp)
    .bind(user_id)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn credit_wallet<'e, E>(exec: E, user_id: i64, amount: i64) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE users SET wallet_balance = wallet_balance + ? WHERE id = ?")
        .bind(amount)
        .bind(user_id)
        .execute(exec)
        .await?;
    Ok(())
}

pub struct NewTournament<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub starts_at: i64,
    pub time: &'a str,
    pub entry_fee: i64,
    pub prize_pool: i64,
    pub participants: i64,
    pub max_participants: i64,
    pub min_participants: Option<i64>,
    pub status: TournamentStatus,
    pub room_id: Option<&'a str>,
    pub password: Option<&'a str>,
    pub image: Option<&'a str>,
}

pub async fn insert_tournament<'e, E>(exec: E, t: &NewTournament<'_>) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO tournaments (
            name, description, starts_at, time, entry_fee, prize_pool, participants,
            max_participants, min_participants, status, room_id, password, image
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(t.name)
    .bind(t.description)
    .bind(t.starts_at)
    .bind(t.time)
    .bind(t.entry_fee)
    .bind(t.prize_pool)
    .bind(t.participants)
    .bind(t.max_participants)
    .bind(t.min_participants)
    .bind(t.status)
    .bind(t.room_id)
    .bind(t.password)
    .bind(t.image)
    .execute(exec)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn get_tournament<'e, E>(exec: E, id: i64) -> Result<Option<Tournament>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Tournament>("SELECT * FROM tournaments WHERE id = ?")
        .bind(id)
        .fetch_optional(exec)
        .await
}

pub async fn list_tournaments<'e, E>(
    exec: E,
    status: Option<TournamentStatus>,
    search: Option<&str>,
) -> Result<Vec<Tournament>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Tournament>(
        r#"
        SELECT * FROM tournaments
        WHERE (?1 IS NULL OR status = ?1)
          AND (?2 IS NULL OR instr(lower(name), lower(?2)) > 0)
        ORDER BY starts_at ASC, id ASC
        "#,
    )
    .bind(status)
    .bind(search)
    .fetch_all(exec)
    .await
}

/// Adds one participant unless the tournament is already full.
/// Returns false when no seat was taken.
pub async fn take_seat<'e, E>(exec: E, tournament_id: i64) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE tournaments
        SET participants = participants + 1
        WHERE id = ? AND participants < max_participants
        "#,
    )
    .bind(tournament_id)
    .execute(exec)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn start_tournament<'e, E>(
    exec: E,
    tournament_id: i64,
    room_id: &str,
    password: &str,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE tournaments SET status = ?, room_id = ?, password = ? WHERE id = ?")
        .bind(TournamentStatus::Active)
        .bind(room_id)
        .bind(password)
        .bind(tournament_id)
        .execute(exec)
        .await?;
    Ok(())
}

pub async fn set_tournament_status<'e, E>(
    exec: E,
    tournament_id: i64,
    status: TournamentStatus,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE tournaments SET status = ? WHERE id = ?")
        .bind(status)
        .bind(tournament_id)
        .execute(exec)
        .await?;
    Ok(())
}

pub async fn find_payment<'e, E>(
    exec: E,
    user_id: i64,
    tournament_id: i64,
) -> Result<Option<Payment>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE user_id = ? AND tournament_id = ?")
        .bind(user_id)
        .bind(tournament_id)
        .fetch_optional(exec)
        .await
}

pub async fn get_payment<'e, E>(exec: E, id: i64) -> Result<Option<Payment>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = ?")
        .bind(id)
        .fetch_optional(exec)
        .await
}

pub async fn insert_payment<'e, E>(
    exec: E,
    user_id: i64,
    tournament_id: i64,
    amount: i64,
    reference: &str,
) -> Result<Payment, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let now = unix_now();
    sqlx::query_as::<_, Payment>(
        r#"
        INSERT INTO payments (user_id, tournament_id, amount, status, reference, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(tournament_id)
    .bind(amount)
    .bind(PaymentStatus::Pending)
    .bind(reference)
    .bind(now)
    .bind(now)
    .fetch_one(exec)
    .await
}

pub async fn set_payment_status<'e, E>(
    exec: E,
    payment_id: i64,
    status: PaymentStatus,
    utr_number: Option<&str>,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        UPDATE payments
        SET status = ?, utr_number = coalesce(?, utr_number), updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(status)
    .bind(utr_number)
    .bind(unix_now())
    .bind(payment_id)
    .execute(exec)
    .await?;
    Ok(())
}

/// Payments waiting on an admin decision, oldest first.
pub async fn review_queue<'e, E>(exec: E) -> Result<Vec<PaymentReview>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, PaymentReview>(
        r#"
        SELECT p.id, p.user_id, u.name AS user_name, p.tournament_id,
               t.name AS tournament_name, p.amount, p.utr_number, p.status, p.created_at
        FROM payments p
        JOIN users u ON u.id = p.user_id
        JOIN tournaments t ON t.id = p.tournament_id
        WHERE p.status IN ('pending', 'under_review')
        ORDER BY p.created_at ASC, p.id ASC
        "#,
    )
    .fetch_all(exec)
    .await
}

pub async fn registrations_for_user<'e, E>(
    exec: E,
    user_id: i64,
) -> Result<Vec<Registration>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Registration>(
        r#"
        SELECT p.id AS payment_id, p.tournament_id, t.name AS tournament_name,
               t.status AS tournament_status, t.starts_at, p.amount, p.status, p.slot
        FROM payments p
        JOIN tournaments t ON t.id = p.tournament_id
        WHERE p.user_id = ?
        ORDER BY t.starts_at DESC, p.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(exec)
    .await
}

pub async fn verified_user_ids<'e, E>(exec: E, tournament_id: i64) -> Result<Vec<i64>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar(
        "SELECT user_id FROM payments WHERE tournament_id = ? AND status = 'verified' ORDER BY id",
    )
    .bind(tournament_id)
    .fetch_all(exec)
    .await
}

pub async fn set_slot<'e, E>(
    exec: E,
    tournament_id: i64,
    user_id: i64,
    slot: i64,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE payments SET slot = ? WHERE tournament_id = ? AND user_id = ?")
        .bind(slot)
        .bind(tournament_id)
        .bind(user_id)
        .execute(exec)
        .await?;
    Ok(())
}

pub async fn insert_winner<'e, E>(
    exec: E,
    tournament_id: i64,
    user_id: i64,
    rank: i64,
    prize_amount: i64,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO winners (tournament_id, user_id, rank, prize_amount) VALUES (?, ?, ?, ?)",
    )
    .bind(tournament_id)
    .bind(user_id)
    .bind(rank)
    .bind(prize_amount)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn list_winners<'e, E>(exec: E, tournament_id: i64) -> Result<Vec<Winner>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Winner>(
        r#"
        SELECT w.id, w.tournament_id, w.user_id, w.rank, w.prize_amount, u.name AS user_name
        FROM winners w
        LEFT JOIN users u ON u.id = w.user_id
        WHERE w.tournament_id = ?
        ORDER BY w.rank ASC
        "#,
    )
    .bind(tournament_id)
    .fetch_all(exec)
    .await
}

pub async fn get_setting<'e, E, T>(exec: E, key: &str) -> Result<Option<T>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
    T: DeserializeOwned,
{
    let raw: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(exec)
        .await?;

    raw.map(|value| serde_json::from_str(&value).map_err(|e| sqlx::Error::Decode(Box::new(e))))
        .transpose()
}

pub async fn put_setting<'e, E, T>(exec: E, key: &str, value: &T) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
    T: Serialize,
{
    let raw = serde_json::to_string(value).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
    sqlx::query(
        r#"
        INSERT INTO settings (key, value) VALUES (?, ?)
        ON CONFLICT (key) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(key)
    .bind(raw)
    .execute(exec)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect;
    use crate::db::models::SiteSettings;

    async fn pool() -> SqlitePool {
        let pool = connect("sqlite::memory:").await.unwrap();
        create_schema(&pool).await.unwrap();
        pool
    }

    fn player<'a>(email: &'a str) -> NewUser<'a> {
        NewUser {
            name: "Player",
            email,
            password_hash: "hash",
            freefire_id: None,
            whatsapp: None,
            wallet_balance: 0,
            status: UserStatus::Active,
        }
    }

    fn tournament(max: i64) -> NewTournament<'static> {
        NewTournament {
            name: "Solo Showdown",
            description: "",
            starts_at: 0,
            time: "8:00 PM",
            entry_fee: 30,
            prize_pool: 500,
            participants: 0,
            max_participants: max,
            min_participants: None,
            status: TournamentStatus::Upcoming,
            room_id: None,
            password: None,
            image: None,
        }
    }

    #[tokio::test]
    async fn test_user_roundtrip_and_duplicate_email() {
        let pool = pool().await;
        let id = insert_user(&pool, &player("a@example.com")).await.unwrap();

        let user = get_user(&pool, id).await.unwrap().unwrap();
        assert_eq!(user.email, "a@example.com");
        assert_eq!(user.status, UserStatus::Active);
        assert!(email_exists(&pool, "a@example.com").await.unwrap());

        assert!(insert_user(&pool, &player("a@example.com")).await.is_err());
    }

    #[tokio::test]
    async fn test_take_seat_stops_at_capacity() {
        let pool = pool().await;
        let id = insert_tournament(&pool, &tournament(2)).await.unwrap();

        assert!(take_seat(&pool, id).await.unwrap());
        assert!(take_seat(&pool, id).await.unwrap());
        assert!(!take_seat(&pool, id).await.unwrap());

        let t = get_tournament(&pool, id).await.unwrap().unwrap();
        assert_eq!(t.participants, 2);
    }

    #[tokio::test]
    async fn test_list_tournaments_filters() {
        let pool = pool().await;
        insert_tournament(&pool, &tournament(10)).await.unwrap();
        let mut done = tournament(10);
        done.name = "Duo Challenge";
        done.status = TournamentStatus::Completed;
        insert_tournament(&pool, &done).await.unwrap();

        assert_eq!(list_tournaments(&pool, None, None).await.unwrap().len(), 2);
        let completed = list_tournaments(&pool, Some(TournamentStatus::Completed), None)
            .await
            .unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].name, "Duo Challenge");
        let searched = list_tournaments(&pool, None, Some("solo")).await.unwrap();
        assert_eq!(searched.len(), 1);
    }

    #[tokio::test]
    async fn test_one_payment_per_user_and_tournament() {
        let pool = pool().await;
        let user = insert_user(&pool, &player("p@example.com")).await.unwrap();
        let t = insert_tournament(&pool, &tournament(10)).await.unwrap();

        let payment = insert_payment(&pool, user, t, 30, "ref-1").await.unwrap();
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert!(insert_payment(&pool, user, t, 30, "ref-2").await.is_err());

        set_payment_status(&pool, payment.id, PaymentStatus::UnderReview, Some("1000000000"))
            .await
            .unwrap();
        let queue = review_queue(&pool).await.unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].utr_number.as_deref(), Some("1000000000"));
        assert_eq!(queue[0].tournament_name, "Solo Showdown");
    }

    #[tokio::test]
    async fn test_settings_documents() {
        let pool = pool().await;
        let missing: Option<SiteSettings> = get_setting(&pool, "site").await.unwrap();
        assert!(missing.is_none());

        let mut site = SiteSettings::default();
        put_setting(&pool, "site", &site).await.unwrap();
        site.site_title = "Weekend Cup".to_string();
        put_setting(&pool, "site", &site).await.unwrap();

        let stored: SiteSettings = get_setting(&pool, "site").await.unwrap().unwrap();
        assert_eq!(stored.site_title, "Weekend Cup");
    }
}
