use serde::{Deserialize, Serialize};

/// Seconds since the Unix epoch.
pub fn unix_now() -> i64 {
    jsonwebtoken::get_current_timestamp() as i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Banned,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TournamentStatus {
    Upcoming,
    Active,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    UnderReview,
    Verified,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub freefire_id: Option<String>,
    pub whatsapp: Option<String>,
    pub wallet_balance: i64,
    pub status: UserStatus,
    pub created_at: i64,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.status == UserStatus::Admin
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tournament {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub starts_at: i64,
    pub time: String,
    pub entry_fee: i64,
    pub prize_pool: i64,
    pub participants: i64,
    pub max_participants: i64,
    pub min_participants: Option<i64>,
    pub status: TournamentStatus,
    // Only handed out through the room endpoint.
    #[serde(skip_serializing)]
    pub room_id: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub image: Option<String>,
}

impl Tournament {
    pub fn is_full(&self) -> bool {
        self.participants >= self.max_participants
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payment {
    pub id: i64,
    pub user_id: i64,
    pub tournament_id: i64,
    pub amount: i64,
    pub utr_number: Option<String>,
    pub status: PaymentStatus,
    pub reference: String,
    pub slot: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A payment as shown on the admin verification queue.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PaymentReview {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub tournament_id: i64,
    pub tournament_name: String,
    pub amount: i64,
    pub utr_number: Option<String>,
    pub status: PaymentStatus,
    pub created_at: i64,
}

/// One of the caller's tournament registrations.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Registration {
    pub payment_id: i64,
    pub tournament_id: i64,
    pub tournament_name: String,
    pub tournament_status: TournamentStatus,
    pub starts_at: i64,
    pub amount: i64,
    pub status: PaymentStatus,
    pub slot: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Winner {
    pub id: i64,
    pub tournament_id: i64,
    pub user_id: i64,
    pub rank: i64,
    pub prize_amount: i64,
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalDocuments {
    pub terms_of_service: String,
    pub privacy_policy: String,
}

impl Default for LegalDocuments {
    fn default() -> Self {
        Self {
            terms_of_service: crate::db::seed::TERMS_OF_SERVICE.to_string(),
            privacy_policy: crate::db::seed::PRIVACY_POLICY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceSettings {
    pub age_verification: bool,
    pub payment_verification: bool,
    pub identity_verification: bool,
    pub auto_refund: bool,
    pub data_retention: bool,
}

impl Default for ComplianceSettings {
    fn default() -> Self {
        Self {
            age_verification: true,
            payment_verification: true,
            identity_verification: false,
            auto_refund: true,
            data_retention: true,
        }
    }
}

impl ComplianceSettings {
    /// Flips the named setting, returning its new value.
    pub fn toggle(&mut self, setting: &str) -> Option<bool> {
        let flag = match setting {
            "age_verification" => &mut self.age_verification,
            "payment_verification" => &mut self.payment_verification,
            "identity_verification" => &mut self.identity_verification,
            "auto_refund" => &mut self.auto_refund,
            "data_retention" => &mut self.data_retention,
            _ => return None,
        };
        *flag = !*flag;
        Some(*flag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub payment_verification: bool,
    pub tournament_start: bool,
    pub user_registration: bool,
    pub low_participants: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSettings {
    pub site_title: String,
    pub contact_whatsapp: String,
    pub upi_id: String,
    pub default_entry_fee: i64,
    pub morning_time: String,
    pub evening_time: String,
    pub min_players: i64,
    pub max_players: i64,
    pub notifications: NotificationSettings,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_title: "Free Fire Tournaments".to_string(),
            contact_whatsapp: "9427415370".to_string(),
            upi_id: "9427415370@fam".to_string(),
            default_entry_fee: 30,
            morning_time: "09:00".to_string(),
            evening_time: "21:00".to_string(),
            min_players: 20,
            max_players: 50,
            notifications: NotificationSettings {
                payment_verification: true,
                tournament_start: true,
                user_registration: true,
                low_participants: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compliance_toggle() {
        let mut settings = ComplianceSettings::default();
        assert_eq!(settings.toggle("identity_verification"), Some(true));
        assert!(settings.identity_verification);
        assert_eq!(settings.toggle("auto_refund"), Some(false));
        assert!(!settings.auto_refund);
        assert_eq!(settings.toggle("telemetry"), None);
    }

    #[test]
    fn test_room_details_not_serialized() {
        let tournament = Tournament {
            id: 2,
            name: "Squad Royale".to_string(),
            description: String::new(),
            starts_at: 0,
            time: "6:30 PM".to_string(),
            entry_fee: 50,
            prize_pool: 1000,
            participants: 20,
            max_participants: 20,
            min_participants: None,
            status: TournamentStatus::Active,
            room_id: Some("123456".to_string()),
            password: Some("freefire123".to_string()),
            image: None,
        };

        let json = serde_json::to_value(&tournament).unwrap();
        assert!(json.get("room_id").is_none());
        assert!(json.get("password").is_none());
        assert_eq!(json["status"], "active");
        assert!(tournament.is_full());
    }

    #[test]
    fn test_payment_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::UnderReview).unwrap(),
            "\"under_review\""
        );
    }
}
