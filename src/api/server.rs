use axum::{
    Router,
    routing::{get, patch, post, put},
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::{admin, auth, tournaments};
use crate::auth::TokenKeys;
use crate::config::Config;
use crate::db;
use crate::error::AppResult;

pub struct AppState {
    pub db: SqlitePool,
    pub keys: TokenKeys,
}

impl AppState {
    pub fn new(db: SqlitePool, config: &Config) -> Self {
        Self {
            db,
            keys: TokenKeys::new(&config.jwt_secret, config.jwt_ttl_hours),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let admin_routes = Router::new()
        .route("/tournaments", post(admin::create_tournament))
        .route("/tournaments/{id}/start", post(admin::start_tournament))
        .route("/tournaments/{id}/complete", post(admin::complete_tournament))
        .route("/payments", get(admin::payment_queue))
        .route("/payments/{id}/approve", post(admin::approve_payment))
        .route("/payments/{id}/reject", post(admin::reject_payment))
        .route("/users", get(admin::list_users))
        .route("/users/{id}/ban", post(admin::toggle_ban))
        .route("/users/{id}/contact", get(admin::contact_user))
        .route("/legal/terms", put(admin::update_terms))
        .route("/legal/privacy", put(admin::update_privacy))
        .route("/compliance", get(admin::compliance))
        .route("/compliance/{setting}", post(admin::toggle_compliance))
        .route(
            "/settings",
            get(admin::site_settings).put(admin::update_site_settings),
        );

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/profile", patch(auth::update_profile))
        .route("/api/profile/password", post(auth::change_password))
        .route("/api/profile/registrations", get(auth::registrations))
        .route("/api/tournaments", get(tournaments::list))
        .route("/api/tournaments/{id}", get(tournaments::get))
        .route("/api/tournaments/{id}/join", post(tournaments::join))
        .route("/api/tournaments/{id}/verify", post(tournaments::verify_payment))
        .route("/api/tournaments/{id}/room", get(tournaments::room))
        .route("/api/tournaments/{id}/winners", get(tournaments::winners))
        .route("/api/legal", get(tournaments::legal))
        .nest("/api/admin", admin_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(config: Config) -> AppResult<()> {
    let pool = db::connect(&config.database_url).await?;
    db::init(&pool, config.seed_demo_data).await?;

    let state = Arc::new(AppState::new(pool, &config));
    let app = router(state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn app() -> Router {
        let pool = crate::services::test_pool().await;
        router(Arc::new(AppState::new(pool, &Config::for_tests())))
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn login(app: &Router, email: &str, password: &str) -> String {
        let (status, body) = send(
            app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let app = app().await;
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_public_listing_hides_room_details() {
        let app = app().await;
        let (status, body) = send(&app, "GET", "/api/tournaments?status=active", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let list = body.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["name"], "Squad Royale");
        assert!(list[0].get("password").is_none());

        let (status, body) = send(&app, "GET", "/api/tournaments/42", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Tournament not found");
    }

    #[tokio::test]
    async fn test_join_requires_login() {
        let app = app().await;
        let (status, body) = send(&app, "POST", "/api/tournaments/1/join", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "You must be logged in to join a tournament");

        let (status, _) = send(&app, "POST", "/api/tournaments/1/join", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_register_join_and_verify_flow() {
        let app = app().await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Priya Patel",
                "email": "priya@example.com",
                "password": "secret12",
                "freefire_id": "FF789012"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let token = body["token"].as_str().unwrap().to_string();

        let (status, body) = send(&app, "POST", "/api/tournaments/1/join", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["payment"]["status"], "pending");
        assert!(body["qr_code"].as_str().unwrap().starts_with("upi://pay"));

        let (status, body) = send(
            &app,
            "POST",
            "/api/tournaments/1/verify",
            Some(&token),
            Some(json!({ "utr_number": "1987654321" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "verified");

        let (_, body) = send(&app, "GET", "/api/tournaments/1", None, None).await;
        assert_eq!(body["participants"], 46);

        let (status, body) = send(&app, "POST", "/api/tournaments/1/join", Some(&token), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "You have already joined this tournament");

        let (status, body) =
            send(&app, "GET", "/api/profile/registrations", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["tournament_name"], "Solo Showdown");
        assert_eq!(body[0]["status"], "verified");
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let app = app().await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "name": "Demo", "email": "demo@example.com", "password": "secret12" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Email already in use");
    }

    #[tokio::test]
    async fn test_admin_routes_reject_players() {
        let app = app().await;
        let token = login(&app, "demo@example.com", "password123").await;

        let (status, body) = send(&app, "GET", "/api/admin/payments", Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Admin access required");

        let (status, _) = send(&app, "GET", "/api/admin/payments", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_review_and_ban() {
        let app = app().await;
        let player = login(&app, "demo@example.com", "password123").await;
        let admin = login(&app, "admin@example.com", "admin123").await;

        let (_, body) = send(
            &app,
            "POST",
            "/api/tournaments/1/verify",
            Some(&player),
            Some(json!({ "utr_number": "UTRB123456" })),
        )
        .await;
        assert_eq!(body["status"], "under_review");

        let (status, queue) = send(&app, "GET", "/api/admin/payments", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        let payment_id = queue[0]["id"].as_i64().unwrap();

        let uri = format!("/api/admin/payments/{payment_id}/approve");
        let (status, body) = send(&app, "POST", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "verified");

        let (status, body) = send(&app, "POST", "/api/admin/users/1/ban", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "banned");

        // The player's existing token stops working immediately.
        let (status, _) = send(&app, "GET", "/api/auth/me", Some(&player), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_legal_is_public_and_admin_editable() {
        let app = app().await;
        let admin = login(&app, "admin@example.com", "admin123").await;

        let (status, _) = send(
            &app,
            "PUT",
            "/api/admin/legal/terms",
            Some(&admin),
            Some(json!({ "text": "Play fair." })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, "GET", "/api/legal", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["terms_of_service"], "Play fair.");

        let (status, body) = send(
            &app,
            "POST",
            "/api/admin/compliance/auto_refund",
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["auto_refund"], false);
    }
}
