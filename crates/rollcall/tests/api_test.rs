//! HTTP-level tests against an in-memory SQLite database.

use std::sync::Arc;

use actix_web::http::{header::ContentType, StatusCode};
use actix_web::{test, web, App};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use migration::MigratorTrait;
use rollcall_core::qr::{NewQrSession, QrSession};
use rollcall_core::{QrSessionService, QrSessionStore, StoreError};
use rollcall_lib::app_state::AppState;
use rollcall_lib::server::configure_routes;
use rollcall_lib::store::SeaOrmQrSessionStore;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::{json, Value};

struct FailingStore;

#[async_trait]
impl QrSessionStore for FailingStore {
    async fn insert(
        &self,
        _session: NewQrSession,
        _deactivate_previous: bool,
    ) -> Result<QrSession, StoreError> {
        Err(StoreError::Backend("database is locked".to_string()))
    }

    async fn latest_active(
        &self,
        _unexpired_at: Option<DateTime<Utc>>,
    ) -> Result<Option<QrSession>, StoreError> {
        Err(StoreError::Backend("database is locked".to_string()))
    }
}

/// Helper: in-memory SQLite with migrations applied.
async fn memory_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

async fn db_state(admin_passkey: Option<&str>) -> web::Data<AppState> {
    let db = memory_db().await;
    let qr_sessions = QrSessionService::new(Arc::new(SeaOrmQrSessionStore::new(db.clone())));
    web::Data::new(AppState {
        db,
        qr_sessions,
        admin_passkey: admin_passkey.map(str::to_string),
    })
}

async fn failing_state() -> web::Data<AppState> {
    web::Data::new(AppState {
        db: memory_db().await,
        qr_sessions: QrSessionService::new(Arc::new(FailingStore)),
        admin_passkey: None,
    })
}

fn parse_time(value: &Value) -> DateTime<Utc> {
    value.as_str().unwrap().parse().unwrap()
}

// ---------------------------------------------------------------------------
// Misc routes
// ---------------------------------------------------------------------------

#[actix_web::test]
async fn index_reports_api_working() {
    let app = test::init_service(
        App::new()
            .app_data(db_state(None).await)
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/").to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert_eq!(body, web::Bytes::from_static(b"API WORKING"));
}

#[actix_web::test]
async fn test_db_pings_database() {
    let app = test::init_service(
        App::new()
            .app_data(db_state(None).await)
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/test-db").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "DB Connected!");
    assert_eq!(body["database"], "Sqlite");
}

// ---------------------------------------------------------------------------
// QR sessions
// ---------------------------------------------------------------------------

#[actix_web::test]
async fn generate_without_location() {
    let app = test::init_service(
        App::new()
            .app_data(db_state(None).await)
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/qr/generate")
        .set_json(json!({ "sessionType": "Lecture1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["id"].as_i64().unwrap() > 0);
    assert_eq!(body["sessionType"], "Lecture1");
    assert_eq!(
        body["code"],
        "https://api.qrserver.com/v1/create-qr-code/?size=150x150&data=Lecture1"
    );
    assert!(body["location"].is_null());
    assert_eq!(body["isActive"], true);
    assert_eq!(
        parse_time(&body["expiresAt"]) - parse_time(&body["generatedAt"]),
        Duration::minutes(10)
    );
}

#[actix_web::test]
async fn generate_with_location_round_trips() {
    let app = test::init_service(
        App::new()
            .app_data(db_state(None).await)
            .configure(configure_routes),
    )
    .await;

    let location = json!({ "latitude": 12.9, "longitude": 77.6, "radius": 50.0 });
    let req = test::TestRequest::post()
        .uri("/api/v1/qr/generate")
        .set_json(json!({ "sessionType": "Lab", "location": location }))
        .to_request();
    let issued: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(issued["location"], location);

    let req = test::TestRequest::get().uri("/api/v1/qr/active").to_request();
    let active: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(active["id"], issued["id"]);
    assert_eq!(active["location"]["latitude"], 12.9);
    assert_eq!(active["location"]["longitude"], 77.6);
    assert_eq!(active["location"]["radius"], 50.0);
}

#[actix_web::test]
async fn generate_requires_session_type() {
    let app = test::init_service(
        App::new()
            .app_data(db_state(None).await)
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/qr/generate")
        .set_json(json!({ "location": { "latitude": 1.0 } }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "missing_session_type");

    // Nothing was stored.
    let req = test::TestRequest::get().uri("/api/v1/qr/active").to_request();
    let active: Value = test::call_and_read_body_json(&app, req).await;
    assert!(active.is_null());
}

#[actix_web::test]
async fn generate_rejects_malformed_json() {
    let app = test::init_service(
        App::new()
            .app_data(db_state(None).await)
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/qr/generate")
        .insert_header(ContentType::json())
        .set_payload("{\"sessionType\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_body");
}

#[actix_web::test]
async fn active_is_null_when_nothing_issued() {
    let app = test::init_service(
        App::new()
            .app_data(db_state(None).await)
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/qr/active").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    assert_eq!(body, web::Bytes::from_static(b"null"));
}

#[actix_web::test]
async fn active_returns_second_of_two() {
    let app = test::init_service(
        App::new()
            .app_data(db_state(None).await)
            .configure(configure_routes),
    )
    .await;

    let mut ids = Vec::new();
    for name in ["First", "Second"] {
        let req = test::TestRequest::post()
            .uri("/api/v1/qr/generate")
            .set_json(json!({ "sessionType": name }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        ids.push(body["id"].as_i64().unwrap());
    }

    let req = test::TestRequest::get().uri("/api/v1/qr/active").to_request();
    let active: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(active["id"].as_i64(), Some(ids[1]));
    assert_eq!(active["sessionType"], "Second");
}

#[actix_web::test]
async fn storage_failure_is_server_error() {
    let app = test::init_service(
        App::new()
            .app_data(failing_state().await)
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/qr/generate")
        .set_json(json!({ "sessionType": "Lecture1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "storage_error");
    assert_eq!(body["message"], "database is locked");

    let req = test::TestRequest::get().uri("/api/v1/qr/active").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "storage_error");
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

fn student(email: &str) -> Value {
    json!({
        "name": "Asha Rao",
        "email": email,
        "password": "pass1234",
        "role": "student",
        "rollNo": "21CS042",
        "department": "CSE",
        "year": "3"
    })
}

#[actix_web::test]
async fn register_then_login() {
    let app = test::init_service(
        App::new()
            .app_data(db_state(None).await)
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/register")
        .set_json(student("Asha@Example.edu"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["email"], "asha@example.edu");
    assert_eq!(body["user"]["role"], "student");
    assert_eq!(body["user"]["rollNo"], "21CS042");
    assert!(body["user"].get("password").is_none());

    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "email": "ASHA@example.edu", "password": "pass1234" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let login: Value = test::read_body_json(resp).await;
    assert_eq!(login["user"]["id"], body["user"]["id"]);
    assert_eq!(login["user"]["name"], "Asha Rao");
}

#[actix_web::test]
async fn register_duplicate_email_conflicts() {
    let app = test::init_service(
        App::new()
            .app_data(db_state(None).await)
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/register")
        .set_json(student("dup@example.edu"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/v1/register")
        .set_json(student("DUP@example.edu"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Email already exists");
}

#[actix_web::test]
async fn register_validates_input() {
    let app = test::init_service(
        App::new()
            .app_data(db_state(None).await)
            .configure(configure_routes),
    )
    .await;

    let cases = [
        (json!({ "name": "A", "email": "a@b.c", "password": "x" }), "missing_fields"),
        (
            json!({ "name": "A", "email": "not-an-email", "password": "x", "role": "student" }),
            "invalid_email",
        ),
        (
            json!({ "name": "A", "email": "a@b.c", "password": "x", "role": "teacher" }),
            "invalid_role",
        ),
    ];

    for (payload, expected) in cases {
        let req = test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], expected);
    }
}

#[actix_web::test]
async fn admin_registration_checks_passkey() {
    let app = test::init_service(
        App::new()
            .app_data(db_state(Some("ADMIN-1234")).await)
            .configure(configure_routes),
    )
    .await;

    let admin = |passkey: &str| {
        json!({
            "name": "Dean",
            "email": "dean@example.edu",
            "password": "pass1234",
            "role": "admin",
            "adminPasskey": passkey
        })
    };

    let req = test::TestRequest::post()
        .uri("/api/v1/register")
        .set_json(admin("wrong"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/api/v1/register")
        .set_json(admin("ADMIN-1234"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["role"], "admin");
}

#[actix_web::test]
async fn login_rejects_bad_credentials() {
    let app = test::init_service(
        App::new()
            .app_data(db_state(None).await)
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/register")
        .set_json(student("sam@example.edu"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "email": "sam@example.edu", "password": "wrong" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid email or password");

    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "email": "nobody@example.edu", "password": "pass1234" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "email": "sam@example.edu" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}
