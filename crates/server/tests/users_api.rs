use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use server::routes;
use server::startup::build_cors;
use server::state::AppState;
use service::notification::mock::{FailingNotifier, RecordingNotifier};
use service::notification::{Notifier, WELCOME_SUBJECT};
use service::token::{JwtTokenService, TokenService};
use service::user::{StoredUserRepository, UserService};

const ORIGIN: &str = "http://127.0.0.1:5500";

struct TestApp {
    router: Router,
    tokens: Arc<JwtTokenService>,
    recorder: Arc<RecordingNotifier>,
}

fn build_app_with(notifier: Arc<dyn Notifier>, recorder: Arc<RecordingNotifier>) -> TestApp {
    let users = UserService::new(Arc::new(StoredUserRepository::in_memory()));
    let tokens = Arc::new(JwtTokenService::new("test-secret", "blog_server", Duration::from_secs(3600)));
    let state = AppState::new(Arc::new(users), tokens.clone(), notifier, Duration::from_millis(200));
    let router = routes::build_router(state, build_cors(ORIGIN).expect("cors"));
    TestApp { router, tokens, recorder }
}

fn build_app() -> TestApp {
    let recorder = Arc::new(RecordingNotifier::default());
    build_app_with(recorder.clone(), recorder)
}

fn json_post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_json(resp: axum::response::Response) -> anyhow::Result<Value> {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn signup(app: &TestApp, username: &str, email: &str, password: &str) -> anyhow::Result<axum::response::Response> {
    let req = json_post("/users", json!({"username": username, "email": email, "password": password}));
    Ok(app.router.clone().oneshot(req).await?)
}

async fn login(app: &TestApp, username: &str, password: &str) -> anyhow::Result<axum::response::Response> {
    let req = json_post("/users/login", json!({"username": username, "password": password}));
    Ok(app.router.clone().oneshot(req).await?)
}

async fn wait_for_mail(recorder: &RecordingNotifier, count: usize) -> usize {
    for _ in 0..100 {
        let n = recorder.sent().await.len();
        if n >= count {
            return n;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    recorder.sent().await.len()
}

#[tokio::test]
async fn signup_returns_created_with_location_and_token() -> anyhow::Result<()> {
    let app = build_app();
    let resp = signup(&app, "alice", "alice@example.com", "S3curePass!").await?;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let location = resp.headers().get(header::LOCATION).expect("location").to_str()?.to_string();
    let body = body_json(resp).await?;
    let id = body["id"].as_str().expect("id");
    assert_eq!(location, format!("/users/{id}"));
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");

    let token = body["token"].as_str().expect("token");
    assert!(!token.is_empty());
    let claims = app.tokens.verify_token(token)?;
    assert_eq!(claims.user_id()?, Uuid::parse_str(id)?);
    Ok(())
}

#[tokio::test]
async fn signup_echoes_padded_username_and_login_accepts_it() -> anyhow::Result<()> {
    let app = build_app();
    let resp = signup(&app, " bob ", "bob@example.com", "S3curePass!").await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await?;
    assert_eq!(created["username"], " bob ");

    let resp = login(&app, " bob ", "S3curePass!").await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await?;
    assert_eq!(body["id"], created["id"]);
    assert_eq!(body["username"], " bob ");
    Ok(())
}

#[tokio::test]
async fn signup_sends_exactly_one_welcome_mail()-> anyhow::Result<()> {
    let app = build_app();
    let resp = signup(&app, "bob", "bob@example.com", "S3curePass!").await?;
    assert_eq!(resp.status(), StatusCode::CREATED);

    assert_eq!(wait_for_mail(&app.recorder, 1).await, 1);
    tokio::time::sleep(Duration::from_millis(50)).await;
    let sent = app.recorder.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, "bob@example.com");
    assert_eq!(sent[0].subject, WELCOME_SUBJECT);
    assert!(sent[0].body.starts_with("Dear bob,"));

    let resp = login(&app, "bob", "S3curePass!").await?;
    assert_eq!(resp.status(), StatusCode::OK);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(app.recorder.sent().await.len(), 1, "login must not notify");
    Ok(())
}

#[tokio::test]
async fn signup_survives_failing_notifier() -> anyhow::Result<()> {
    let failing: Arc<dyn Notifier> = Arc::new(FailingNotifier { delay: Some(Duration::from_secs(30)) });
    let app = build_app_with(failing, Arc::new(RecordingNotifier::default()));

    let started = std::time::Instant::now();
    let resp = signup(&app, "carol", "carol@example.com", "S3curePass!").await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(started.elapsed() < Duration::from_secs(10));

    let resp = login(&app, "carol", "S3curePass!").await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn duplicate_signup_is_unclassified_failure() -> anyhow::Result<()> {
    let app = build_app();
    let resp = signup(&app, "dave", "dave@example.com", "S3curePass!").await?;
    assert_eq!(resp.status(), StatusCode::CREATED);

    for (name, mail) in [("dave", "other@example.com"), ("dave2", "dave@example.com")] {
        let resp = signup(&app, name, mail, "S3curePass!").await?;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
        assert_eq!(&bytes[..], b"Internal Server Error");
    }
    Ok(())
}

#[tokio::test]
async fn login_issues_fresh_valid_tokens() -> anyhow::Result<()> {
    let app = build_app();
    let created = body_json(signup(&app, "erin", "erin@example.com", "S3curePass!").await?).await?;
    let id = Uuid::parse_str(created["id"].as_str().expect("id"))?;

    let first = login(&app, "erin", "S3curePass!").await?;
    assert_eq!(first.status(), StatusCode::OK);
    let first = body_json(first).await?;
    let second = body_json(login(&app, "erin", "S3curePass!").await?).await?;

    let t1 = first["token"].as_str().expect("token");
    let t2 = second["token"].as_str().expect("token");
    assert!(!t1.is_empty());
    assert_ne!(t1, t2);
    assert_eq!(app.tokens.verify_token(t1)?.user_id()?, id);
    assert_eq!(app.tokens.verify_token(t2)?.user_id()?, id);
    assert_eq!(first["id"], created["id"]);
    assert_eq!(first["username"], "erin");
    assert_eq!(first["email"], "erin@example.com");
    Ok(())
}

#[tokio::test]
async fn login_unknown_user_is_not_found() -> anyhow::Result<()> {
    let app = build_app();
    let resp = login(&app, "ghost", "whatever").await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await?, json!({"message": "user not found"}));
    Ok(())
}

#[tokio::test]
async fn login_wrong_password_is_unauthorized() -> anyhow::Result<()> {
    let app = build_app();
    signup(&app, "frank", "frank@example.com", "StrongPass123").await?;
    let resp = login(&app, "frank", "wrong").await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await?, json!({"message": "invalid credentials"}));
    Ok(())
}

#[tokio::test]
async fn responses_never_expose_credentials() -> anyhow::Result<()> {
    let app = build_app();
    let signed_up = to_bytes(signup(&app, "gina", "gina@example.com", "Pa55word!").await?.into_body(), usize::MAX).await?;
    let logged_in = to_bytes(login(&app, "gina", "Pa55word!").await?.into_body(), usize::MAX).await?;

    for raw in [signed_up, logged_in] {
        let text = String::from_utf8(raw.to_vec())?;
        assert!(!text.contains("Pa55word!"));
        assert!(!text.contains("password"));
        assert!(!text.contains("argon2"));
        let value: Value = serde_json::from_str(&text)?;
        assert_eq!(value.as_object().map(|o| o.len()), Some(4));
    }
    Ok(())
}

#[tokio::test]
async fn health_is_plain_success() -> anyhow::Result<()> {
    let app = build_app();
    let req = Request::builder().uri("/users").body(Body::empty())?;
    let resp = app.router.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
    assert_eq!(&bytes[..], b"success");
    Ok(())
}

#[tokio::test]
async fn malformed_body_is_unclassified_failure() -> anyhow::Result<()> {
    let app = build_app();
    let req = Request::builder()
        .method("POST")
        .uri("/users/login")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))?;
    let resp = app.router.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let resp = signup(&app, "", "blank@example.com", "x").await?;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    Ok(())
}

#[tokio::test]
async fn cors_admits_only_configured_origin() -> anyhow::Result<()> {
    let app = build_app();
    let preflight = |origin: &str| {
        Request::builder()
            .method("OPTIONS")
            .uri("/users")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
    };

    let resp = app.router.clone().oneshot(preflight(ORIGIN)?).await?;
    assert_eq!(
        resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).map(|v| v.as_bytes()),
        Some(ORIGIN.as_bytes())
    );

    let resp = app.router.clone().oneshot(preflight("http://evil.example")?).await?;
    assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    Ok(())
}

#[tokio::test]
async fn openapi_document_lists_user_routes() -> anyhow::Result<()> {
    let app = build_app();
    let req = Request::builder().uri("/api-docs/openapi.json").body(Body::empty())?;
    let resp = app.router.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let doc = body_json(resp).await?;
    assert!(doc["paths"]["/users"]["post"].is_object());
    assert!(doc["paths"]["/users"]["get"].is_object());
    assert!(doc["paths"]["/users/login"]["post"].is_object());
    Ok(())
}
