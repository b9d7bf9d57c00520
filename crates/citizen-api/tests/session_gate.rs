use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response, StatusCode},
    Router,
};
use fake::faker::internet::en::SafeEmail;
use fake::Fake;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use citizen_api::{build_router, AppState};
use citizen_core::domain::{Session, UserMetadata};
use citizen_core::ports::{BackendClient, SignUpRequest};
use citizen_infrastructure::backend::mock::MOCK_JWT_SECRET;
use citizen_infrastructure::{BackendFactory, MockBackend, MockStore, RemoteBackend};
use citizen_security::JwtService;
use citizen_shared::config::{AppConfig, AppSettings, LogSettings, SessionSettings};
use citizen_shared::BackendSettings;

fn config() -> AppConfig {
    AppConfig {
        app: AppSettings {
            env: "test".into(),
            host: "127.0.0.1".into(),
            port: 0,
            name: "citizen-connect".into(),
            site_url: None,
        },
        backend: BackendSettings::default(),
        session: SessionSettings::default(),
        log: LogSettings::default(),
    }
}

fn app_with(factory: BackendFactory) -> Router {
    build_router(AppState::new(config(), factory))
}

/// Gate active, backed by the in-memory store.
fn in_memory_app() -> (Router, Arc<MockStore>) {
    let store = Arc::new(MockStore::new());
    (app_with(BackendFactory::in_memory(store.clone())), store)
}

async fn signed_up(store: &Arc<MockStore>, role: Option<&str>) -> Session {
    let email: String = SafeEmail().fake();
    MockBackend::new(store.clone())
        .sign_up(&SignUpRequest {
            email,
            password: "irrelevant".into(),
            metadata: UserMetadata {
                full_name: Some("Sari".into()),
                role: role.map(str::to_string),
                ..Default::default()
            },
            email_redirect_to: None,
        })
        .await
        .unwrap()
        .session
        .unwrap()
}

fn get(uri: &str, cookie: Option<String>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value, cookie: Option<String>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn access_cookie(token: &str) -> String {
    format!("cc-access-token={}", token)
}

fn both_cookies(session: &Session) -> String {
    format!(
        "cc-access-token={}; cc-refresh-token={}",
        session.access_token, session.refresh_token
    )
}

fn location(response: &Response<Body>) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn protected_path_without_session_redirects_to_login() {
    let (app, _) = in_memory_app();
    let response = app.oneshot(get("/dashboard", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/auth/login?next=/dashboard");
}

#[tokio::test]
async fn nested_protected_path_keeps_next() {
    let (app, _) = in_memory_app();
    let response = app.oneshot(get("/admin/users", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/auth/login?next=/admin/users");
}

#[tokio::test]
async fn auth_path_with_session_redirects_to_dashboard() {
    let (app, store) = in_memory_app();
    let session = signed_up(&store, None).await;

    let response = app
        .oneshot(get("/auth/login", Some(access_cookie(&session.access_token))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn allowed_states_pass_through() {
    let (app, store) = in_memory_app();
    let session = signed_up(&store, None).await;

    let anonymous_login = app.clone().oneshot(get("/auth/login", None)).await.unwrap();
    assert_eq!(anonymous_login.status(), StatusCode::OK);

    let public = app.clone().oneshot(get("/api/campaigns", None)).await.unwrap();
    assert_eq!(public.status(), StatusCode::OK);

    let dashboard = app
        .oneshot(get("/dashboard", Some(access_cookie(&session.access_token))))
        .await
        .unwrap();
    assert_eq!(dashboard.status(), StatusCode::OK);
    let body = json_body(dashboard).await;
    assert_eq!(body["data"]["user"]["id"], json!(session.user.id));
    assert_eq!(body["data"]["donor_registrations"], 0);
}

#[tokio::test]
async fn unconfigured_backend_bypasses_the_gate() {
    let app = app_with(BackendFactory::new(
        &BackendSettings::default(),
        Arc::new(MockStore::new()),
    ));

    for uri in ["/dashboard", "/profile", "/admin", "/auth/login", "/api/guides"] {
        let response = app.clone().oneshot(get(uri, None)).await.unwrap();
        assert_ne!(
            response.status(),
            StatusCode::TEMPORARY_REDIRECT,
            "{} was redirected",
            uri
        );
    }

    let dashboard = app.oneshot(get("/dashboard", None)).await.unwrap();
    assert_eq!(dashboard.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn stale_access_token_is_refreshed_into_cookies() {
    let (app, store) = in_memory_app();
    let session = signed_up(&store, None).await;
    let stale = JwtService::new(MOCK_JWT_SECRET.to_string(), -600, 3600)
        .generate_access_token(&session.user.id, &session.user.email)
        .unwrap();

    let cookie = format!(
        "cc-access-token={}; cc-refresh-token={}",
        stale, session.refresh_token
    );
    let response = app.oneshot(get("/profile", Some(cookie))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("cc-access-token=") && !c.contains(&stale)));
    assert!(cookies.iter().any(|c| c.starts_with("cc-refresh-token=")));
    assert!(cookies.iter().all(|c| c.contains("HttpOnly")));
}

#[tokio::test]
async fn rejected_refresh_clears_cookies_and_redirects() {
    let (app, _) = in_memory_app();
    let cookie = "cc-refresh-token=forged".to_string();

    let response = app.oneshot(get("/dashboard", Some(cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let cookies = set_cookies(&response);
    assert!(cookies
        .iter()
        .any(|c| c.starts_with("cc-refresh-token=") && c.contains("Max-Age=0")));
}

#[tokio::test]
async fn backend_outage_fails_open() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let remote = RemoteBackend::new(
        RemoteBackend::build_http_client(2).unwrap(),
        Url::parse(&server.uri()).unwrap(),
        "anon-key".into(),
    );
    let app = app_with(BackendFactory::with_remote(remote, Arc::new(MockStore::new())));

    let cookie = "cc-access-token=opaque; cc-refresh-token=opaque-refresh".to_string();
    let response = app
        .clone()
        .oneshot(get("/profile", Some(cookie.clone())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert!(set_cookies(&response).is_empty());

    let public = app.oneshot(get("/health", Some(cookie))).await.unwrap();
    assert_eq!(public.status(), StatusCode::OK);
}

#[tokio::test]
async fn static_assets_skip_the_gate() {
    let (app, _) = in_memory_app();
    let response = app
        .clone()
        .oneshot(get("/images/map-marker.png", None))
        .await
        .unwrap();
    assert_ne!(response.status(), StatusCode::TEMPORARY_REDIRECT);

    let response = app.oneshot(get("/dashboard/report.png", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/auth/login?next=/dashboard/report.png");
}

#[tokio::test]
async fn admin_requires_admin_role() {
    let (app, store) = in_memory_app();

    let citizen = signed_up(&store, None).await;
    let response = app
        .clone()
        .oneshot(get("/admin", Some(access_cookie(&citizen.access_token))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin = signed_up(&store, Some("admin")).await;
    let response = app
        .oneshot(get("/admin", Some(both_cookies(&admin))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_sets_cookies_and_follows_next() {
    let (app, store) = in_memory_app();
    let session = signed_up(&store, None).await;

    let response = app
        .oneshot(post_json(
            "/auth/login?next=/profile",
            json!({ "email": session.user.email, "password": "anything" }),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/profile");
    assert_eq!(set_cookies(&response).len(), 2);
}

#[tokio::test]
async fn login_rejects_offsite_next() {
    let (app, store) = in_memory_app();
    let session = signed_up(&store, None).await;

    let response = app
        .oneshot(post_json(
            "/auth/login?next=//evil.example",
            json!({ "email": session.user.email, "password": "anything" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn login_with_line_break_in_next_goes_to_dashboard() {
    let (app, store) = in_memory_app();
    let session = signed_up(&store, None).await;

    let response = app
        .oneshot(post_json(
            "/auth/login?next=/guides%0Aevil",
            json!({ "email": session.user.email, "password": "anything" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
    assert_eq!(set_cookies(&response).len(), 2);
}

#[tokio::test]
async fn login_with_unknown_email_is_unauthorized() {
    let (app, _) = in_memory_app();
    let response = app
        .oneshot(post_json(
            "/auth/login",
            json!({ "email": "nobody@example.com", "password": "anything" }),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn signup_creates_account_and_session() {
    let (app, store) = in_memory_app();
    let response = app
        .oneshot(post_json(
            "/auth/signup",
            json!({
                "email": "baru@example.com",
                "password": "rahasia123",
                "full_name": "Warga Baru",
                "role": "admin"
            }),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(store.len(), 1);
    assert_eq!(set_cookies(&response).len(), 2);
    let body = json_body(response).await;
    assert_eq!(body["data"]["user"]["role"], "citizen");
    assert_eq!(body["data"]["session_started"], true);
}

#[tokio::test]
async fn logout_clears_cookies() {
    let (app, store) = in_memory_app();
    let session = signed_up(&store, None).await;

    let response = app
        .oneshot(post_json("/api/auth/logout", json!({}), Some(both_cookies(&session))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
}

#[tokio::test]
async fn donor_registration_requires_session() {
    let (app, _) = in_memory_app();
    let donor = json!({
        "full_name": "Budi",
        "blood_group": "O+",
        "phone": "08123456789",
        "city": "Medan"
    });

    let response = app
        .oneshot(post_json("/api/donors", donor, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn donor_registration_echoes_record() {
    let (app, store) = in_memory_app();
    let session = signed_up(&store, None).await;
    let donor = json!({
        "full_name": "Budi",
        "blood_group": "O+",
        "phone": "08123456789",
        "city": "Medan"
    });

    let response = app
        .oneshot(post_json(
            "/api/donors",
            donor,
            Some(access_cookie(&session.access_token)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["data"]["user_id"], json!(session.user.id));
    assert_eq!(body["data"]["available"], true);
}

#[tokio::test]
async fn invalid_blood_group_is_bad_request() {
    let (app, _) = in_memory_app();
    let response = app
        .oneshot(get("/api/donors?blood_group=Q%2B", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn donation_to_unknown_campaign_is_not_found() {
    let (app, _) = in_memory_app();
    let uri = format!("/api/campaigns/{}/donations", uuid::Uuid::new_v4());
    let response = app
        .oneshot(post_json(&uri, json!({ "amount": 10000.0 }), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn contact_form_is_accepted() {
    let (app, _) = in_memory_app();
    let response = app
        .oneshot(post_json(
            "/api/contact",
            json!({
                "name": "Ayu",
                "email": "ayu@example.com",
                "subject": "Jam layanan",
                "message": "Kapan kantor catatan sipil buka?"
            }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn health_reports_backend_kind() {
    let (app, _) = in_memory_app();

    let health = app.clone().oneshot(get("/health", None)).await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(json_body(health).await["backend"], "mock");

    let ready = app.oneshot(get("/health/ready", None)).await.unwrap();
    assert_eq!(ready.status(), StatusCode::OK);
    assert!(json_body(ready).await["server_time"].is_string());
}
