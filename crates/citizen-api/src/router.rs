use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_cookies::CookieManagerLayer;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::warn;

use crate::handlers::{auth, campaigns, community, donors, guides, health, pages};
use crate::middleware::session_gate;
use crate::state::AppState;

const ASSETS_DIR: &str = "static/assets";

pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/login", get(auth::login_page).post(auth::login))
        .route("/auth/signup", get(auth::signup_page).post(auth::signup))
        .route(
            "/auth/reset-password",
            get(auth::reset_password_page).post(auth::reset_password),
        )
        .route("/api/auth/logout", post(auth::logout));

    let page_routes = Router::new()
        .route("/dashboard", get(pages::dashboard))
        .route("/profile", get(pages::profile))
        .route("/admin", get(pages::admin));

    let api_routes = Router::new()
        .route("/api/categories", get(guides::list_categories))
        .route("/api/guides", get(guides::search_guides))
        .route("/api/guides/suggest", get(guides::suggest_guides))
        .route("/api/guides/{slug}", get(guides::guide_detail))
        .route("/api/donors", get(donors::list_donors).post(donors::register_donor))
        .route("/api/blood-requests", post(donors::request_blood))
        .route("/api/campaigns", get(campaigns::list_campaigns))
        .route("/api/campaigns/{id}/donations", post(campaigns::donate))
        .route("/api/volunteers", post(community::register_volunteer))
        .route("/api/contact", post(community::send_contact_message));

    let cors = cors_layer(&state);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .nest_service("/assets", ServeDir::new(ASSETS_DIR))
        .merge(auth_routes)
        .merge(page_routes)
        .merge(api_routes)
        // Session gate runs inside the cookie manager so it can read and set cookies
        .layer(middleware::from_fn_with_state(state.clone(), session_gate))
        .layer(CookieManagerLayer::new())
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false)),
        )
        .with_state(state)
}

/// Cross-origin calls are only allowed from the configured public site, with
/// credentials so the session cookies travel.
fn cors_layer(state: &AppState) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    match state.config.app.site_url.as_deref() {
        Some(origin) => match HeaderValue::from_str(origin.trim_end_matches('/')) {
            Ok(origin) => base.allow_origin(origin).allow_credentials(true),
            Err(e) => {
                warn!("Ignoring invalid site_url for CORS: {}", e);
                base
            }
        },
        None => base,
    }
}
