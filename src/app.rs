use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{auth, coupons, payments, settings, shops, users};
use crate::middleware::auth::session_gate;
use crate::state::AppState;

/// Build the full admin router. Everything under /admin except login sits
/// behind the session gate.
pub fn app(state: AppState) -> Router {
    let gated = Router::new()
        .route("/admin/csrf", get(auth::csrf_token))
        .route("/admin/logout", post(auth::logout))
        .route("/admin/coupons", get(coupons::list).post(coupons::actions))
        .route("/admin/settings", get(settings::list).post(settings::actions))
        .route("/admin/settings/upload", post(settings::upload_asset))
        .route("/admin/shops", get(shops::list).post(shops::actions))
        .route("/admin/users", get(users::list).post(users::actions))
        .route("/admin/payments", get(payments::list).post(payments::actions))
        .route("/admin/payments/pending", get(payments::pending))
        .layer(middleware::from_fn_with_state(state.clone(), session_gate));

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .route("/admin/login", post(auth::login))
        .merge(gated)
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Bazaar Admin API",
            "version": version,
            "description": "Back-office API for marketplace administration",
            "endpoints": {
                "home": "/ (public)",
                "login": "/admin/login (public)",
                "csrf": "/admin/csrf (session)",
                "coupons": "/admin/coupons (session)",
                "settings": "/admin/settings, /admin/settings/upload (session)",
                "shops": "/admin/shops (session)",
                "users": "/admin/users (session)",
                "payments": "/admin/payments, /admin/payments/pending (session)",
            }
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::db::health_check(&state.pool).await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": { "status": "degraded", "timestamp": now, "database_error": e.to_string() }
            })),
        ),
    }
}
