// Login, logout and CSRF token issuance. Login is the only POST endpoint
// outside the session gate.
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
    extract::{Extension, State},
    http::header::SET_COOKIE,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::config;
use crate::error::AdminError;
use crate::middleware::auth::AdminContext;
use crate::session::AdminSession;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, FromRow)]
struct LoginRow {
    id: i64,
    user_type: String,
    password: String,
}

/// POST /admin/login - verify credentials, create a session, set the cookie.
///
/// Failure is uniform regardless of which check failed; the client never
/// learns whether the email exists.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, AdminError> {
    let email = req.email.trim();
    if email.is_empty() || req.password.is_empty() {
        return Err(AdminError::bad_request("Email and password are required"));
    }

    let row: Option<LoginRow> =
        sqlx::query_as("SELECT id, user_type, password FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&state.pool)
            .await?;

    let row = row.ok_or(AdminError::Unauthenticated)?;

    let parsed = PasswordHash::new(&row.password).map_err(|_| AdminError::Unauthenticated)?;
    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed)
        .map_err(|_| AdminError::Unauthenticated)?;

    let allowed = config::config().session.allowed_roles.iter().any(|r| r == &row.user_type);
    if !allowed {
        return Err(AdminError::Unauthenticated);
    }

    let session = AdminSession::new(row.id, row.user_type.clone());
    let csrf_token = session.csrf_token.clone();
    let session_id = state.sessions.create(session).await;

    let body = Json(json!({
        "success": true,
        "message": "Logged in",
        "user_id": row.id,
        "user_type": row.user_type,
        "csrf_token": csrf_token,
    }));

    Ok(([(SET_COOKIE, session_cookie(Some(session_id)))], body).into_response())
}

/// POST /admin/logout - destroy the session and expire the cookie.
pub async fn logout(
    State(state): State<AppState>,
    Extension(ctx): Extension<AdminContext>,
) -> Response {
    state.sessions.destroy(&ctx.session_id).await;
    let body = Json(json!({ "success": true, "message": "Logged out" }));
    ([(SET_COOKIE, session_cookie(None))], body).into_response()
}

/// GET /admin/csrf - the per-session token clients must echo into every
/// action POST. Replaces the inline-script variable of the rendered pages.
pub async fn csrf_token(
    State(state): State<AppState>,
    Extension(ctx): Extension<AdminContext>,
) -> Result<Json<serde_json::Value>, AdminError> {
    let session = state
        .sessions
        .get(&ctx.session_id)
        .await
        .ok_or(AdminError::Unauthenticated)?;

    Ok(Json(json!({ "success": true, "csrf_token": session.csrf_token })))
}

fn session_cookie(session_id: Option<Uuid>) -> String {
    let cfg = &config::config().session;
    let secure = if cfg.cookie_secure { "; Secure" } else { "" };
    match session_id {
        Some(id) => format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax{}",
            cfg.cookie_name, id, secure
        ),
        // Expire immediately on logout
        None => format!(
            "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{}",
            cfg.cookie_name, secure
        ),
    }
}
