use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use uuid::Uuid;

use crate::config;
use crate::error::AdminError;
use crate::state::AppState;

/// Authenticated principal for the current request, injected by the gate.
/// Handlers read this instead of any ambient session state.
#[derive(Clone, Debug)]
pub struct AdminContext {
    pub session_id: Uuid,
    pub user_id: i64,
    pub user_type: String,
}

/// Session gate applied to every /admin route except login.
///
/// Checks run in a fixed order: cookie present and session known, role
/// allowed, then the 8-hour lifetime. A timed-out session is torn down
/// before the request is denied. Evaluated once per request, no retries.
pub async fn session_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();

    let session_id = match extract_session_cookie(request.headers()) {
        Some(id) => id,
        None => return deny(&method, AdminError::Unauthenticated),
    };

    let session = match state.sessions.get(&session_id).await {
        Some(s) => s,
        None => return deny(&method, AdminError::Unauthenticated),
    };

    if !session.has_allowed_role() {
        return deny(&method, AdminError::Unauthenticated);
    }

    if session.is_expired(Utc::now()) {
        state.sessions.destroy(&session_id).await;
        return deny(&method, AdminError::SessionExpired);
    }

    request.extensions_mut().insert(AdminContext {
        session_id,
        user_id: session.user_id,
        user_type: session.user_type,
    });

    next.run(request).await
}

/// GET requests are browser navigations and get a login redirect; anything
/// state-changing gets the JSON failure body.
fn deny(method: &Method, error: AdminError) -> Response {
    if *method == Method::GET {
        let target = match error {
            AdminError::SessionExpired => "/admin/login?timeout=1",
            _ => "/admin/login",
        };
        return Redirect::to(target).into_response();
    }
    error.into_response()
}

/// Pull the opaque session id out of the Cookie header.
pub fn extract_session_cookie(headers: &HeaderMap) -> Option<Uuid> {
    let cookie_name = &config::config().session.cookie_name;
    let header = headers.get("cookie")?.to_str().ok()?;

    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == cookie_name {
            Uuid::parse_str(value.trim()).ok()
        } else {
            None
        }
    })
}
