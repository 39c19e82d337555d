// Action dispatch: the shared POST contract for every admin page.
use async_trait::async_trait;
use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use sqlx::PgPool;

use crate::error::AdminError;
use crate::middleware::auth::AdminContext;
use crate::session;
use crate::state::AppState;

/// Uniform result every action handler returns: `{success, message, ...extra}`.
#[derive(Debug)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
    pub extra: Map<String, Value>,
}

impl ActionResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into(), extra: Map::new() }
    }

    /// Validation failure: part of the action protocol, delivered with
    /// HTTP 200 so clients handle it off the `success` flag.
    pub fn failure(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into(), extra: Map::new() }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("success".to_string(), Value::Bool(self.success));
        body.insert("message".to_string(), Value::String(self.message.clone()));
        for (k, v) in &self.extra {
            body.insert(k.clone(), v.clone());
        }
        Value::Object(body)
    }
}

/// One named operation on an admin page. Implementors validate their own
/// required fields and report bad input as a failure result, not an error.
#[async_trait]
pub trait AdminAction: Sized + Send {
    async fn perform(self, pool: &PgPool, ctx: &AdminContext) -> Result<ActionResult, AdminError>;
}

/// Shared POST pipeline: CSRF check against the session token, then decode
/// the typed action, then run it. The raw body is never interpreted before
/// the token matches.
pub async fn dispatch<A>(state: &AppState, ctx: &AdminContext, body: Value) -> Response
where
    A: AdminAction + DeserializeOwned,
{
    let session = match state.sessions.get(&ctx.session_id).await {
        Some(s) => s,
        None => return AdminError::Unauthenticated.into_response(),
    };

    let supplied = body.get("token").and_then(Value::as_str).unwrap_or("");
    if !session::verify_csrf(&session.csrf_token, supplied) {
        return AdminError::InvalidCsrf.into_response();
    }

    // Unknown or missing `action` tag fails the closed-set decode
    let action: A = match serde_json::from_value(body) {
        Ok(a) => a,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "message": "Invalid action" })),
            )
                .into_response();
        }
    };

    match action.perform(&state.pool, ctx).await {
        Ok(result) => Json(result.to_json()).into_response(),
        Err(e) => e.into_response(),
    }
}
