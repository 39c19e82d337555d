// Business settings: key/value listing, single and bulk updates, and the
// asset upload endpoint.
use async_trait::async_trait;
use axum::{
    extract::{Extension, Multipart, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use std::collections::HashMap;
use std::path::Path;

use crate::config;
use crate::dispatch::{self, ActionResult, AdminAction};
use crate::error::AdminError;
use crate::middleware::auth::AdminContext;
use crate::models::BusinessSetting;
use crate::query::builder::SelectBuilder;
use crate::query::{fetch_page, ListParams};
use crate::session;
use crate::state::AppState;
use crate::upload;

/// GET /admin/settings - key/value listing, searchable by key.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<Value> {
    let mut builder = SelectBuilder::new("business_settings");
    if let Some(term) = params.like_term() {
        builder = builder.and_like_any(&["type"], term);
    }
    builder = builder
        .order_by("type ASC")
        .paginate(params.page(), params.per_page());

    let page = fetch_page::<BusinessSetting>(&state.pool, &builder, &params).await;
    Json(json!({ "success": true, "data": page }))
}

/// POST /admin/settings - action dispatch.
pub async fn actions(
    State(state): State<AppState>,
    Extension(ctx): Extension<AdminContext>,
    Json(body): Json<Value>,
) -> Response {
    dispatch::dispatch::<SettingsAction>(&state, &ctx, body).await
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SettingsAction {
    UpdateSetting { key: Option<String>, value: Option<String> },
    BulkUpdate { settings: Option<HashMap<String, String>> },
}

#[async_trait]
impl AdminAction for SettingsAction {
    async fn perform(self, pool: &PgPool, _ctx: &AdminContext) -> Result<ActionResult, AdminError> {
        match self {
            SettingsAction::UpdateSetting { key, value } => update_setting(pool, key, value).await,
            SettingsAction::BulkUpdate { settings } => bulk_update(pool, settings).await,
        }
    }
}

const UPSERT_SQL: &str = "INSERT INTO business_settings (type, value, updated_at) \
     VALUES ($1, $2, now()) \
     ON CONFLICT (type) DO UPDATE SET value = EXCLUDED.value, updated_at = now()";

async fn update_setting(
    pool: &PgPool,
    key: Option<String>,
    value: Option<String>,
) -> Result<ActionResult, AdminError> {
    let key = match key.as_deref().map(str::trim) {
        Some(k) if !k.is_empty() => k.to_string(),
        _ => return Ok(ActionResult::failure("Setting key is required")),
    };

    sqlx::query(UPSERT_SQL)
        .bind(&key)
        .bind(value.unwrap_or_default())
        .execute(pool)
        .await?;

    Ok(ActionResult::ok("Setting updated"))
}

/// All-or-nothing update across every submitted pair.
async fn bulk_update(
    pool: &PgPool,
    settings: Option<HashMap<String, String>>,
) -> Result<ActionResult, AdminError> {
    let settings = match settings {
        Some(s) if !s.is_empty() => s,
        _ => return Ok(ActionResult::failure("No settings provided")),
    };
    if settings.keys().any(|k| k.trim().is_empty()) {
        return Ok(ActionResult::failure("Setting key is required"));
    }

    let mut tx = pool.begin().await?;
    for (key, value) in &settings {
        sqlx::query(UPSERT_SQL)
            .bind(key.trim())
            .bind(value)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    Ok(ActionResult::ok("Settings updated").with("updated", settings.len() as i64))
}

/// POST /admin/settings/upload - multipart upload of logo/favicon/meta image.
///
/// Expected fields: `token` (CSRF), `kind`, `file`. Parts may arrive in any
/// order, so the body is read in full first; the CSRF token is then checked
/// before anything touches disk or the settings table.
pub async fn upload_asset(
    State(state): State<AppState>,
    Extension(ctx): Extension<AdminContext>,
    mut multipart: Multipart,
) -> Response {
    let session = match state.sessions.get(&ctx.session_id).await {
        Some(s) => s,
        None => return AdminError::Unauthenticated.into_response(),
    };

    let mut token: Option<String> = None;
    let mut kind: Option<String> = None;
    let mut file: Option<(String, Vec<u8>)> = None; // (content_type, bytes)

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => break,
            Err(_) => return AdminError::bad_request("Malformed multipart body").into_response(),
        };
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "token" => token = field.text().await.ok(),
            "kind" => kind = field.text().await.ok(),
            "file" => {
                let content_type = field.content_type().unwrap_or("").to_string();
                match field.bytes().await {
                    Ok(bytes) => file = Some((content_type, bytes.to_vec())),
                    Err(_) => {
                        return AdminError::bad_request("Failed to read uploaded file").into_response()
                    }
                }
            }
            _ => {}
        }
    }

    if !session::verify_csrf(&session.csrf_token, token.as_deref().unwrap_or("")) {
        return AdminError::InvalidCsrf.into_response();
    }

    let kind = match kind.as_deref() {
        Some(k) if upload::is_valid_kind(k) => k.to_string(),
        _ => {
            return Json(json!({ "success": false, "message": "Invalid upload kind" })).into_response()
        }
    };

    let Some((content_type, bytes)) = file else {
        return Json(json!({ "success": false, "message": "No file provided" })).into_response();
    };

    let Some(ext) = upload::extension_for_mime(&content_type) else {
        return Json(json!({ "success": false, "message": "Unsupported file type" })).into_response();
    };

    let cfg = &config::config().uploads;
    if bytes.len() > cfg.max_size_bytes {
        return Json(json!({ "success": false, "message": "File too large" })).into_response();
    }

    let filename = upload::upload_filename(&kind, Utc::now().timestamp(), ext);
    let target = Path::new(&cfg.directory).join(&filename);

    if let Err(e) = tokio::fs::create_dir_all(&cfg.directory).await {
        tracing::error!("failed to create upload directory: {}", e);
        return AdminError::Internal("upload directory unavailable".to_string()).into_response();
    }
    if let Err(e) = tokio::fs::write(&target, &bytes).await {
        tracing::error!("failed to store upload {}: {}", filename, e);
        return AdminError::Internal("failed to store upload".to_string()).into_response();
    }

    // Persist the relative path under `{kind}_path`
    let stored_path = format!("{}/{}", cfg.directory.trim_end_matches('/'), filename);
    let upsert = sqlx::query(UPSERT_SQL)
        .bind(upload::settings_key(&kind))
        .bind(&stored_path)
        .execute(&state.pool)
        .await;
    if let Err(e) = upsert {
        return AdminError::from(e).into_response();
    }

    Json(json!({ "success": true, "message": "File uploaded", "path": stored_path })).into_response()
}
