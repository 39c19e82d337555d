// User account management: listing, ban toggle, deletion, wallet credits.
use async_trait::async_trait;
use axum::{
    extract::{Extension, Query, State},
    response::Response,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::dispatch::{self, ActionResult, AdminAction};
use crate::error::AdminError;
use crate::middleware::auth::AdminContext;
use crate::models::User;
use crate::query::builder::SelectBuilder;
use crate::query::{fetch_page, ListParams};
use crate::state::AppState;

/// GET /admin/users - searchable by name/email/phone, filterable by
/// user_type.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<Value> {
    let mut builder = SelectBuilder::new("users").columns(
        "id, name, email, phone, user_type, banned, wallet_balance, created_at",
    );
    if let Some(term) = params.like_term() {
        builder = builder.and_like_any(&["name", "email", "phone"], term);
    }
    if let Some(kind) = params.kind.as_deref().filter(|k| !k.is_empty()) {
        builder = builder.and_eq_text("user_type", kind);
    }
    builder = builder
        .order_by(sort_clause(params.sort.as_deref()))
        .paginate(params.page(), params.per_page());

    let page = fetch_page::<User>(&state.pool, &builder, &params).await;
    Json(json!({ "success": true, "data": page }))
}

fn sort_clause(key: Option<&str>) -> &'static str {
    match key {
        Some("oldest") => "created_at ASC",
        Some("name_asc") => "name ASC",
        Some("name_desc") => "name DESC",
        _ => "created_at DESC",
    }
}

/// POST /admin/users - action dispatch.
pub async fn actions(
    State(state): State<AppState>,
    Extension(ctx): Extension<AdminContext>,
    Json(body): Json<Value>,
) -> Response {
    dispatch::dispatch::<UserAction>(&state, &ctx, body).await
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UserAction {
    ToggleBan { id: Option<i64> },
    DeleteUser { id: Option<i64> },
    CreditWallet {
        user_id: Option<i64>,
        amount: Option<Decimal>,
        note: Option<String>,
    },
}

#[async_trait]
impl AdminAction for UserAction {
    async fn perform(self, pool: &PgPool, _ctx: &AdminContext) -> Result<ActionResult, AdminError> {
        match self {
            UserAction::ToggleBan { id } => toggle_ban(pool, id).await,
            UserAction::DeleteUser { id } => delete_user(pool, id).await,
            UserAction::CreditWallet { user_id, amount, note } => {
                credit_wallet(pool, user_id, amount, note).await
            }
        }
    }
}

async fn toggle_ban(pool: &PgPool, id: Option<i64>) -> Result<ActionResult, AdminError> {
    let Some(id) = id else {
        return Ok(ActionResult::failure("User id is required"));
    };
    let result = sqlx::query("UPDATE users SET banned = NOT banned WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Ok(ActionResult::failure("User not found"));
    }
    Ok(ActionResult::ok("User ban status updated"))
}

async fn delete_user(pool: &PgPool, id: Option<i64>) -> Result<ActionResult, AdminError> {
    let Some(id) = id else {
        return Ok(ActionResult::failure("User id is required"));
    };
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Ok(ActionResult::failure("User not found"));
    }
    Ok(ActionResult::ok("User deleted"))
}

/// The transaction row and the balance bump land together or not at all.
async fn credit_wallet(
    pool: &PgPool,
    user_id: Option<i64>,
    amount: Option<Decimal>,
    note: Option<String>,
) -> Result<ActionResult, AdminError> {
    let Some(user_id) = user_id else {
        return Ok(ActionResult::failure("User id is required"));
    };
    let Some(amount) = amount else {
        return Ok(ActionResult::failure("Amount is required"));
    };
    if amount <= Decimal::ZERO {
        return Ok(ActionResult::failure("Amount must be greater than zero"));
    }

    let mut tx = pool.begin().await?;

    let (txn_id,): (i64,) = sqlx::query_as(
        "INSERT INTO wallet_transactions (user_id, amount, note, created_at) \
         VALUES ($1, $2, $3, now()) RETURNING id",
    )
    .bind(user_id)
    .bind(amount)
    .bind(note.as_deref())
    .fetch_one(&mut *tx)
    .await?;

    let updated = sqlx::query("UPDATE users SET wallet_balance = wallet_balance + $2 WHERE id = $1")
        .bind(user_id)
        .bind(amount)
        .execute(&mut *tx)
        .await?;
    if updated.rows_affected() == 0 {
        // Dropping the transaction rolls the insert back
        return Ok(ActionResult::failure("User not found"));
    }

    tx.commit().await?;
    Ok(ActionResult::ok("Wallet credited").with("transaction_id", txn_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_action_tags_decode() {
        let action: UserAction =
            serde_json::from_value(json!({ "action": "toggle_ban", "id": 11 })).unwrap();
        assert!(matches!(action, UserAction::ToggleBan { id: Some(11) }));

        let action: UserAction = serde_json::from_value(json!({
            "action": "credit_wallet",
            "user_id": 11,
            "amount": 50.0,
            "note": "refund"
        }))
        .unwrap();
        assert!(matches!(action, UserAction::CreditWallet { .. }));
    }
}
