// Seller payouts: payment history, pending balances, and the transactional
// payout action.
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
use crate::models::{Payment, SellerBalance};
use crate::query::builder::SelectBuilder;
use crate::query::{fetch_page, ListParams};
use crate::state::AppState;

/// GET /admin/payments - payout history.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<Value> {
    let mut builder = SelectBuilder::new("payments");
    if let Some(term) = params.like_term() {
        builder = builder.and_like_any(&["payment_method", "txn_code"], term);
    }
    builder = builder
        .order_by("created_at DESC")
        .paginate(params.page(), params.per_page());

    let page = fetch_page::<Payment>(&state.pool, &builder, &params).await;
    Json(json!({ "success": true, "data": page }))
}

/// GET /admin/payments/pending - sellers the platform still owes.
pub async fn pending(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<Value> {
    let builder = SelectBuilder::new("sellers")
        .columns(
            "id AS seller_id, \
             (SELECT name FROM shops WHERE shops.seller_id = sellers.id LIMIT 1) AS shop_name, \
             admin_to_pay",
        )
        .and_raw("\"admin_to_pay\" > 0")
        .order_by("admin_to_pay DESC")
        .paginate(params.page(), params.per_page());

    let page = fetch_page::<SellerBalance>(&state.pool, &builder, &params).await;
    Json(json!({ "success": true, "data": page }))
}

/// POST /admin/payments - action dispatch.
pub async fn actions(
    State(state): State<AppState>,
    Extension(ctx): Extension<AdminContext>,
    Json(body): Json<Value>,
) -> Response {
    dispatch::dispatch::<PaymentAction>(&state, &ctx, body).await
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PaymentAction {
    ProcessPayment {
        seller_id: Option<i64>,
        payment_method: Option<String>,
        txn_code: Option<String>,
    },
}

#[async_trait]
impl AdminAction for PaymentAction {
    async fn perform(self, pool: &PgPool, _ctx: &AdminContext) -> Result<ActionResult, AdminError> {
        match self {
            PaymentAction::ProcessPayment { seller_id, payment_method, txn_code } => {
                process_payment(pool, seller_id, payment_method, txn_code).await
            }
        }
    }
}

/// Record the payout and zero the seller's balance atomically. Two operators
/// racing on the same seller serialize on the row lock; the loser sees a
/// zero balance and fails cleanly.
async fn process_payment(
    pool: &PgPool,
    seller_id: Option<i64>,
    payment_method: Option<String>,
    txn_code: Option<String>,
) -> Result<ActionResult, AdminError> {
    let Some(seller_id) = seller_id else {
        return Ok(ActionResult::failure("Seller id is required"));
    };
    let payment_method = match payment_method.as_deref().map(str::trim) {
        Some(m) if !m.is_empty() => m.to_string(),
        _ => return Ok(ActionResult::failure("Payment method is required")),
    };

    let mut tx = pool.begin().await?;

    let balance: Option<(Decimal,)> =
        sqlx::query_as("SELECT admin_to_pay FROM sellers WHERE id = $1 FOR UPDATE")
            .bind(seller_id)
            .fetch_optional(&mut *tx)
            .await?;
    let amount = match balance {
        Some((amount,)) => amount,
        None => return Ok(ActionResult::failure("Seller not found")),
    };
    if amount <= Decimal::ZERO {
        return Ok(ActionResult::failure("Nothing to pay for this seller"));
    }

    let (payment_id,): (i64,) = sqlx::query_as(
        "INSERT INTO payments (seller_id, amount, payment_method, txn_code, created_at) \
         VALUES ($1, $2, $3, $4, now()) RETURNING id",
    )
    .bind(seller_id)
    .bind(amount)
    .bind(&payment_method)
    .bind(txn_code.as_deref())
    .fetch_one(&mut *tx)
    .await?;

    // Second half of the pair; a failure here rolls the insert back
    sqlx::query("UPDATE sellers SET admin_to_pay = 0 WHERE id = $1")
        .bind(seller_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(ActionResult::ok("Payment processed")
        .with("payment_id", payment_id)
        .with("amount", json!(amount)))
}
