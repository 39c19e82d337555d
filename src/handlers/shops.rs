// Seller shop management: approval workflow and commission control.
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
use crate::models::Shop;
use crate::query::builder::SelectBuilder;
use crate::query::{fetch_page, ListParams};
use crate::state::AppState;

/// GET /admin/shops - searchable by shop or owner name, filterable by
/// approval status.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<Value> {
    let mut builder = SelectBuilder::new("shops");
    if let Some(term) = params.like_term() {
        builder = builder.and_like_any(&["name", "owner_name"], term);
    }
    if let Some(status) = params.status_filter() {
        builder = builder.and_eq_int("status", status as i64);
    }
    builder = builder
        .order_by(sort_clause(params.sort.as_deref()))
        .paginate(params.page(), params.per_page());

    let page = fetch_page::<Shop>(&state.pool, &builder, &params).await;
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

/// POST /admin/shops - action dispatch.
pub async fn actions(
    State(state): State<AppState>,
    Extension(ctx): Extension<AdminContext>,
    Json(body): Json<Value>,
) -> Response {
    dispatch::dispatch::<ShopAction>(&state, &ctx, body).await
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ShopAction {
    ApproveShop { id: Option<i64> },
    RejectShop { id: Option<i64>, reason: Option<String> },
    UpdateCommission { id: Option<i64>, commission: Option<Decimal> },
}

#[async_trait]
impl AdminAction for ShopAction {
    async fn perform(self, pool: &PgPool, _ctx: &AdminContext) -> Result<ActionResult, AdminError> {
        match self {
            ShopAction::ApproveShop { id } => approve(pool, id).await,
            ShopAction::RejectShop { id, reason } => reject(pool, id, reason).await,
            ShopAction::UpdateCommission { id, commission } => {
                update_commission(pool, id, commission).await
            }
        }
    }
}

async fn approve(pool: &PgPool, id: Option<i64>) -> Result<ActionResult, AdminError> {
    let Some(id) = id else {
        return Ok(ActionResult::failure("Shop id is required"));
    };
    let result = sqlx::query("UPDATE shops SET status = 1, rejection_reason = NULL WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Ok(ActionResult::failure("Shop not found"));
    }
    Ok(ActionResult::ok("Shop approved"))
}

async fn reject(
    pool: &PgPool,
    id: Option<i64>,
    reason: Option<String>,
) -> Result<ActionResult, AdminError> {
    let Some(id) = id else {
        return Ok(ActionResult::failure("Shop id is required"));
    };
    let reason = match reason.as_deref().map(str::trim) {
        Some(r) if !r.is_empty() => r.to_string(),
        _ => return Ok(ActionResult::failure("Rejection reason is required")),
    };
    let result = sqlx::query("UPDATE shops SET status = 2, rejection_reason = $2 WHERE id = $1")
        .bind(id)
        .bind(&reason)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Ok(ActionResult::failure("Shop not found"));
    }
    Ok(ActionResult::ok("Shop rejected"))
}

async fn update_commission(
    pool: &PgPool,
    id: Option<i64>,
    commission: Option<Decimal>,
) -> Result<ActionResult, AdminError> {
    let Some(id) = id else {
        return Ok(ActionResult::failure("Shop id is required"));
    };
    let Some(commission) = commission else {
        return Ok(ActionResult::failure("Commission percentage is required"));
    };
    // App-layer invariant: the schema does not constrain the range
    if commission < Decimal::ZERO || commission > Decimal::from(100) {
        return Ok(ActionResult::failure("Commission must be between 0 and 100"));
    }
    let result = sqlx::query("UPDATE shops SET commission_percentage = $2 WHERE id = $1")
        .bind(id)
        .bind(commission)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Ok(ActionResult::failure("Shop not found"));
    }
    Ok(ActionResult::ok("Commission updated"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shop_action_tags_decode() {
        let action: ShopAction =
            serde_json::from_value(json!({ "action": "approve_shop", "id": 3 })).unwrap();
        assert!(matches!(action, ShopAction::ApproveShop { id: Some(3) }));

        let action: ShopAction = serde_json::from_value(json!({
            "action": "update_commission",
            "id": 3,
            "commission": 12.5
        }))
        .unwrap();
        assert!(matches!(action, ShopAction::UpdateCommission { .. }));
    }

    #[test]
    fn shop_sort_allow_list() {
        assert_eq!(sort_clause(Some("name_asc")), "name ASC");
        assert_eq!(sort_clause(Some("anything else")), "created_at DESC");
    }
}
