// Coupon management: listing plus the create/update/delete/toggle actions.
use async_trait::async_trait;
use axum::{
    extract::{Extension, Query, State},
    response::Response,
    Json,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;

use crate::dispatch::{self, ActionResult, AdminAction};
use crate::error::AdminError;
use crate::middleware::auth::AdminContext;
use crate::models::{Coupon, CouponDetails, DisplayStatus};
use crate::query::builder::SelectBuilder;
use crate::query::{fetch_page, ListParams};
use crate::state::AppState;

const DUPLICATE_CODE_MESSAGE: &str = "Mã giảm giá đã tồn tại";

/// Coupon row enriched with the derived display state for the UI.
#[derive(Debug, Serialize)]
pub struct CouponView {
    #[serde(flatten)]
    pub coupon: Coupon,
    pub display_status: DisplayStatus,
    pub decoded_details: Option<CouponDetails>,
}

/// GET /admin/coupons - filtered, sorted, paginated listing.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<Value> {
    let mut builder = SelectBuilder::new("coupons");
    if let Some(term) = params.like_term() {
        builder = builder.and_like_any(&["code"], term);
    }
    if let Some(kind) = params.kind.as_deref().filter(|k| !k.is_empty()) {
        builder = builder.and_eq_text("type", kind);
    }
    if let Some(status) = params.status_filter() {
        builder = builder.and_eq_int("status", status as i64);
    }
    builder = builder
        .order_by(sort_clause(params.sort.as_deref()))
        .paginate(params.page(), params.per_page());

    let now = Utc::now();
    let page = fetch_page::<Coupon>(&state.pool, &builder, &params).await.map(|coupon| {
        let display_status = coupon.display_status(now);
        let decoded_details = coupon.decode_details().unwrap_or_else(|e| {
            tracing::error!("undecodable details blob for coupon {}: {}", coupon.id, e);
            None
        });
        CouponView { coupon, display_status, decoded_details }
    });

    Json(serde_json::json!({ "success": true, "data": page }))
}

fn sort_clause(key: Option<&str>) -> &'static str {
    match key {
        Some("oldest") => "created_at ASC",
        Some("code_asc") => "code ASC",
        Some("code_desc") => "code DESC",
        _ => "created_at DESC",
    }
}

/// POST /admin/coupons - action dispatch.
pub async fn actions(
    State(state): State<AppState>,
    Extension(ctx): Extension<AdminContext>,
    Json(body): Json<Value>,
) -> Response {
    dispatch::dispatch::<CouponAction>(&state, &ctx, body).await
}

/// The closed set of coupon operations.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CouponAction {
    CreateCoupon(CouponForm),
    UpdateCoupon(CouponUpdateForm),
    DeleteCoupon { id: Option<i64> },
    ToggleStatus { id: Option<i64> },
}

/// Raw create payload. Everything is optional here; `validate` decides what
/// is actually required so bad input becomes a failure result, not a 422.
#[derive(Debug, Default, Deserialize)]
pub struct CouponForm {
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub discount: Option<Decimal>,
    pub discount_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<i32>,
    pub details: Option<CouponDetails>,
}

#[derive(Debug, Deserialize)]
pub struct CouponUpdateForm {
    pub id: Option<i64>,
    #[serde(flatten)]
    pub form: CouponForm,
}

/// A fully validated coupon ready for insert/update.
#[derive(Debug)]
pub struct ValidCoupon {
    pub code: String,
    pub kind: String,
    pub discount: Decimal,
    pub discount_type: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: i32,
    pub details: Option<CouponDetails>,
}

const COUPON_KINDS: [&str; 4] = ["cart_base", "product_base", "category_base", "user_base"];

impl CouponForm {
    pub fn validate(self) -> Result<ValidCoupon, String> {
        let code = match self.code.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => return Err("Coupon code is required".to_string()),
        };

        let kind = match self.kind.as_deref() {
            Some(k) if COUPON_KINDS.contains(&k) => k.to_string(),
            Some(k) => return Err(format!("Unknown coupon type: {}", k)),
            None => return Err("Coupon type is required".to_string()),
        };

        let discount_type = match self.discount_type.as_deref() {
            Some(t @ ("percent" | "amount")) => t.to_string(),
            Some(t) => return Err(format!("Unknown discount type: {}", t)),
            None => return Err("Discount type is required".to_string()),
        };

        let discount = self.discount.ok_or_else(|| "Discount is required".to_string())?;
        if discount <= Decimal::ZERO {
            return Err("Discount must be greater than zero".to_string());
        }
        if discount_type == "percent" && discount > Decimal::from(100) {
            return Err("Percentage discount cannot exceed 100".to_string());
        }

        let start_date = parse_window_date(self.start_date.as_deref(), false)
            .ok_or_else(|| "Valid start date is required".to_string())?;
        let end_date = parse_window_date(self.end_date.as_deref(), true)
            .ok_or_else(|| "Valid end date is required".to_string())?;
        if start_date > end_date {
            return Err("Start date must not be after end date".to_string());
        }

        if let Some(ref details) = self.details {
            if details.kind() != kind {
                return Err("Coupon details do not match the coupon type".to_string());
            }
        }

        let status = match self.status {
            Some(0) => 0,
            _ => 1,
        };

        Ok(ValidCoupon {
            code,
            kind,
            discount,
            discount_type,
            start_date,
            end_date,
            status,
            details: self.details,
        })
    }
}

/// Accepts `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS`. Bare end dates cover
/// their whole day so a coupon ending "2025-06-30" is active through the
/// 30th.
fn parse_window_date(raw: Option<&str>, end_of_day: bool) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    let time = if end_of_day {
        chrono::NaiveTime::from_hms_opt(23, 59, 59)?
    } else {
        chrono::NaiveTime::from_hms_opt(0, 0, 0)?
    };
    Some(date.and_time(time).and_utc())
}

#[async_trait]
impl AdminAction for CouponAction {
    async fn perform(self, pool: &PgPool, _ctx: &AdminContext) -> Result<ActionResult, AdminError> {
        match self {
            CouponAction::CreateCoupon(form) => create_coupon(pool, form).await,
            CouponAction::UpdateCoupon(update) => update_coupon(pool, update).await,
            CouponAction::DeleteCoupon { id } => delete_coupon(pool, id).await,
            CouponAction::ToggleStatus { id } => toggle_status(pool, id).await,
        }
    }
}

async fn create_coupon(pool: &PgPool, form: CouponForm) -> Result<ActionResult, AdminError> {
    let coupon = match form.validate() {
        Ok(c) => c,
        Err(msg) => return Ok(ActionResult::failure(msg)),
    };

    // Manual uniqueness invariant: the schema carries no unique index on code
    let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM coupons WHERE code = $1")
        .bind(&coupon.code)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        return Ok(ActionResult::failure(DUPLICATE_CODE_MESSAGE));
    }

    let details = encode_details(coupon.details.as_ref())?;
    let (coupon_id,): (i64,) = sqlx::query_as(
        "INSERT INTO coupons (code, type, discount, discount_type, details, start_date, end_date, status, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now()) RETURNING id",
    )
    .bind(&coupon.code)
    .bind(&coupon.kind)
    .bind(coupon.discount)
    .bind(&coupon.discount_type)
    .bind(details)
    .bind(coupon.start_date)
    .bind(coupon.end_date)
    .bind(coupon.status)
    .fetch_one(pool)
    .await?;

    Ok(ActionResult::ok("Coupon created").with("coupon_id", coupon_id))
}

async fn update_coupon(pool: &PgPool, update: CouponUpdateForm) -> Result<ActionResult, AdminError> {
    let Some(id) = update.id else {
        return Ok(ActionResult::failure("Coupon id is required"));
    };
    let coupon = match update.form.validate() {
        Ok(c) => c,
        Err(msg) => return Ok(ActionResult::failure(msg)),
    };

    // The new code may not belong to a different coupon
    let collision: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM coupons WHERE code = $1 AND id <> $2")
            .bind(&coupon.code)
            .bind(id)
            .fetch_optional(pool)
            .await?;
    if collision.is_some() {
        return Ok(ActionResult::failure(DUPLICATE_CODE_MESSAGE));
    }

    let details = encode_details(coupon.details.as_ref())?;
    let result = sqlx::query(
        "UPDATE coupons SET code = $1, type = $2, discount = $3, discount_type = $4, \
         details = $5, start_date = $6, end_date = $7, status = $8 WHERE id = $9",
    )
    .bind(&coupon.code)
    .bind(&coupon.kind)
    .bind(coupon.discount)
    .bind(&coupon.discount_type)
    .bind(details)
    .bind(coupon.start_date)
    .bind(coupon.end_date)
    .bind(coupon.status)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(ActionResult::failure("Coupon not found"));
    }
    Ok(ActionResult::ok("Coupon updated"))
}

async fn delete_coupon(pool: &PgPool, id: Option<i64>) -> Result<ActionResult, AdminError> {
    let Some(id) = id else {
        return Ok(ActionResult::failure("Coupon id is required"));
    };
    let result = sqlx::query("DELETE FROM coupons WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Ok(ActionResult::failure("Coupon not found"));
    }
    Ok(ActionResult::ok("Coupon deleted"))
}

async fn toggle_status(pool: &PgPool, id: Option<i64>) -> Result<ActionResult, AdminError> {
    let Some(id) = id else {
        return Ok(ActionResult::failure("Coupon id is required"));
    };
    let result = sqlx::query("UPDATE coupons SET status = 1 - status WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Ok(ActionResult::failure("Coupon not found"));
    }
    Ok(ActionResult::ok("Coupon status updated"))
}

fn encode_details(details: Option<&CouponDetails>) -> Result<Option<String>, AdminError> {
    details
        .map(|d| d.encode())
        .transpose()
        .map_err(|e| AdminError::Internal(format!("failed to encode coupon details: {}", e)))
}
