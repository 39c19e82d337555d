use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of the `coupons` table. The `details` column holds the
/// kind-specific JSON blob; it is decoded into [`CouponDetails`] at the
/// storage boundary, never passed around as raw text.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Coupon {
    pub id: i64,
    pub code: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub discount: Decimal,
    pub discount_type: String,
    pub details: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: i32,
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    pub fn decode_details(&self) -> Result<Option<CouponDetails>, serde_json::Error> {
        match self.details.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => serde_json::from_str(raw).map(Some),
        }
    }

    pub fn display_status(&self, now: DateTime<Utc>) -> DisplayStatus {
        DisplayStatus::derive(self.status, self.start_date, self.end_date, now)
    }
}

/// Kind-specific coupon payload, tagged by the coupon `type` column value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CouponDetails {
    CartBase { min_buy: Decimal },
    ProductBase { product_ids: Vec<i64> },
    CategoryBase { category_id: i64 },
    UserBase { user_ids: Vec<i64> },
}

impl CouponDetails {
    /// The `type` column value this payload belongs to.
    pub fn kind(&self) -> &'static str {
        match self {
            CouponDetails::CartBase { .. } => "cart_base",
            CouponDetails::ProductBase { .. } => "product_base",
            CouponDetails::CategoryBase { .. } => "category_base",
            CouponDetails::UserBase { .. } => "user_base",
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Displayed coupon state derived from the status flag and date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStatus {
    Inactive,
    Upcoming,
    Expired,
    Active,
}

impl DisplayStatus {
    /// Precedence is fixed: disabled flag wins over everything, then
    /// upcoming, then expired, then active. Total over all inputs.
    pub fn derive(status: i32, start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if status == 0 {
            DisplayStatus::Inactive
        } else if now < start {
            DisplayStatus::Upcoming
        } else if now > end {
            DisplayStatus::Expired
        } else {
            DisplayStatus::Active
        }
    }
}
