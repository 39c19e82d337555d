use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// A recorded payout to a seller.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Payment {
    pub id: i64,
    pub seller_id: i64,
    pub amount: Decimal,
    pub payment_method: String,
    pub txn_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// What the platform currently owes a seller.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SellerBalance {
    pub seller_id: i64,
    pub shop_name: Option<String>,
    pub admin_to_pay: Decimal,
}
