use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// Seller shop row. `status`: 0 = pending, 1 = approved, 2 = rejected.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Shop {
    pub id: i64,
    pub seller_id: i64,
    pub name: String,
    pub owner_name: Option<String>,
    pub status: i32,
    pub rejection_reason: Option<String>,
    /// Platform cut in percent, [0, 100]. Enforced at the application layer.
    pub commission_percentage: Decimal,
    pub created_at: DateTime<Utc>,
}
