use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Key/value row from `business_settings`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BusinessSetting {
    pub id: i64,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub key: String,
    pub value: Option<String>,
    pub updated_at: DateTime<Utc>,
}
