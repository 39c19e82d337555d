pub mod builder;
pub mod pagination;

use serde::Deserialize;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};
use tracing::error;

use crate::config;
use builder::SelectBuilder;
use pagination::Page;

/// Common listing parameters accepted by every GET endpoint.
///
/// All fields are optional; page/per_page are coerced to sane positive
/// values rather than rejected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    /// Categorical status filter; -1 (or absence) means "any".
    pub status: Option<i32>,
    /// Entity-specific category filter (coupon type, user type, ...).
    pub kind: Option<String>,
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl ListParams {
    pub fn page(&self) -> i64 {
        match self.page {
            Some(p) if p >= 1 => p,
            _ => 1,
        }
    }

    pub fn per_page(&self) -> i64 {
        let cfg = &config::config().listing;
        match self.per_page {
            Some(p) if p >= 1 => p.min(cfg.max_per_page),
            _ => cfg.default_per_page,
        }
    }

    /// Search term with surrounding wildcards for LIKE matching, or None
    /// when the term is empty/whitespace.
    pub fn like_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s))
    }

    /// Status filter, treating -1 as "any".
    pub fn status_filter(&self) -> Option<i32> {
        self.status.filter(|s| *s >= 0)
    }
}

/// Run the count + paged select pair for a listing and assemble the page.
///
/// Failure policy: a query error logs server-side and yields an empty page;
/// the listing endpoint itself never fails on a bad read.
pub async fn fetch_page<T>(pool: &PgPool, builder: &SelectBuilder, params: &ListParams) -> Page<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let page = params.page();
    let per_page = params.per_page();

    let (count_sql, count_params) = builder.to_count_sql();
    let total_records: i64 = match builder::bind_params(sqlx::query(&count_sql), &count_params)
        .fetch_one(pool)
        .await
        .and_then(|row| row.try_get::<i64, _>(0))
    {
        Ok(n) => n,
        Err(e) => {
            error!("listing count query failed: {}", e);
            return Page::empty(page, per_page);
        }
    };

    let (select_sql, select_params) = builder.to_sql();
    let records: Vec<T> =
        match builder::bind_params_as::<T>(sqlx::query_as(&select_sql), &select_params)
            .fetch_all(pool)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                error!("listing select query failed: {}", e);
                return Page::empty(page, per_page);
            }
        };

    Page::new(records, page, per_page, total_records)
}
