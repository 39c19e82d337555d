use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::{Query, QueryAs};
use sqlx::{FromRow, Postgres};

/// A bindable predicate value. Listing filters only ever need these shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    Text(String),
    Int(i64),
}

/// Parameterized SELECT builder for the listing endpoints.
///
/// Every predicate is a `$n` placeholder; user-controlled values never touch
/// the SQL text. The count query reuses the same predicates and parameters
/// without ORDER BY / LIMIT / OFFSET.
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    table: String,
    columns: String,
    predicates: Vec<String>,
    params: Vec<QueryParam>,
    order_by: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl SelectBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: "*".to_string(),
            predicates: vec![],
            params: vec![],
            order_by: None,
            limit: None,
            offset: None,
        }
    }

    pub fn columns(mut self, columns: &str) -> Self {
        self.columns = columns.to_string();
        self
    }

    /// Equality predicate against a text column.
    pub fn and_eq_text(mut self, column: &str, value: impl Into<String>) -> Self {
        self.params.push(QueryParam::Text(value.into()));
        self.predicates.push(format!("\"{}\" = ${}", column, self.params.len()));
        self
    }

    /// Equality predicate against an integer column.
    pub fn and_eq_int(mut self, column: &str, value: i64) -> Self {
        self.params.push(QueryParam::Int(value));
        self.predicates.push(format!("\"{}\" = ${}", column, self.params.len()));
        self
    }

    /// Free-text search: the term matches if any of the given columns
    /// matches, case-insensitively. The term must already carry wildcards.
    pub fn and_like_any(mut self, columns: &[&str], term: impl Into<String>) -> Self {
        let term = term.into();
        let mut parts = Vec::with_capacity(columns.len());
        for column in columns {
            self.params.push(QueryParam::Text(term.clone()));
            parts.push(format!("\"{}\" ILIKE ${}", column, self.params.len()));
        }
        self.predicates.push(format!("({})", parts.join(" OR ")));
        self
    }

    /// Constant predicate fragment. Internal literals only, never request
    /// data.
    pub fn and_raw(mut self, predicate: &'static str) -> Self {
        self.predicates.push(predicate.to_string());
        self
    }

    /// ORDER BY clause from a fixed allow-list; never from user input.
    pub fn order_by(mut self, clause: &'static str) -> Self {
        self.order_by = Some(clause.to_string());
        self
    }

    pub fn paginate(mut self, page: i64, per_page: i64) -> Self {
        self.limit = Some(per_page);
        self.offset = Some((page - 1) * per_page);
        self
    }

    pub fn to_sql(&self) -> (String, &[QueryParam]) {
        let mut sql = format!(
            "SELECT {} FROM \"{}\" WHERE {}",
            self.columns,
            self.table,
            self.where_clause()
        );
        if let Some(ref order) = self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }
        (sql, &self.params)
    }

    pub fn to_count_sql(&self) -> (String, &[QueryParam]) {
        let sql = format!(
            "SELECT COUNT(*) FROM \"{}\" WHERE {}",
            self.table,
            self.where_clause()
        );
        (sql, &self.params)
    }

    fn where_clause(&self) -> String {
        // Constant anchor keeps predicate appending uniform
        let mut clause = "1=1".to_string();
        for predicate in &self.predicates {
            clause.push_str(" AND ");
            clause.push_str(predicate);
        }
        clause
    }
}

pub fn bind_params<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &'q [QueryParam],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            QueryParam::Text(s) => query.bind(s),
            QueryParam::Int(i) => query.bind(i),
        };
    }
    query
}

pub fn bind_params_as<'q, T>(
    mut query: QueryAs<'q, Postgres, T, PgArguments>,
    params: &'q [QueryParam],
) -> QueryAs<'q, Postgres, T, PgArguments>
where
    T: for<'r> FromRow<'r, PgRow>,
{
    for param in params {
        query = match param {
            QueryParam::Text(s) => query.bind(s),
            QueryParam::Int(i) => query.bind(i),
        };
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_builder_uses_constant_anchor() {
        // to_sql borrows the builder's params, so the builder needs a binding
        let builder = SelectBuilder::new("coupons");
        let (sql, params) = builder.to_sql();
        assert_eq!(sql, "SELECT * FROM \"coupons\" WHERE 1=1");
        assert!(params.is_empty());
    }

    #[test]
    fn predicates_are_parameterized_in_order() {
        let builder = SelectBuilder::new("coupons")
            .and_eq_int("status", 1)
            .and_eq_text("type", "cart_base");
        let (sql, params) = builder.to_sql();
        assert_eq!(
            sql,
            "SELECT * FROM \"coupons\" WHERE 1=1 AND \"status\" = $1 AND \"type\" = $2"
        );
        assert_eq!(params, &[QueryParam::Int(1), QueryParam::Text("cart_base".into())]);
    }

    #[test]
    fn like_any_binds_term_once_per_column() {
        let builder = SelectBuilder::new("users").and_like_any(&["name", "email"], "%term%");
        let (sql, params) = builder.to_sql();
        assert_eq!(
            sql,
            "SELECT * FROM \"users\" WHERE 1=1 AND (\"name\" ILIKE $1 OR \"email\" ILIKE $2)"
        );
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn count_sql_drops_order_and_pagination_but_keeps_predicates() {
        let builder = SelectBuilder::new("shops")
            .and_eq_int("status", 0)
            .order_by("created_at DESC")
            .paginate(3, 20);

        let (count_sql, count_params) = builder.to_count_sql();
        assert_eq!(count_sql, "SELECT COUNT(*) FROM \"shops\" WHERE 1=1 AND \"status\" = $1");
        assert_eq!(count_params, &[QueryParam::Int(0)]);

        let (sql, _) = builder.to_sql();
        assert!(sql.ends_with("ORDER BY created_at DESC LIMIT 20 OFFSET 40"));
    }

    #[test]
    fn pagination_arithmetic_from_page_one() {
        let (sql, _) = SelectBuilder::new("payments").paginate(1, 20).to_sql();
        assert!(sql.ends_with("LIMIT 20 OFFSET 0"));
    }
}
