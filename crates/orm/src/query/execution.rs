//! Query Builder execution against PostgreSQL

use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Pool, Postgres, Row};

use super::builder::QueryBuilder;
use super::types::SqlValue;
use crate::error::{ModelResult, QueryError};

/// Bind one typed value to the next placeholder
fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: SqlValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        SqlValue::Null => query.bind(Option::<String>::None),
        SqlValue::Bool(b) => query.bind(b),
        SqlValue::Int(i) => query.bind(i),
        SqlValue::Float(f) => query.bind(f),
        SqlValue::Text(s) => query.bind(s),
        // Timestamps are stored as UTC without a zone
        SqlValue::Timestamp(ts) => query.bind(ts.naive_utc()),
        SqlValue::Uuid(uid) => query.bind(uid),
    }
}

fn bind_all(sql: &str, params: Vec<SqlValue>) -> Query<'_, Postgres, PgArguments> {
    params
        .into_iter()
        .fold(sqlx::query(sql), |query, value| bind_value(query, value))
}

impl<M: Send + Sync> QueryBuilder<M> {
    /// Placeholder SQL and binds, refusing statements without a source
    fn executable(&self) -> Result<(String, Vec<SqlValue>), QueryError> {
        if self.from.is_none() {
            return Err(QueryError::MissingClause("FROM"));
        }
        Ok(self.to_sql_with_params())
    }

    /// Execute the query and return every row
    pub async fn fetch_rows(&self, pool: &Pool<Postgres>) -> ModelResult<Vec<PgRow>> {
        let (sql, params) = self.executable()?;
        tracing::debug!(sql = %sql, params = params.len(), "executing query");

        let rows = bind_all(&sql, params).fetch_all(pool).await?;
        Ok(rows)
    }

    /// Execute the query and return the first row, if any
    pub async fn fetch_optional_row(&self, pool: &Pool<Postgres>) -> ModelResult<Option<PgRow>> {
        let (sql, params) = self.executable()?;
        tracing::debug!(sql = %sql, params = params.len(), "executing query");

        let row = bind_all(&sql, params).fetch_optional(pool).await?;
        Ok(row)
    }

    /// Count the rows the query would return, honouring LIMIT and OFFSET
    pub async fn fetch_count(&self, pool: &Pool<Postgres>) -> ModelResult<i64> {
        self.executable()?;
        let counter: QueryBuilder<()> = QueryBuilder::new()
            .select("COUNT(*)")
            .from_subquery(self.clone().clear_order(), "counted");
        let (sql, params) = counter.to_sql_with_params();
        tracing::debug!(sql = %sql, params = params.len(), "executing count");

        let row = bind_all(&sql, params).fetch_one(pool).await?;
        let count: i64 = row.try_get(0)?;
        Ok(count)
    }

    /// Execute the query and read the first column of every row as an id
    pub async fn fetch_ids(&self, pool: &Pool<Postgres>) -> ModelResult<Vec<i32>> {
        let rows = self.fetch_rows(pool).await?;
        rows.iter()
            .map(|row| row.try_get::<i32, _>(0).map_err(Into::into))
            .collect()
    }
}
