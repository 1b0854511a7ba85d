//! Query Builder SELECT operations

use super::builder::QueryBuilder;
use super::types::FromSource;

impl<M> QueryBuilder<M> {
    /// Add SELECT fields to the query
    pub fn select(mut self, fields: &str) -> Self {
        if fields == "*" {
            self.select_fields.push("*".to_string());
        } else {
            self.select_fields.extend(
                fields
                    .split(',')
                    .map(|f| f.trim().to_string())
                    .filter(|f| !f.is_empty()),
            );
        }
        self
    }

    /// Add several SELECT fields at once
    pub fn select_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.select_fields
            .extend(columns.into_iter().map(|c| c.as_ref().to_string()));
        self
    }

    /// Set the FROM table
    pub fn from(mut self, table: &str) -> Self {
        self.from = Some(FromSource::Table(table.to_string()));
        self
    }

    /// Select from a derived table: `FROM (subquery) AS alias`
    pub fn from_subquery<T>(mut self, subquery: QueryBuilder<T>, alias: &str) -> Self {
        self.from = Some(FromSource::Subquery {
            query: Box::new(subquery.cast()),
            alias: alias.to_string(),
        });
        self
    }
}
