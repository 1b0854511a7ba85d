//! Query Builder WHERE clause operations

use super::builder::QueryBuilder;
use super::types::*;

impl<M> QueryBuilder<M> {
    /// Add an arbitrary condition, AND-ed with the existing ones
    pub fn and_where(mut self, condition: Condition) -> Self {
        self.where_conditions.push(condition);
        self
    }

    /// Add a condition only when one was produced
    pub fn and_where_opt(self, condition: Option<Condition>) -> Self {
        match condition {
            Some(condition) => self.and_where(condition),
            None => self,
        }
    }

    /// Add WHERE condition with equality
    pub fn where_eq<T: Into<SqlValue>>(self, column: &str, value: T) -> Self {
        self.and_where(Condition::compare(column, QueryOperator::Equal, value))
    }

    /// Add WHERE condition with greater than
    pub fn where_gt<T: Into<SqlValue>>(self, column: &str, value: T) -> Self {
        self.and_where(Condition::compare(column, QueryOperator::GreaterThan, value))
    }

    /// Compare two columns, e.g. `total_paid >= total_price`
    pub fn where_column(self, left: &str, operator: QueryOperator, right: &str) -> Self {
        self.and_where(Condition::CompareColumns {
            left: left.to_string(),
            operator,
            right: right.to_string(),
        })
    }

    /// Add WHERE condition with LIKE
    pub fn where_like(self, column: &str, pattern: &str) -> Self {
        self.and_where(Condition::Like {
            column: column.to_string(),
            pattern: pattern.to_string(),
            negated: false,
        })
    }

    /// Add WHERE condition with IN
    pub fn where_in<T: Into<SqlValue>>(self, column: &str, values: Vec<T>) -> Self {
        self.and_where(Condition::in_list(column, values))
    }

    /// Add WHERE condition with NOT IN
    pub fn where_not_in<T: Into<SqlValue>>(self, column: &str, values: Vec<T>) -> Self {
        self.and_where(Condition::In {
            column: column.to_string(),
            values: values.into_iter().map(Into::into).collect(),
            negated: true,
        })
    }

    /// Add WHERE condition with IN over a subquery
    pub fn where_in_subquery<T>(self, column: &str, subquery: QueryBuilder<T>) -> Self {
        self.and_where(Condition::InSubquery {
            column: column.to_string(),
            subquery: Box::new(subquery.cast()),
            negated: false,
        })
    }

    /// Add WHERE condition with IS NULL
    pub fn where_null(self, column: &str) -> Self {
        self.and_where(Condition::is_null(column))
    }

    /// Add WHERE condition with IS NOT NULL
    pub fn where_not_null(self, column: &str) -> Self {
        self.and_where(Condition::Null {
            column: column.to_string(),
            negated: true,
        })
    }

    /// Add WHERE condition with BETWEEN
    pub fn where_between<T: Into<SqlValue>>(self, column: &str, start: T, end: T) -> Self {
        self.and_where(Condition::Between {
            column: column.to_string(),
            start: start.into(),
            end: end.into(),
        })
    }

}
