//! Query Builder ORDER BY and GROUP BY operations

use super::builder::QueryBuilder;
use super::types::*;

impl<M> QueryBuilder<M> {
    /// Add ORDER BY clause (ascending)
    pub fn order_by(mut self, column: &str) -> Self {
        self.order_by.push((column.to_string(), OrderDirection::Asc));
        self
    }

    /// Add ORDER BY clause (descending)
    pub fn order_by_desc(mut self, column: &str) -> Self {
        self.order_by.push((column.to_string(), OrderDirection::Desc));
        self
    }

    /// Append several ORDER BY terms
    pub fn order_by_all(mut self, terms: &[(String, OrderDirection)]) -> Self {
        self.order_by.extend_from_slice(terms);
        self
    }

    /// Drop every ORDER BY term
    pub fn clear_order(mut self) -> Self {
        self.order_by.clear();
        self
    }

    /// Add GROUP BY clause
    pub fn group_by(mut self, column: &str) -> Self {
        self.group_by.push(column.to_string());
        self
    }
}
