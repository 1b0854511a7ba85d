//! Query Builder - Core builder implementation

use std::marker::PhantomData;

use super::types::*;

/// Query builder for constructing SELECT statements
///
/// `M` tags the row type the query produces; untyped builders (`()`) are
/// used for subqueries.
#[derive(Debug)]
pub struct QueryBuilder<M = ()> {
    pub(crate) select_fields: Vec<String>,
    pub(crate) from: Option<FromSource>,
    pub(crate) where_conditions: Vec<Condition>,
    pub(crate) joins: Vec<JoinClause>,
    pub(crate) order_by: Vec<(String, OrderDirection)>,
    pub(crate) group_by: Vec<String>,
    pub(crate) limit_count: Option<i64>,
    pub(crate) offset_value: Option<i64>,
    _phantom: PhantomData<M>,
}

impl<M> Clone for QueryBuilder<M> {
    fn clone(&self) -> Self {
        Self {
            select_fields: self.select_fields.clone(),
            from: self.from.clone(),
            where_conditions: self.where_conditions.clone(),
            joins: self.joins.clone(),
            order_by: self.order_by.clone(),
            group_by: self.group_by.clone(),
            limit_count: self.limit_count,
            offset_value: self.offset_value,
            _phantom: PhantomData,
        }
    }
}

impl<M> Default for QueryBuilder<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> QueryBuilder<M> {
    /// Create a new query builder
    pub fn new() -> Self {
        Self {
            select_fields: Vec::new(),
            from: None,
            where_conditions: Vec::new(),
            joins: Vec::new(),
            order_by: Vec::new(),
            group_by: Vec::new(),
            limit_count: None,
            offset_value: None,
            _phantom: PhantomData,
        }
    }

    /// Re-tag the builder with another row type, keeping every clause
    pub fn cast<T>(self) -> QueryBuilder<T> {
        QueryBuilder {
            select_fields: self.select_fields,
            from: self.from,
            where_conditions: self.where_conditions,
            joins: self.joins,
            order_by: self.order_by,
            group_by: self.group_by,
            limit_count: self.limit_count,
            offset_value: self.offset_value,
            _phantom: PhantomData,
        }
    }

    /// Whether a join against `table` (bare name or alias) is already present
    pub fn has_join(&self, table: &str) -> bool {
        self.joins.iter().any(|join| {
            join.table == table || join.table.split_whitespace().last() == Some(table)
        })
    }
}
