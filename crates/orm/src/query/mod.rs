//! Query Builder Module - Fluent SQL builder for element queries

pub mod builder;
pub mod execution;
pub mod joins;
pub mod ordering;
pub mod pagination;
pub mod select;
pub mod sql_generation;
pub mod types;
pub mod where_clause;

pub use builder::QueryBuilder;
pub use types::{Condition, FromSource, JoinClause, JoinType, OrderDirection, QueryOperator, SqlValue};
