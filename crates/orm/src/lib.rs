//! # storefront-orm: element query foundation
//!
//! Fluent SQL builder, filter parameter parsing and the element query
//! abstraction that typed queries (orders, products, ...) specialize.
//!
//! Every element lives in the shared `elements` table and in one
//! type-specific table keyed by the same id. An element query collects
//! criteria through chainable setters and only turns them into SQL when it
//! is prepared for execution.

pub mod config;
pub mod database;
pub mod deprecation;
pub mod element;
pub mod error;
pub mod params;
pub mod query;


pub use config::{ConfigError, DatabaseConfig};
pub use database::{create_database_pool, create_database_pool_with_config, PoolConfig};
pub use deprecation::{DeprecationEntry, Deprecator};
pub use element::{
    Element, ElementCriteria, ElementQuery, ElementQueryParts, PreparedElementQuery, ELEMENT_COLUMNS,
};
pub use error::*;
pub use params::{
    format_w3c, parse_column_comparison, parse_date, parse_date_param, parse_param, ColumnType, Param,
};
pub use query::{Condition, JoinType, OrderDirection, QueryBuilder, QueryOperator, SqlValue};
