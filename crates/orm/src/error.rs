//! Error types for the element query layer
//!
//! Filter values are validated by the parameter parsers when a query is
//! prepared; everything else is reported by the database driver.

use std::fmt;

use crate::config::ConfigError;

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Error types for ORM operations
#[derive(Debug, Clone)]
pub enum ModelError {
    /// Database connection or query error
    Database(String),
    /// Row could not be hydrated into an element
    Hydration(String),
    /// Connection pool error
    Connection(String),
    /// Query building error
    Query(String),
    /// A filter parameter could not be turned into a predicate
    Param(ParamError),
    /// Configuration error
    Configuration(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Database(msg) => write!(f, "Database error: {}", msg),
            ModelError::Hydration(msg) => write!(f, "Hydration error: {}", msg),
            ModelError::Connection(msg) => write!(f, "Connection error: {}", msg),
            ModelError::Query(msg) => write!(f, "Query error: {}", msg),
            ModelError::Param(err) => write!(f, "Parameter error: {}", err),
            ModelError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ModelError {}

// Convert from sqlx errors
impl From<sqlx::Error> for ModelError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::ColumnNotFound(column) => {
                ModelError::Hydration(format!("column '{}' missing from result", column))
            }
            sqlx::Error::ColumnDecode { index, source } => {
                ModelError::Hydration(format!("column {} could not be decoded: {}", index, source))
            }
            other => ModelError::Database(other.to_string()),
        }
    }
}

impl From<ParamError> for ModelError {
    fn from(err: ParamError) -> Self {
        ModelError::Param(err)
    }
}

impl From<ConfigError> for ModelError {
    fn from(err: ConfigError) -> Self {
        ModelError::Configuration(err.to_string())
    }
}

/// Error types for query builder operations
#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    /// A clause the statement cannot run without
    MissingClause(&'static str),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::MissingClause(clause) => write!(f, "Missing {} clause", clause),
        }
    }
}

impl std::error::Error for QueryError {}

impl From<QueryError> for ModelError {
    fn from(err: QueryError) -> Self {
        ModelError::Query(err.to_string())
    }
}

/// Errors raised while translating filter parameters into predicates
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("invalid value '{value}' for column {column}: expected {expected}")]
    InvalidValue {
        column: String,
        value: String,
        expected: &'static str,
    },

    #[error("invalid date '{value}' for column {column}")]
    InvalidDate { column: String, value: String },

    #[error("unsupported operator '{operator}' for column {column}")]
    UnsupportedOperator { column: String, operator: String },
}
