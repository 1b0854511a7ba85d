//! Query Builder Types - Core types and enums for query building

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::builder::QueryBuilder;

/// Query operator types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl QueryOperator {
    /// Parse a SQL comparison operator (`=`, `!=`, `<>`, `<`, `<=`, `>`, `>=`)
    pub fn parse(operator: &str) -> Option<Self> {
        match operator {
            "=" => Some(QueryOperator::Equal),
            "!=" | "<>" => Some(QueryOperator::NotEqual),
            ">" => Some(QueryOperator::GreaterThan),
            ">=" => Some(QueryOperator::GreaterThanOrEqual),
            "<" => Some(QueryOperator::LessThan),
            "<=" => Some(QueryOperator::LessThanOrEqual),
            _ => None,
        }
    }
}

impl fmt::Display for QueryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOperator::Equal => write!(f, "="),
            QueryOperator::NotEqual => write!(f, "!="),
            QueryOperator::GreaterThan => write!(f, ">"),
            QueryOperator::GreaterThanOrEqual => write!(f, ">="),
            QueryOperator::LessThan => write!(f, "<"),
            QueryOperator::LessThanOrEqual => write!(f, "<="),
        }
    }
}

/// A typed value bound to a `$n` placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
}

impl SqlValue {
    /// Render the value as an inline SQL literal
    pub fn to_literal(&self) -> String {
        match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Bool(b) => b.to_string(),
            SqlValue::Int(i) => i.to_string(),
            SqlValue::Float(n) => n.to_string(),
            SqlValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
            SqlValue::Timestamp(ts) => format!("'{}'", ts.format("%Y-%m-%d %H:%M:%S")),
            SqlValue::Uuid(uid) => format!("'{}'", uid),
        }
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(value as i64)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(value: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(value)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(value: NaiveDateTime) -> Self {
        SqlValue::Timestamp(value.and_utc())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

impl From<Uuid> for SqlValue {
    fn from(value: Uuid) -> Self {
        SqlValue::Uuid(value)
    }
}

/// A WHERE predicate
#[derive(Debug, Clone)]
pub enum Condition {
    /// `column <op> value`
    Compare {
        column: String,
        operator: QueryOperator,
        value: SqlValue,
    },
    /// `left <op> right`, both sides column references
    CompareColumns {
        left: String,
        operator: QueryOperator,
        right: String,
    },
    /// `column [NOT] IN (values)`
    In {
        column: String,
        values: Vec<SqlValue>,
        negated: bool,
    },
    /// `column [NOT] IN (SELECT ...)`
    InSubquery {
        column: String,
        subquery: Box<QueryBuilder>,
        negated: bool,
    },
    /// `column IS [NOT] NULL`
    Null { column: String, negated: bool },
    /// `column BETWEEN start AND end`
    Between {
        column: String,
        start: SqlValue,
        end: SqlValue,
    },
    /// `column [NOT] LIKE pattern`
    Like {
        column: String,
        pattern: String,
        negated: bool,
    },
    /// Disjunction of nested conditions
    Any(Vec<Condition>),
    /// Conjunction of nested conditions
    All(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    pub fn eq<T: Into<SqlValue>>(column: &str, value: T) -> Self {
        Condition::Compare {
            column: column.to_string(),
            operator: QueryOperator::Equal,
            value: value.into(),
        }
    }

    pub fn compare<T: Into<SqlValue>>(column: &str, operator: QueryOperator, value: T) -> Self {
        Condition::Compare {
            column: column.to_string(),
            operator,
            value: value.into(),
        }
    }

    pub fn in_list<T: Into<SqlValue>>(column: &str, values: Vec<T>) -> Self {
        Condition::In {
            column: column.to_string(),
            values: values.into_iter().map(Into::into).collect(),
            negated: false,
        }
    }

    pub fn is_null(column: &str) -> Self {
        Condition::Null {
            column: column.to_string(),
            negated: false,
        }
    }

    pub fn not(condition: Condition) -> Self {
        Condition::Not(Box::new(condition))
    }
}

/// Join types
#[derive(Debug, Clone, PartialEq)]
pub enum JoinType {
    Inner,
    Left,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinType::Inner => write!(f, "INNER JOIN"),
            JoinType::Left => write!(f, "LEFT JOIN"),
        }
    }
}

/// Join clause
#[derive(Debug, Clone)]
pub struct JoinClause {
    pub join_type: JoinType,
    pub table: String,
    pub on_conditions: Vec<(String, String)>, // (left_column, right_column)
}

/// Source of the FROM clause
#[derive(Debug, Clone)]
pub enum FromSource {
    Table(String),
    Subquery { query: Box<QueryBuilder>, alias: String },
}

/// Order by direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderDirection::Asc => write!(f, "ASC"),
            OrderDirection::Desc => write!(f, "DESC"),
        }
    }
}
