//! Filter parameter parsing
//!
//! Element query setters accept loosely typed values: `5`, `"not 5"`,
//! `">= 2018-01-01"`, `"foo*"`, `"1, 2, 3"`, `vec!["and", ">=1", "<10"]`.
//! The parsers here turn such a value into a single [`Condition`] for one
//! column.
//!
//! Rules:
//! - text splits on unescaped commas (`\,` keeps the comma); tokens are trimmed
//! - a leading `and` / `or` token picks the glue, `or` by default
//! - operator prefixes: `not `, `!=`, `<=`, `>=`, `<`, `>`, `=`
//! - `:empty:` / `:notempty:` match missing values
//! - `*` is a wildcard on text columns (`\*` is a literal star)
//! - `=` tokens under `or` collapse into one `IN`, `!=` tokens under `and`
//!   into one `NOT IN`

pub mod date;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::error::ParamError;
use crate::query::{Condition, QueryOperator, SqlValue};

pub use date::{format_w3c, parse_date};

const EMPTY_MARKER: &str = ":empty:";
const NOT_EMPTY_MARKER: &str = ":notempty:";

/// A filter value as handed to an element query setter
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(DateTime<Utc>),
    List(Vec<Param>),
}

impl Param {
    /// A blank param produces no predicate at all
    pub fn is_blank(&self) -> bool {
        match self {
            Param::Null => true,
            Param::Text(s) => s.trim().is_empty(),
            Param::List(items) => items.iter().all(Param::is_blank),
            _ => false,
        }
    }

    /// Turn the value into a list, keeping existing list items
    pub fn into_list(self) -> Vec<Param> {
        match self {
            Param::Null => Vec::new(),
            Param::List(items) => items,
            other => vec![other],
        }
    }

    /// Blank, or a scalar zero / `false`; id setters ignore such values
    pub fn is_falsy(&self) -> bool {
        match self {
            Param::Bool(b) => !b,
            Param::Int(i) => *i == 0,
            Param::Float(n) => *n == 0.0,
            Param::Text(s) => s.trim().is_empty() || s.trim() == "0",
            _ => self.is_blank(),
        }
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Text(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Text(value)
    }
}

impl From<&String> for Param {
    fn from(value: &String) -> Self {
        Param::Text(value.clone())
    }
}

impl From<bool> for Param {
    fn from(value: bool) -> Self {
        Param::Bool(value)
    }
}

impl From<i32> for Param {
    fn from(value: i32) -> Self {
        Param::Int(value as i64)
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Param::Int(value)
    }
}

impl From<u32> for Param {
    fn from(value: u32) -> Self {
        Param::Int(value as i64)
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Param::Float(value)
    }
}

impl From<DateTime<Utc>> for Param {
    fn from(value: DateTime<Utc>) -> Self {
        Param::DateTime(value)
    }
}

impl From<NaiveDate> for Param {
    fn from(value: NaiveDate) -> Self {
        match value.and_hms_opt(0, 0, 0) {
            Some(midnight) => Param::DateTime(midnight.and_utc()),
            None => Param::Null,
        }
    }
}

impl<T: Into<Param>> From<Option<T>> for Param {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Param::Null)
    }
}

impl<T: Into<Param>> From<Vec<T>> for Param {
    fn from(values: Vec<T>) -> Self {
        Param::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Param>, const N: usize> From<[T; N]> for Param {
    fn from(values: [T; N]) -> Self {
        Param::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<Uuid> for Param {
    fn from(value: Uuid) -> Self {
        Param::Text(value.to_string())
    }
}

impl From<Value> for Param {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Param::Null,
            Value::Bool(b) => Param::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Param::Int(i),
                None => Param::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => Param::Text(s),
            Value::Array(items) => Param::List(items.into_iter().map(Param::from).collect()),
            Value::Object(map) => Param::Text(Value::Object(map).to_string()),
        }
    }
}

/// How token values are coerced before being bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Numeric,
    Text,
    Boolean,
    Timestamp,
    Uuid,
}

impl ColumnType {
    fn expected(self) -> &'static str {
        match self {
            ColumnType::Integer => "an integer",
            ColumnType::Numeric => "a number",
            ColumnType::Text => "text",
            ColumnType::Boolean => "a boolean",
            ColumnType::Timestamp => "a date",
            ColumnType::Uuid => "a UUID",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Glue {
    And,
    Or,
}

/// Translate a filter value into a predicate on `column`.
///
/// Returns `Ok(None)` when the value is blank.
pub fn parse_param(
    column: &str,
    value: &Param,
    column_type: ColumnType,
) -> Result<Option<Condition>, ParamError> {
    if value.is_blank() {
        return Ok(None);
    }

    let mut tokens = Vec::new();
    flatten(value, &mut tokens);

    let glue = match tokens.first() {
        Some(Param::Text(first)) if first.eq_ignore_ascii_case("and") => Some(Glue::And),
        Some(Param::Text(first)) if first.eq_ignore_ascii_case("or") => Some(Glue::Or),
        _ => None,
    };
    if glue.is_some() {
        tokens.remove(0);
    }
    let glue = glue.unwrap_or(Glue::Or);

    let mut conditions = Vec::new();
    let mut in_values = Vec::new();
    let mut not_in_values = Vec::new();

    for token in tokens {
        let (operator, operand) = match token {
            Param::Text(text) => {
                let (operator, rest) = split_operator(&text);
                (operator, Param::Text(rest.to_string()))
            }
            other => (QueryOperator::Equal, other),
        };

        if let Param::Null = operand {
            conditions.push(null_condition(column, operator, column_type, false)?);
            continue;
        }

        if let Param::Text(text) = &operand {
            if text == EMPTY_MARKER || text == NOT_EMPTY_MARKER {
                let negated = text == NOT_EMPTY_MARKER;
                conditions.push(null_condition(column, operator, column_type, negated)?);
                continue;
            }

            if column_type == ColumnType::Text
                && has_wildcard(text)
                && matches!(operator, QueryOperator::Equal | QueryOperator::NotEqual)
            {
                conditions.push(Condition::Like {
                    column: column.to_string(),
                    pattern: like_pattern(text),
                    negated: operator == QueryOperator::NotEqual,
                });
                continue;
            }
        }

        let value = coerce(column, operand, column_type)?;
        match (operator, glue) {
            (QueryOperator::Equal, Glue::Or) => in_values.push(value),
            (QueryOperator::NotEqual, Glue::And) => not_in_values.push(value),
            _ => conditions.push(Condition::compare(column, operator, value)),
        }
    }

    if !in_values.is_empty() {
        conditions.push(collapse(column, in_values, false));
    }
    if !not_in_values.is_empty() {
        conditions.push(collapse(column, not_in_values, true));
    }

    Ok(match conditions.len() {
        0 => None,
        1 => conditions.pop(),
        _ => Some(match glue {
            Glue::And => Condition::All(conditions),
            Glue::Or => Condition::Any(conditions),
        }),
    })
}

/// Translate a date filter value into a predicate on `column`.
///
/// Same syntax as [`parse_param`]; every operand must parse as a date.
pub fn parse_date_param(column: &str, value: &Param) -> Result<Option<Condition>, ParamError> {
    parse_param(column, value, ColumnType::Timestamp)
}

/// Parse `"<op> other.column"` into a column-to-column comparison
pub fn parse_column_comparison(column: &str, expression: &str) -> Result<Condition, ParamError> {
    let (operator, other) = split_operator(expression.trim());
    let is_reference = !other.is_empty()
        && other
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');

    if !is_reference {
        return Err(ParamError::InvalidValue {
            column: column.to_string(),
            value: expression.to_string(),
            expected: "a column reference",
        });
    }

    Ok(Condition::CompareColumns {
        left: column.to_string(),
        operator,
        right: other.to_string(),
    })
}

fn flatten(value: &Param, out: &mut Vec<Param>) {
    match value {
        Param::List(items) => {
            for item in items {
                flatten(item, out);
            }
        }
        Param::Text(text) => {
            out.extend(split_unescaped(text).into_iter().map(Param::Text));
        }
        other => out.push(other.clone()),
    }
}

/// Split on commas not preceded by a backslash, trimming and dropping blanks
fn split_unescaped(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&',') => {
                current.push(',');
                chars.next();
            }
            ',' => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);

    parts
        .into_iter()
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

fn split_operator(token: &str) -> (QueryOperator, &str) {
    if let Some(prefix) = token.get(..4) {
        if prefix.eq_ignore_ascii_case("not ") {
            return (QueryOperator::NotEqual, token[4..].trim_start());
        }
    }

    for prefix in ["!=", "<>", "<=", ">=", "<", ">", "="] {
        if let Some(rest) = token.strip_prefix(prefix) {
            if let Some(operator) = QueryOperator::parse(prefix) {
                return (operator, rest.trim_start());
            }
        }
    }

    (QueryOperator::Equal, token)
}

fn null_condition(
    column: &str,
    operator: QueryOperator,
    column_type: ColumnType,
    negated: bool,
) -> Result<Condition, ParamError> {
    let negated = match operator {
        QueryOperator::Equal => negated,
        QueryOperator::NotEqual => !negated,
        other => {
            return Err(ParamError::UnsupportedOperator {
                column: column.to_string(),
                operator: format!("{} {}", other, EMPTY_MARKER),
            })
        }
    };

    let empty = if column_type == ColumnType::Text {
        Condition::Any(vec![
            Condition::is_null(column),
            Condition::eq(column, String::new()),
        ])
    } else {
        Condition::is_null(column)
    };

    Ok(match (negated, empty) {
        (false, empty) => empty,
        (true, Condition::Null { column, .. }) => Condition::Null {
            column,
            negated: true,
        },
        (true, empty) => Condition::not(empty),
    })
}

fn has_wildcard(text: &str) -> bool {
    let mut escaped = false;
    for c in text.chars() {
        match c {
            '\\' if !escaped => escaped = true,
            '*' if !escaped => return true,
            _ => escaped = false,
        }
    }
    false
}

fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'*') => {
                pattern.push('*');
                chars.next();
            }
            '*' => pattern.push('%'),
            '%' | '_' | '\\' => {
                pattern.push('\\');
                pattern.push(c);
            }
            _ => pattern.push(c),
        }
    }

    pattern
}

fn unescape_literal(text: &str) -> String {
    text.replace("\\*", "*")
}

fn collapse(column: &str, mut values: Vec<SqlValue>, negated: bool) -> Condition {
    if values.len() == 1 {
        let operator = if negated {
            QueryOperator::NotEqual
        } else {
            QueryOperator::Equal
        };
        if let Some(value) = values.pop() {
            return Condition::compare(column, operator, value);
        }
    }

    Condition::In {
        column: column.to_string(),
        values,
        negated,
    }
}

fn coerce(column: &str, operand: Param, column_type: ColumnType) -> Result<SqlValue, ParamError> {
    let invalid = |value: String| ParamError::InvalidValue {
        column: column.to_string(),
        value,
        expected: column_type.expected(),
    };

    match (column_type, operand) {
        (ColumnType::Integer, Param::Int(i)) => Ok(SqlValue::Int(i)),
        (ColumnType::Integer, Param::Float(f)) if f.fract() == 0.0 => Ok(SqlValue::Int(f as i64)),
        (ColumnType::Integer, Param::Bool(b)) => Ok(SqlValue::Int(i64::from(b))),
        (ColumnType::Integer, Param::Text(s)) => s.parse().map(SqlValue::Int).map_err(|_| invalid(s)),

        (ColumnType::Numeric, Param::Int(i)) => Ok(SqlValue::Int(i)),
        (ColumnType::Numeric, Param::Float(f)) => Ok(SqlValue::Float(f)),
        (ColumnType::Numeric, Param::Text(s)) => match s.parse::<i64>() {
            Ok(i) => Ok(SqlValue::Int(i)),
            Err(_) => s.parse().map(SqlValue::Float).map_err(|_| invalid(s)),
        },

        (ColumnType::Text, Param::Text(s)) => Ok(SqlValue::Text(unescape_literal(&s))),
        (ColumnType::Text, Param::Int(i)) => Ok(SqlValue::Text(i.to_string())),
        (ColumnType::Text, Param::Float(f)) => Ok(SqlValue::Text(f.to_string())),
        (ColumnType::Text, Param::DateTime(ts)) => Ok(SqlValue::Text(format_w3c(&ts))),

        (ColumnType::Boolean, Param::Bool(b)) => Ok(SqlValue::Bool(b)),
        (ColumnType::Boolean, Param::Int(i @ (0 | 1))) => Ok(SqlValue::Bool(i == 1)),
        (ColumnType::Boolean, Param::Text(s)) => match s.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(SqlValue::Bool(true)),
            "0" | "false" | "no" | "off" => Ok(SqlValue::Bool(false)),
            _ => Err(invalid(s)),
        },

        (ColumnType::Timestamp, Param::DateTime(ts)) => Ok(SqlValue::Timestamp(ts)),
        (ColumnType::Timestamp, Param::Int(secs)) => Utc
            .timestamp_opt(secs, 0)
            .single()
            .map(SqlValue::Timestamp)
            .ok_or_else(|| ParamError::InvalidDate {
                column: column.to_string(),
                value: secs.to_string(),
            }),
        (ColumnType::Timestamp, Param::Text(s)) => {
            parse_date(&s)
                .map(SqlValue::Timestamp)
                .ok_or_else(|| ParamError::InvalidDate {
                    column: column.to_string(),
                    value: s,
                })
        }

        (ColumnType::Uuid, Param::Text(s)) => Uuid::parse_str(&s)
            .map(SqlValue::Uuid)
            .map_err(|_| invalid(s)),

        (_, other) => Err(invalid(format!("{:?}", other))),
    }
}
