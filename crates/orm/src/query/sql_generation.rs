//! Query Builder SQL generation
//!
//! One renderer serves both outputs: placeholders plus typed parameters for
//! execution, and inline literals for logging and assertions. Placeholder
//! numbering runs across nested subqueries in the order they are written.

use super::builder::QueryBuilder;
use super::types::*;

#[derive(Debug, Clone, Copy, PartialEq)]
enum RenderMode {
    Placeholders,
    Inline,
}

struct SqlWriter {
    sql: String,
    params: Vec<SqlValue>,
    mode: RenderMode,
}

impl SqlWriter {
    fn new(mode: RenderMode) -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
            mode,
        }
    }

    fn push(&mut self, fragment: &str) {
        self.sql.push_str(fragment);
    }

    fn push_value(&mut self, value: &SqlValue) {
        match self.mode {
            RenderMode::Placeholders => {
                self.params.push(value.clone());
                self.sql.push_str(&format!("${}", self.params.len()));
            }
            RenderMode::Inline => self.sql.push_str(&value.to_literal()),
        }
    }
}

impl<M> QueryBuilder<M> {
    /// Generate SQL with `$n` placeholders and the values to bind, in order
    pub fn to_sql_with_params(&self) -> (String, Vec<SqlValue>) {
        let mut writer = SqlWriter::new(RenderMode::Placeholders);
        self.write_select(&mut writer);
        (writer.sql, writer.params)
    }

    /// Generate SQL with every value inlined as an escaped literal
    pub fn to_sql(&self) -> String {
        let mut writer = SqlWriter::new(RenderMode::Inline);
        self.write_select(&mut writer);
        writer.sql
    }

    fn write_select(&self, w: &mut SqlWriter) {
        // SELECT clause
        w.push("SELECT ");

        if self.select_fields.is_empty() {
            w.push("*");
        } else {
            w.push(&self.select_fields.join(", "));
        }

        // FROM clause
        match &self.from {
            Some(FromSource::Table(table)) => {
                w.push(" FROM ");
                w.push(table);
            }
            Some(FromSource::Subquery { query, alias }) => {
                w.push(" FROM (");
                query.write_select(w);
                w.push(") AS ");
                w.push(alias);
            }
            None => {}
        }

        // JOIN clauses
        for join in &self.joins {
            w.push(&format!(" {} {}", join.join_type, join.table));
            if !join.on_conditions.is_empty() {
                let conditions: Vec<String> = join
                    .on_conditions
                    .iter()
                    .map(|(left, right)| format!("{} = {}", left, right))
                    .collect();
                w.push(" ON ");
                w.push(&conditions.join(" AND "));
            }
        }

        // WHERE clause
        if !self.where_conditions.is_empty() {
            w.push(" WHERE ");
            for (i, condition) in self.where_conditions.iter().enumerate() {
                if i > 0 {
                    w.push(" AND ");
                }
                write_condition(condition, w);
            }
        }

        // GROUP BY clause
        if !self.group_by.is_empty() {
            w.push(&format!(" GROUP BY {}", self.group_by.join(", ")));
        }

        // ORDER BY clause
        if !self.order_by.is_empty() {
            let order_clauses: Vec<String> = self
                .order_by
                .iter()
                .map(|(column, direction)| format!("{} {}", column, direction))
                .collect();
            w.push(" ORDER BY ");
            w.push(&order_clauses.join(", "));
        }

        if let Some(limit) = self.limit_count {
            w.push(&format!(" LIMIT {}", limit));
        }

        if let Some(offset) = self.offset_value {
            w.push(&format!(" OFFSET {}", offset));
        }
    }
}

fn write_condition(condition: &Condition, w: &mut SqlWriter) {
    match condition {
        Condition::Compare {
            column,
            operator,
            value,
        } => match (operator, value) {
            (QueryOperator::Equal, SqlValue::Null) => w.push(&format!("{} IS NULL", column)),
            (QueryOperator::NotEqual, SqlValue::Null) => w.push(&format!("{} IS NOT NULL", column)),
            _ => {
                w.push(&format!("{} {} ", column, operator));
                w.push_value(value);
            }
        },
        Condition::CompareColumns {
            left,
            operator,
            right,
        } => w.push(&format!("{} {} {}", left, operator, right)),
        Condition::In {
            column,
            values,
            negated,
        } => {
            if values.is_empty() {
                // Nothing can be IN an empty set; everything is NOT IN it
                w.push(if *negated { "1 = 1" } else { "1 = 0" });
                return;
            }
            w.push(column);
            w.push(if *negated { " NOT IN (" } else { " IN (" });
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    w.push(", ");
                }
                w.push_value(value);
            }
            w.push(")");
        }
        Condition::InSubquery {
            column,
            subquery,
            negated,
        } => {
            w.push(column);
            w.push(if *negated { " NOT IN (" } else { " IN (" });
            subquery.write_select(w);
            w.push(")");
        }
        Condition::Null { column, negated } => {
            w.push(column);
            w.push(if *negated { " IS NOT NULL" } else { " IS NULL" });
        }
        Condition::Between { column, start, end } => {
            w.push(&format!("{} BETWEEN ", column));
            w.push_value(start);
            w.push(" AND ");
            w.push_value(end);
        }
        Condition::Like {
            column,
            pattern,
            negated,
        } => {
            let keyword = if *negated { "NOT LIKE" } else { "LIKE" };
            w.push(&format!("{} {} ", column, keyword));
            w.push_value(&SqlValue::Text(pattern.clone()));
        }
        Condition::Any(conditions) => write_group(conditions, " OR ", "1 = 0", w),
        Condition::All(conditions) => write_group(conditions, " AND ", "1 = 1", w),
        Condition::Not(inner) => {
            w.push("NOT (");
            write_condition(inner, w);
            w.push(")");
        }
    }
}

fn write_group(conditions: &[Condition], glue: &str, empty: &str, w: &mut SqlWriter) {
    match conditions {
        [] => w.push(empty),
        [single] => write_condition(single, w),
        _ => {
            w.push("(");
            for (i, condition) in conditions.iter().enumerate() {
                if i > 0 {
                    w.push(glue);
                }
                write_condition(condition, w);
            }
            w.push(")");
        }
    }
}
