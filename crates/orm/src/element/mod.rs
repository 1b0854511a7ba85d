//! Element query abstraction
//!
//! Every element row lives in `elements` plus one type table sharing its id.
//! A query is assembled in two layers, mirroring how element types filter:
//!
//! ```text
//! SELECT <element + type columns>
//! FROM (SELECT elements.id AS element_id
//!       FROM elements INNER JOIN <type> ON <type>.id = elements.id
//!       [extra joins] WHERE <predicates> ORDER BY .. LIMIT .. OFFSET ..) AS subquery
//! INNER JOIN elements ON elements.id = subquery.element_id
//! INNER JOIN <type> ON <type>.id = subquery.element_id
//! ORDER BY ..
//! ```
//!
//! Predicates always land on the subquery; the outer query only hydrates.

pub mod criteria;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres};

use crate::error::ModelResult;
use crate::params::{parse_date_param, parse_param, ColumnType, Param};
use crate::query::{OrderDirection, QueryBuilder};

pub use criteria::ElementCriteria;

/// Columns every element query selects from `elements`
pub const ELEMENT_COLUMNS: &[&str] = &[
    "elements.id",
    "elements.uid",
    "elements.date_created",
    "elements.date_updated",
];

/// A type stored as an element
pub trait Element: Sized + Send + Sync + Unpin {
    /// Type table name, without prefix
    fn table_name() -> &'static str;

    /// Select expressions for the type table, qualified by table name.
    /// Columns clashing with [`ELEMENT_COLUMNS`] must be aliased.
    fn columns() -> &'static [&'static str];

    /// Order applied when the caller sets none
    fn default_order_by() -> Vec<(String, OrderDirection)> {
        vec![("elements.date_created".to_string(), OrderDirection::Desc)]
    }

    /// Hydrate an element from a row of the outer query
    fn from_row(row: &PgRow) -> ModelResult<Self>;
}

/// The two queries an element query is assembled from
#[derive(Debug, Clone)]
pub struct ElementQueryParts {
    /// Outer, hydrating query
    pub query: QueryBuilder,
    /// Inner query every predicate and extra join is attached to
    pub sub_query: QueryBuilder,
    pub criteria: ElementCriteria,
}

impl ElementQueryParts {
    /// Physical table reference, see [`ElementCriteria::table`]
    pub fn table(&self, name: &str) -> String {
        self.criteria.table(name)
    }
}

/// A fully prepared element query
#[derive(Debug, Clone)]
pub struct PreparedElementQuery<E> {
    pub query: QueryBuilder<E>,
    pub sub_query: QueryBuilder,
}

/// Fluent, lazily-evaluated query over one element type.
///
/// Implementors own an [`ElementCriteria`] and add their own criteria;
/// [`ElementQuery::before_prepare`] turns the latter into predicates.
#[async_trait]
pub trait ElementQuery: Clone + Send + Sync {
    type Element: Element;

    fn criteria(&self) -> &ElementCriteria;

    fn criteria_mut(&mut self) -> &mut ElementCriteria;

    /// Attach type-specific predicates and joins to `parts.sub_query`
    fn before_prepare(&self, parts: ElementQueryParts) -> ModelResult<ElementQueryParts>;

    fn id(mut self, value: impl Into<Param>) -> Self {
        self.criteria_mut().id = Some(value.into());
        self
    }

    fn uid(mut self, value: impl Into<Param>) -> Self {
        self.criteria_mut().uid = Some(value.into());
        self
    }

    fn date_created(mut self, value: impl Into<Param>) -> Self {
        self.criteria_mut().date_created = Some(value.into());
        self
    }

    fn date_updated(mut self, value: impl Into<Param>) -> Self {
        self.criteria_mut().date_updated = Some(value.into());
        self
    }

    fn trashed(mut self, value: impl Into<Option<bool>>) -> Self {
        self.criteria_mut().trashed = value.into();
        self
    }

    fn limit(mut self, value: i64) -> Self {
        self.criteria_mut().limit = Some(value);
        self
    }

    fn offset(mut self, value: i64) -> Self {
        self.criteria_mut().offset = Some(value);
        self
    }

    /// Drop limit and offset
    fn unbounded(mut self) -> Self {
        let criteria = self.criteria_mut();
        criteria.limit = None;
        criteria.offset = None;
        self
    }

    /// Replace the ordering
    fn order_by(mut self, column: &str, direction: OrderDirection) -> Self {
        self.criteria_mut().order_by = Some(vec![(column.to_string(), direction)]);
        self
    }

    /// Append to the ordering, starting from the default one
    fn add_order_by(mut self, column: &str, direction: OrderDirection) -> Self {
        let criteria = self.criteria_mut();
        let mut terms = criteria
            .order_by
            .take()
            .unwrap_or_else(Self::Element::default_order_by);
        terms.push((column.to_string(), direction));
        criteria.order_by = Some(terms);
        self
    }

    fn table_prefix(mut self, prefix: &str) -> Self {
        self.criteria_mut().table_prefix = prefix.to_string();
        self
    }

    /// Build the SQL for this query without executing it
    fn prepare(&self) -> ModelResult<PreparedElementQuery<Self::Element>> {
        let criteria = self.criteria().clone();
        let type_table = Self::Element::table_name();
        let elements = criteria.table("elements");
        let type_join = criteria.table(type_table);
        let type_id = format!("{}.id", type_table);

        tracing::trace!(element = type_table, "preparing element query");

        let mut sub_query = QueryBuilder::new()
            .select("elements.id AS element_id")
            .from(&elements)
            .join(&type_join, &type_id, "elements.id");

        if let Some(id) = &criteria.id {
            sub_query = sub_query.and_where_opt(parse_param("elements.id", id, ColumnType::Integer)?);
        }
        if let Some(uid) = &criteria.uid {
            sub_query = sub_query.and_where_opt(parse_param("elements.uid", uid, ColumnType::Uuid)?);
        }
        if let Some(date_created) = &criteria.date_created {
            sub_query = sub_query.and_where_opt(parse_date_param("elements.date_created", date_created)?);
        }
        if let Some(date_updated) = &criteria.date_updated {
            sub_query = sub_query.and_where_opt(parse_date_param("elements.date_updated", date_updated)?);
        }
        sub_query = match criteria.trashed {
            Some(false) => sub_query.where_null("elements.date_deleted"),
            Some(true) => sub_query.where_not_null("elements.date_deleted"),
            None => sub_query,
        };

        let query = QueryBuilder::new()
            .select_columns(ELEMENT_COLUMNS)
            .select_columns(Self::Element::columns());

        let parts = self.before_prepare(ElementQueryParts {
            query,
            sub_query,
            criteria,
        })?;

        let order = parts
            .criteria
            .order_by
            .clone()
            .unwrap_or_else(Self::Element::default_order_by);

        let mut sub_query = parts.sub_query.order_by_all(&order);
        if let Some(limit) = parts.criteria.limit {
            sub_query = sub_query.limit(limit);
        }
        if let Some(offset) = parts.criteria.offset {
            sub_query = sub_query.offset(offset);
        }

        let query = parts
            .query
            .from_subquery(sub_query.clone(), "subquery")
            .join(&elements, "elements.id", "subquery.element_id")
            .join(&type_join, &type_id, "subquery.element_id")
            .order_by_all(&order)
            .cast();

        Ok(PreparedElementQuery { query, sub_query })
    }

    /// Rendered SQL with literals inlined
    fn to_sql(&self) -> ModelResult<String> {
        Ok(self.prepare()?.query.to_sql())
    }

    /// Fetch every matching element
    async fn all(&self, pool: &Pool<Postgres>) -> ModelResult<Vec<Self::Element>> {
        let prepared = self.prepare()?;
        prepared.query.get(pool).await
    }

    /// Fetch the first matching element
    async fn one(&self, pool: &Pool<Postgres>) -> ModelResult<Option<Self::Element>> {
        let prepared = self.clone().limit(1).prepare()?;
        prepared.query.first(pool).await
    }

    /// Fetch the element at zero-based position `n` of the result set
    async fn nth(&self, n: i64, pool: &Pool<Postgres>) -> ModelResult<Option<Self::Element>> {
        let criteria = self.criteria();
        if n < 0 || criteria.limit.is_some_and(|limit| n >= limit) {
            return Ok(None);
        }

        let offset = criteria.offset.unwrap_or(0) + n;
        let prepared = self.clone().offset(offset).limit(1).prepare()?;
        prepared.query.first(pool).await
    }

    /// Ids of every matching element, in query order
    async fn ids(&self, pool: &Pool<Postgres>) -> ModelResult<Vec<i32>> {
        let prepared = self.prepare()?;
        prepared.sub_query.fetch_ids(pool).await
    }

    /// Number of matching elements, honouring limit and offset
    async fn count(&self, pool: &Pool<Postgres>) -> ModelResult<i64> {
        let prepared = self.prepare()?;
        prepared.sub_query.fetch_count(pool).await
    }

    async fn exists(&self, pool: &Pool<Postgres>) -> ModelResult<bool> {
        let prepared = self.clone().limit(1).prepare()?;
        Ok(prepared.sub_query.fetch_optional_row(pool).await?.is_some())
    }
}

// Hydrating execution for element-typed builders
impl<E: Element> QueryBuilder<E> {
    /// Execute the query and hydrate every row
    pub async fn get(&self, pool: &Pool<Postgres>) -> ModelResult<Vec<E>> {
        let rows = self.fetch_rows(pool).await?;
        rows.iter().map(E::from_row).collect()
    }

    /// Execute the query and hydrate the first row
    pub async fn first(&self, pool: &Pool<Postgres>) -> ModelResult<Option<E>> {
        match self.fetch_optional_row(pool).await? {
            Some(row) => Ok(Some(E::from_row(&row)?)),
            None => Ok(None),
        }
    }
}
