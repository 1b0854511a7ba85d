//! Fluent order query
//!
//! Criteria are only stored by the setters. They become predicates on the
//! element subquery in [`ElementQuery::before_prepare`], so a query can be
//! built up, cloned and refined before anything touches the database.

use async_trait::async_trait;
use storefront_orm::{
    format_w3c, parse_column_comparison, parse_date_param, parse_param, ColumnType, DatabaseConfig,
    Deprecator, ElementCriteria, ElementQuery, ElementQueryParts, ModelResult, Param, QueryBuilder,
};

use crate::models::{Customer, Gateway, Order, OrderStatus, PurchasableRef, User};

/// Which statuses an order must be in
#[derive(Debug, Clone, PartialEq)]
pub enum OrderStatusRef {
    Id(i32),
    /// One or more status handles, in filter syntax
    Handle(Param),
    /// No restriction
    Any,
}

impl From<&OrderStatus> for OrderStatusRef {
    fn from(status: &OrderStatus) -> Self {
        OrderStatusRef::Id(status.id)
    }
}

impl From<Option<&OrderStatus>> for OrderStatusRef {
    fn from(status: Option<&OrderStatus>) -> Self {
        status.map_or(OrderStatusRef::Any, OrderStatusRef::from)
    }
}

impl From<&str> for OrderStatusRef {
    fn from(handle: &str) -> Self {
        OrderStatusRef::Handle(Param::from(handle))
    }
}

impl From<String> for OrderStatusRef {
    fn from(handle: String) -> Self {
        OrderStatusRef::Handle(Param::from(handle))
    }
}

impl From<Vec<&str>> for OrderStatusRef {
    fn from(handles: Vec<&str>) -> Self {
        OrderStatusRef::Handle(Param::from(handles))
    }
}

/// Which user the order's customer must belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRef {
    Id(i32),
    Any,
}

impl From<&User> for UserRef {
    fn from(user: &User) -> Self {
        UserRef::Id(user.id)
    }
}

impl From<Option<&User>> for UserRef {
    fn from(user: Option<&User>) -> Self {
        user.map_or(UserRef::Any, UserRef::from)
    }
}

impl From<i32> for UserRef {
    fn from(id: i32) -> Self {
        UserRef::Id(id)
    }
}

impl From<Option<i32>> for UserRef {
    fn from(id: Option<i32>) -> Self {
        id.map_or(UserRef::Any, UserRef::Id)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum StatusFilter {
    Ids(Param),
    Handles(Param),
}

#[derive(Debug, Clone, PartialEq)]
enum CustomerFilter {
    Ids(Param),
    User(i32),
}

/// Query over [`Order`] elements
#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
    criteria: ElementCriteria,
    number: Option<String>,
    email: Option<Param>,
    is_completed: bool,
    date_ordered: Option<Param>,
    date_paid: Option<Param>,
    expiry_date: Option<Param>,
    order_status: Option<StatusFilter>,
    customer: Option<CustomerFilter>,
    gateway_id: Option<Param>,
    is_paid: bool,
    is_unpaid: bool,
    has_purchasables: Option<Vec<PurchasableRef>>,
}

impl OrderQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query using the table prefix of `config`
    pub fn with_config(config: &DatabaseConfig) -> Self {
        Self::new().table_prefix(&config.table_prefix)
    }

    /// Exact order number; `None` or an empty number clears the filter
    pub fn number(mut self, value: Option<&str>) -> Self {
        self.number = value.filter(|number| !number.is_empty()).map(str::to_string);
        self
    }

    pub fn email(mut self, value: impl Into<Param>) -> Self {
        self.email = Some(value.into());
        self
    }

    /// Only completed orders; `false` lifts the restriction and still
    /// includes carts
    pub fn is_completed(mut self, value: bool) -> Self {
        self.is_completed = value;
        self
    }

    pub fn date_ordered(mut self, value: impl Into<Param>) -> Self {
        self.date_ordered = Some(value.into());
        self
    }

    pub fn date_paid(mut self, value: impl Into<Param>) -> Self {
        self.date_paid = Some(value.into());
        self
    }

    pub fn expiry_date(mut self, value: impl Into<Param>) -> Self {
        self.expiry_date = Some(value.into());
        self
    }

    /// Orders updated at or after `value`
    #[deprecated(note = "use `date_updated` with a `>=` bound")]
    pub fn updated_after(mut self, value: impl Into<Param>) -> Self {
        Deprecator::log(
            "OrderQuery::updated_after",
            "OrderQuery::updated_after is deprecated. Use date_updated() instead.",
        );
        self.push_date_updated_bound(">=", value.into());
        self
    }

    /// Orders updated before `value`
    #[deprecated(note = "use `date_updated` with a `<` bound")]
    pub fn updated_before(mut self, value: impl Into<Param>) -> Self {
        Deprecator::log(
            "OrderQuery::updated_before",
            "OrderQuery::updated_before is deprecated. Use date_updated() instead.",
        );
        self.push_date_updated_bound("<", value.into());
        self
    }

    pub fn order_status(mut self, value: impl Into<OrderStatusRef>) -> Self {
        self.order_status = match value.into() {
            OrderStatusRef::Id(id) => Some(StatusFilter::Ids(Param::from(id))),
            OrderStatusRef::Handle(handles) if !handles.is_blank() => {
                Some(StatusFilter::Handles(handles))
            }
            OrderStatusRef::Handle(_) | OrderStatusRef::Any => None,
        };
        self
    }

    pub fn order_status_id(mut self, value: impl Into<Param>) -> Self {
        self.order_status = Some(StatusFilter::Ids(value.into()));
        self
    }

    pub fn customer(mut self, value: Option<&Customer>) -> Self {
        self.customer = value.map(|customer| CustomerFilter::Ids(Param::from(customer.id)));
        self
    }

    pub fn customer_id(mut self, value: impl Into<Param>) -> Self {
        self.customer = Some(CustomerFilter::Ids(value.into()));
        self
    }

    /// Orders whose customer belongs to the given user
    pub fn user(mut self, value: impl Into<UserRef>) -> Self {
        self.customer = match value.into() {
            UserRef::Id(id) => Some(CustomerFilter::User(id)),
            UserRef::Any => None,
        };
        self
    }

    pub fn gateway(mut self, value: Option<&Gateway>) -> Self {
        self.gateway_id = value.map(|gateway| Param::from(gateway.id));
        self
    }

    pub fn gateway_id(mut self, value: impl Into<Param>) -> Self {
        self.gateway_id = Some(value.into());
        self
    }

    /// Only orders paid in full
    pub fn is_paid(mut self, value: bool) -> Self {
        self.is_paid = value;
        self
    }

    /// Only orders with an outstanding balance
    pub fn is_unpaid(mut self, value: bool) -> Self {
        self.is_unpaid = value;
        self
    }

    /// Orders with a line item for any of `purchasables`.
    ///
    /// An empty list removes the filter.
    pub fn has_purchasables<I>(mut self, purchasables: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<PurchasableRef>,
    {
        let refs: Vec<PurchasableRef> = purchasables.into_iter().map(Into::into).collect();
        self.has_purchasables = if refs.is_empty() { None } else { Some(refs) };
        self
    }

    // Appended bounds intersect with whatever was already set
    fn push_date_updated_bound(&mut self, operator: &str, value: Param) {
        let operand = match value {
            Param::DateTime(date) => format_w3c(&date),
            Param::Text(text) if !text.trim().is_empty() => text.trim().to_string(),
            Param::Int(timestamp) => timestamp.to_string(),
            _ => return,
        };

        let mut items = self
            .criteria
            .date_updated
            .take()
            .map(Param::into_list)
            .unwrap_or_default();
        let has_glue = matches!(
            items.first(),
            Some(Param::Text(glue)) if glue.eq_ignore_ascii_case("and") || glue.eq_ignore_ascii_case("or")
        );
        if !has_glue {
            items.insert(0, Param::from("and"));
        }
        items.push(Param::Text(format!("{}{}", operator, operand)));
        self.criteria.date_updated = Some(Param::List(items));
    }
}

#[async_trait]
impl ElementQuery for OrderQuery {
    type Element = Order;

    fn criteria(&self) -> &ElementCriteria {
        &self.criteria
    }

    fn criteria_mut(&mut self) -> &mut ElementCriteria {
        &mut self.criteria
    }

    fn before_prepare(&self, mut parts: ElementQueryParts) -> ModelResult<ElementQueryParts> {
        let mut sub_query = parts.sub_query;

        if let Some(number) = &self.number {
            tracing::trace!(filter = "number", "attaching order predicate");
            sub_query = sub_query.where_eq("commerce_orders.number", number.as_str());
        }

        if let Some(email) = &self.email {
            tracing::trace!(filter = "email", "attaching order predicate");
            sub_query =
                sub_query.and_where_opt(parse_param("commerce_orders.email", email, ColumnType::Text)?);
        }

        if self.is_completed {
            tracing::trace!(filter = "is_completed", "attaching order predicate");
            sub_query = sub_query.where_eq("commerce_orders.is_completed", true);
        }

        let dates = [
            ("commerce_orders.date_ordered", &self.date_ordered),
            ("commerce_orders.date_paid", &self.date_paid),
            ("commerce_orders.expiry_date", &self.expiry_date),
            ("commerce_orders.date_updated", &parts.criteria.date_updated),
        ];
        for (column, value) in dates {
            if let Some(value) = value {
                tracing::trace!(filter = column, "attaching order predicate");
                sub_query = sub_query.and_where_opt(parse_date_param(column, value)?);
            }
        }

        match &self.order_status {
            Some(StatusFilter::Ids(ids)) if !ids.is_falsy() => {
                tracing::trace!(filter = "order_status_id", "attaching order predicate");
                sub_query = sub_query.and_where_opt(parse_param(
                    "commerce_orders.order_status_id",
                    ids,
                    ColumnType::Integer,
                )?);
            }
            Some(StatusFilter::Handles(handles)) => {
                tracing::trace!(filter = "order_status", "attaching order predicate");
                let statuses = QueryBuilder::<()>::new()
                    .select("commerce_orderstatuses.id")
                    .from(&parts.criteria.table("commerce_orderstatuses"))
                    .and_where_opt(parse_param(
                        "commerce_orderstatuses.handle",
                        handles,
                        ColumnType::Text,
                    )?);
                sub_query = sub_query.where_in_subquery("commerce_orders.order_status_id", statuses);
            }
            Some(StatusFilter::Ids(_)) | None => {}
        }

        match &self.customer {
            Some(CustomerFilter::Ids(ids)) if !ids.is_falsy() => {
                tracing::trace!(filter = "customer_id", "attaching order predicate");
                sub_query = sub_query.and_where_opt(parse_param(
                    "commerce_orders.customer_id",
                    ids,
                    ColumnType::Integer,
                )?);
            }
            Some(CustomerFilter::User(user_id)) => {
                tracing::trace!(filter = "user", user_id, "attaching order predicate");
                let customers = QueryBuilder::<()>::new()
                    .select("commerce_customers.id")
                    .from(&parts.criteria.table("commerce_customers"))
                    .where_eq("commerce_customers.user_id", *user_id);
                sub_query = sub_query.where_in_subquery("commerce_orders.customer_id", customers);
            }
            Some(CustomerFilter::Ids(_)) | None => {}
        }

        if let Some(gateway_id) = self.gateway_id.as_ref().filter(|ids| !ids.is_falsy()) {
            tracing::trace!(filter = "gateway_id", "attaching order predicate");
            sub_query = sub_query.and_where_opt(parse_param(
                "commerce_orders.gateway_id",
                gateway_id,
                ColumnType::Integer,
            )?);
        }

        if self.is_paid {
            tracing::trace!(filter = "is_paid", "attaching order predicate");
            sub_query = sub_query.and_where(parse_column_comparison(
                "commerce_orders.total_paid",
                ">= commerce_orders.total_price",
            )?);
        }

        if self.is_unpaid {
            tracing::trace!(filter = "is_unpaid", "attaching order predicate");
            sub_query = sub_query.and_where(parse_column_comparison(
                "commerce_orders.total_paid",
                "< commerce_orders.total_price",
            )?);
        }

        if let Some(purchasables) = &self.has_purchasables {
            let ids: Vec<i64> = purchasables
                .iter()
                .filter_map(PurchasableRef::resolve)
                .map(i64::from)
                .collect();
            tracing::trace!(filter = "has_purchasables", ids = ids.len(), "attaching order predicate");

            // Blank-only lists still join and match nothing. Grouping keeps
            // one row per order when several line items match.
            sub_query = sub_query
                .join(
                    &parts.criteria.table_as("commerce_lineitems", "lineitems"),
                    "lineitems.order_id",
                    "commerce_orders.id",
                )
                .where_in("lineitems.purchasable_id", ids)
                .group_by("elements.id")
                .group_by("commerce_orders.id");
        }

        parts.sub_query = sub_query;
        Ok(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_orm::ModelError;

    fn sub_sql(query: &OrderQuery) -> String {
        query.prepare().unwrap().sub_query.to_sql()
    }

    #[test]
    fn test_setting_a_filter_again_replaces_it() {
        let sql = sub_sql(&OrderQuery::new().email("a@example.com").email("b@example.com"));
        assert!(sql.contains("commerce_orders.email = 'b@example.com'"));
        assert!(!sql.contains("a@example.com"));
    }

    #[test]
    fn test_empty_number_is_ignored() {
        let plain = sub_sql(&OrderQuery::new());
        assert_eq!(sub_sql(&OrderQuery::new().number(Some(""))), plain);
        assert_eq!(sub_sql(&OrderQuery::new().number(Some("abc")).number(None)), plain);
    }

    #[test]
    fn test_status_id_and_handle_share_one_slot() {
        let sql = sub_sql(&OrderQuery::new().order_status("shipped").order_status_id(4));
        assert!(sql.contains("commerce_orders.order_status_id = 4"));
        assert!(!sql.contains("commerce_orderstatuses"));
    }

    #[test]
    fn test_blank_status_handle_clears() {
        let plain = sub_sql(&OrderQuery::new());
        assert_eq!(sub_sql(&OrderQuery::new().order_status_id(3).order_status("")), plain);
    }

    #[test]
    fn test_user_replaces_customer() {
        let customer = Customer { id: 9, user_id: Some(2) };
        let sql = sub_sql(&OrderQuery::new().customer(Some(&customer)).user(2));
        assert!(sql.contains("commerce_orders.customer_id IN (SELECT commerce_customers.id"));
        assert!(!sql.contains("commerce_orders.customer_id = 9"));
    }

    #[test]
    #[allow(deprecated)]
    fn test_updated_bounds_intersect() {
        let query = OrderQuery::new()
            .updated_after("2024-01-01")
            .updated_before("2024-02-01");
        assert_eq!(
            query.criteria().date_updated,
            Some(Param::List(vec![
                Param::from("and"),
                Param::from(">=2024-01-01"),
                Param::from("<2024-02-01"),
            ]))
        );
    }

    #[test]
    #[allow(deprecated)]
    fn test_blank_updated_bound_is_ignored() {
        let query = OrderQuery::new().updated_after("");
        assert_eq!(query.criteria().date_updated, None);
    }

    #[test]
    #[allow(deprecated)]
    fn test_updated_bound_keeps_existing_glue() {
        let query = OrderQuery::new()
            .date_updated(vec!["or", "2024-01-05", "2024-01-06"])
            .updated_after("2024-01-01");
        assert_eq!(
            query.criteria().date_updated,
            Some(Param::List(vec![
                Param::from("or"),
                Param::from("2024-01-05"),
                Param::from("2024-01-06"),
                Param::from(">=2024-01-01"),
            ]))
        );

        let query = OrderQuery::new()
            .date_updated(vec!["2024-01-05", "2024-01-06"])
            .updated_before("2024-02-01");
        assert_eq!(
            query.criteria().date_updated,
            Some(Param::List(vec![
                Param::from("and"),
                Param::from("2024-01-05"),
                Param::from("2024-01-06"),
                Param::from("<2024-02-01"),
            ]))
        );
    }

    #[test]
    fn test_second_purchasable_list_replaces_first() {
        let sql = sub_sql(&OrderQuery::new().has_purchasables([1, 2]).has_purchasables([9]));
        assert!(sql.contains("lineitems.purchasable_id IN (9)"));
        assert!(!sql.contains("IN (1, 2)"));
        assert_eq!(sql.matches("commerce_lineitems").count(), 1);
    }

    #[test]
    fn test_unparseable_date_fails_prepare() {
        let result = OrderQuery::new().date_paid(">= last tuesday").prepare();
        assert!(matches!(result, Err(ModelError::Param(_))));
    }
}
