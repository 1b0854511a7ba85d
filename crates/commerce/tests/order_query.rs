//! Order query assembly tests
//!
//! Everything here asserts on rendered SQL; no database is needed.

use chrono::{TimeZone, Utc};
use sqlx::postgres::PgPoolOptions;
use storefront_commerce::{
    Customer, Gateway, OrderQuery, OrderStatus, Purchasable, PurchasableRef, User,
};
use storefront_orm::{DatabaseConfig, Deprecator, ElementQuery, ModelError, SqlValue};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("storefront_commerce=trace,storefront_orm=debug")
        .with_test_writer()
        .try_init();
}

fn sub_sql(query: &OrderQuery) -> String {
    query.prepare().unwrap().sub_query.to_sql()
}

struct Variant {
    id: Option<i32>,
}

impl Purchasable for Variant {
    fn purchasable_id(&self) -> Option<i32> {
        self.id
    }
}

#[test]
fn test_default_subquery_shape() {
    init_tracing();
    assert_eq!(
        sub_sql(&OrderQuery::new()),
        "SELECT elements.id AS element_id FROM elements \
         INNER JOIN commerce_orders ON commerce_orders.id = elements.id \
         WHERE elements.date_deleted IS NULL \
         ORDER BY commerce_orders.id ASC"
    );
}

#[test]
fn test_outer_query_hydrates_order_columns() {
    let sql = OrderQuery::new().to_sql().unwrap();
    assert!(sql.starts_with("SELECT elements.id, elements.uid, elements.date_created, elements.date_updated, commerce_orders.number"));
    assert!(sql.contains("commerce_orders.date_updated AS order_date_updated"));
    assert!(sql.contains("INNER JOIN commerce_orders ON commerce_orders.id = subquery.element_id"));
    assert!(sql.ends_with("ORDER BY commerce_orders.id ASC"));
}

#[test]
fn test_number_is_exact() {
    let sql = sub_sql(&OrderQuery::new().number(Some("a1b2*")));
    assert!(sql.contains("commerce_orders.number = 'a1b2*'"));
    assert!(!sql.contains("LIKE"));
}

#[test]
fn test_email_uses_filter_syntax() {
    let sql = sub_sql(&OrderQuery::new().email("*@example.com"));
    assert!(sql.contains("commerce_orders.email LIKE '%@example.com'"));

    let sql = sub_sql(&OrderQuery::new().email("a@example.com, b@example.com"));
    assert!(sql.contains("commerce_orders.email IN ('a@example.com', 'b@example.com')"));
}

#[test]
fn test_is_completed_only_restricts_when_true() {
    let sql = sub_sql(&OrderQuery::new().is_completed(true));
    assert!(sql.contains("commerce_orders.is_completed = true"));

    let plain = sub_sql(&OrderQuery::new());
    assert_eq!(sub_sql(&OrderQuery::new().is_completed(false)), plain);
    assert_eq!(sub_sql(&OrderQuery::new().is_completed(true).is_completed(false)), plain);
}

#[test]
fn test_date_filters() {
    let sql = sub_sql(
        &OrderQuery::new()
            .date_ordered(">= 2024-01-01")
            .date_paid(":notempty:")
            .expiry_date("< 2024-06-30 12:00"),
    );
    assert!(sql.contains("commerce_orders.date_ordered >= '2024-01-01 00:00:00'"));
    assert!(sql.contains("commerce_orders.date_paid IS NOT NULL"));
    assert!(sql.contains("commerce_orders.expiry_date < '2024-06-30 12:00:00'"));
}

#[test]
fn test_date_updated_applies_to_element_and_order() {
    let sql = sub_sql(&OrderQuery::new().date_updated("> 2023-05-01"));
    assert!(sql.contains("elements.date_updated > '2023-05-01 00:00:00'"));
    assert!(sql.contains("commerce_orders.date_updated > '2023-05-01 00:00:00'"));
}

#[test]
#[allow(deprecated)]
fn test_updated_after_and_before_form_a_range() {
    init_tracing();
    let after = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let sql = sub_sql(
        &OrderQuery::new()
            .updated_after(after)
            .updated_before("2024-04-01"),
    );
    assert!(sql.contains(
        "(commerce_orders.date_updated >= '2024-03-01 12:00:00' AND commerce_orders.date_updated < '2024-04-01 00:00:00')"
    ));

    let entry = Deprecator::entry("OrderQuery::updated_after").unwrap();
    assert!(entry.count >= 1);
    assert!(Deprecator::entry("OrderQuery::updated_before").is_some());
}

#[test]
fn test_order_status_by_model_id_and_handle() {
    let shipped = OrderStatus {
        id: 3,
        handle: "shipped".to_string(),
        name: "Shipped".to_string(),
    };
    let sql = sub_sql(&OrderQuery::new().order_status(&shipped));
    assert!(sql.contains("commerce_orders.order_status_id = 3"));

    let sql = sub_sql(&OrderQuery::new().order_status_id(vec![1, 2]));
    assert!(sql.contains("commerce_orders.order_status_id IN (1, 2)"));

    let sql = sub_sql(&OrderQuery::new().order_status(vec!["new", "shipped"]));
    assert!(sql.contains(
        "commerce_orders.order_status_id IN (SELECT commerce_orderstatuses.id FROM commerce_orderstatuses \
         WHERE commerce_orderstatuses.handle IN ('new', 'shipped'))"
    ));

    let plain = sub_sql(&OrderQuery::new());
    let cleared = sub_sql(&OrderQuery::new().order_status(&shipped).order_status(None::<&OrderStatus>));
    assert_eq!(plain, cleared);
}

#[test]
fn test_zero_status_id_applies_no_filter() {
    let plain = sub_sql(&OrderQuery::new());
    assert_eq!(sub_sql(&OrderQuery::new().order_status_id(0)), plain);
    assert_eq!(sub_sql(&OrderQuery::new().order_status_id("0")), plain);
}

#[test]
fn test_customer_and_user() {
    let customer = Customer { id: 11, user_id: None };
    let sql = sub_sql(&OrderQuery::new().customer(Some(&customer)));
    assert!(sql.contains("commerce_orders.customer_id = 11"));

    let sql = sub_sql(&OrderQuery::new().customer_id("not 4"));
    assert!(sql.contains("commerce_orders.customer_id != 4"));

    let user = User { id: 8 };
    let sql = sub_sql(&OrderQuery::new().user(&user));
    assert!(sql.contains(
        "commerce_orders.customer_id IN (SELECT commerce_customers.id FROM commerce_customers \
         WHERE commerce_customers.user_id = 8)"
    ));

    let plain = sub_sql(&OrderQuery::new());
    assert_eq!(sub_sql(&OrderQuery::new().user(&user).user(None::<&User>)), plain);
}

#[test]
fn test_zero_customer_id_applies_no_filter() {
    let plain = sub_sql(&OrderQuery::new());
    assert_eq!(sub_sql(&OrderQuery::new().customer_id("0")), plain);
    assert_eq!(sub_sql(&OrderQuery::new().customer_id(0)), plain);
}

#[test]
fn test_gateway() {
    let gateway = Gateway {
        id: 2,
        handle: "stripe".to_string(),
        name: "Stripe".to_string(),
    };
    let sql = sub_sql(&OrderQuery::new().gateway(Some(&gateway)));
    assert!(sql.contains("commerce_orders.gateway_id = 2"));

    let sql = sub_sql(&OrderQuery::new().gateway_id(":empty:"));
    assert!(sql.contains("commerce_orders.gateway_id IS NULL"));

    let plain = sub_sql(&OrderQuery::new());
    assert_eq!(sub_sql(&OrderQuery::new().gateway(Some(&gateway)).gateway(None)), plain);
}

#[test]
fn test_zero_gateway_id_applies_no_filter() {
    let plain = sub_sql(&OrderQuery::new());
    assert_eq!(sub_sql(&OrderQuery::new().gateway_id(0)), plain);
    assert_eq!(sub_sql(&OrderQuery::new().gateway_id(" 0 ")), plain);
}

#[test]
fn test_paid_and_unpaid_compare_columns() {
    let sql = sub_sql(&OrderQuery::new().is_paid(true));
    assert!(sql.contains("commerce_orders.total_paid >= commerce_orders.total_price"));

    let sql = sub_sql(&OrderQuery::new().is_unpaid(true));
    assert!(sql.contains("commerce_orders.total_paid < commerce_orders.total_price"));

    let sql = sub_sql(&OrderQuery::new().is_paid(false).is_unpaid(false));
    assert!(!sql.contains("total_paid"));
}

#[test]
fn test_paid_and_unpaid_together_keep_both_predicates() {
    let sql = sub_sql(&OrderQuery::new().is_paid(true).is_unpaid(true));
    assert!(sql.contains(
        "commerce_orders.total_paid >= commerce_orders.total_price \
         AND commerce_orders.total_paid < commerce_orders.total_price"
    ));
}

#[test]
fn test_has_purchasables_joins_line_items() {
    let variant = Variant { id: Some(5) };
    let sql = sub_sql(&OrderQuery::new().has_purchasables([
        variant.purchasable_ref(),
        PurchasableRef::from("7"),
        PurchasableRef::from("gift-card"),
        PurchasableRef::from(0),
    ]));
    assert!(sql.contains("INNER JOIN commerce_lineitems lineitems ON lineitems.order_id = commerce_orders.id"));
    assert!(sql.contains("lineitems.purchasable_id IN (5, 7)"));
    assert_eq!(sql.matches("commerce_lineitems").count(), 1);
}

#[test]
fn test_purchasable_join_yields_one_row_per_order() {
    let sql = sub_sql(&OrderQuery::new().has_purchasables([5, 7]));
    assert!(sql.ends_with(
        "lineitems.purchasable_id IN (5, 7) \
         GROUP BY elements.id, commerce_orders.id \
         ORDER BY commerce_orders.id ASC"
    ));

    let plain = sub_sql(&OrderQuery::new());
    assert!(!plain.contains("GROUP BY"));
}

#[test]
fn test_purchasables_accept_model_references() {
    let shirt = Variant { id: Some(5) };
    let mug = Variant { id: Some(6) };
    let sql = sub_sql(&OrderQuery::new().has_purchasables([&shirt, &mug]));
    assert!(sql.contains("lineitems.purchasable_id IN (5, 6)"));

    let sql = sub_sql(&OrderQuery::new().has_purchasables(vec![&shirt]).has_purchasables(vec![&mug]));
    assert!(sql.contains("lineitems.purchasable_id IN (6)"));
    assert!(!sql.contains("IN (5"));
}

#[test]
fn test_blank_purchasables_match_nothing() {
    let unsaved = Variant { id: None };
    let sql = sub_sql(&OrderQuery::new().has_purchasables([unsaved.purchasable_ref()]));
    assert!(sql.contains("INNER JOIN commerce_lineitems lineitems"));
    assert!(sql.contains("1 = 0"));
}

#[test]
fn test_empty_purchasables_apply_no_filter() {
    let plain = sub_sql(&OrderQuery::new());
    let sql = sub_sql(&OrderQuery::new().has_purchasables(Vec::<PurchasableRef>::new()));
    assert_eq!(sql, plain);
}

#[test]
fn test_table_prefix_from_config() {
    let config = DatabaseConfig::new("postgres://localhost/shop").with_table_prefix("shop_");
    let sql = sub_sql(
        &OrderQuery::with_config(&config)
            .order_status("shipped")
            .has_purchasables([3]),
    );
    assert!(sql.contains("FROM shop_elements elements"));
    assert!(sql.contains("INNER JOIN shop_commerce_orders commerce_orders ON commerce_orders.id = elements.id"));
    assert!(sql.contains("FROM shop_commerce_orderstatuses commerce_orderstatuses"));
    assert!(sql.contains("INNER JOIN shop_commerce_lineitems lineitems"));
}

#[test]
fn test_placeholders_number_through_subqueries() {
    let prepared = OrderQuery::new()
        .order_status("shipped")
        .user(4)
        .limit(10)
        .prepare()
        .unwrap();
    let (sql, params) = prepared.query.to_sql_with_params();

    assert!(sql.contains("commerce_orderstatuses.handle = $1"));
    assert!(sql.contains("commerce_customers.user_id = $2"));
    assert_eq!(
        params,
        vec![SqlValue::Text("shipped".to_string()), SqlValue::Int(4)]
    );
}

#[test]
fn test_limit_and_order_stay_on_the_subquery() {
    let prepared = OrderQuery::new()
        .order_by("commerce_orders.date_ordered", storefront_orm::OrderDirection::Desc)
        .limit(20)
        .offset(40)
        .prepare()
        .unwrap();
    assert!(prepared
        .sub_query
        .to_sql()
        .ends_with("ORDER BY commerce_orders.date_ordered DESC LIMIT 20 OFFSET 40"));
    assert!(prepared.query.to_sql().ends_with("ORDER BY commerce_orders.date_ordered DESC"));
}

#[test]
fn test_filters_combine_with_and() {
    let sql = sub_sql(
        &OrderQuery::new()
            .is_completed(true)
            .email("buyer@example.com")
            .gateway_id(1),
    );
    assert!(sql.contains(
        "WHERE elements.date_deleted IS NULL AND commerce_orders.email = 'buyer@example.com' \
         AND commerce_orders.is_completed = true AND commerce_orders.gateway_id = 1"
    ));
}

#[tokio::test]
async fn test_invalid_filter_fails_before_touching_the_database() {
    init_tracing();
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/storefront_test")
        .unwrap();

    let result = OrderQuery::new().order_status_id("shipped").all(&pool).await;
    assert!(matches!(result, Err(ModelError::Param(_))));
}

#[tokio::test]
async fn test_nth_outside_the_limit_is_none() {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/storefront_test")
        .unwrap();

    let query = OrderQuery::new().limit(2);
    assert!(query.nth(2, &pool).await.unwrap().is_none());
    assert!(query.nth(-1, &pool).await.unwrap().is_none());
}
