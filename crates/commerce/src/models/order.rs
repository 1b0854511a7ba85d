//! Order element

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::Row;
use storefront_orm::{Element, ModelResult, OrderDirection};
use uuid::Uuid;

/// A cart or completed order, hydrated from `elements` + `commerce_orders`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i32,
    pub uid: Uuid,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
    pub number: String,
    pub coupon_code: Option<String>,
    pub order_status_id: Option<i32>,
    pub date_ordered: Option<DateTime<Utc>>,
    pub email: Option<String>,
    pub is_completed: bool,
    pub date_paid: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub currency: Option<String>,
    pub payment_currency: Option<String>,
    pub last_ip: Option<String>,
    pub order_language: Option<String>,
    pub message: Option<String>,
    pub return_url: Option<String>,
    pub cancel_url: Option<String>,
    pub billing_address_id: Option<i32>,
    pub shipping_address_id: Option<i32>,
    pub shipping_method_handle: Option<String>,
    pub gateway_id: Option<i32>,
    pub payment_source_id: Option<i32>,
    pub customer_id: Option<i32>,
    /// Last change to the order row itself, as opposed to the element
    pub order_date_updated: Option<DateTime<Utc>>,
}

// Timestamps are stored without zone and are always UTC
fn utc(row: &PgRow, column: &str) -> ModelResult<DateTime<Utc>> {
    let value: NaiveDateTime = row.try_get(column)?;
    Ok(value.and_utc())
}

fn utc_opt(row: &PgRow, column: &str) -> ModelResult<Option<DateTime<Utc>>> {
    let value: Option<NaiveDateTime> = row.try_get(column)?;
    Ok(value.map(|value| value.and_utc()))
}

impl Element for Order {
    fn table_name() -> &'static str {
        "commerce_orders"
    }

    fn columns() -> &'static [&'static str] {
        &[
            "commerce_orders.number",
            "commerce_orders.coupon_code",
            "commerce_orders.order_status_id",
            "commerce_orders.date_ordered",
            "commerce_orders.email",
            "commerce_orders.is_completed",
            "commerce_orders.date_paid",
            "commerce_orders.expiry_date",
            "commerce_orders.currency",
            "commerce_orders.payment_currency",
            "commerce_orders.last_ip",
            "commerce_orders.order_language",
            "commerce_orders.message",
            "commerce_orders.return_url",
            "commerce_orders.cancel_url",
            "commerce_orders.billing_address_id",
            "commerce_orders.shipping_address_id",
            "commerce_orders.shipping_method_handle",
            "commerce_orders.gateway_id",
            "commerce_orders.payment_source_id",
            "commerce_orders.customer_id",
            "commerce_orders.date_updated AS order_date_updated",
        ]
    }

    fn default_order_by() -> Vec<(String, OrderDirection)> {
        vec![("commerce_orders.id".to_string(), OrderDirection::Asc)]
    }

    fn from_row(row: &PgRow) -> ModelResult<Self> {
        Ok(Order {
            id: row.try_get("id")?,
            uid: row.try_get("uid")?,
            date_created: utc(row, "date_created")?,
            date_updated: utc(row, "date_updated")?,
            number: row.try_get("number")?,
            coupon_code: row.try_get("coupon_code")?,
            order_status_id: row.try_get("order_status_id")?,
            date_ordered: utc_opt(row, "date_ordered")?,
            email: row.try_get("email")?,
            is_completed: row.try_get("is_completed")?,
            date_paid: utc_opt(row, "date_paid")?,
            expiry_date: utc_opt(row, "expiry_date")?,
            currency: row.try_get("currency")?,
            payment_currency: row.try_get("payment_currency")?,
            last_ip: row.try_get("last_ip")?,
            order_language: row.try_get("order_language")?,
            message: row.try_get("message")?,
            return_url: row.try_get("return_url")?,
            cancel_url: row.try_get("cancel_url")?,
            billing_address_id: row.try_get("billing_address_id")?,
            shipping_address_id: row.try_get("shipping_address_id")?,
            shipping_method_handle: row.try_get("shipping_method_handle")?,
            gateway_id: row.try_get("gateway_id")?,
            payment_source_id: row.try_get("payment_source_id")?,
            customer_id: row.try_get("customer_id")?,
            order_date_updated: utc_opt(row, "order_date_updated")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_orm::ELEMENT_COLUMNS;

    #[test]
    fn test_columns_do_not_clash_with_element_columns() {
        for column in Order::columns() {
            let name = column.rsplit(|c: char| c == ' ' || c == '.').next().unwrap_or(column);
            let clashes = ELEMENT_COLUMNS
                .iter()
                .any(|element_column| element_column.ends_with(&format!(".{}", name)));
            assert!(!clashes, "{} clashes with an element column", column);
        }
    }

    #[test]
    fn test_default_order_is_by_id() {
        assert_eq!(
            Order::default_order_by(),
            vec![("commerce_orders.id".to_string(), OrderDirection::Asc)]
        );
    }
}
