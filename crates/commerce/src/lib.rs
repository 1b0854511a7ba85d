//! # storefront-commerce
//!
//! Commerce order elements on top of `storefront-orm`, and [`OrderQuery`],
//! the fluent filter builder used to find them.
//!
//! ```no_run
//! use storefront_commerce::OrderQuery;
//! use storefront_orm::ElementQuery;
//!
//! # async fn run(pool: &sqlx::PgPool) -> storefront_orm::ModelResult<()> {
//! let recent = OrderQuery::new()
//!     .is_completed(true)
//!     .email("*@example.com")
//!     .date_ordered(">= 2024-01-01")
//!     .limit(20)
//!     .all(pool)
//!     .await?;
//! # let _ = recent;
//! # Ok(())
//! # }
//! ```

pub mod models;
pub mod query;

pub use models::{
    Customer, Gateway, Order, OrderStatus, Purchasable, PurchasableRef, User,
};
pub use query::{OrderQuery, OrderStatusRef, UserRef};
