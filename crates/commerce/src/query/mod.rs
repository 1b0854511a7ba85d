pub mod order_query;

pub use order_query::{OrderQuery, OrderStatusRef, UserRef};
