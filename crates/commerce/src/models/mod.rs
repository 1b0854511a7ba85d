//! Order element and the records order filters refer to

pub mod customer;
pub mod gateway;
pub mod order;
pub mod order_status;
pub mod purchasable;
pub mod user;

pub use customer::Customer;
pub use gateway::Gateway;
pub use order::Order;
pub use order_status::OrderStatus;
pub use purchasable::{Purchasable, PurchasableRef};
pub use user::User;
