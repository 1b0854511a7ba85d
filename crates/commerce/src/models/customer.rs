use serde::{Deserialize, Serialize};

/// Customer record, optionally tied to a registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i32,
    pub user_id: Option<i32>,
}
