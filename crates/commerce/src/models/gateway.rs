use serde::{Deserialize, Serialize};

/// Payment gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gateway {
    pub id: i32,
    pub handle: String,
    pub name: String,
}
