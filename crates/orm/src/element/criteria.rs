//! Criteria shared by every element query

use crate::params::Param;
use crate::query::OrderDirection;

/// Filters and paging that apply to the `elements` table
#[derive(Debug, Clone)]
pub struct ElementCriteria {
    pub id: Option<Param>,
    pub uid: Option<Param>,
    pub date_created: Option<Param>,
    pub date_updated: Option<Param>,
    /// `Some(false)` excludes soft-deleted elements, `Some(true)` returns only
    /// those, `None` returns both
    pub trashed: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// `None` falls back to the element type's default order
    pub order_by: Option<Vec<(String, OrderDirection)>>,
    pub table_prefix: String,
}

impl Default for ElementCriteria {
    fn default() -> Self {
        Self {
            id: None,
            uid: None,
            date_created: None,
            date_updated: None,
            trashed: Some(false),
            limit: None,
            offset: None,
            order_by: None,
            table_prefix: String::new(),
        }
    }
}

impl ElementCriteria {
    /// Physical table reference aliased back to its bare name when prefixed
    pub fn table(&self, name: &str) -> String {
        if self.table_prefix.is_empty() {
            name.to_string()
        } else {
            self.table_as(name, name)
        }
    }

    /// Physical table reference under an explicit alias
    pub fn table_as(&self, name: &str, alias: &str) -> String {
        format!("{}{} {}", self.table_prefix, name, alias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_without_prefix_is_bare() {
        assert_eq!(ElementCriteria::default().table("elements"), "elements");
    }

    #[test]
    fn test_prefixed_table_keeps_bare_alias() {
        let criteria = ElementCriteria {
            table_prefix: "shop_".to_string(),
            ..ElementCriteria::default()
        };
        assert_eq!(
            criteria.table("commerce_orders"),
            "shop_commerce_orders commerce_orders"
        );
    }

    #[test]
    fn test_table_as_always_aliases() {
        let criteria = ElementCriteria::default();
        assert_eq!(
            criteria.table_as("commerce_lineitems", "lineitems"),
            "commerce_lineitems lineitems"
        );
    }

    #[test]
    fn test_trashed_elements_are_excluded_by_default() {
        assert_eq!(ElementCriteria::default().trashed, Some(false));
    }
}
