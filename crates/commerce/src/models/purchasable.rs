//! Things that can be bought and appear as order line items

/// A product-like element that can be added to an order
pub trait Purchasable {
    /// Element id, `None` while unsaved
    fn purchasable_id(&self) -> Option<i32>;

    fn purchasable_ref(&self) -> PurchasableRef {
        PurchasableRef::Id(self.purchasable_id())
    }
}

/// A purchasable given by model or by a raw, possibly untrusted, value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchasableRef {
    Id(Option<i32>),
    Raw(String),
}

impl PurchasableRef {
    /// Usable id, if any.
    ///
    /// Raw values must be numeric; zero and missing ids count as blank.
    pub fn resolve(&self) -> Option<i32> {
        let id = match self {
            PurchasableRef::Id(id) => *id,
            PurchasableRef::Raw(raw) => raw.trim().parse::<i32>().ok(),
        };
        id.filter(|id| *id != 0)
    }
}

impl From<i32> for PurchasableRef {
    fn from(id: i32) -> Self {
        PurchasableRef::Id(Some(id))
    }
}

impl From<i64> for PurchasableRef {
    fn from(id: i64) -> Self {
        PurchasableRef::Id(i32::try_from(id).ok())
    }
}

impl From<Option<i32>> for PurchasableRef {
    fn from(id: Option<i32>) -> Self {
        PurchasableRef::Id(id)
    }
}

impl<P: Purchasable> From<&P> for PurchasableRef {
    fn from(purchasable: &P) -> Self {
        purchasable.purchasable_ref()
    }
}

impl From<&str> for PurchasableRef {
    fn from(raw: &str) -> Self {
        PurchasableRef::Raw(raw.to_string())
    }
}

impl From<String> for PurchasableRef {
    fn from(raw: String) -> Self {
        PurchasableRef::Raw(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Variant {
        id: Option<i32>,
    }

    impl Purchasable for Variant {
        fn purchasable_id(&self) -> Option<i32> {
            self.id
        }
    }

    #[test]
    fn test_models_resolve_to_their_id() {
        assert_eq!(Variant { id: Some(12) }.purchasable_ref().resolve(), Some(12));
        assert_eq!(Variant { id: None }.purchasable_ref().resolve(), None);
    }

    #[test]
    fn test_model_references_convert() {
        let saved = Variant { id: Some(4) };
        let unsaved = Variant { id: None };
        assert_eq!(PurchasableRef::from(&saved), PurchasableRef::Id(Some(4)));
        assert_eq!(PurchasableRef::from(&unsaved).resolve(), None);
    }

    #[test]
    fn test_raw_values_must_be_numeric() {
        assert_eq!(PurchasableRef::from(" 7 ").resolve(), Some(7));
        assert_eq!(PurchasableRef::from("t-shirt").resolve(), None);
        assert_eq!(PurchasableRef::from("1.5").resolve(), None);
    }

    #[test]
    fn test_zero_is_blank() {
        assert_eq!(PurchasableRef::from(0).resolve(), None);
        assert_eq!(PurchasableRef::from("0").resolve(), None);
    }

    #[test]
    fn test_out_of_range_ids_are_blank() {
        assert_eq!(PurchasableRef::from(i64::MAX).resolve(), None);
    }
}
