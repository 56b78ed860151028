//! Sweet model
//!
//! Defines the Sweet catalog entity and the input types used by the
//! catalog operations (create, partial update, filtered search).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sweet entity representing one sellable catalog item.
///
/// Invariants: `price` is non-negative and `quantity` never goes below
/// zero. Both are enforced at the service layer on create/update, and the
/// quantity floor additionally at the storage layer for purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sweet {
    /// Unique identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// Category label (e.g. "Indian", "Chocolate")
    pub category: String,
    /// Unit price
    pub price: f64,
    /// Units in stock
    pub quantity: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new sweet
#[derive(Debug, Clone, Deserialize)]
pub struct SweetInput {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub quantity: i64,
}

/// Input for a partial update of a sweet
///
/// Unspecified fields are left untouched. An update with every field
/// absent is rejected by the catalog service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SweetUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
}

impl SweetUpdate {
    /// Whether the update carries no fields at all
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.quantity.is_none()
    }
}

/// Search filters for the catalog
///
/// Name and category are case-insensitive substring matches; price bounds
/// are inclusive. All present filters are ANDed; absent filters match
/// everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SweetFilter {
    pub name: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl SweetFilter {
    /// Whether no filter is set (the search degenerates to a full list)
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweet_update_is_empty() {
        assert!(SweetUpdate::default().is_empty());

        let update = SweetUpdate {
            price: Some(12.5),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_sweet_filter_is_empty() {
        assert!(SweetFilter::default().is_empty());

        let filter = SweetFilter {
            category: Some("Indian".to_string()),
            ..Default::default()
        };
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_sweet_update_deserializes_partial_payload() {
        let update: SweetUpdate = serde_json::from_str(r#"{"price": 9.5}"#).unwrap();

        assert_eq!(update.price, Some(9.5));
        assert!(update.name.is_none());
        assert!(update.category.is_none());
        assert!(update.quantity.is_none());
    }

    #[test]
    fn test_sweet_filter_deserializes_from_query_shape() {
        let filter: SweetFilter =
            serde_json::from_str(r#"{"name": "ladoo", "min_price": 5.0, "max_price": 10.0}"#)
                .unwrap();

        assert_eq!(filter.name.as_deref(), Some("ladoo"));
        assert_eq!(filter.min_price, Some(5.0));
        assert_eq!(filter.max_price, Some(10.0));
        assert!(filter.category.is_none());
    }
}
