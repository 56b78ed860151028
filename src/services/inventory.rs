//! Inventory service
//!
//! The stock mutation core: purchase (decrement by one) and restock
//! (increment by a positive amount) over a single sweet record. Both lean
//! on the repository's atomic UPDATE primitives, so concurrent mutations
//! of the same record cannot lose updates and stock cannot go negative.

use crate::db::repositories::SweetRepository;
use crate::models::Sweet;
use anyhow::Context;
use std::sync::Arc;

/// Error types for inventory operations
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    /// Referenced sweet doesn't exist
    #[error("Sweet not found")]
    NotFound,

    /// Purchase attempted on a sweet with zero stock
    #[error("Sweet out of stock")]
    OutOfStock,

    /// Restock amount was zero or negative
    #[error("Amount must be positive")]
    InvalidAmount,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Inventory service applying stock mutations
pub struct InventoryService {
    sweet_repo: Arc<dyn SweetRepository>,
}

impl InventoryService {
    /// Create a new inventory service
    pub fn new(sweet_repo: Arc<dyn SweetRepository>) -> Self {
        Self { sweet_repo }
    }

    /// Purchase one unit of a sweet.
    ///
    /// The decrement is a single conditional UPDATE (`quantity > 0`), so
    /// the out-of-stock check is evaluated against the same state the
    /// write sees. When the update matches no row, a reload distinguishes
    /// a missing sweet from an empty one.
    pub async fn purchase(&self, sweet_id: i64) -> Result<Sweet, InventoryError> {
        let decremented = self
            .sweet_repo
            .decrement_quantity(sweet_id)
            .await
            .context("Failed to apply purchase")?;

        if !decremented {
            return match self
                .sweet_repo
                .get_by_id(sweet_id)
                .await
                .context("Failed to load sweet after refused purchase")?
            {
                Some(_) => Err(InventoryError::OutOfStock),
                None => Err(InventoryError::NotFound),
            };
        }

        let sweet = self
            .sweet_repo
            .get_by_id(sweet_id)
            .await
            .context("Failed to load sweet after purchase")?
            .ok_or(InventoryError::NotFound)?;

        tracing::info!(sweet_id, quantity = sweet.quantity, "Purchase applied");

        Ok(sweet)
    }

    /// Restock a sweet by `amount` units.
    ///
    /// The amount must be positive; the increment is a single atomic
    /// UPDATE.
    pub async fn restock(&self, sweet_id: i64, amount: i64) -> Result<Sweet, InventoryError> {
        if amount <= 0 {
            return Err(InventoryError::InvalidAmount);
        }

        let matched = self
            .sweet_repo
            .increment_quantity(sweet_id, amount)
            .await
            .context("Failed to apply restock")?;

        if !matched {
            return Err(InventoryError::NotFound);
        }

        let sweet = self
            .sweet_repo
            .get_by_id(sweet_id)
            .await
            .context("Failed to load sweet after restock")?
            .ok_or(InventoryError::NotFound)?;

        tracing::info!(sweet_id, amount, quantity = sweet.quantity, "Restock applied");

        Ok(sweet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxSweetRepository, SweetRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::SweetInput;

    async fn setup() -> (Arc<dyn SweetRepository>, InventoryService) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxSweetRepository::boxed(pool);
        let service = InventoryService::new(repo.clone());
        (repo, service)
    }

    async fn seed(repo: &Arc<dyn SweetRepository>, quantity: i64) -> i64 {
        repo.create(&SweetInput {
            name: "Ladoo".to_string(),
            category: "Indian".to_string(),
            price: 10.0,
            quantity,
        })
        .await
        .expect("Failed to seed sweet")
        .id
    }

    #[tokio::test]
    async fn test_purchase_decrements_by_one() {
        let (repo, service) = setup().await;
        let id = seed(&repo, 5).await;

        let sweet = service.purchase(id).await.expect("Purchase failed");

        assert_eq!(sweet.quantity, 4);
    }

    #[tokio::test]
    async fn test_purchase_out_of_stock() {
        let (repo, service) = setup().await;
        let id = seed(&repo, 0).await;

        let result = service.purchase(id).await;

        assert!(matches!(result, Err(InventoryError::OutOfStock)));

        // Quantity unchanged
        let sweet = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(sweet.quantity, 0);
    }

    #[tokio::test]
    async fn test_purchase_missing_sweet() {
        let (_repo, service) = setup().await;

        let result = service.purchase(99999).await;

        assert!(matches!(result, Err(InventoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_purchase_drains_stock_then_refuses() {
        let (repo, service) = setup().await;
        let id = seed(&repo, 2).await;

        assert_eq!(service.purchase(id).await.expect("First failed").quantity, 1);
        assert_eq!(service.purchase(id).await.expect("Second failed").quantity, 0);
        assert!(matches!(
            service.purchase(id).await,
            Err(InventoryError::OutOfStock)
        ));
    }

    #[tokio::test]
    async fn test_restock_increments() {
        let (repo, service) = setup().await;
        let id = seed(&repo, 3).await;

        let sweet = service.restock(id, 7).await.expect("Restock failed");

        assert_eq!(sweet.quantity, 10);
    }

    #[tokio::test]
    async fn test_restock_rejects_non_positive_amount() {
        let (repo, service) = setup().await;
        let id = seed(&repo, 3).await;

        assert!(matches!(
            service.restock(id, 0).await,
            Err(InventoryError::InvalidAmount)
        ));
        assert!(matches!(
            service.restock(id, -5).await,
            Err(InventoryError::InvalidAmount)
        ));

        // Quantity unchanged
        let sweet = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(sweet.quantity, 3);
    }

    #[tokio::test]
    async fn test_restock_missing_sweet() {
        let (_repo, service) = setup().await;

        let result = service.restock(99999, 5).await;

        assert!(matches!(result, Err(InventoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_restock_amount_check_precedes_lookup() {
        let (_repo, service) = setup().await;

        // Invalid amount wins even when the sweet doesn't exist
        let result = service.restock(99999, 0).await;

        assert!(matches!(result, Err(InventoryError::InvalidAmount)));
    }

    #[tokio::test]
    async fn test_concurrent_purchases_drain_exactly() {
        let initial = 8usize;
        let (repo, service) = setup().await;
        let id = seed(&repo, initial as i64).await;

        let service = Arc::new(service);
        let mut handles = Vec::new();
        for _ in 0..initial {
            let service = service.clone();
            handles.push(tokio::spawn(async move { service.purchase(id).await }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.expect("task panicked").is_ok() {
                successes += 1;
            }
        }

        assert_eq!(successes, initial, "Every unit sells exactly once");

        let sweet = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(sweet.quantity, 0);
    }
}
