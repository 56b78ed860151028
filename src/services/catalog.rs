//! Catalog service
//!
//! Business logic for the sweets catalog: create, read, filtered search,
//! partial update, delete, and bulk create. Enforces the data-model
//! invariants (non-negative price and quantity) that the storage layer
//! does not.

use crate::db::repositories::SweetRepository;
use crate::models::{Sweet, SweetFilter, SweetInput, SweetUpdate};
use anyhow::Context;
use std::sync::Arc;

/// Error types for catalog operations
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Referenced sweet doesn't exist
    #[error("Sweet not found")]
    NotFound,

    /// Invalid input (empty update, negative price or quantity, blank fields)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Catalog service for managing sweets
pub struct CatalogService {
    sweet_repo: Arc<dyn SweetRepository>,
}

impl CatalogService {
    /// Create a new catalog service
    pub fn new(sweet_repo: Arc<dyn SweetRepository>) -> Self {
        Self { sweet_repo }
    }

    /// Create a new sweet
    pub async fn create(&self, input: SweetInput) -> Result<Sweet, CatalogError> {
        validate_input(&input)?;

        let sweet = self
            .sweet_repo
            .create(&input)
            .await
            .context("Failed to create sweet")?;

        tracing::info!(sweet_id = sweet.id, name = %sweet.name, "Created sweet");

        Ok(sweet)
    }

    /// Get a sweet by id
    pub async fn get(&self, id: i64) -> Result<Sweet, CatalogError> {
        self.sweet_repo
            .get_by_id(id)
            .await
            .context("Failed to get sweet")?
            .ok_or(CatalogError::NotFound)
    }

    /// List all sweets
    pub async fn list(&self) -> Result<Vec<Sweet>, CatalogError> {
        let sweets = self
            .sweet_repo
            .list()
            .await
            .context("Failed to list sweets")?;
        Ok(sweets)
    }

    /// Search sweets with filters
    pub async fn search(&self, filter: &SweetFilter) -> Result<Vec<Sweet>, CatalogError> {
        let sweets = self
            .sweet_repo
            .search(filter)
            .await
            .context("Failed to search sweets")?;
        Ok(sweets)
    }

    /// Apply a partial update to a sweet.
    ///
    /// An update with no fields is rejected; unspecified fields are left
    /// untouched.
    pub async fn update(&self, id: i64, update: SweetUpdate) -> Result<Sweet, CatalogError> {
        if update.is_empty() {
            return Err(CatalogError::ValidationError(
                "No fields to update".to_string(),
            ));
        }
        if let Some(price) = update.price {
            if price < 0.0 {
                return Err(CatalogError::ValidationError(
                    "Price must be non-negative".to_string(),
                ));
            }
        }
        if let Some(quantity) = update.quantity {
            if quantity < 0 {
                return Err(CatalogError::ValidationError(
                    "Quantity must be non-negative".to_string(),
                ));
            }
        }

        self.sweet_repo
            .update(id, &update)
            .await
            .context("Failed to update sweet")?
            .ok_or(CatalogError::NotFound)
    }

    /// Delete a sweet
    pub async fn delete(&self, id: i64) -> Result<(), CatalogError> {
        let deleted = self
            .sweet_repo
            .delete(id)
            .await
            .context("Failed to delete sweet")?;

        if !deleted {
            return Err(CatalogError::NotFound);
        }

        tracing::info!(sweet_id = id, "Deleted sweet");

        Ok(())
    }

    /// Create several sweets in one call.
    ///
    /// Inserts are sequential and independent: a failure part-way leaves
    /// earlier inserts in place and surfaces the error. There is no
    /// all-or-nothing guarantee.
    pub async fn create_many(&self, inputs: Vec<SweetInput>) -> Result<Vec<Sweet>, CatalogError> {
        for input in &inputs {
            validate_input(input)?;
        }

        let mut created = Vec::with_capacity(inputs.len());
        for input in &inputs {
            let sweet = self
                .sweet_repo
                .create(input)
                .await
                .context("Failed to create sweet in bulk insert")?;
            created.push(sweet);
        }

        tracing::info!(count = created.len(), "Bulk-created sweets");

        Ok(created)
    }
}

fn validate_input(input: &SweetInput) -> Result<(), CatalogError> {
    if input.name.trim().is_empty() {
        return Err(CatalogError::ValidationError(
            "Name must not be empty".to_string(),
        ));
    }
    if input.category.trim().is_empty() {
        return Err(CatalogError::ValidationError(
            "Category must not be empty".to_string(),
        ));
    }
    if input.price < 0.0 {
        return Err(CatalogError::ValidationError(
            "Price must be non-negative".to_string(),
        ));
    }
    if input.quantity < 0 {
        return Err(CatalogError::ValidationError(
            "Quantity must be non-negative".to_string(),
        ));
    }
    Ok(())
}
