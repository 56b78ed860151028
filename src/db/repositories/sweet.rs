//! Sweet repository
//!
//! Catalog store: persists sweet records and supports filtered queries.
//! Also carries the two stock mutation primitives used by the inventory
//! service. Both are single atomic UPDATE statements, and the decrement is
//! conditioned on `quantity > 0` at the storage layer, so concurrent
//! mutations of the same record serialize in the database and stock can
//! never go negative.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Sweet, SweetFilter, SweetInput, SweetUpdate};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Sweet repository trait
#[async_trait]
pub trait SweetRepository: Send + Sync {
    /// Create a new sweet
    async fn create(&self, input: &SweetInput) -> Result<Sweet>;

    /// Get sweet by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Sweet>>;

    /// List all sweets (unordered full scan)
    async fn list(&self) -> Result<Vec<Sweet>>;

    /// Search sweets with the given filters
    async fn search(&self, filter: &SweetFilter) -> Result<Vec<Sweet>>;

    /// Apply a partial update; only the supplied fields are written.
    /// Returns the updated sweet, or `None` if the id doesn't exist.
    async fn update(&self, id: i64, update: &SweetUpdate) -> Result<Option<Sweet>>;

    /// Delete a sweet. Returns whether a row was deleted.
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Atomically decrement quantity by one, conditioned on quantity > 0.
    /// Returns whether the decrement was applied.
    async fn decrement_quantity(&self, id: i64) -> Result<bool>;

    /// Atomically increment quantity by `amount`.
    /// Returns whether a row was matched.
    async fn increment_quantity(&self, id: i64, amount: i64) -> Result<bool>;
}

/// SQLx-based sweet repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxSweetRepository {
    pool: DynDatabasePool,
}

impl SqlxSweetRepository {
    /// Create a new SQLx sweet repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn SweetRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SweetRepository for SqlxSweetRepository {
    async fn create(&self, input: &SweetInput) -> Result<Sweet> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sweet_sqlite(self.pool.as_sqlite().unwrap(), input).await,
            DatabaseDriver::Mysql => create_sweet_mysql(self.pool.as_mysql().unwrap(), input).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Sweet>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_sweet_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_sweet_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list(&self) -> Result<Vec<Sweet>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_sweets_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => list_sweets_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn search(&self, filter: &SweetFilter) -> Result<Vec<Sweet>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                search_sweets_sqlite(self.pool.as_sqlite().unwrap(), filter).await
            }
            DatabaseDriver::Mysql => search_sweets_mysql(self.pool.as_mysql().unwrap(), filter).await,
        }
    }

    async fn update(&self, id: i64, update: &SweetUpdate) -> Result<Option<Sweet>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_sweet_sqlite(self.pool.as_sqlite().unwrap(), id, update).await
            }
            DatabaseDriver::Mysql => {
                update_sweet_mysql(self.pool.as_mysql().unwrap(), id, update).await
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_sweet_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_sweet_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn decrement_quantity(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                decrement_quantity_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => {
                decrement_quantity_mysql(self.pool.as_mysql().unwrap(), id).await
            }
        }
    }

    async fn increment_quantity(&self, id: i64, amount: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                increment_quantity_sqlite(self.pool.as_sqlite().unwrap(), id, amount).await
            }
            DatabaseDriver::Mysql => {
                increment_quantity_mysql(self.pool.as_mysql().unwrap(), id, amount).await
            }
        }
    }
}

/// Build the WHERE clause for a search filter.
///
/// Name and category become case-insensitive substring matches, price
/// bounds are inclusive, and every present filter is ANDed. The bind
/// order matches the clause order.
fn build_search_sql(filter: &SweetFilter) -> String {
    let mut sql = String::from(
        "SELECT id, name, category, price, quantity, created_at, updated_at FROM sweets WHERE 1=1",
    );
    if filter.name.is_some() {
        sql.push_str(" AND LOWER(name) LIKE ?");
    }
    if filter.category.is_some() {
        sql.push_str(" AND LOWER(category) LIKE ?");
    }
    if filter.min_price.is_some() {
        sql.push_str(" AND price >= ?");
    }
    if filter.max_price.is_some() {
        sql.push_str(" AND price <= ?");
    }
    sql
}

fn like_pattern(needle: &str) -> String {
    format!("%{}%", needle.to_lowercase())
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sweet_sqlite(pool: &SqlitePool, input: &SweetInput) -> Result<Sweet> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO sweets (name, category, price, quantity, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.name)
    .bind(&input.category)
    .bind(input.price)
    .bind(input.quantity)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create sweet")?;

    Ok(Sweet {
        id: result.last_insert_rowid(),
        name: input.name.clone(),
        category: input.category.clone(),
        price: input.price,
        quantity: input.quantity,
        created_at: now,
        updated_at: now,
    })
}

async fn get_sweet_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Sweet>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, category, price, quantity, created_at, updated_at
        FROM sweets
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get sweet by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_sweet_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn list_sweets_sqlite(pool: &SqlitePool) -> Result<Vec<Sweet>> {
    let rows = sqlx::query(
        "SELECT id, name, category, price, quantity, created_at, updated_at FROM sweets",
    )
    .fetch_all(pool)
    .await
    .context("Failed to list sweets")?;

    let mut sweets = Vec::new();
    for row in rows {
        sweets.push(row_to_sweet_sqlite(&row)?);
    }

    Ok(sweets)
}

async fn search_sweets_sqlite(pool: &SqlitePool, filter: &SweetFilter) -> Result<Vec<Sweet>> {
    let sql = build_search_sql(filter);
    let mut query = sqlx::query(&sql);

    if let Some(name) = &filter.name {
        query = query.bind(like_pattern(name));
    }
    if let Some(category) = &filter.category {
        query = query.bind(like_pattern(category));
    }
    if let Some(min_price) = filter.min_price {
        query = query.bind(min_price);
    }
    if let Some(max_price) = filter.max_price {
        query = query.bind(max_price);
    }

    let rows = query
        .fetch_all(pool)
        .await
        .context("Failed to search sweets")?;

    let mut sweets = Vec::new();
    for row in rows {
        sweets.push(row_to_sweet_sqlite(&row)?);
    }

    Ok(sweets)
}

async fn update_sweet_sqlite(
    pool: &SqlitePool,
    id: i64,
    update: &SweetUpdate,
) -> Result<Option<Sweet>> {
    let mut sets = Vec::new();
    if update.name.is_some() {
        sets.push("name = ?");
    }
    if update.category.is_some() {
        sets.push("category = ?");
    }
    if update.price.is_some() {
        sets.push("price = ?");
    }
    if update.quantity.is_some() {
        sets.push("quantity = ?");
    }
    if sets.is_empty() {
        return get_sweet_by_id_sqlite(pool, id).await;
    }
    sets.push("updated_at = ?");

    let sql = format!("UPDATE sweets SET {} WHERE id = ?", sets.join(", "));
    let mut query = sqlx::query(&sql);

    if let Some(name) = &update.name {
        query = query.bind(name);
    }
    if let Some(category) = &update.category {
        query = query.bind(category);
    }
    if let Some(price) = update.price {
        query = query.bind(price);
    }
    if let Some(quantity) = update.quantity {
        query = query.bind(quantity);
    }
    query = query.bind(Utc::now()).bind(id);

    query.execute(pool).await.context("Failed to update sweet")?;

    get_sweet_by_id_sqlite(pool, id).await
}

async fn delete_sweet_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM sweets WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete sweet")?;

    Ok(result.rows_affected() > 0)
}

async fn decrement_quantity_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE sweets
        SET quantity = quantity - 1, updated_at = ?
        WHERE id = ? AND quantity > 0
        "#,
    )
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to decrement quantity")?;

    Ok(result.rows_affected() > 0)
}

async fn increment_quantity_sqlite(pool: &SqlitePool, id: i64, amount: i64) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE sweets
        SET quantity = quantity + ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(amount)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to increment quantity")?;

    Ok(result.rows_affected() > 0)
}

fn row_to_sweet_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Sweet> {
    Ok(Sweet {
        id: row.get("id"),
        name: row.get("name"),
        category: row.get("category"),
        price: row.get("price"),
        quantity: row.get("quantity"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_sweet_mysql(pool: &MySqlPool, input: &SweetInput) -> Result<Sweet> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO sweets (name, category, price, quantity, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.name)
    .bind(&input.category)
    .bind(input.price)
    .bind(input.quantity)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create sweet")?;

    Ok(Sweet {
        id: result.last_insert_id() as i64,
        name: input.name.clone(),
        category: input.category.clone(),
        price: input.price,
        quantity: input.quantity,
        created_at: now,
        updated_at: now,
    })
}

async fn get_sweet_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Sweet>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, category, price, quantity, created_at, updated_at
        FROM sweets
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get sweet by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_sweet_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn list_sweets_mysql(pool: &MySqlPool) -> Result<Vec<Sweet>> {
    let rows = sqlx::query(
        "SELECT id, name, category, price, quantity, created_at, updated_at FROM sweets",
    )
    .fetch_all(pool)
    .await
    .context("Failed to list sweets")?;

    let mut sweets = Vec::new();
    for row in rows {
        sweets.push(row_to_sweet_mysql(&row)?);
    }

    Ok(sweets)
}

async fn search_sweets_mysql(pool: &MySqlPool, filter: &SweetFilter) -> Result<Vec<Sweet>> {
    let sql = build_search_sql(filter);
    let mut query = sqlx::query(&sql);

    if let Some(name) = &filter.name {
        query = query.bind(like_pattern(name));
    }
    if let Some(category) = &filter.category {
        query = query.bind(like_pattern(category));
    }
    if let Some(min_price) = filter.min_price {
        query = query.bind(min_price);
    }
    if let Some(max_price) = filter.max_price {
        query = query.bind(max_price);
    }

    let rows = query
        .fetch_all(pool)
        .await
        .context("Failed to search sweets")?;

    let mut sweets = Vec::new();
    for row in rows {
        sweets.push(row_to_sweet_mysql(&row)?);
    }

    Ok(sweets)
}

async fn update_sweet_mysql(
    pool: &MySqlPool,
    id: i64,
    update: &SweetUpdate,
) -> Result<Option<Sweet>> {
    let mut sets = Vec::new();
    if update.name.is_some() {
        sets.push("name = ?");
    }
    if update.category.is_some() {
        sets.push("category = ?");
    }
    if update.price.is_some() {
        sets.push("price = ?");
    }
    if update.quantity.is_some() {
        sets.push("quantity = ?");
    }
    if sets.is_empty() {
        return get_sweet_by_id_mysql(pool, id).await;
    }
    sets.push("updated_at = ?");

    let sql = format!("UPDATE sweets SET {} WHERE id = ?", sets.join(", "));
    let mut query = sqlx::query(&sql);

    if let Some(name) = &update.name {
        query = query.bind(name);
    }
    if let Some(category) = &update.category {
        query = query.bind(category);
    }
    if let Some(price) = update.price {
        query = query.bind(price);
    }
    if let Some(quantity) = update.quantity {
        query = query.bind(quantity);
    }
    query = query.bind(Utc::now()).bind(id);

    query.execute(pool).await.context("Failed to update sweet")?;

    get_sweet_by_id_mysql(pool, id).await
}

async fn delete_sweet_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM sweets WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete sweet")?;

    Ok(result.rows_affected() > 0)
}

async fn decrement_quantity_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE sweets
        SET quantity = quantity - 1, updated_at = ?
        WHERE id = ? AND quantity > 0
        "#,
    )
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to decrement quantity")?;

    Ok(result.rows_affected() > 0)
}

async fn increment_quantity_mysql(pool: &MySqlPool, id: i64, amount: i64) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE sweets
        SET quantity = quantity + ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(amount)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to increment quantity")?;

    Ok(result.rows_affected() > 0)
}

fn row_to_sweet_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Sweet> {
    Ok(Sweet {
        id: row.get("id"),
        name: row.get("name"),
        category: row.get("category"),
        price: row.get("price"),
        quantity: row.get("quantity"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
