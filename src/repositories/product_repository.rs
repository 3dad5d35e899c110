use super::stock_movement_repository::{apply_stock_change, lock_product};
use crate::error::RepositoryError;
use crate::models::{MovementCause, NewProduct, Product, ProductUpdate};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

/// Repository for the product store
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new product with its opening stock
    pub async fn create(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, brand_id, category_id, price, quantity)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, brand_id, category_id, price, quantity, created_at, updated_at
            "#,
        )
        .bind(new.name.trim())
        .bind(new.brand_id)
        .bind(new.category_id)
        .bind(new.price)
        .bind(new.quantity)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    /// Find a product by UUID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, brand_id, category_id, price, quantity, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// All products, newest first
    pub async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, brand_id, category_id, price, quantity, created_at, updated_at
            FROM products
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Current on-hand quantity
    pub async fn get_quantity(&self, id: Uuid) -> Result<i32, RepositoryError> {
        sqlx::query_scalar::<_, i32>("SELECT quantity FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("Product {} not found", id)))
    }

    /// Apply a stock delta in its own transaction
    pub async fn adjust_quantity(
        &self,
        id: Uuid,
        delta: i32,
        cause: MovementCause,
    ) -> Result<i32, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let change = apply_stock_change(&mut tx, id, delta, cause, None).await?;
        tx.commit().await?;

        Ok(change.quantity_after)
    }

    /// Edit product details; a quantity override is journaled as a manual edit
    pub async fn update(&self, id: Uuid, update: &ProductUpdate) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (_, current_quantity) = lock_product(&mut tx, id).await?;

        if let Some(target) = update.quantity {
            if target < 0 {
                return Err(RepositoryError::InvalidInput(
                    "Quantity cannot be negative".to_string(),
                ));
            }
            if target != current_quantity {
                debug!("Manual quantity edit on {}: {} -> {}", id, current_quantity, target);
                apply_stock_change(
                    &mut tx,
                    id,
                    target - current_quantity,
                    MovementCause::ManualEdit,
                    None,
                )
                .await?;
            }
        }

        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = COALESCE($2, name),
                brand_id = COALESCE($3, brand_id),
                category_id = COALESCE($4, category_id),
                price = COALESCE($5, price),
                updated_at = (NOW() AT TIME ZONE 'UTC')
            WHERE id = $1
            RETURNING id, name, brand_id, category_id, price, quantity, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(update.name.as_deref().map(str::trim))
        .bind(update.brand_id)
        .bind(update.category_id)
        .bind(update.price)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(product)
    }

    /// Delete a product that no ledger record references
    pub async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        lock_product(&mut tx, id).await?;

        let references: i64 = sqlx::query_scalar(
            r#"
            SELECT (SELECT COUNT(*) FROM purchases WHERE product_id = $1)
                 + (SELECT COUNT(*) FROM sells WHERE product_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if references > 0 {
            return Err(RepositoryError::Conflict(format!(
                "Product {} is referenced by {} ledger records",
                id, references
            )));
        }

        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
