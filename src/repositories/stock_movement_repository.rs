//! Stock changes and their journal

use crate::error::RepositoryError;
use crate::inventory::apply_delta;
use crate::models::{MovementCause, StockMovement};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Product quantity before and after a committed change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockChange {
    pub product_id: Uuid,
    pub brand_id: Uuid,
    pub quantity_before: i32,
    pub quantity_after: i32,
}

#[derive(sqlx::FromRow)]
struct LockedProduct {
    brand_id: Uuid,
    quantity: i32,
}

/// Lock a product row and return its brand and quantity
pub async fn lock_product(
    conn: &mut PgConnection,
    product_id: Uuid,
) -> Result<(Uuid, i32), RepositoryError> {
    let locked = sqlx::query_as::<_, LockedProduct>(
        r#"
        SELECT brand_id, quantity
        FROM products
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| RepositoryError::NotFound(format!("Product {} not found", product_id)))?;

    Ok((locked.brand_id, locked.quantity))
}

/// Apply `delta` to a product inside the caller's transaction and journal it
///
/// Locks the product row, checks the stock rule, then issues a conditional
/// update so the quantity can never be written below zero even if the lock
/// were bypassed. A zero delta keeps the lock but writes nothing.
pub async fn apply_stock_change(
    conn: &mut PgConnection,
    product_id: Uuid,
    delta: i32,
    cause: MovementCause,
    reference_id: Option<Uuid>,
) -> Result<StockChange, RepositoryError> {
    let (brand_id, quantity_before) = lock_product(conn, product_id).await?;

    apply_delta(quantity_before, delta)
        .map_err(|source| RepositoryError::Stock { product_id, source })?;

    if delta == 0 {
        return Ok(StockChange {
            product_id,
            brand_id,
            quantity_before,
            quantity_after: quantity_before,
        });
    }

    let quantity_after: i32 = sqlx::query_scalar(
        r#"
        UPDATE products
        SET quantity = quantity + $2, updated_at = (NOW() AT TIME ZONE 'UTC')
        WHERE id = $1 AND quantity + $2 >= 0
        RETURNING quantity
        "#,
    )
    .bind(product_id)
    .bind(delta)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(RepositoryError::Stock {
        product_id,
        source: crate::inventory::StockError::Insufficient {
            available: quantity_before,
            requested: delta.saturating_neg(),
        },
    })?;

    record_movement(
        conn,
        &StockMovement::new(product_id, cause, reference_id, quantity_before, quantity_after),
    )
    .await?;

    Ok(StockChange {
        product_id,
        brand_id,
        quantity_before,
        quantity_after,
    })
}

/// Insert a journal row
pub async fn record_movement(
    conn: &mut PgConnection,
    movement: &StockMovement,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r#"
        INSERT INTO stock_movements
        (id, product_id, cause, reference_id, delta, quantity_before, quantity_after)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(movement.id)
    .bind(movement.product_id)
    .bind(&movement.cause)
    .bind(movement.reference_id)
    .bind(movement.delta)
    .bind(movement.quantity_before)
    .bind(movement.quantity_after)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub struct StockMovementRepository {
    pool: PgPool,
}

impl StockMovementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Journal for a product, oldest first
    pub async fn find_by_product(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<StockMovement>, RepositoryError> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, product_id, cause, reference_id, delta, quantity_before, quantity_after, created_at
            FROM stock_movements
            WHERE product_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }
}
