use super::stock_movement_repository::apply_stock_change;
use crate::error::RepositoryError;
use crate::inventory::LedgerChange;
use crate::models::{LedgerOutcome, MovementCause, NewSell, Sell, SellUpdate};
use chrono::NaiveDateTime;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

const SELL_COLUMNS: &str = "id, product_id, brand_id, user_id, seller_id, quantity, sell_price, \
     tester, tester_created_at, created_at, updated_at";

/// Repository for the sell ledger
pub struct SellRepository {
    pool: PgPool,
}

impl SellRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn lock(conn: &mut PgConnection, id: Uuid) -> Result<Sell, RepositoryError> {
        sqlx::query_as::<_, Sell>(&format!(
            "SELECT {} FROM sells WHERE id = $1 FOR UPDATE",
            SELL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Sell {} not found", id)))
    }

    /// Record a stock-out event; fails without side effects if stock is short
    pub async fn create(&self, new: &NewSell) -> Result<LedgerOutcome<Sell>, RepositoryError> {
        let change = LedgerChange::SellCreated {
            quantity: new.quantity,
        };
        change.validate().map_err(|source| RepositoryError::Stock {
            product_id: new.product_id,
            source,
        })?;

        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        let stock = apply_stock_change(
            &mut tx,
            new.product_id,
            change.stock_delta(),
            change.cause(),
            Some(id),
        )
        .await?;

        let sell = sqlx::query_as::<_, Sell>(&format!(
            r#"
            INSERT INTO sells
            (id, product_id, brand_id, user_id, seller_id, quantity, sell_price, tester, tester_created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, CASE WHEN $8 THEN (NOW() AT TIME ZONE 'UTC') ELSE NULL END)
            RETURNING {}
            "#,
            SELL_COLUMNS
        ))
        .bind(id)
        .bind(new.product_id)
        .bind(stock.brand_id)
        .bind(new.user_id)
        .bind(new.seller_id)
        .bind(new.quantity)
        .bind(new.sell_price)
        .bind(new.tester)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(LedgerOutcome {
            record: sell,
            product_quantity: stock.quantity_after,
        })
    }

    /// Edit a sell; raising the quantity takes more stock, lowering returns it
    pub async fn update(
        &self,
        id: Uuid,
        update: &SellUpdate,
    ) -> Result<LedgerOutcome<Sell>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let existing = Self::lock(&mut tx, id).await?;
        let change = LedgerChange::SellUpdated {
            old_quantity: existing.quantity,
            new_quantity: update.quantity,
        };
        change.validate().map_err(|source| RepositoryError::Stock {
            product_id: existing.product_id,
            source,
        })?;

        let stock = apply_stock_change(
            &mut tx,
            existing.product_id,
            change.stock_delta(),
            change.cause(),
            Some(id),
        )
        .await?;

        let sell = sqlx::query_as::<_, Sell>(&format!(
            r#"
            UPDATE sells
            SET quantity = $2, sell_price = $3, seller_id = $4, updated_at = (NOW() AT TIME ZONE 'UTC')
            WHERE id = $1
            RETURNING {}
            "#,
            SELL_COLUMNS
        ))
        .bind(id)
        .bind(update.quantity)
        .bind(update.sell_price)
        .bind(update.seller_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(LedgerOutcome {
            record: sell,
            product_quantity: stock.quantity_after,
        })
    }

    /// Remove a sell and return its units to stock
    pub async fn delete(
        &self,
        id: Uuid,
        cause: MovementCause,
    ) -> Result<LedgerOutcome<Sell>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let existing = Self::lock(&mut tx, id).await?;
        let change = LedgerChange::SellDeleted {
            quantity: existing.quantity,
        };

        let stock = apply_stock_change(
            &mut tx,
            existing.product_id,
            change.stock_delta(),
            cause,
            Some(id),
        )
        .await?;

        sqlx::query("DELETE FROM sells WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(LedgerOutcome {
            record: existing,
            product_quantity: stock.quantity_after,
        })
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Sell>, RepositoryError> {
        let sell = sqlx::query_as::<_, Sell>(&format!(
            "SELECT {} FROM sells WHERE id = $1",
            SELL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sell)
    }

    pub async fn find_all(&self) -> Result<Vec<Sell>, RepositoryError> {
        let sells = sqlx::query_as::<_, Sell>(&format!(
            "SELECT {} FROM sells ORDER BY created_at DESC",
            SELL_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(sells)
    }

    /// Ids of tester sells created before `cutoff`
    pub async fn find_expired_testers(
        &self,
        cutoff: NaiveDateTime,
    ) -> Result<Vec<Uuid>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM sells
            WHERE tester AND tester_created_at < $1
            ORDER BY tester_created_at ASC
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}
