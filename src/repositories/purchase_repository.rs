use super::stock_movement_repository::apply_stock_change;
use crate::error::RepositoryError;
use crate::inventory::LedgerChange;
use crate::models::{LedgerOutcome, MovementCause, NewPurchase, Purchase, PurchaseUpdate};
use chrono::NaiveDateTime;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

const PURCHASE_COLUMNS: &str = "id, product_id, brand_id, user_id, buyer_id, firm_id, quantity, \
     purchase_price, tester, tester_created_at, created_at, updated_at";

/// Repository for the purchase ledger
///
/// Every mutation runs the stock change, the record write and the journal
/// entry in a single transaction.
pub struct PurchaseRepository {
    pool: PgPool,
}

impl PurchaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn lock(conn: &mut PgConnection, id: Uuid) -> Result<Purchase, RepositoryError> {
        sqlx::query_as::<_, Purchase>(&format!(
            "SELECT {} FROM purchases WHERE id = $1 FOR UPDATE",
            PURCHASE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("Purchase {} not found", id)))
    }

    /// Record a stock-in event and raise the product's quantity
    pub async fn create(
        &self,
        new: &NewPurchase,
    ) -> Result<LedgerOutcome<Purchase>, RepositoryError> {
        let change = LedgerChange::PurchaseCreated {
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

        let purchase = sqlx::query_as::<_, Purchase>(&format!(
            r#"
            INSERT INTO purchases
            (id, product_id, brand_id, user_id, buyer_id, firm_id, quantity, purchase_price, tester, tester_created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, CASE WHEN $9 THEN (NOW() AT TIME ZONE 'UTC') ELSE NULL END)
            RETURNING {}
            "#,
            PURCHASE_COLUMNS
        ))
        .bind(id)
        .bind(new.product_id)
        .bind(stock.brand_id)
        .bind(new.user_id)
        .bind(new.buyer_id)
        .bind(new.firm_id)
        .bind(new.quantity)
        .bind(new.purchase_price)
        .bind(new.tester)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(LedgerOutcome {
            record: purchase,
            product_quantity: stock.quantity_after,
        })
    }

    /// Edit a purchase; stock moves by `new - old`
    pub async fn update(
        &self,
        id: Uuid,
        update: &PurchaseUpdate,
    ) -> Result<LedgerOutcome<Purchase>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let existing = Self::lock(&mut tx, id).await?;
        let change = LedgerChange::PurchaseUpdated {
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

        let purchase = sqlx::query_as::<_, Purchase>(&format!(
            r#"
            UPDATE purchases
            SET quantity = $2, purchase_price = $3, firm_id = $4, buyer_id = $5, updated_at = (NOW() AT TIME ZONE 'UTC')
            WHERE id = $1
            RETURNING {}
            "#,
            PURCHASE_COLUMNS
        ))
        .bind(id)
        .bind(update.quantity)
        .bind(update.purchase_price)
        .bind(update.firm_id)
        .bind(update.buyer_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(LedgerOutcome {
            record: purchase,
            product_quantity: stock.quantity_after,
        })
    }

    /// Remove a purchase and take its units back out of stock
    pub async fn delete(
        &self,
        id: Uuid,
        cause: MovementCause,
    ) -> Result<LedgerOutcome<Purchase>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let existing = Self::lock(&mut tx, id).await?;
        let change = LedgerChange::PurchaseDeleted {
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

        sqlx::query("DELETE FROM purchases WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(LedgerOutcome {
            record: existing,
            product_quantity: stock.quantity_after,
        })
    }

    /// Find a purchase by UUID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Purchase>, RepositoryError> {
        let purchase = sqlx::query_as::<_, Purchase>(&format!(
            "SELECT {} FROM purchases WHERE id = $1",
            PURCHASE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(purchase)
    }

    /// All purchases, newest first
    pub async fn find_all(&self) -> Result<Vec<Purchase>, RepositoryError> {
        let purchases = sqlx::query_as::<_, Purchase>(&format!(
            "SELECT {} FROM purchases ORDER BY created_at DESC",
            PURCHASE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases)
    }

    /// Ids of tester purchases created before `cutoff`
    pub async fn find_expired_testers(
        &self,
        cutoff: NaiveDateTime,
    ) -> Result<Vec<Uuid>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM purchases
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
