use super::reference_service::ensure_user;
use crate::error::{AppError, AppResult};
use crate::models::{LedgerOutcome, MovementCause, NewSell, Sell, SellUpdate};
use crate::reports::SellFilter;
use crate::store::InventoryStore;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Service for the sell ledger
pub struct SellService {
    store: Arc<dyn InventoryStore>,
}

fn validate_amounts(quantity: i32, sell_price: Decimal) -> AppResult<()> {
    if quantity <= 0 {
        return Err(AppError::Validation(format!(
            "Quantity must be greater than zero, got {}",
            quantity
        )));
    }
    if sell_price < Decimal::ZERO {
        return Err(AppError::Validation("Sell price cannot be negative".to_string()));
    }
    Ok(())
}

impl SellService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Record a sell; stock must cover the quantity or nothing changes
    pub async fn create_sell(&self, new: NewSell) -> AppResult<LedgerOutcome<Sell>> {
        validate_amounts(new.quantity, new.sell_price)?;
        ensure_user(self.store.as_ref(), new.seller_id, "seller").await?;
        ensure_user(self.store.as_ref(), new.user_id, "creator").await?;

        info!(
            "Creating sell: product={}, quantity={}, price={}",
            new.product_id, new.quantity, new.sell_price
        );

        match self.store.create_sell(&new).await {
            Ok(outcome) => {
                info!(
                    "Sell {} created, product {} now at {}",
                    outcome.record.id, outcome.record.product_id, outcome.product_quantity
                );
                Ok(outcome)
            }
            Err(e) => {
                if e.is_insufficient_stock() {
                    warn!("Sell rejected for product {}: {}", new.product_id, e);
                }
                Err(e)
            }
        }
    }

    /// Edit quantity, price or seller; stock moves by `old - new`
    pub async fn update_sell(&self, id: Uuid, update: SellUpdate) -> AppResult<LedgerOutcome<Sell>> {
        validate_amounts(update.quantity, update.sell_price)?;
        ensure_user(self.store.as_ref(), update.seller_id, "seller").await?;

        info!("Updating sell {}: quantity={}", id, update.quantity);
        self.store.update_sell(id, &update).await
    }

    /// Remove a sell and return its units to stock
    pub async fn delete_sell(&self, id: Uuid) -> AppResult<LedgerOutcome<Sell>> {
        self.remove(id, MovementCause::SellDeleted).await
    }

    /// Delete path used by the tester sweeper
    pub async fn expire_sell(&self, id: Uuid) -> AppResult<LedgerOutcome<Sell>> {
        self.remove(id, MovementCause::TesterExpired).await
    }

    async fn remove(&self, id: Uuid, cause: MovementCause) -> AppResult<LedgerOutcome<Sell>> {
        let outcome = self.store.delete_sell(id, cause).await?;
        info!(
            "Sell {} deleted ({}), product {} now at {}",
            id,
            cause.as_str(),
            outcome.record.product_id,
            outcome.product_quantity
        );
        Ok(outcome)
    }

    pub async fn get_sell(&self, id: Uuid) -> AppResult<Sell> {
        self.store
            .find_sell(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Sell {} not found", id)))
    }

    pub async fn list_sells(&self, filter: &SellFilter) -> AppResult<Vec<Sell>> {
        let sells = self.store.list_sells().await?;
        if *filter == SellFilter::default() {
            return Ok(sells);
        }
        let products = self.store.list_products().await?;
        Ok(filter.apply(sells, &products))
    }
}
