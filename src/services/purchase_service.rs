use super::reference_service::{ensure_firm, ensure_user};
use crate::error::{AppError, AppResult};
use crate::models::{LedgerOutcome, MovementCause, NewPurchase, Purchase, PurchaseUpdate};
use crate::reports::PurchaseFilter;
use crate::store::InventoryStore;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Service for the purchase ledger
pub struct PurchaseService {
    store: Arc<dyn InventoryStore>,
}

fn validate_amounts(quantity: i32, purchase_price: Decimal) -> AppResult<()> {
    if quantity <= 0 {
        return Err(AppError::Validation(format!(
            "Quantity must be greater than zero, got {}",
            quantity
        )));
    }
    if purchase_price < Decimal::ZERO {
        return Err(AppError::Validation("Purchase price cannot be negative".to_string()));
    }
    Ok(())
}

impl PurchaseService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Record a purchase and add its units to stock
    pub async fn create_purchase(&self, new: NewPurchase) -> AppResult<LedgerOutcome<Purchase>> {
        validate_amounts(new.quantity, new.purchase_price)?;
        ensure_firm(self.store.as_ref(), new.firm_id).await?;
        ensure_user(self.store.as_ref(), new.buyer_id, "buyer").await?;
        ensure_user(self.store.as_ref(), new.user_id, "creator").await?;

        info!(
            "Creating purchase: product={}, quantity={}, price={}",
            new.product_id, new.quantity, new.purchase_price
        );

        let outcome = self.store.create_purchase(&new).await?;

        info!(
            "Purchase {} created, product {} now at {}",
            outcome.record.id, outcome.record.product_id, outcome.product_quantity
        );
        Ok(outcome)
    }

    /// Edit quantity, price, firm or buyer; stock moves by `new - old`
    pub async fn update_purchase(
        &self,
        id: Uuid,
        update: PurchaseUpdate,
    ) -> AppResult<LedgerOutcome<Purchase>> {
        validate_amounts(update.quantity, update.purchase_price)?;
        ensure_firm(self.store.as_ref(), update.firm_id).await?;
        ensure_user(self.store.as_ref(), update.buyer_id, "buyer").await?;

        info!("Updating purchase {}: quantity={}", id, update.quantity);
        self.store.update_purchase(id, &update).await
    }

    /// Remove a purchase; rejected if its units were already sold
    pub async fn delete_purchase(&self, id: Uuid) -> AppResult<LedgerOutcome<Purchase>> {
        self.remove(id, MovementCause::PurchaseDeleted).await
    }

    /// Delete path used by the tester sweeper
    pub async fn expire_purchase(&self, id: Uuid) -> AppResult<LedgerOutcome<Purchase>> {
        self.remove(id, MovementCause::TesterExpired).await
    }

    async fn remove(&self, id: Uuid, cause: MovementCause) -> AppResult<LedgerOutcome<Purchase>> {
        match self.store.delete_purchase(id, cause).await {
            Ok(outcome) => {
                info!(
                    "Purchase {} deleted ({}), product {} now at {}",
                    id,
                    cause.as_str(),
                    outcome.record.product_id,
                    outcome.product_quantity
                );
                Ok(outcome)
            }
            Err(e) => {
                if e.is_insufficient_stock() {
                    warn!("Refusing to delete purchase {}: {}", id, e);
                }
                Err(e)
            }
        }
    }

    pub async fn get_purchase(&self, id: Uuid) -> AppResult<Purchase> {
        self.store
            .find_purchase(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Purchase {} not found", id)))
    }

    pub async fn list_purchases(&self, filter: &PurchaseFilter) -> AppResult<Vec<Purchase>> {
        let purchases = self.store.list_purchases().await?;
        if *filter == PurchaseFilter::default() {
            return Ok(purchases);
        }
        let products = self.store.list_products().await?;
        Ok(filter.apply(purchases, &products))
    }
}
