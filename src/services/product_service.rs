use crate::error::{AppError, AppResult};
use crate::models::{MovementCause, NewProduct, Product, ProductUpdate, StockMovement};
use crate::reports::{paginate, Page, ProductFilter};
use crate::store::InventoryStore;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Service for the product store
pub struct ProductService {
    store: Arc<dyn InventoryStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    async fn ensure_catalog_refs(
        &self,
        brand_id: Option<Uuid>,
        category_id: Option<Uuid>,
    ) -> AppResult<()> {
        if let Some(id) = brand_id {
            if self.store.find_brand(id).await?.is_none() {
                return Err(AppError::Validation(format!("Unknown brand {}", id)));
            }
        }
        if let Some(id) = category_id {
            if self.store.find_category(id).await?.is_none() {
                return Err(AppError::Validation(format!("Unknown category {}", id)));
            }
        }
        Ok(())
    }

    pub async fn create_product(&self, new: NewProduct) -> AppResult<Product> {
        if new.name.trim().is_empty() {
            return Err(AppError::Validation("Product name is required".to_string()));
        }
        if new.price < Decimal::ZERO {
            return Err(AppError::Validation("Price cannot be negative".to_string()));
        }
        if new.quantity < 0 {
            return Err(AppError::Validation("Quantity cannot be negative".to_string()));
        }
        self.ensure_catalog_refs(Some(new.brand_id), Some(new.category_id))
            .await?;

        info!("Creating product: name={}, quantity={}", new.name.trim(), new.quantity);
        self.store.create_product(&new).await
    }

    pub async fn update_product(&self, id: Uuid, update: ProductUpdate) -> AppResult<Product> {
        if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::Validation("Product name is required".to_string()));
        }
        if update.price.is_some_and(|p| p < Decimal::ZERO) {
            return Err(AppError::Validation("Price cannot be negative".to_string()));
        }
        if update.quantity.is_some_and(|q| q < 0) {
            return Err(AppError::Validation("Quantity cannot be negative".to_string()));
        }
        self.ensure_catalog_refs(update.brand_id, update.category_id)
            .await?;

        info!("Updating product {}", id);
        self.store.update_product(id, &update).await
    }

    pub async fn delete_product(&self, id: Uuid) -> AppResult<()> {
        info!("Deleting product {}", id);
        self.store.delete_product(id).await
    }

    pub async fn get_product(&self, id: Uuid) -> AppResult<Product> {
        self.store
            .find_product(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))
    }

    pub async fn list_products(
        &self,
        filter: &ProductFilter,
        page: usize,
        per_page: usize,
    ) -> AppResult<Page<Product>> {
        let products = filter.apply(self.store.list_products().await?);
        Ok(paginate(products, page, per_page))
    }

    pub async fn get_quantity(&self, id: Uuid) -> AppResult<i32> {
        self.store.get_quantity(id).await
    }

    /// Manual stock correction outside the ledgers
    pub async fn adjust_quantity(&self, id: Uuid, delta: i32) -> AppResult<i32> {
        info!("Adjusting product {} by {}", id, delta);
        self.store
            .adjust_quantity(id, delta, MovementCause::ManualEdit)
            .await
    }

    pub async fn movements(&self, id: Uuid) -> AppResult<Vec<StockMovement>> {
        self.get_product(id).await?;
        self.store.list_movements(id).await
    }
}
