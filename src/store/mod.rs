//! Storage seam for inventory state.
//!
//! Services talk to an [`InventoryStore`]; production runs on PostgreSQL and
//! development/tests can run on the in-memory book. Both backends apply the
//! same stock rules from [`crate::inventory`] and make every ledger mutation
//! atomic: either the quantity change, the record write and the journal entry
//! all happen, or none of them do.

pub mod memory;
pub mod postgres;

pub use memory::MemoryInventoryStore;
pub use postgres::PgInventoryStore;

use crate::error::AppResult;
use crate::models::{
    Brand, Category, Firm, LedgerOutcome, MovementCause, NewFirm, NewProduct, NewPurchase,
    NewSell, NewUser, Product, ProductUpdate, Purchase, PurchaseUpdate, Sell, SellUpdate,
    StockMovement, User,
};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Backend health check
    async fn ping(&self) -> AppResult<()>;

    // Users
    async fn create_user(&self, new: &NewUser) -> AppResult<User>;
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn list_users(&self) -> AppResult<Vec<User>>;

    // Reference data
    async fn create_brand(&self, name: &str) -> AppResult<Brand>;
    async fn find_brand(&self, id: Uuid) -> AppResult<Option<Brand>>;
    async fn list_brands(&self) -> AppResult<Vec<Brand>>;
    async fn create_category(&self, name: &str) -> AppResult<Category>;
    async fn find_category(&self, id: Uuid) -> AppResult<Option<Category>>;
    async fn list_categories(&self) -> AppResult<Vec<Category>>;
    async fn create_firm(&self, new: &NewFirm) -> AppResult<Firm>;
    async fn find_firm(&self, id: Uuid) -> AppResult<Option<Firm>>;
    async fn list_firms(&self) -> AppResult<Vec<Firm>>;

    // Product store
    async fn create_product(&self, new: &NewProduct) -> AppResult<Product>;
    async fn update_product(&self, id: Uuid, update: &ProductUpdate) -> AppResult<Product>;
    /// Fails with `Conflict` while any purchase or sell references the product
    async fn delete_product(&self, id: Uuid) -> AppResult<()>;
    async fn find_product(&self, id: Uuid) -> AppResult<Option<Product>>;
    async fn list_products(&self) -> AppResult<Vec<Product>>;
    async fn get_quantity(&self, product_id: Uuid) -> AppResult<i32>;
    /// Apply `delta` atomically; `InsufficientStock` if the result would be negative
    async fn adjust_quantity(
        &self,
        product_id: Uuid,
        delta: i32,
        cause: MovementCause,
    ) -> AppResult<i32>;

    // Purchase ledger
    async fn create_purchase(&self, new: &NewPurchase) -> AppResult<LedgerOutcome<Purchase>>;
    async fn update_purchase(
        &self,
        id: Uuid,
        update: &PurchaseUpdate,
    ) -> AppResult<LedgerOutcome<Purchase>>;
    async fn delete_purchase(
        &self,
        id: Uuid,
        cause: MovementCause,
    ) -> AppResult<LedgerOutcome<Purchase>>;
    async fn find_purchase(&self, id: Uuid) -> AppResult<Option<Purchase>>;
    async fn list_purchases(&self) -> AppResult<Vec<Purchase>>;

    // Sell ledger
    async fn create_sell(&self, new: &NewSell) -> AppResult<LedgerOutcome<Sell>>;
    async fn update_sell(&self, id: Uuid, update: &SellUpdate) -> AppResult<LedgerOutcome<Sell>>;
    async fn delete_sell(&self, id: Uuid, cause: MovementCause) -> AppResult<LedgerOutcome<Sell>>;
    async fn find_sell(&self, id: Uuid) -> AppResult<Option<Sell>>;
    async fn list_sells(&self) -> AppResult<Vec<Sell>>;

    // Tester expiry
    async fn expired_tester_purchases(&self, cutoff: NaiveDateTime) -> AppResult<Vec<Uuid>>;
    async fn expired_tester_sells(&self, cutoff: NaiveDateTime) -> AppResult<Vec<Uuid>>;

    /// Stock journal for a product, oldest first
    async fn list_movements(&self, product_id: Uuid) -> AppResult<Vec<StockMovement>>;
}
