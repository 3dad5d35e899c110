use super::InventoryStore;
use crate::database;
use crate::error::AppResult;
use crate::models::{
    Brand, Category, Firm, LedgerOutcome, MovementCause, NewFirm, NewProduct, NewPurchase,
    NewSell, NewUser, Product, ProductUpdate, Purchase, PurchaseUpdate, Sell, SellUpdate,
    StockMovement, User,
};
use crate::repositories::{
    ProductRepository, PurchaseRepository, ReferenceRepository, SellRepository,
    StockMovementRepository, UserRepository,
};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL-backed store delegating to the repositories
pub struct PgInventoryStore {
    pool: PgPool,
    users: UserRepository,
    references: ReferenceRepository,
    products: ProductRepository,
    purchases: PurchaseRepository,
    sells: SellRepository,
    movements: StockMovementRepository,
}

impl PgInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            references: ReferenceRepository::new(pool.clone()),
            products: ProductRepository::new(pool.clone()),
            purchases: PurchaseRepository::new(pool.clone()),
            sells: SellRepository::new(pool.clone()),
            movements: StockMovementRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl InventoryStore for PgInventoryStore {
    async fn ping(&self) -> AppResult<()> {
        database::ping(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, new: &NewUser) -> AppResult<User> {
        Ok(self.users.create(new).await?)
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.find_by_id(id).await?)
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self.users.find_by_username(username).await?)
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(self.users.find_all().await?)
    }

    async fn create_brand(&self, name: &str) -> AppResult<Brand> {
        Ok(self.references.create_brand(name).await?)
    }

    async fn find_brand(&self, id: Uuid) -> AppResult<Option<Brand>> {
        Ok(self.references.find_brand(id).await?)
    }

    async fn list_brands(&self) -> AppResult<Vec<Brand>> {
        Ok(self.references.find_all_brands().await?)
    }

    async fn create_category(&self, name: &str) -> AppResult<Category> {
        Ok(self.references.create_category(name).await?)
    }

    async fn find_category(&self, id: Uuid) -> AppResult<Option<Category>> {
        Ok(self.references.find_category(id).await?)
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        Ok(self.references.find_all_categories().await?)
    }

    async fn create_firm(&self, new: &NewFirm) -> AppResult<Firm> {
        Ok(self.references.create_firm(new).await?)
    }

    async fn find_firm(&self, id: Uuid) -> AppResult<Option<Firm>> {
        Ok(self.references.find_firm(id).await?)
    }

    async fn list_firms(&self) -> AppResult<Vec<Firm>> {
        Ok(self.references.find_all_firms().await?)
    }

    async fn create_product(&self, new: &NewProduct) -> AppResult<Product> {
        Ok(self.products.create(new).await?)
    }

    async fn update_product(&self, id: Uuid, update: &ProductUpdate) -> AppResult<Product> {
        Ok(self.products.update(id, update).await?)
    }

    async fn delete_product(&self, id: Uuid) -> AppResult<()> {
        Ok(self.products.delete(id).await?)
    }

    async fn find_product(&self, id: Uuid) -> AppResult<Option<Product>> {
        Ok(self.products.find_by_id(id).await?)
    }

    async fn list_products(&self) -> AppResult<Vec<Product>> {
        Ok(self.products.find_all().await?)
    }

    async fn get_quantity(&self, product_id: Uuid) -> AppResult<i32> {
        Ok(self.products.get_quantity(product_id).await?)
    }

    async fn adjust_quantity(
        &self,
        product_id: Uuid,
        delta: i32,
        cause: MovementCause,
    ) -> AppResult<i32> {
        Ok(self.products.adjust_quantity(product_id, delta, cause).await?)
    }

    async fn create_purchase(&self, new: &NewPurchase) -> AppResult<LedgerOutcome<Purchase>> {
        Ok(self.purchases.create(new).await?)
    }

    async fn update_purchase(
        &self,
        id: Uuid,
        update: &PurchaseUpdate,
    ) -> AppResult<LedgerOutcome<Purchase>> {
        Ok(self.purchases.update(id, update).await?)
    }

    async fn delete_purchase(
        &self,
        id: Uuid,
        cause: MovementCause,
    ) -> AppResult<LedgerOutcome<Purchase>> {
        Ok(self.purchases.delete(id, cause).await?)
    }

    async fn find_purchase(&self, id: Uuid) -> AppResult<Option<Purchase>> {
        Ok(self.purchases.find_by_id(id).await?)
    }

    async fn list_purchases(&self) -> AppResult<Vec<Purchase>> {
        Ok(self.purchases.find_all().await?)
    }

    async fn create_sell(&self, new: &NewSell) -> AppResult<LedgerOutcome<Sell>> {
        Ok(self.sells.create(new).await?)
    }

    async fn update_sell(&self, id: Uuid, update: &SellUpdate) -> AppResult<LedgerOutcome<Sell>> {
        Ok(self.sells.update(id, update).await?)
    }

    async fn delete_sell(&self, id: Uuid, cause: MovementCause) -> AppResult<LedgerOutcome<Sell>> {
        Ok(self.sells.delete(id, cause).await?)
    }

    async fn find_sell(&self, id: Uuid) -> AppResult<Option<Sell>> {
        Ok(self.sells.find_by_id(id).await?)
    }

    async fn list_sells(&self) -> AppResult<Vec<Sell>> {
        Ok(self.sells.find_all().await?)
    }

    async fn expired_tester_purchases(&self, cutoff: NaiveDateTime) -> AppResult<Vec<Uuid>> {
        Ok(self.purchases.find_expired_testers(cutoff).await?)
    }

    async fn expired_tester_sells(&self, cutoff: NaiveDateTime) -> AppResult<Vec<Uuid>> {
        Ok(self.sells.find_expired_testers(cutoff).await?)
    }

    async fn list_movements(&self, product_id: Uuid) -> AppResult<Vec<StockMovement>> {
        Ok(self.movements.find_by_product(product_id).await?)
    }
}
