//! In-memory store for development and tests.
//!
//! The whole book sits behind one `tokio::sync::Mutex`, so each ledger
//! mutation's check-and-adjust is a single critical section.

use super::InventoryStore;
use crate::error::{AppError, AppResult};
use crate::inventory::{apply_delta, LedgerChange};
use crate::models::{
    Brand, Category, Firm, LedgerOutcome, MovementCause, NewFirm, NewProduct, NewPurchase,
    NewSell, NewUser, Product, ProductUpdate, Purchase, PurchaseUpdate, Sell, SellUpdate,
    StockMovement, User,
};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct Book {
    users: HashMap<Uuid, User>,
    brands: HashMap<Uuid, Brand>,
    categories: HashMap<Uuid, Category>,
    firms: HashMap<Uuid, Firm>,
    products: HashMap<Uuid, Product>,
    purchases: HashMap<Uuid, Purchase>,
    sells: HashMap<Uuid, Sell>,
    movements: Vec<StockMovement>,
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn duplicate(what: &str, value: &str) -> AppError {
    AppError::Validation(format!("Duplicate: {} {} already exists", what, value))
}

/// Newest first, id as tie-breaker
fn newest_first<T: Clone>(
    items: &HashMap<Uuid, T>,
    key: impl Fn(&T) -> (NaiveDateTime, Uuid),
) -> Vec<T> {
    let mut out: Vec<T> = items.values().cloned().collect();
    out.sort_by(|a, b| key(b).cmp(&key(a)));
    out
}

impl Book {
    fn product(&self, id: Uuid) -> AppResult<&Product> {
        self.products
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))
    }

    /// Check and apply a stock delta, then journal it. A zero delta leaves no trace.
    fn apply_stock(
        &mut self,
        product_id: Uuid,
        delta: i32,
        cause: MovementCause,
        reference_id: Option<Uuid>,
    ) -> AppResult<(Uuid, i32)> {
        let product = self
            .products
            .get_mut(&product_id)
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", product_id)))?;

        let before = product.quantity;
        let after =
            apply_delta(before, delta).map_err(|e| AppError::from_stock(product_id, e))?;
        if delta == 0 {
            return Ok((product.brand_id, before));
        }

        product.quantity = after;
        product.updated_at = now();
        let brand_id = product.brand_id;

        self.movements.push(StockMovement::new(
            product_id,
            cause,
            reference_id,
            before,
            after,
        ));

        Ok((brand_id, after))
    }

    fn check_change(product_id: Uuid, change: &LedgerChange) -> AppResult<()> {
        change
            .validate()
            .map_err(|e| AppError::from_stock(product_id, e))
    }
}

/// Inventory book held in process memory
#[derive(Default)]
pub struct MemoryInventoryStore {
    book: Mutex<Book>,
}

impl MemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InventoryStore for MemoryInventoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn create_user(&self, new: &NewUser) -> AppResult<User> {
        let mut book = self.book.lock().await;
        let username = new.username.trim().to_string();
        let email = new.email.trim().to_lowercase();

        if book.users.values().any(|u| u.username == username) {
            return Err(duplicate("username", &username));
        }
        if book.users.values().any(|u| u.email == email) {
            return Err(duplicate("email", &email));
        }

        let created_at = now();
        let user = User {
            id: Uuid::new_v4(),
            username,
            email,
            first_name: new.first_name.trim().to_string(),
            last_name: new.last_name.trim().to_string(),
            role: new.role.into(),
            tester: new.tester,
            tester_created_at: new.tester.then_some(created_at),
            created_at,
        };
        book.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.book.lock().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let book = self.book.lock().await;
        Ok(book.users.values().find(|u| u.username == username).cloned())
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let book = self.book.lock().await;
        let mut users: Vec<User> = book.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn create_brand(&self, name: &str) -> AppResult<Brand> {
        let mut book = self.book.lock().await;
        let name = name.trim().to_string();
        if book.brands.values().any(|b| b.name == name) {
            return Err(duplicate("brand", &name));
        }
        let brand = Brand {
            id: Uuid::new_v4(),
            name,
            created_at: now(),
        };
        book.brands.insert(brand.id, brand.clone());
        Ok(brand)
    }

    async fn find_brand(&self, id: Uuid) -> AppResult<Option<Brand>> {
        Ok(self.book.lock().await.brands.get(&id).cloned())
    }

    async fn list_brands(&self) -> AppResult<Vec<Brand>> {
        let book = self.book.lock().await;
        let mut brands: Vec<Brand> = book.brands.values().cloned().collect();
        brands.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(brands)
    }

    async fn create_category(&self, name: &str) -> AppResult<Category> {
        let mut book = self.book.lock().await;
        let name = name.trim().to_string();
        if book.categories.values().any(|c| c.name == name) {
            return Err(duplicate("category", &name));
        }
        let category = Category {
            id: Uuid::new_v4(),
            name,
            created_at: now(),
        };
        book.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn find_category(&self, id: Uuid) -> AppResult<Option<Category>> {
        Ok(self.book.lock().await.categories.get(&id).cloned())
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let book = self.book.lock().await;
        let mut categories: Vec<Category> = book.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn create_firm(&self, new: &NewFirm) -> AppResult<Firm> {
        let mut book = self.book.lock().await;
        let name = new.name.trim().to_string();
        if book.firms.values().any(|f| f.name == name) {
            return Err(duplicate("firm", &name));
        }
        let firm = Firm {
            id: Uuid::new_v4(),
            name,
            phone: new.phone.clone(),
            address: new.address.clone(),
            created_at: now(),
        };
        book.firms.insert(firm.id, firm.clone());
        Ok(firm)
    }

    async fn find_firm(&self, id: Uuid) -> AppResult<Option<Firm>> {
        Ok(self.book.lock().await.firms.get(&id).cloned())
    }

    async fn list_firms(&self) -> AppResult<Vec<Firm>> {
        let book = self.book.lock().await;
        let mut firms: Vec<Firm> = book.firms.values().cloned().collect();
        firms.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(firms)
    }

    async fn create_product(&self, new: &NewProduct) -> AppResult<Product> {
        let mut book = self.book.lock().await;
        if new.quantity < 0 {
            return Err(AppError::Validation("Quantity cannot be negative".to_string()));
        }
        let product = Product::new(
            new.name.trim().to_string(),
            new.brand_id,
            new.category_id,
            new.price,
            new.quantity,
        );
        book.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: Uuid, update: &ProductUpdate) -> AppResult<Product> {
        let mut book = self.book.lock().await;
        let current = book.product(id)?.quantity;

        if let Some(target) = update.quantity {
            if target < 0 {
                return Err(AppError::Validation("Quantity cannot be negative".to_string()));
            }
            if target != current {
                book.apply_stock(id, target - current, MovementCause::ManualEdit, None)?;
            }
        }

        let product = book
            .products
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))?;
        if let Some(name) = &update.name {
            product.name = name.trim().to_string();
        }
        if let Some(brand_id) = update.brand_id {
            product.brand_id = brand_id;
        }
        if let Some(category_id) = update.category_id {
            product.category_id = category_id;
        }
        if let Some(price) = update.price {
            product.price = price;
        }
        product.updated_at = now();
        Ok(product.clone())
    }

    async fn delete_product(&self, id: Uuid) -> AppResult<()> {
        let mut book = self.book.lock().await;
        book.product(id)?;

        let references = book.purchases.values().filter(|p| p.product_id == id).count()
            + book.sells.values().filter(|s| s.product_id == id).count();
        if references > 0 {
            return Err(AppError::Conflict(format!(
                "Product {} is referenced by {} ledger records",
                id, references
            )));
        }

        book.products.remove(&id);
        book.movements.retain(|m| m.product_id != id);
        Ok(())
    }

    async fn find_product(&self, id: Uuid) -> AppResult<Option<Product>> {
        Ok(self.book.lock().await.products.get(&id).cloned())
    }

    async fn list_products(&self) -> AppResult<Vec<Product>> {
        let book = self.book.lock().await;
        Ok(newest_first(&book.products, |p| (p.created_at, p.id)))
    }

    async fn get_quantity(&self, product_id: Uuid) -> AppResult<i32> {
        Ok(self.book.lock().await.product(product_id)?.quantity)
    }

    async fn adjust_quantity(
        &self,
        product_id: Uuid,
        delta: i32,
        cause: MovementCause,
    ) -> AppResult<i32> {
        let mut book = self.book.lock().await;
        let (_, after) = book.apply_stock(product_id, delta, cause, None)?;
        Ok(after)
    }

    async fn create_purchase(&self, new: &NewPurchase) -> AppResult<LedgerOutcome<Purchase>> {
        let change = LedgerChange::PurchaseCreated {
            quantity: new.quantity,
        };
        Book::check_change(new.product_id, &change)?;

        let mut book = self.book.lock().await;
        let id = Uuid::new_v4();
        let (brand_id, product_quantity) =
            book.apply_stock(new.product_id, change.stock_delta(), change.cause(), Some(id))?;

        let created_at = now();
        let purchase = Purchase {
            id,
            product_id: new.product_id,
            brand_id,
            user_id: new.user_id,
            buyer_id: new.buyer_id,
            firm_id: new.firm_id,
            quantity: new.quantity,
            purchase_price: new.purchase_price,
            tester: new.tester,
            tester_created_at: new.tester.then_some(created_at),
            created_at,
            updated_at: created_at,
        };
        book.purchases.insert(id, purchase.clone());

        Ok(LedgerOutcome {
            record: purchase,
            product_quantity,
        })
    }

    async fn update_purchase(
        &self,
        id: Uuid,
        update: &PurchaseUpdate,
    ) -> AppResult<LedgerOutcome<Purchase>> {
        let mut book = self.book.lock().await;
        let existing = book
            .purchases
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Purchase {} not found", id)))?;

        let change = LedgerChange::PurchaseUpdated {
            old_quantity: existing.quantity,
            new_quantity: update.quantity,
        };
        Book::check_change(existing.product_id, &change)?;
        let (_, product_quantity) = book.apply_stock(
            existing.product_id,
            change.stock_delta(),
            change.cause(),
            Some(id),
        )?;

        let purchase = Purchase {
            quantity: update.quantity,
            purchase_price: update.purchase_price,
            firm_id: update.firm_id,
            buyer_id: update.buyer_id,
            updated_at: now(),
            ..existing
        };
        book.purchases.insert(id, purchase.clone());

        Ok(LedgerOutcome {
            record: purchase,
            product_quantity,
        })
    }

    async fn delete_purchase(
        &self,
        id: Uuid,
        cause: MovementCause,
    ) -> AppResult<LedgerOutcome<Purchase>> {
        let mut book = self.book.lock().await;
        let existing = book
            .purchases
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Purchase {} not found", id)))?;

        let change = LedgerChange::PurchaseDeleted {
            quantity: existing.quantity,
        };
        let (_, product_quantity) =
            book.apply_stock(existing.product_id, change.stock_delta(), cause, Some(id))?;
        book.purchases.remove(&id);

        Ok(LedgerOutcome {
            record: existing,
            product_quantity,
        })
    }

    async fn find_purchase(&self, id: Uuid) -> AppResult<Option<Purchase>> {
        Ok(self.book.lock().await.purchases.get(&id).cloned())
    }

    async fn list_purchases(&self) -> AppResult<Vec<Purchase>> {
        let book = self.book.lock().await;
        Ok(newest_first(&book.purchases, |p| (p.created_at, p.id)))
    }

    async fn create_sell(&self, new: &NewSell) -> AppResult<LedgerOutcome<Sell>> {
        let change = LedgerChange::SellCreated {
            quantity: new.quantity,
        };
        Book::check_change(new.product_id, &change)?;

        let mut book = self.book.lock().await;
        let id = Uuid::new_v4();
        let (brand_id, product_quantity) =
            book.apply_stock(new.product_id, change.stock_delta(), change.cause(), Some(id))?;

        let created_at = now();
        let sell = Sell {
            id,
            product_id: new.product_id,
            brand_id,
            user_id: new.user_id,
            seller_id: new.seller_id,
            quantity: new.quantity,
            sell_price: new.sell_price,
            tester: new.tester,
            tester_created_at: new.tester.then_some(created_at),
            created_at,
            updated_at: created_at,
        };
        book.sells.insert(id, sell.clone());

        Ok(LedgerOutcome {
            record: sell,
            product_quantity,
        })
    }

    async fn update_sell(&self, id: Uuid, update: &SellUpdate) -> AppResult<LedgerOutcome<Sell>> {
        let mut book = self.book.lock().await;
        let existing = book
            .sells
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Sell {} not found", id)))?;

        let change = LedgerChange::SellUpdated {
            old_quantity: existing.quantity,
            new_quantity: update.quantity,
        };
        Book::check_change(existing.product_id, &change)?;
        let (_, product_quantity) = book.apply_stock(
            existing.product_id,
            change.stock_delta(),
            change.cause(),
            Some(id),
        )?;

        let sell = Sell {
            quantity: update.quantity,
            sell_price: update.sell_price,
            seller_id: update.seller_id,
            updated_at: now(),
            ..existing
        };
        book.sells.insert(id, sell.clone());

        Ok(LedgerOutcome {
            record: sell,
            product_quantity,
        })
    }

    async fn delete_sell(&self, id: Uuid, cause: MovementCause) -> AppResult<LedgerOutcome<Sell>> {
        let mut book = self.book.lock().await;
        let existing = book
            .sells
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Sell {} not found", id)))?;

        let change = LedgerChange::SellDeleted {
            quantity: existing.quantity,
        };
        let (_, product_quantity) =
            book.apply_stock(existing.product_id, change.stock_delta(), cause, Some(id))?;
        book.sells.remove(&id);

        Ok(LedgerOutcome {
            record: existing,
            product_quantity,
        })
    }

    async fn find_sell(&self, id: Uuid) -> AppResult<Option<Sell>> {
        Ok(self.book.lock().await.sells.get(&id).cloned())
    }

    async fn list_sells(&self) -> AppResult<Vec<Sell>> {
        let book = self.book.lock().await;
        Ok(newest_first(&book.sells, |s| (s.created_at, s.id)))
    }

    async fn expired_tester_purchases(&self, cutoff: NaiveDateTime) -> AppResult<Vec<Uuid>> {
        let book = self.book.lock().await;
        let mut expired: Vec<(NaiveDateTime, Uuid)> = book
            .purchases
            .values()
            .filter_map(|p| match (p.tester, p.tester_created_at) {
                (true, Some(at)) if at < cutoff => Some((at, p.id)),
                _ => None,
            })
            .collect();
        expired.sort();
        Ok(expired.into_iter().map(|(_, id)| id).collect())
    }

    async fn expired_tester_sells(&self, cutoff: NaiveDateTime) -> AppResult<Vec<Uuid>> {
        let book = self.book.lock().await;
        let mut expired: Vec<(NaiveDateTime, Uuid)> = book
            .sells
            .values()
            .filter_map(|s| match (s.tester, s.tester_created_at) {
                (true, Some(at)) if at < cutoff => Some((at, s.id)),
                _ => None,
            })
            .collect();
        expired.sort();
        Ok(expired.into_iter().map(|(_, id)| id).collect())
    }

    async fn list_movements(&self, product_id: Uuid) -> AppResult<Vec<StockMovement>> {
        let book = self.book.lock().await;
        Ok(book
            .movements
            .iter()
            .filter(|m| m.product_id == product_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    async fn seeded(quantity: i32) -> (MemoryInventoryStore, Uuid) {
        let store = MemoryInventoryStore::new();
        let brand = store.create_brand("Fender").await.unwrap();
        let category = store.create_category("Guitars").await.unwrap();
        let product = store
            .create_product(&NewProduct {
                name: "Strat".to_string(),
                brand_id: brand.id,
                category_id: category.id,
                price: Decimal::new(5, 0),
                quantity,
            })
            .await
            .unwrap();
        (store, product.id)
    }

    #[tokio::test]
    async fn test_adjust_quantity_journals_change() {
        let (store, product_id) = seeded(10).await;

        assert_eq!(
            store
                .adjust_quantity(product_id, -4, MovementCause::ManualEdit)
                .await
                .unwrap(),
            6
        );
        let err = store
            .adjust_quantity(product_id, -7, MovementCause::ManualEdit)
            .await
            .unwrap_err();
        assert!(err.is_insufficient_stock());
        assert_eq!(store.get_quantity(product_id).await.unwrap(), 6);

        let movements = store.list_movements(product_id).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].quantity_before, 10);
        assert_eq!(movements[0].quantity_after, 6);
        assert_eq!(movements[0].delta, -4);
    }

    #[tokio::test]
    async fn test_manual_quantity_override() {
        let (store, product_id) = seeded(3).await;

        let product = store
            .update_product(
                product_id,
                &ProductUpdate {
                    quantity: Some(8),
                    ..ProductUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(product.quantity, 8);

        let movements = store.list_movements(product_id).await.unwrap();
        assert_eq!(movements[0].cause_enum(), Some(MovementCause::ManualEdit));
    }

    #[tokio::test]
    async fn test_duplicate_brand_rejected() {
        let store = MemoryInventoryStore::new();
        store.create_brand("Yamaha").await.unwrap();
        assert!(matches!(
            store.create_brand(" Yamaha ").await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let store = MemoryInventoryStore::new();
        assert!(store.get_quantity(Uuid::new_v4()).await.unwrap_err().is_not_found());
    }
}
