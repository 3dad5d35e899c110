#![allow(dead_code)]

use musco_backend::auth::SessionKeys;
use musco_backend::models::*;
use musco_backend::store::{InventoryStore, MemoryInventoryStore};
use musco_backend::AppState;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-secret";

/// Seeded inventory: three users, one firm, brand and category, and a
/// product holding 10 units priced at 5
pub struct Fixture {
    pub store: Arc<dyn InventoryStore>,
    pub state: Arc<AppState>,
    pub admin: User,
    pub seller: User,
    pub buyer: User,
    pub coordinator: User,
    pub firm: Firm,
    pub brand: Brand,
    pub category: Category,
    pub product: Product,
}

pub fn dec(n: i64) -> Decimal {
    Decimal::from(n)
}

fn new_user(username: &str, role: Role) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: format!("{}@musco.com", username),
        first_name: username.to_string(),
        last_name: "Test".to_string(),
        role,
        tester: false,
    }
}

impl Fixture {
    /// Fixture over a fresh in-memory store
    pub async fn memory() -> Self {
        Self::seed(Arc::new(MemoryInventoryStore::new())).await
    }

    /// Seed reference data and one product into `store`
    pub async fn seed(store: Arc<dyn InventoryStore>) -> Self {
        let admin = store
            .create_user(&new_user("admin", Role::Admin))
            .await
            .expect("Failed to create admin");
        let seller = store
            .create_user(&new_user("seller", Role::Staff))
            .await
            .expect("Failed to create seller");
        let buyer = store
            .create_user(&new_user("buyer", Role::User))
            .await
            .expect("Failed to create buyer");
        let coordinator = store
            .create_user(&new_user("coordinator", Role::Coordinator))
            .await
            .expect("Failed to create coordinator");

        let firm = store
            .create_firm(&NewFirm {
                name: "Acme Supply".to_string(),
                phone: None,
                address: None,
            })
            .await
            .expect("Failed to create firm");
        let brand = store.create_brand("Dior").await.expect("Failed to create brand");
        let category = store
            .create_category("Perfume")
            .await
            .expect("Failed to create category");

        let product = store
            .create_product(&NewProduct {
                name: "Sauvage".to_string(),
                brand_id: brand.id,
                category_id: category.id,
                price: dec(5),
                quantity: 10,
            })
            .await
            .expect("Failed to create product");

        let state = Arc::new(AppState::new(
            store.clone(),
            SessionKeys::new(TEST_SECRET, 3600),
            true,
        ));

        Self {
            store,
            state,
            admin,
            seller,
            buyer,
            coordinator,
            firm,
            brand,
            category,
            product,
        }
    }

    pub fn purchase(&self, quantity: i32, price: i64) -> NewPurchase {
        NewPurchase {
            product_id: self.product.id,
            user_id: self.admin.id,
            buyer_id: self.buyer.id,
            firm_id: self.firm.id,
            quantity,
            purchase_price: dec(price),
            tester: false,
        }
    }

    pub fn sell(&self, quantity: i32, price: i64) -> NewSell {
        NewSell {
            product_id: self.product.id,
            user_id: self.admin.id,
            seller_id: self.seller.id,
            quantity,
            sell_price: dec(price),
            tester: false,
        }
    }

    /// Add a second product to the catalog
    pub async fn add_product(&self, name: &str, price: i64, quantity: i32) -> Product {
        self.store
            .create_product(&NewProduct {
                name: name.to_string(),
                brand_id: self.brand.id,
                category_id: self.category.id,
                price: dec(price),
                quantity,
            })
            .await
            .expect("Failed to create product")
    }

    pub async fn quantity(&self) -> i32 {
        self.state
            .products
            .get_quantity(self.product.id)
            .await
            .expect("Failed to read quantity")
    }

    /// Signed bearer token for `user`
    pub fn token(&self, user: &User) -> String {
        self.state
            .sessions
            .issue(user.id, user.role_enum(), chrono::Utc::now().timestamp())
            .expect("Failed to issue token")
    }
}

pub fn random_id() -> Uuid {
    Uuid::new_v4()
}
