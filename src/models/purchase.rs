use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Purchase model representing a single stock-in event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Purchase {
    pub id: Uuid,
    pub product_id: Uuid,
    pub brand_id: Uuid, // always the product's brand at write time
    pub user_id: Uuid,  // creator of the record
    pub buyer_id: Uuid,
    pub firm_id: Uuid,
    pub quantity: i32,
    pub purchase_price: Decimal,
    pub tester: bool,
    pub tester_created_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Purchase {
    /// Amount paid for this purchase (quantity * purchase_price)
    pub fn total(&self) -> Decimal {
        self.purchase_price * Decimal::from(self.quantity)
    }
}

/// Input for `create_purchase`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPurchase {
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub buyer_id: Uuid,
    pub firm_id: Uuid,
    pub quantity: i32,
    pub purchase_price: Decimal,
    #[serde(default)]
    pub tester: bool,
}

/// Input for `update_purchase`; the product of a purchase never changes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseUpdate {
    pub quantity: i32,
    pub purchase_price: Decimal,
    pub firm_id: Uuid,
    pub buyer_id: Uuid,
}
