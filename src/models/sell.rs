use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Sell model representing a single stock-out event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Sell {
    pub id: Uuid,
    pub product_id: Uuid,
    pub brand_id: Uuid,
    pub user_id: Uuid,
    pub seller_id: Uuid,
    pub quantity: i32,
    pub sell_price: Decimal,
    pub tester: bool,
    pub tester_created_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Sell {
    /// Derived amount (sell_price * quantity); never stored on its own
    pub fn amount(&self) -> Decimal {
        self.sell_price * Decimal::from(self.quantity)
    }
}

/// Input for `create_sell`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSell {
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub seller_id: Uuid,
    pub quantity: i32,
    pub sell_price: Decimal,
    #[serde(default)]
    pub tester: bool,
}

/// Input for `update_sell`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellUpdate {
    pub quantity: i32,
    pub sell_price: Decimal,
    pub seller_id: Uuid,
}
