use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Quantity at which a product stops counting as low stock
pub const LOW_STOCK_THRESHOLD: i32 = 5;

/// Product model holding the current on-hand quantity and market price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub brand_id: Uuid,
    pub category_id: Uuid,
    pub price: Decimal, // NUMERIC(14, 2) in database
    pub quantity: i32,  // never negative, maintained by the ledgers
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Product {
    /// Create a new Product
    pub fn new(
        name: String,
        brand_id: Uuid,
        category_id: Uuid,
        price: Decimal,
        quantity: i32,
    ) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4(),
            name,
            brand_id,
            category_id,
            price,
            quantity,
            created_at: now,
            updated_at: now,
        }
    }

    /// Stock level bucket for this product
    pub fn stock_status(&self) -> StockStatus {
        StockStatus::from_quantity(self.quantity)
    }

    /// Market value of the stock on hand
    pub fn stock_value(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Stock level buckets used by the product listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    OutOfStock,
    Low,
    Available,
}

impl StockStatus {
    pub fn from_quantity(quantity: i32) -> Self {
        if quantity <= 0 {
            StockStatus::OutOfStock
        } else if quantity < LOW_STOCK_THRESHOLD {
            StockStatus::Low
        } else {
            StockStatus::Available
        }
    }

    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "out" | "out_of_stock" => Ok(StockStatus::OutOfStock),
            "low" => Ok(StockStatus::Low),
            "available" => Ok(StockStatus::Available),
            _ => Err(format!("Invalid stock status: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::OutOfStock => "out_of_stock",
            StockStatus::Low => "low",
            StockStatus::Available => "available",
        }
    }
}

/// Input for creating a product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub brand_id: Uuid,
    pub category_id: Uuid,
    pub price: Decimal,
    #[serde(default)]
    pub quantity: i32,
}

/// Partial product edit; `quantity` is an admin override journaled as a manual edit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub brand_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub price: Option<Decimal>,
    pub quantity: Option<i32>,
}
