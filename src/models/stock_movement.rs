//! Stock movement journal entries

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Why a product's quantity changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementCause {
    PurchaseCreated,
    PurchaseUpdated,
    PurchaseDeleted,
    SellCreated,
    SellUpdated,
    SellDeleted,
    ManualEdit,
    TesterExpired,
}

impl MovementCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PurchaseCreated => "purchase_created",
            Self::PurchaseUpdated => "purchase_updated",
            Self::PurchaseDeleted => "purchase_deleted",
            Self::SellCreated => "sell_created",
            Self::SellUpdated => "sell_updated",
            Self::SellDeleted => "sell_deleted",
            Self::ManualEdit => "manual_edit",
            Self::TesterExpired => "tester_expired",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "purchase_created" => Some(Self::PurchaseCreated),
            "purchase_updated" => Some(Self::PurchaseUpdated),
            "purchase_deleted" => Some(Self::PurchaseDeleted),
            "sell_created" => Some(Self::SellCreated),
            "sell_updated" => Some(Self::SellUpdated),
            "sell_deleted" => Some(Self::SellDeleted),
            "manual_edit" => Some(Self::ManualEdit),
            "tester_expired" => Some(Self::TesterExpired),
            _ => None,
        }
    }
}

/// One committed change to a product's quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub cause: String,
    pub reference_id: Option<Uuid>, // purchase or sell id, None for manual edits
    pub delta: i32,
    pub quantity_before: i32,
    pub quantity_after: i32,
    pub created_at: NaiveDateTime,
}

impl StockMovement {
    pub fn new(
        product_id: Uuid,
        cause: MovementCause,
        reference_id: Option<Uuid>,
        quantity_before: i32,
        quantity_after: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            cause: cause.as_str().to_string(),
            reference_id,
            delta: quantity_after - quantity_before,
            quantity_before,
            quantity_after,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    pub fn cause_enum(&self) -> Option<MovementCause> {
        MovementCause::from_str(&self.cause)
    }
}

/// Result of a ledger mutation: the record plus the product's adjusted quantity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerOutcome<T> {
    pub record: T,
    pub product_quantity: i32,
}
