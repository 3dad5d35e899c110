//! Domain models for the MusCo backend.
//!
//! Database-backed models for the product store, the purchase and sell
//! ledgers, and the reference data they point at.

pub mod product;
pub mod purchase;
pub mod reference;
pub mod sell;
pub mod stock_movement;
pub mod user;

// Re-export all models for convenient access
pub use product::{NewProduct, Product, ProductUpdate, StockStatus, LOW_STOCK_THRESHOLD};
pub use purchase::{NewPurchase, Purchase, PurchaseUpdate};
pub use reference::{Brand, Category, Firm, NewFirm};
pub use sell::{NewSell, Sell, SellUpdate};
pub use stock_movement::{LedgerOutcome, MovementCause, StockMovement};
pub use user::{NewUser, Role, User};
