//! MusCo Backend Library
//!
//! Inventory backend for the purchase and sell ledgers. This module exposes
//! the backend components for use by the binary and by tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod expiry;
pub mod inventory;
pub mod models;
pub mod reports;
pub mod repositories;
pub mod services;
pub mod store;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};

use auth::SessionKeys;
use services::{ProductService, PurchaseService, ReferenceService, ReportService, SellService};
use std::sync::Arc;
use store::InventoryStore;

/// Application state shared by every request handler
pub struct AppState {
    pub store: Arc<dyn InventoryStore>,
    pub products: ProductService,
    pub purchases: PurchaseService,
    pub sells: SellService,
    pub references: ReferenceService,
    pub reports: ReportService,
    pub sessions: SessionKeys,
    /// `/auth/token` is served only when set
    pub allow_token_issue: bool,
}

impl AppState {
    /// Create a new AppState with services over `store`
    pub fn new(store: Arc<dyn InventoryStore>, sessions: SessionKeys, allow_token_issue: bool) -> Self {
        Self {
            products: ProductService::new(store.clone()),
            purchases: PurchaseService::new(store.clone()),
            sells: SellService::new(store.clone()),
            references: ReferenceService::new(store.clone()),
            reports: ReportService::new(store.clone()),
            store,
            sessions,
            allow_token_issue,
        }
    }

    /// State wired from configuration
    pub fn from_config(store: Arc<dyn InventoryStore>, config: &AppConfig) -> Self {
        Self::new(
            store,
            SessionKeys::new(config.auth_secret.clone(), config.session_ttl_secs),
            config.is_development(),
        )
    }
}
