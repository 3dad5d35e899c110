use crate::error::{AppError, AppResult};
use crate::models::{Brand, Category, Firm, NewFirm, NewUser, User};
use crate::store::InventoryStore;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Service for users, brands, categories and firms
pub struct ReferenceService {
    store: Arc<dyn InventoryStore>,
}

fn require_name(kind: &str, name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::Validation(format!("{} name is required", kind)));
    }
    Ok(())
}

impl ReferenceService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    pub async fn create_user(&self, new: NewUser) -> AppResult<User> {
        new.validate().map_err(AppError::Validation)?;
        info!("Creating user: username={}, role={}", new.username, new.role.as_str());
        self.store.create_user(&new).await
    }

    pub async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.store
            .find_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    pub async fn find_user_by_username(&self, username: &str) -> AppResult<User> {
        self.store
            .find_user_by_username(username.trim())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", username)))
    }

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.store.list_users().await
    }

    pub async fn create_brand(&self, name: &str) -> AppResult<Brand> {
        require_name("Brand", name)?;
        info!("Creating brand: {}", name.trim());
        self.store.create_brand(name).await
    }

    pub async fn list_brands(&self) -> AppResult<Vec<Brand>> {
        self.store.list_brands().await
    }

    pub async fn create_category(&self, name: &str) -> AppResult<Category> {
        require_name("Category", name)?;
        info!("Creating category: {}", name.trim());
        self.store.create_category(name).await
    }

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.store.list_categories().await
    }

    pub async fn create_firm(&self, new: NewFirm) -> AppResult<Firm> {
        require_name("Firm", &new.name)?;
        info!("Creating firm: {}", new.name.trim());
        self.store.create_firm(&new).await
    }

    pub async fn list_firms(&self) -> AppResult<Vec<Firm>> {
        self.store.list_firms().await
    }
}

/// Fail with `Validation` unless user `id` exists
pub(crate) async fn ensure_user(store: &dyn InventoryStore, id: Uuid, role: &str) -> AppResult<()> {
    match store.find_user(id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::Validation(format!("Unknown {} {}", role, id))),
    }
}

/// Fail with `Validation` unless firm `id` exists
pub(crate) async fn ensure_firm(store: &dyn InventoryStore, id: Uuid) -> AppResult<()> {
    match store.find_firm(id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::Validation(format!("Unknown firm {}", id))),
    }
}
