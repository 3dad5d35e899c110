//! Brands, categories and firms

use crate::error::RepositoryError;
use crate::models::{Brand, Category, Firm, NewFirm};
use sqlx::PgPool;
use uuid::Uuid;

pub struct ReferenceRepository {
    pool: PgPool,
}

impl ReferenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Brands
    // =========================================================================

    pub async fn create_brand(&self, name: &str) -> Result<Brand, RepositoryError> {
        let brand = sqlx::query_as::<_, Brand>(
            "INSERT INTO brands (name) VALUES ($1) RETURNING id, name, created_at",
        )
        .bind(name.trim())
        .fetch_one(&self.pool)
        .await?;

        Ok(brand)
    }

    pub async fn find_brand(&self, id: Uuid) -> Result<Option<Brand>, RepositoryError> {
        let brand = sqlx::query_as::<_, Brand>("SELECT id, name, created_at FROM brands WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(brand)
    }

    pub async fn find_all_brands(&self) -> Result<Vec<Brand>, RepositoryError> {
        let brands = sqlx::query_as::<_, Brand>("SELECT id, name, created_at FROM brands ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(brands)
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub async fn create_category(&self, name: &str) -> Result<Category, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name, created_at",
        )
        .bind(name.trim())
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    pub async fn find_category(&self, id: Uuid) -> Result<Option<Category>, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, created_at FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    pub async fn find_all_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, created_at FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    // =========================================================================
    // Firms
    // =========================================================================

    pub async fn create_firm(&self, new: &NewFirm) -> Result<Firm, RepositoryError> {
        let firm = sqlx::query_as::<_, Firm>(
            r#"
            INSERT INTO firms (name, phone, address)
            VALUES ($1, $2, $3)
            RETURNING id, name, phone, address, created_at
            "#,
        )
        .bind(new.name.trim())
        .bind(new.phone.as_deref())
        .bind(new.address.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(firm)
    }

    pub async fn find_firm(&self, id: Uuid) -> Result<Option<Firm>, RepositoryError> {
        let firm = sqlx::query_as::<_, Firm>(
            "SELECT id, name, phone, address, created_at FROM firms WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(firm)
    }

    pub async fn find_all_firms(&self) -> Result<Vec<Firm>, RepositoryError> {
        let firms = sqlx::query_as::<_, Firm>(
            "SELECT id, name, phone, address, created_at FROM firms ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(firms)
    }
}
