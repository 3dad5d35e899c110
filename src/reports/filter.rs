use crate::models::{Product, Purchase, Sell, StockStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Items per page in listings
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Product price buckets; the first includes both ends, the rest are `(lo, hi]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceRange {
    #[serde(rename = "0-10")]
    UpTo10,
    #[serde(rename = "11-50")]
    UpTo50,
    #[serde(rename = "51-100")]
    UpTo100,
    #[serde(rename = "101-200")]
    UpTo200,
    #[serde(rename = "201-500")]
    UpTo500,
    #[serde(rename = "501-1000")]
    UpTo1000,
    #[serde(rename = "1000+")]
    Over1000,
}

impl PriceRange {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.trim().trim_start_matches('$') {
            "0-10" => Ok(Self::UpTo10),
            "11-50" => Ok(Self::UpTo50),
            "51-100" => Ok(Self::UpTo100),
            "101-200" => Ok(Self::UpTo200),
            "201-500" => Ok(Self::UpTo500),
            "501-1000" => Ok(Self::UpTo1000),
            "1000+" => Ok(Self::Over1000),
            _ => Err(format!("Invalid price range: {}", s)),
        }
    }

    pub fn contains(&self, price: Decimal) -> bool {
        let d = |n: i64| Decimal::from(n);
        match self {
            Self::UpTo10 => price >= Decimal::ZERO && price <= d(10),
            Self::UpTo50 => price > d(10) && price <= d(50),
            Self::UpTo100 => price > d(50) && price <= d(100),
            Self::UpTo200 => price > d(100) && price <= d(200),
            Self::UpTo500 => price > d(200) && price <= d(500),
            Self::UpTo1000 => price > d(500) && price <= d(1000),
            Self::Over1000 => price > d(1000),
        }
    }

    /// Parse a comma-separated list such as `0-10,1000+`
    pub fn parse_list(s: &str) -> Result<Vec<Self>, String> {
        s.split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Self::from_str)
            .collect()
    }
}

fn product_index(products: &[Product]) -> HashMap<Uuid, &Product> {
    products.iter().map(|p| (p.id, p)).collect()
}

/// Category and brand filters resolve through the record's product; a
/// record whose product is gone never matches them.
fn matches_catalog(
    product: Option<&&Product>,
    category_id: Option<Uuid>,
    brand_id: Option<Uuid>,
) -> bool {
    if category_id.is_none() && brand_id.is_none() {
        return true;
    }
    match product {
        Some(p) => {
            category_id.map_or(true, |c| p.category_id == c)
                && brand_id.map_or(true, |b| p.brand_id == b)
        }
        None => false,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SellFilter {
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub seller_id: Option<Uuid>,
}

impl SellFilter {
    pub fn apply(&self, sells: Vec<Sell>, products: &[Product]) -> Vec<Sell> {
        let index = product_index(products);
        sells
            .into_iter()
            .filter(|s| {
                matches_catalog(index.get(&s.product_id), self.category_id, self.brand_id)
                    && self.product_id.map_or(true, |id| s.product_id == id)
                    && self.seller_id.map_or(true, |id| s.seller_id == id)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PurchaseFilter {
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub firm_id: Option<Uuid>,
    pub buyer_id: Option<Uuid>,
    /// Creator of the record
    pub user_id: Option<Uuid>,
}

impl PurchaseFilter {
    pub fn apply(&self, purchases: Vec<Purchase>, products: &[Product]) -> Vec<Purchase> {
        let index = product_index(products);
        purchases
            .into_iter()
            .filter(|p| {
                matches_catalog(index.get(&p.product_id), self.category_id, self.brand_id)
                    && self.product_id.map_or(true, |id| p.product_id == id)
                    && self.firm_id.map_or(true, |id| p.firm_id == id)
                    && self.buyer_id.map_or(true, |id| p.buyer_id == id)
                    && self.user_id.map_or(true, |id| p.user_id == id)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub brand_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub stock_status: Option<StockStatus>,
    /// Any-of; empty matches every price
    pub price_ranges: Vec<PriceRange>,
    /// Case-insensitive substring of the name
    pub search: Option<String>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        self.brand_id.map_or(true, |id| product.brand_id == id)
            && self.category_id.map_or(true, |id| product.category_id == id)
            && self
                .stock_status
                .map_or(true, |status| product.stock_status() == status)
            && (self.price_ranges.is_empty()
                || self.price_ranges.iter().any(|r| r.contains(product.price)))
            && search.map_or(true, |needle| product.name.to_lowercase().contains(&needle))
    }

    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        products.into_iter().filter(|p| self.matches(p)).collect()
    }
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Slice `items` into 1-based pages, clamping `page` into `[1, total_pages]`
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);
    let page = page.clamp(1, total_pages.max(1));

    let items = items
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();

    Page {
        items,
        page,
        per_page,
        total_items,
        total_pages,
    }
}
