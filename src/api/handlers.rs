use super::extract::{IdPath, JsonBody, QueryParams};
use super::{created, ok, ApiResult, CreatedResult};
use crate::auth::{Permission, Session};
use crate::error::AppError;
use crate::models::{
    Brand, Category, Firm, LedgerOutcome, NewFirm, NewProduct, NewPurchase, NewSell, NewUser,
    Product, ProductUpdate, Purchase, PurchaseUpdate, Role, Sell, SellUpdate, StockMovement,
    StockStatus, User,
};
use crate::reports::{Page, PriceRange, ProductFilter, PurchaseFilter, SellFilter, StockSummary, DEFAULT_PAGE_SIZE};
use crate::services::{PurchaseReport, SellReport};
use crate::AppState;
use axum::extract::State;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

type AppStateRef = State<Arc<AppState>>;

// =========================================================================
// Health and sessions
// =========================================================================

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health(State(state): AppStateRef) -> ApiResult<HealthStatus> {
    state.store.ping().await?;
    ok(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub user_id: Uuid,
    pub role: Role,
    pub expires_in: i64,
}

/// Issue a session token for an existing user; disabled outside development
pub async fn issue_token(
    State(state): AppStateRef,
    JsonBody(req): JsonBody<TokenRequest>,
) -> ApiResult<TokenResponse> {
    if !state.allow_token_issue {
        return Err(AppError::Forbidden(
            "Token issuance is only available in development".to_string(),
        ));
    }

    let user = state.references.find_user_by_username(&req.username).await?;
    let role = user.role_enum();
    let token = state
        .sessions
        .issue(user.id, role, chrono::Utc::now().timestamp())?;

    info!("Issued session token for {}", user.username);
    ok(TokenResponse {
        token,
        user_id: user.id,
        role,
        expires_in: state.sessions.ttl_secs(),
    })
}

// =========================================================================
// Reference data
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

pub async fn list_users(State(state): AppStateRef, _session: Session) -> ApiResult<Vec<User>> {
    ok(state.references.list_users().await?)
}

pub async fn create_user(
    State(state): AppStateRef,
    session: Session,
    JsonBody(new): JsonBody<NewUser>,
) -> CreatedResult<User> {
    session.require(Permission::ManageUsers)?;
    created(state.references.create_user(new).await?)
}

pub async fn list_brands(State(state): AppStateRef, _session: Session) -> ApiResult<Vec<Brand>> {
    ok(state.references.list_brands().await?)
}

pub async fn create_brand(
    State(state): AppStateRef,
    session: Session,
    JsonBody(req): JsonBody<NameRequest>,
) -> CreatedResult<Brand> {
    session.require(Permission::ManageCatalog)?;
    created(state.references.create_brand(&req.name).await?)
}

pub async fn list_categories(
    State(state): AppStateRef,
    _session: Session,
) -> ApiResult<Vec<Category>> {
    ok(state.references.list_categories().await?)
}

pub async fn create_category(
    State(state): AppStateRef,
    session: Session,
    JsonBody(req): JsonBody<NameRequest>,
) -> CreatedResult<Category> {
    session.require(Permission::ManageCatalog)?;
    created(state.references.create_category(&req.name).await?)
}

pub async fn list_firms(State(state): AppStateRef, _session: Session) -> ApiResult<Vec<Firm>> {
    ok(state.references.list_firms().await?)
}

pub async fn create_firm(
    State(state): AppStateRef,
    session: Session,
    JsonBody(new): JsonBody<NewFirm>,
) -> CreatedResult<Firm> {
    session.require(Permission::ManageCatalog)?;
    created(state.references.create_firm(new).await?)
}

// =========================================================================
// Products
// =========================================================================

/// Product listing query; `price_ranges` is comma-separated, e.g. `0-10,1000+`
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub brand_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub stock_status: Option<String>,
    pub price_ranges: Option<String>,
    pub search: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

impl ProductQuery {
    fn filter(&self) -> Result<ProductFilter, AppError> {
        let stock_status = self
            .stock_status
            .as_deref()
            .map(StockStatus::from_str)
            .transpose()
            .map_err(AppError::Validation)?;
        let price_ranges = self
            .price_ranges
            .as_deref()
            .map(PriceRange::parse_list)
            .transpose()
            .map_err(AppError::Validation)?
            .unwrap_or_default();

        Ok(ProductFilter {
            brand_id: self.brand_id,
            category_id: self.category_id,
            stock_status,
            price_ranges,
            search: self.search.clone(),
        })
    }
}

pub async fn list_products(
    State(state): AppStateRef,
    _session: Session,
    QueryParams(query): QueryParams<ProductQuery>,
) -> ApiResult<Page<Product>> {
    let filter = query.filter()?;
    let page = state
        .products
        .list_products(
            &filter,
            query.page.unwrap_or(1),
            query.per_page.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .await?;
    ok(page)
}

pub async fn create_product(
    State(state): AppStateRef,
    session: Session,
    JsonBody(new): JsonBody<NewProduct>,
) -> CreatedResult<Product> {
    session.require(Permission::ManageCatalog)?;
    created(state.products.create_product(new).await?)
}

pub async fn get_product(
    State(state): AppStateRef,
    _session: Session,
    IdPath(id): IdPath,
) -> ApiResult<Product> {
    ok(state.products.get_product(id).await?)
}

pub async fn update_product(
    State(state): AppStateRef,
    session: Session,
    IdPath(id): IdPath,
    JsonBody(update): JsonBody<ProductUpdate>,
) -> ApiResult<Product> {
    session.require(Permission::ManageCatalog)?;
    ok(state.products.update_product(id, update).await?)
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: Uuid,
}

pub async fn delete_product(
    State(state): AppStateRef,
    session: Session,
    IdPath(id): IdPath,
) -> ApiResult<Deleted> {
    session.require(Permission::ManageCatalog)?;
    state.products.delete_product(id).await?;
    ok(Deleted { id })
}

pub async fn list_movements(
    State(state): AppStateRef,
    _session: Session,
    IdPath(id): IdPath,
) -> ApiResult<Vec<StockMovement>> {
    ok(state.products.movements(id).await?)
}

// =========================================================================
// Purchases
// =========================================================================

/// Purchase body; the creator is always the session user
#[derive(Debug, Deserialize)]
pub struct CreatePurchaseRequest {
    pub product_id: Uuid,
    pub buyer_id: Uuid,
    pub firm_id: Uuid,
    pub quantity: i32,
    pub purchase_price: Decimal,
    #[serde(default)]
    pub tester: bool,
}

pub async fn list_purchases(
    State(state): AppStateRef,
    _session: Session,
    QueryParams(filter): QueryParams<PurchaseFilter>,
) -> ApiResult<Vec<Purchase>> {
    ok(state.purchases.list_purchases(&filter).await?)
}

pub async fn create_purchase(
    State(state): AppStateRef,
    session: Session,
    JsonBody(req): JsonBody<CreatePurchaseRequest>,
) -> CreatedResult<LedgerOutcome<Purchase>> {
    session.require(Permission::ManageLedger)?;
    let new = NewPurchase {
        product_id: req.product_id,
        user_id: session.user_id,
        buyer_id: req.buyer_id,
        firm_id: req.firm_id,
        quantity: req.quantity,
        purchase_price: req.purchase_price,
        tester: req.tester,
    };
    created(state.purchases.create_purchase(new).await?)
}

pub async fn get_purchase(
    State(state): AppStateRef,
    _session: Session,
    IdPath(id): IdPath,
) -> ApiResult<Purchase> {
    ok(state.purchases.get_purchase(id).await?)
}

pub async fn update_purchase(
    State(state): AppStateRef,
    session: Session,
    IdPath(id): IdPath,
    JsonBody(update): JsonBody<PurchaseUpdate>,
) -> ApiResult<LedgerOutcome<Purchase>> {
    session.require(Permission::ManageLedger)?;
    ok(state.purchases.update_purchase(id, update).await?)
}

pub async fn delete_purchase(
    State(state): AppStateRef,
    session: Session,
    IdPath(id): IdPath,
) -> ApiResult<LedgerOutcome<Purchase>> {
    session.require(Permission::ManageLedger)?;
    ok(state.purchases.delete_purchase(id).await?)
}

// =========================================================================
// Sells
// =========================================================================

/// Sell as returned by the API, with the derived amount
#[derive(Debug, Serialize)]
pub struct SellView {
    #[serde(flatten)]
    pub sell: Sell,
    pub amount: Decimal,
}

impl From<Sell> for SellView {
    fn from(sell: Sell) -> Self {
        Self {
            amount: sell.amount(),
            sell,
        }
    }
}

fn sell_outcome(outcome: LedgerOutcome<Sell>) -> LedgerOutcome<SellView> {
    LedgerOutcome {
        record: outcome.record.into(),
        product_quantity: outcome.product_quantity,
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateSellRequest {
    pub product_id: Uuid,
    pub seller_id: Uuid,
    pub quantity: i32,
    pub sell_price: Decimal,
    #[serde(default)]
    pub tester: bool,
}

pub async fn list_sells(
    State(state): AppStateRef,
    _session: Session,
    QueryParams(filter): QueryParams<SellFilter>,
) -> ApiResult<Vec<SellView>> {
    let sells = state.sells.list_sells(&filter).await?;
    ok(sells.into_iter().map(SellView::from).collect())
}

pub async fn create_sell(
    State(state): AppStateRef,
    session: Session,
    JsonBody(req): JsonBody<CreateSellRequest>,
) -> CreatedResult<LedgerOutcome<SellView>> {
    session.require(Permission::ManageLedger)?;
    let new = NewSell {
        product_id: req.product_id,
        user_id: session.user_id,
        seller_id: req.seller_id,
        quantity: req.quantity,
        sell_price: req.sell_price,
        tester: req.tester,
    };
    created(sell_outcome(state.sells.create_sell(new).await?))
}

pub async fn get_sell(
    State(state): AppStateRef,
    _session: Session,
    IdPath(id): IdPath,
) -> ApiResult<SellView> {
    ok(state.sells.get_sell(id).await?.into())
}

pub async fn update_sell(
    State(state): AppStateRef,
    session: Session,
    IdPath(id): IdPath,
    JsonBody(update): JsonBody<SellUpdate>,
) -> ApiResult<LedgerOutcome<SellView>> {
    session.require(Permission::ManageLedger)?;
    ok(sell_outcome(state.sells.update_sell(id, update).await?))
}

pub async fn delete_sell(
    State(state): AppStateRef,
    session: Session,
    IdPath(id): IdPath,
) -> ApiResult<LedgerOutcome<SellView>> {
    session.require(Permission::ManageLedger)?;
    ok(sell_outcome(state.sells.delete_sell(id).await?))
}

// =========================================================================
// Reports
// =========================================================================

pub async fn purchase_report(
    State(state): AppStateRef,
    _session: Session,
    QueryParams(filter): QueryParams<PurchaseFilter>,
) -> ApiResult<PurchaseReport> {
    ok(state.reports.purchase_report(&filter).await?)
}

pub async fn sell_report(
    State(state): AppStateRef,
    _session: Session,
    QueryParams(filter): QueryParams<SellFilter>,
) -> ApiResult<SellReport> {
    ok(state.reports.sell_report(&filter).await?)
}

pub async fn stock_report(
    State(state): AppStateRef,
    _session: Session,
    QueryParams(query): QueryParams<ProductQuery>,
) -> ApiResult<StockSummary> {
    ok(state.reports.stock_report(&query.filter()?).await?)
}
