use crate::error::AppResult;
use crate::reports::{
    buyer_totals, product_purchase_averages, product_sell_averages, seller_totals, stock_summary,
    total_paid, total_profit, total_revenue, BuyerTotal, ProductFilter, ProductPurchaseAverage,
    ProductSellAverage, PurchaseFilter, PurchasePriceIndex, SellFilter, SellerTotal, StockSummary,
};
use crate::store::InventoryStore;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseReport {
    pub count: usize,
    pub total_paid: Decimal,
    pub buyer_totals: Vec<BuyerTotal>,
    pub product_averages: Vec<ProductPurchaseAverage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellReport {
    pub count: usize,
    pub total_revenue: Decimal,
    pub total_profit: Decimal,
    pub seller_totals: Vec<SellerTotal>,
    pub product_averages: Vec<ProductSellAverage>,
}

/// Derived views over the ledgers, recomputed on every call
pub struct ReportService {
    store: Arc<dyn InventoryStore>,
}

impl ReportService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Cost index over the whole purchase ledger
    async fn price_index(&self) -> AppResult<PurchasePriceIndex> {
        let products = self.store.list_products().await?;
        let purchases = self.store.list_purchases().await?;
        Ok(PurchasePriceIndex::new(&products, &purchases))
    }

    pub async fn average_purchase_price(&self, product_id: Uuid) -> AppResult<Decimal> {
        Ok(self.price_index().await?.average_purchase_price(product_id))
    }

    pub async fn purchase_report(&self, filter: &PurchaseFilter) -> AppResult<PurchaseReport> {
        let products = self.store.list_products().await?;
        let purchases = filter.apply(self.store.list_purchases().await?, &products);
        debug!("Purchase report over {} records", purchases.len());

        Ok(PurchaseReport {
            count: purchases.len(),
            total_paid: total_paid(&purchases),
            buyer_totals: buyer_totals(&purchases),
            product_averages: product_purchase_averages(&purchases),
        })
    }

    /// Profit always uses the unfiltered purchase history for cost
    pub async fn sell_report(&self, filter: &SellFilter) -> AppResult<SellReport> {
        let products = self.store.list_products().await?;
        let prices = PurchasePriceIndex::new(&products, &self.store.list_purchases().await?);
        let sells = filter.apply(self.store.list_sells().await?, &products);
        debug!("Sell report over {} records", sells.len());

        Ok(SellReport {
            count: sells.len(),
            total_revenue: total_revenue(&sells),
            total_profit: total_profit(&sells, &prices),
            seller_totals: seller_totals(&sells, &prices),
            product_averages: product_sell_averages(&sells, &prices),
        })
    }

    pub async fn stock_report(&self, filter: &ProductFilter) -> AppResult<StockSummary> {
        let products = filter.apply(self.store.list_products().await?);
        Ok(stock_summary(&products))
    }
}
