pub mod aggregate;
pub mod filter;
pub mod pricing;

pub use aggregate::{
    buyer_totals, product_purchase_averages, product_sell_averages, seller_totals, sell_profit,
    stock_summary, total_paid, total_profit, total_revenue, BuyerTotal, ProductPurchaseAverage,
    ProductSellAverage, SellerTotal, StockSummary,
};
pub use filter::{paginate, Page, PriceRange, ProductFilter, PurchaseFilter, SellFilter, DEFAULT_PAGE_SIZE};
pub use pricing::{PurchasePriceIndex, FALLBACK_PURCHASE_PRICE_RATIO};
