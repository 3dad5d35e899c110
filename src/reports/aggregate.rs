//! Totals and group-bys over fetched ledger collections.
//!
//! Every function here is pure: same input, same output. Group-by results
//! are ordered by key.

use super::pricing::PurchasePriceIndex;
use crate::models::{Product, Purchase, Sell, StockStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Σ quantity × purchase_price
pub fn total_paid(purchases: &[Purchase]) -> Decimal {
    purchases.iter().map(Purchase::total).sum()
}

/// Σ quantity × sell_price
pub fn total_revenue(sells: &[Sell]) -> Decimal {
    sells.iter().map(Sell::amount).sum()
}

/// Profit of one sell against the product's average cost
pub fn sell_profit(sell: &Sell, prices: &PurchasePriceIndex) -> Decimal {
    (sell.sell_price - prices.average_purchase_price(sell.product_id)) * Decimal::from(sell.quantity)
}

/// Σ (sell_price − average_purchase_price) × quantity
pub fn total_profit(sells: &[Sell], prices: &PurchasePriceIndex) -> Decimal {
    sells.iter().map(|s| sell_profit(s, prices)).sum()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyerTotal {
    pub buyer_id: Uuid,
    pub total_spent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerTotal {
    pub seller_id: Uuid,
    pub total_sold: Decimal,
    pub total_profit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPurchaseAverage {
    pub product_id: Uuid,
    pub avg_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSellAverage {
    pub product_id: Uuid,
    pub avg_sell_price: Decimal,
    pub avg_profit: Decimal,
}

/// Money spent per buyer
pub fn buyer_totals(purchases: &[Purchase]) -> Vec<BuyerTotal> {
    let mut grouped: BTreeMap<Uuid, Decimal> = BTreeMap::new();
    for purchase in purchases {
        *grouped.entry(purchase.buyer_id).or_default() += purchase.total();
    }

    grouped
        .into_iter()
        .map(|(buyer_id, total_spent)| BuyerTotal {
            buyer_id,
            total_spent,
        })
        .collect()
}

/// Revenue and profit per seller
pub fn seller_totals(sells: &[Sell], prices: &PurchasePriceIndex) -> Vec<SellerTotal> {
    let mut grouped: BTreeMap<Uuid, (Decimal, Decimal)> = BTreeMap::new();
    for sell in sells {
        let entry = grouped.entry(sell.seller_id).or_default();
        entry.0 += sell.amount();
        entry.1 += sell_profit(sell, prices);
    }

    grouped
        .into_iter()
        .map(|(seller_id, (total_sold, total_profit))| SellerTotal {
            seller_id,
            total_sold,
            total_profit,
        })
        .collect()
}

fn weighted_mean(total: Decimal, quantity: i64) -> Decimal {
    if quantity > 0 {
        total / Decimal::from(quantity)
    } else {
        Decimal::ZERO
    }
}

/// Average purchase price per product over the given purchases
pub fn product_purchase_averages(purchases: &[Purchase]) -> Vec<ProductPurchaseAverage> {
    let mut grouped: BTreeMap<Uuid, (Decimal, i64)> = BTreeMap::new();
    for purchase in purchases {
        let entry = grouped.entry(purchase.product_id).or_default();
        entry.0 += purchase.total();
        entry.1 += i64::from(purchase.quantity);
    }

    grouped
        .into_iter()
        .map(|(product_id, (spent, quantity))| ProductPurchaseAverage {
            product_id,
            avg_price: weighted_mean(spent, quantity),
        })
        .collect()
}

/// Average sell price and per-unit profit per product
pub fn product_sell_averages(
    sells: &[Sell],
    prices: &PurchasePriceIndex,
) -> Vec<ProductSellAverage> {
    let mut grouped: BTreeMap<Uuid, (Decimal, i64)> = BTreeMap::new();
    for sell in sells {
        let entry = grouped.entry(sell.product_id).or_default();
        entry.0 += sell.amount();
        entry.1 += i64::from(sell.quantity);
    }

    grouped
        .into_iter()
        .map(|(product_id, (sold, quantity))| {
            let avg_sell_price = weighted_mean(sold, quantity);
            ProductSellAverage {
                product_id,
                avg_sell_price,
                avg_profit: avg_sell_price - prices.average_purchase_price(product_id),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSummary {
    pub total: usize,
    pub out_of_stock: usize,
    pub low_stock: usize,
    pub available: usize,
    /// Σ price × quantity over the summarized products
    pub total_value: Decimal,
}

/// Count products per stock bucket and value the stock on hand
pub fn stock_summary(products: &[Product]) -> StockSummary {
    products
        .iter()
        .fold(StockSummary::default(), |mut summary, product| {
            summary.total += 1;
            summary.total_value += product.stock_value();
            match product.stock_status() {
                StockStatus::OutOfStock => summary.out_of_stock += 1,
                StockStatus::Low => summary.low_stock += 1,
                StockStatus::Available => summary.available += 1,
            }
            summary
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sell(product_id: Uuid, seller_id: Uuid, quantity: i32, price: i64) -> Sell {
        let now = chrono::Utc::now().naive_utc();
        Sell {
            id: Uuid::new_v4(),
            product_id,
            brand_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            seller_id,
            quantity,
            sell_price: Decimal::new(price, 0),
            tester: false,
            tester_created_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn product_with(quantity: i32) -> Product {
        Product::new(
            "Pick".to_string(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Decimal::new(4, 0),
            quantity,
        )
    }

    #[test]
    fn test_revenue_and_profit_with_fallback_cost() {
        let product = product_with(10);
        let prices = PurchasePriceIndex::new(&[product.clone()], &[]);
        let seller = Uuid::new_v4();
        let sells = vec![sell(product.id, seller, 2, 10), sell(product.id, seller, 1, 6)];

        assert_eq!(total_revenue(&sells), Decimal::new(26, 0));
        // Cost falls back to 0.75 * 4 = 3
        assert_eq!(total_profit(&sells, &prices), Decimal::new(17, 0));
        assert_eq!(total_profit(&sells, &prices), total_profit(&sells, &prices));
    }

    #[test]
    fn test_seller_totals_sorted_by_key() {
        let product = product_with(10);
        let prices = PurchasePriceIndex::new(&[product.clone()], &[]);
        let (a, b) = {
            let x = Uuid::new_v4();
            let y = Uuid::new_v4();
            if x < y { (x, y) } else { (y, x) }
        };
        let sells = vec![
            sell(product.id, b, 1, 5),
            sell(product.id, a, 2, 5),
            sell(product.id, b, 3, 5),
        ];

        let totals = seller_totals(&sells, &prices);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].seller_id, a);
        assert_eq!(totals[0].total_sold, Decimal::new(10, 0));
        assert_eq!(totals[1].seller_id, b);
        assert_eq!(totals[1].total_sold, Decimal::new(20, 0));
        assert_eq!(totals[1].total_profit, Decimal::new(8, 0));
    }

    #[test]
    fn test_product_sell_averages() {
        let product = product_with(10);
        let prices = PurchasePriceIndex::new(&[product.clone()], &[]);
        let seller = Uuid::new_v4();
        let sells = vec![sell(product.id, seller, 1, 4), sell(product.id, seller, 3, 8)];

        let averages = product_sell_averages(&sells, &prices);
        assert_eq!(averages.len(), 1);
        assert_eq!(averages[0].avg_sell_price, Decimal::new(7, 0));
        assert_eq!(averages[0].avg_profit, Decimal::new(4, 0));
    }

    #[test]
    fn test_stock_summary() {
        let products: Vec<Product> = [0, 0, 1, 4, 5, 40].into_iter().map(product_with).collect();
        assert_eq!(
            stock_summary(&products),
            StockSummary {
                total: 6,
                out_of_stock: 2,
                low_stock: 2,
                available: 2,
                total_value: Decimal::new(200, 0),
            }
        );
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(total_paid(&[]), Decimal::ZERO);
        assert!(buyer_totals(&[]).is_empty());
        assert!(product_purchase_averages(&[]).is_empty());
    }
}
