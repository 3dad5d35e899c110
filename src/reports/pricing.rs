use crate::models::{Product, Purchase};
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

/// Share of the market price assumed as cost when a product has no purchase history
pub const FALLBACK_PURCHASE_PRICE_RATIO: Decimal = Decimal::from_parts(75, 0, 0, false, 2); // 0.75

#[derive(Debug, Default, Clone, Copy)]
struct Totals {
    spent: Decimal,
    quantity: i64,
}

/// Quantity-weighted average purchase price per product
///
/// Built once per request from the full purchase ledger and the product
/// catalog; lookups never touch storage.
#[derive(Debug, Clone, Default)]
pub struct PurchasePriceIndex {
    totals: HashMap<Uuid, Totals>,
    market_prices: HashMap<Uuid, Decimal>,
}

impl PurchasePriceIndex {
    pub fn new(products: &[Product], purchases: &[Purchase]) -> Self {
        let mut totals: HashMap<Uuid, Totals> = HashMap::new();
        for purchase in purchases {
            let entry = totals.entry(purchase.product_id).or_default();
            entry.spent += purchase.total();
            entry.quantity += i64::from(purchase.quantity);
        }

        let market_prices = products.iter().map(|p| (p.id, p.price)).collect();

        Self {
            totals,
            market_prices,
        }
    }

    /// Average cost of one unit of `product_id`
    ///
    /// Falls back to [`FALLBACK_PURCHASE_PRICE_RATIO`] of the market price when
    /// nothing was ever bought, and to zero for a product that is not in the
    /// catalog.
    pub fn average_purchase_price(&self, product_id: Uuid) -> Decimal {
        match self.totals.get(&product_id) {
            Some(t) if t.quantity > 0 => t.spent / Decimal::from(t.quantity),
            _ => self
                .market_prices
                .get(&product_id)
                .map(|price| *price * FALLBACK_PURCHASE_PRICE_RATIO)
                .unwrap_or(Decimal::ZERO),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: Decimal) -> Product {
        Product::new(
            "Snare".to_string(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            price,
            10,
        )
    }

    fn purchase(product_id: Uuid, quantity: i32, price: Decimal) -> Purchase {
        let now = chrono::Utc::now().naive_utc();
        Purchase {
            id: Uuid::new_v4(),
            product_id,
            brand_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            buyer_id: Uuid::new_v4(),
            firm_id: Uuid::new_v4(),
            quantity,
            purchase_price: price,
            tester: false,
            tester_created_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_weighted_average() {
        let p = product(Decimal::new(5, 0));
        let index = PurchasePriceIndex::new(
            &[p.clone()],
            &[
                purchase(p.id, 5, Decimal::new(3, 0)),
                purchase(p.id, 15, Decimal::new(7, 0)),
            ],
        );
        // (15 + 105) / 20
        assert_eq!(index.average_purchase_price(p.id), Decimal::new(6, 0));
    }

    #[test]
    fn test_fallback_to_market_price() {
        let p = product(Decimal::new(20, 0));
        let index = PurchasePriceIndex::new(&[p.clone()], &[]);
        assert_eq!(index.average_purchase_price(p.id), Decimal::new(15, 0));
    }

    #[test]
    fn test_unknown_product_costs_nothing() {
        let index = PurchasePriceIndex::default();
        assert_eq!(index.average_purchase_price(Uuid::new_v4()), Decimal::ZERO);
    }
}
