// Ledger behaviour over the in-memory store.
//
// Run with: cargo test --test ledger_test

mod helpers;

use helpers::*;
use musco_backend::models::{MovementCause, PurchaseUpdate, SellUpdate};
use musco_backend::AppError;
use proptest::prelude::*;

// ============================================================================
// Purchase / sell lifecycle
// ============================================================================

#[tokio::test]
async fn test_purchase_sell_lifecycle() {
    let fx = Fixture::memory().await;
    assert_eq!(fx.quantity().await, 10);

    let purchase = fx
        .state
        .purchases
        .create_purchase(fx.purchase(5, 3))
        .await
        .expect("Failed to create purchase");
    assert_eq!(purchase.product_quantity, 15);
    assert_eq!(purchase.record.brand_id, fx.brand.id);

    let sell = fx
        .state
        .sells
        .create_sell(fx.sell(12, 8))
        .await
        .expect("Failed to create sell");
    assert_eq!(sell.product_quantity, 3);
    assert_eq!(sell.record.amount(), dec(96));

    let report = fx
        .state
        .reports
        .sell_report(&Default::default())
        .await
        .expect("Failed to build sell report");
    assert_eq!(report.total_profit, dec(60));

    let err = fx
        .state
        .sells
        .create_sell(fx.sell(5, 8))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::InsufficientStock {
            available: 3,
            requested: 5,
            ..
        }
    ));
    assert_eq!(fx.quantity().await, 3);

    let deleted = fx
        .state
        .sells
        .delete_sell(sell.record.id)
        .await
        .expect("Failed to delete sell");
    assert_eq!(deleted.product_quantity, 15);
    assert_eq!(fx.quantity().await, 15);
}

#[tokio::test]
async fn test_rejected_sell_leaves_no_record() {
    let fx = Fixture::memory().await;

    assert!(fx.state.sells.create_sell(fx.sell(11, 8)).await.is_err());

    let sells = fx
        .state
        .sells
        .list_sells(&Default::default())
        .await
        .unwrap();
    assert!(sells.is_empty());
    assert_eq!(fx.quantity().await, 10);
}

#[tokio::test]
async fn test_sell_of_exact_stock_reaches_zero() {
    let fx = Fixture::memory().await;

    let outcome = fx.state.sells.create_sell(fx.sell(10, 8)).await.unwrap();
    assert_eq!(outcome.product_quantity, 0);
}

#[tokio::test]
async fn test_delete_then_recreate_purchase_restores_quantity() {
    let fx = Fixture::memory().await;

    let first = fx
        .state
        .purchases
        .create_purchase(fx.purchase(4, 3))
        .await
        .unwrap();
    assert_eq!(first.product_quantity, 14);

    let deleted = fx
        .state
        .purchases
        .delete_purchase(first.record.id)
        .await
        .unwrap();
    assert_eq!(deleted.product_quantity, 10);

    let again = fx
        .state
        .purchases
        .create_purchase(fx.purchase(4, 3))
        .await
        .unwrap();
    assert_eq!(again.product_quantity, 14);
}

#[tokio::test]
async fn test_update_sell_moves_stock_by_difference() {
    let fx = Fixture::memory().await;
    let sell = fx.state.sells.create_sell(fx.sell(4, 8)).await.unwrap();
    assert_eq!(sell.product_quantity, 6);

    // 4 -> 7 takes three more units
    let grown = fx
        .state
        .sells
        .update_sell(
            sell.record.id,
            SellUpdate {
                quantity: 7,
                sell_price: dec(9),
                seller_id: fx.seller.id,
            },
        )
        .await
        .unwrap();
    assert_eq!(grown.product_quantity, 3);
    assert_eq!(grown.record.sell_price, dec(9));

    // 7 -> 2 returns five
    let shrunk = fx
        .state
        .sells
        .update_sell(
            sell.record.id,
            SellUpdate {
                quantity: 2,
                sell_price: dec(9),
                seller_id: fx.seller.id,
            },
        )
        .await
        .unwrap();
    assert_eq!(shrunk.product_quantity, 8);
}

#[tokio::test]
async fn test_update_sell_beyond_stock_is_rejected() {
    let fx = Fixture::memory().await;
    let sell = fx.state.sells.create_sell(fx.sell(4, 8)).await.unwrap();

    let err = fx
        .state
        .sells
        .update_sell(
            sell.record.id,
            SellUpdate {
                quantity: 15,
                sell_price: dec(8),
                seller_id: fx.seller.id,
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_insufficient_stock());

    let unchanged = fx.state.sells.get_sell(sell.record.id).await.unwrap();
    assert_eq!(unchanged.quantity, 4);
    assert_eq!(fx.quantity().await, 6);
}

#[tokio::test]
async fn test_delete_purchase_of_sold_units_is_rejected() {
    let fx = Fixture::memory().await;
    let purchase = fx
        .state
        .purchases
        .create_purchase(fx.purchase(5, 3))
        .await
        .unwrap();
    fx.state.sells.create_sell(fx.sell(12, 8)).await.unwrap();

    let err = fx
        .state
        .purchases
        .delete_purchase(purchase.record.id)
        .await
        .unwrap_err();
    assert!(err.is_insufficient_stock());
    assert_eq!(fx.quantity().await, 3);
    assert!(fx.state.purchases.get_purchase(purchase.record.id).await.is_ok());
}

#[tokio::test]
async fn test_update_purchase_down_below_sold_is_rejected() {
    let fx = Fixture::memory().await;
    let purchase = fx
        .state
        .purchases
        .create_purchase(fx.purchase(5, 3))
        .await
        .unwrap();
    fx.state.sells.create_sell(fx.sell(14, 8)).await.unwrap();

    let update = PurchaseUpdate {
        quantity: 2,
        purchase_price: dec(3),
        firm_id: fx.firm.id,
        buyer_id: fx.buyer.id,
    };
    let err = fx
        .state
        .purchases
        .update_purchase(purchase.record.id, update.clone())
        .await
        .unwrap_err();
    assert!(err.is_insufficient_stock());

    // 5 -> 4 only needs one unit back
    let ok = fx
        .state
        .purchases
        .update_purchase(
            purchase.record.id,
            PurchaseUpdate {
                quantity: 4,
                ..update
            },
        )
        .await
        .unwrap();
    assert_eq!(ok.product_quantity, 0);
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_non_positive_quantity_rejected() {
    let fx = Fixture::memory().await;

    for quantity in [0, -3] {
        let err = fx
            .state
            .sells
            .create_sell(fx.sell(quantity, 8))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = fx
            .state
            .purchases
            .create_purchase(fx.purchase(quantity, 3))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
    assert_eq!(fx.quantity().await, 10);
}

#[tokio::test]
async fn test_negative_price_rejected() {
    let fx = Fixture::memory().await;

    let err = fx
        .state
        .purchases
        .create_purchase(fx.purchase(1, -1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_unknown_references_rejected() {
    let fx = Fixture::memory().await;

    let mut new = fx.purchase(1, 3);
    new.firm_id = random_id();
    let err = fx.state.purchases.create_purchase(new).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let mut new = fx.sell(1, 8);
    new.seller_id = random_id();
    let err = fx.state.sells.create_sell(new).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let mut new = fx.sell(1, 8);
    new.product_id = random_id();
    let err = fx.state.sells.create_sell(new).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_missing_records_are_not_found() {
    let fx = Fixture::memory().await;

    assert!(fx
        .state
        .sells
        .delete_sell(random_id())
        .await
        .unwrap_err()
        .is_not_found());
    assert!(fx
        .state
        .purchases
        .get_purchase(random_id())
        .await
        .unwrap_err()
        .is_not_found());
}

// ============================================================================
// Products and the stock journal
// ============================================================================

#[tokio::test]
async fn test_movements_journal_every_change() {
    let fx = Fixture::memory().await;
    let purchase = fx
        .state
        .purchases
        .create_purchase(fx.purchase(5, 3))
        .await
        .unwrap();
    let sell = fx.state.sells.create_sell(fx.sell(2, 8)).await.unwrap();
    fx.state
        .products
        .adjust_quantity(fx.product.id, -1)
        .await
        .unwrap();

    let movements = fx.state.products.movements(fx.product.id).await.unwrap();
    let causes: Vec<_> = movements.iter().filter_map(|m| m.cause_enum()).collect();
    assert_eq!(
        causes,
        vec![
            MovementCause::PurchaseCreated,
            MovementCause::SellCreated,
            MovementCause::ManualEdit
        ]
    );
    assert_eq!(movements[0].reference_id, Some(purchase.record.id));
    assert_eq!(movements[1].reference_id, Some(sell.record.id));
    assert_eq!(movements[1].delta, -2);

    for pair in movements.windows(2) {
        assert_eq!(pair[0].quantity_after, pair[1].quantity_before);
    }
    assert_eq!(movements.last().unwrap().quantity_after, 12);
}

#[tokio::test]
async fn test_unchanged_quantity_is_not_journaled() {
    let fx = Fixture::memory().await;
    let sell = fx.state.sells.create_sell(fx.sell(3, 8)).await.unwrap();

    let repriced = fx
        .state
        .sells
        .update_sell(
            sell.record.id,
            SellUpdate {
                quantity: 3,
                sell_price: dec(11),
                seller_id: fx.seller.id,
            },
        )
        .await
        .unwrap();
    assert_eq!(repriced.product_quantity, 7);
    assert_eq!(repriced.record.sell_price, dec(11));

    let unchanged = fx
        .state
        .products
        .adjust_quantity(fx.product.id, 0)
        .await
        .unwrap();
    assert_eq!(unchanged, 7);

    let movements = fx.state.products.movements(fx.product.id).await.unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].cause_enum(), Some(MovementCause::SellCreated));
}

#[tokio::test]
async fn test_manual_adjust_cannot_go_negative() {
    let fx = Fixture::memory().await;

    let err = fx
        .state
        .products
        .adjust_quantity(fx.product.id, -11)
        .await
        .unwrap_err();
    assert!(err.is_insufficient_stock());
    assert_eq!(fx.quantity().await, 10);
}

#[tokio::test]
async fn test_manual_adjust_by_min_delta_is_rejected() {
    let fx = Fixture::memory().await;

    let err = fx
        .state
        .products
        .adjust_quantity(fx.product.id, i32::MIN)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(fx.quantity().await, 10);
}

#[tokio::test]
async fn test_referenced_product_cannot_be_deleted() {
    let fx = Fixture::memory().await;
    fx.state.sells.create_sell(fx.sell(1, 8)).await.unwrap();

    let err = fx
        .state
        .products
        .delete_product(fx.product.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let spare = fx.add_product("Spare", 1, 0).await;
    fx.state.products.delete_product(spare.id).await.unwrap();
    assert!(fx
        .state
        .products
        .get_product(spare.id)
        .await
        .unwrap_err()
        .is_not_found());
}

// ============================================================================
// Property: stock equals initial + purchases - sells
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Purchase(i32),
    Sell(i32),
    DeleteSell(usize),
    DeletePurchase(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1..20i32).prop_map(Op::Purchase),
        (1..20i32).prop_map(Op::Sell),
        (0..8usize).prop_map(Op::DeleteSell),
        (0..8usize).prop_map(Op::DeletePurchase),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_quantity_matches_ledgers(ops in prop::collection::vec(op(), 1..30)) {
        tokio_test::block_on(async {
            let fx = Fixture::memory().await;
            let mut purchases = Vec::new();
            let mut sells = Vec::new();

            for op in ops {
                match op {
                    Op::Purchase(q) => {
                        if let Ok(o) = fx.state.purchases.create_purchase(fx.purchase(q, 3)).await {
                            purchases.push(o.record.id);
                        }
                    }
                    Op::Sell(q) => {
                        if let Ok(o) = fx.state.sells.create_sell(fx.sell(q, 8)).await {
                            sells.push(o.record.id);
                        }
                    }
                    Op::DeleteSell(i) if !sells.is_empty() => {
                        let id = sells.remove(i % sells.len());
                        fx.state.sells.delete_sell(id).await.unwrap();
                    }
                    Op::DeletePurchase(i) if !purchases.is_empty() => {
                        let idx = i % purchases.len();
                        if fx.state.purchases.delete_purchase(purchases[idx]).await.is_ok() {
                            purchases.remove(idx);
                        }
                    }
                    _ => {}
                }

                let quantity = fx.quantity().await;
                assert!(quantity >= 0);
            }

            let purchased: i32 = fx
                .state
                .purchases
                .list_purchases(&Default::default())
                .await
                .unwrap()
                .iter()
                .map(|p| p.quantity)
                .sum();
            let sold: i32 = fx
                .state
                .sells
                .list_sells(&Default::default())
                .await
                .unwrap()
                .iter()
                .map(|s| s.quantity)
                .sum();
            assert_eq!(fx.quantity().await, 10 + purchased - sold);
        });
    }
}
