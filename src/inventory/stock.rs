use crate::models::MovementCause;
use thiserror::Error;

/// Error types for stock arithmetic
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StockError {
    #[error("Insufficient stock: {available} available, {requested} requested")]
    Insufficient { available: i32, requested: i32 },

    #[error("Invalid quantity: {0} (must be greater than zero)")]
    InvalidQuantity(i32),

    #[error("Stock overflow: {current} + {delta}")]
    Overflow { current: i32, delta: i32 },
}

/// Result type for stock operations
pub type StockResult<T> = Result<T, StockError>;

/// Apply `delta` to an on-hand quantity.
///
/// The result is never negative: a delta that would take the quantity below
/// zero fails with `Insufficient` carrying the current level and the amount
/// that was asked for.
pub fn apply_delta(current: i32, delta: i32) -> StockResult<i32> {
    let next = current
        .checked_add(delta)
        .ok_or(StockError::Overflow { current, delta })?;

    if next < 0 {
        let requested = delta
            .checked_neg()
            .ok_or(StockError::Overflow { current, delta })?;
        return Err(StockError::Insufficient {
            available: current,
            requested,
        });
    }

    Ok(next)
}

/// Ledger record quantities must be strictly positive
pub fn ensure_positive(quantity: i32) -> StockResult<()> {
    if quantity <= 0 {
        return Err(StockError::InvalidQuantity(quantity));
    }
    Ok(())
}

/// Stock effect of a single purchase or sell mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerChange {
    PurchaseCreated { quantity: i32 },
    PurchaseUpdated { old_quantity: i32, new_quantity: i32 },
    PurchaseDeleted { quantity: i32 },
    SellCreated { quantity: i32 },
    SellUpdated { old_quantity: i32, new_quantity: i32 },
    SellDeleted { quantity: i32 },
}

impl LedgerChange {
    /// Signed change to the product's quantity
    ///
    /// Purchases add stock and sells remove it; updates move by the
    /// difference and deletes undo the original effect.
    pub fn stock_delta(&self) -> i32 {
        match *self {
            Self::PurchaseCreated { quantity } => quantity,
            Self::PurchaseUpdated {
                old_quantity,
                new_quantity,
            } => new_quantity - old_quantity,
            Self::PurchaseDeleted { quantity } => -quantity,
            Self::SellCreated { quantity } => -quantity,
            Self::SellUpdated {
                old_quantity,
                new_quantity,
            } => old_quantity - new_quantity,
            Self::SellDeleted { quantity } => quantity,
        }
    }

    /// Journal cause recorded for this change
    pub fn cause(&self) -> MovementCause {
        match self {
            Self::PurchaseCreated { .. } => MovementCause::PurchaseCreated,
            Self::PurchaseUpdated { .. } => MovementCause::PurchaseUpdated,
            Self::PurchaseDeleted { .. } => MovementCause::PurchaseDeleted,
            Self::SellCreated { .. } => MovementCause::SellCreated,
            Self::SellUpdated { .. } => MovementCause::SellUpdated,
            Self::SellDeleted { .. } => MovementCause::SellDeleted,
        }
    }

    /// Check the quantities carried by the change itself
    pub fn validate(&self) -> StockResult<()> {
        match *self {
            Self::PurchaseCreated { quantity } | Self::SellCreated { quantity } => {
                ensure_positive(quantity)
            }
            Self::PurchaseUpdated { new_quantity, .. } | Self::SellUpdated { new_quantity, .. } => {
                ensure_positive(new_quantity)
            }
            // Deletes revert whatever was stored
            Self::PurchaseDeleted { .. } | Self::SellDeleted { .. } => Ok(()),
        }
    }

    /// Validate and apply to the current on-hand quantity
    pub fn apply(&self, current: i32) -> StockResult<i32> {
        self.validate()?;
        apply_delta(current, self.stock_delta())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_apply_delta() {
        assert_eq!(apply_delta(10, 5).unwrap(), 15);
        assert_eq!(apply_delta(10, -10).unwrap(), 0);
        assert_eq!(
            apply_delta(3, -5),
            Err(StockError::Insufficient {
                available: 3,
                requested: 5
            })
        );
    }

    #[test]
    fn test_apply_delta_overflow() {
        assert!(matches!(
            apply_delta(i32::MAX, 1),
            Err(StockError::Overflow { .. })
        ));
        assert_eq!(
            apply_delta(3, i32::MIN),
            Err(StockError::Overflow {
                current: 3,
                delta: i32::MIN
            })
        );
    }

    #[test]
    fn test_sell_created_rejects_more_than_on_hand() {
        let change = LedgerChange::SellCreated { quantity: 5 };
        assert_eq!(
            change.apply(3),
            Err(StockError::Insufficient {
                available: 3,
                requested: 5
            })
        );
    }

    #[test]
    fn test_sell_update_moves_by_difference() {
        // Raising a sell from 4 to 6 takes two more units
        let up = LedgerChange::SellUpdated {
            old_quantity: 4,
            new_quantity: 6,
        };
        assert_eq!(up.stock_delta(), -2);
        assert_eq!(up.apply(2).unwrap(), 0);
        assert!(up.apply(1).is_err());

        // Lowering returns stock even from zero
        let down = LedgerChange::SellUpdated {
            old_quantity: 6,
            new_quantity: 1,
        };
        assert_eq!(down.apply(0).unwrap(), 5);
    }

    #[test]
    fn test_purchase_delete_cannot_go_negative() {
        let change = LedgerChange::PurchaseDeleted { quantity: 5 };
        assert_eq!(change.apply(5).unwrap(), 0);
        assert!(change.apply(4).is_err());
    }

    #[test]
    fn test_purchase_update_decrease_respects_stock() {
        let change = LedgerChange::PurchaseUpdated {
            old_quantity: 10,
            new_quantity: 2,
        };
        assert_eq!(change.apply(8).unwrap(), 0);
        assert!(change.apply(7).is_err());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        assert_eq!(
            LedgerChange::PurchaseCreated { quantity: 0 }.apply(10),
            Err(StockError::InvalidQuantity(0))
        );
        assert_eq!(
            LedgerChange::SellUpdated {
                old_quantity: 3,
                new_quantity: -1
            }
            .apply(10),
            Err(StockError::InvalidQuantity(-1))
        );
    }

    #[test]
    fn test_causes() {
        assert_eq!(
            LedgerChange::SellDeleted { quantity: 1 }.cause(),
            MovementCause::SellDeleted
        );
        assert_eq!(
            LedgerChange::PurchaseUpdated {
                old_quantity: 1,
                new_quantity: 2
            }
            .cause(),
            MovementCause::PurchaseUpdated
        );
    }

    proptest! {
        #[test]
        fn prop_quantity_tracks_ledger_sums(
            start in 0i32..50,
            ops in proptest::collection::vec((any::<bool>(), 1i32..20), 0..60),
        ) {
            let mut quantity = start;
            let mut purchased = 0;
            let mut sold = 0;

            for (is_purchase, amount) in ops {
                let change = if is_purchase {
                    LedgerChange::PurchaseCreated { quantity: amount }
                } else {
                    LedgerChange::SellCreated { quantity: amount }
                };

                match change.apply(quantity) {
                    Ok(next) => {
                        quantity = next;
                        if is_purchase { purchased += amount } else { sold += amount }
                    }
                    Err(StockError::Insufficient { available, requested }) => {
                        prop_assert!(!is_purchase);
                        prop_assert_eq!(available, quantity);
                        prop_assert!(requested > available);
                    }
                    Err(e) => prop_assert!(false, "unexpected error: {}", e),
                }

                prop_assert!(quantity >= 0);
            }

            prop_assert_eq!(quantity, start + purchased - sold);
        }

        #[test]
        fn prop_update_then_revert_is_identity(
            current in 0i32..100,
            old_quantity in 1i32..50,
            new_quantity in 1i32..50,
        ) {
            let forward = LedgerChange::SellUpdated { old_quantity, new_quantity };
            let back = LedgerChange::SellUpdated { old_quantity: new_quantity, new_quantity: old_quantity };
            if let Ok(after) = forward.apply(current) {
                prop_assert_eq!(after, current + old_quantity - new_quantity);
                prop_assert_eq!(back.apply(after).unwrap(), current);
            }
        }
    }
}
