use crate::error::AppResult;
use crate::services::{PurchaseService, SellService};
use crate::store::InventoryStore;
use chrono::{NaiveDateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{debug, error, info, warn};

/// What one sweep reclaimed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub sells_removed: usize,
    pub purchases_removed: usize,
    pub purchases_skipped: usize,
}

/// Background task that reclaims tester records past their retention window
pub struct ExpirySweeper {
    store: Arc<dyn InventoryStore>,
    purchases: PurchaseService,
    sells: SellService,
    retention: Duration,
    sweep_interval: Duration,
}

impl ExpirySweeper {
    /// Create a new sweeper
    ///
    /// # Arguments
    /// * `store` - Inventory store the records live in
    /// * `retention` - Age after which a tester record is removed (default: 600 seconds)
    /// * `sweep_interval` - How often to sweep (default: 30 seconds)
    pub fn new(store: Arc<dyn InventoryStore>, retention: Duration, sweep_interval: Duration) -> Self {
        Self {
            purchases: PurchaseService::new(store.clone()),
            sells: SellService::new(store.clone()),
            store,
            retention,
            sweep_interval,
        }
    }

    /// Start the sweeper background task
    pub async fn start(self) {
        let mut interval = time::interval(self.sweep_interval);
        info!(
            "Expiry sweeper started, retention {:?}, sweeping every {:?}",
            self.retention, self.sweep_interval
        );

        loop {
            interval.tick().await;

            match self.sweep_once(Utc::now().naive_utc()).await {
                Ok(report) if report != SweepReport::default() => {
                    info!(
                        "Tester sweep: {} sells, {} purchases removed, {} purchases skipped",
                        report.sells_removed, report.purchases_removed, report.purchases_skipped
                    );
                }
                Ok(_) => debug!("Tester sweep found nothing to reclaim"),
                Err(e) => error!("Error sweeping tester records: {}", e),
            }
        }
    }

    /// Delete tester sells, then tester purchases, older than the retention window
    ///
    /// Sells go first so the stock they held is back before purchases are
    /// reverted. A purchase whose revert would take stock negative is left for
    /// the next sweep.
    pub async fn sweep_once(&self, now: NaiveDateTime) -> AppResult<SweepReport> {
        let retention = chrono::Duration::from_std(self.retention)
            .unwrap_or_else(|_| chrono::Duration::seconds(600));
        let cutoff = now - retention;
        let mut report = SweepReport::default();

        for id in self.store.expired_tester_sells(cutoff).await? {
            match self.sells.expire_sell(id).await {
                Ok(_) => report.sells_removed += 1,
                // Removed concurrently by a user
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e),
            }
        }

        for id in self.store.expired_tester_purchases(cutoff).await? {
            match self.purchases.expire_purchase(id).await {
                Ok(_) => report.purchases_removed += 1,
                Err(e) if e.is_not_found() => continue,
                Err(e) if e.is_insufficient_stock() => {
                    warn!("Skipping expired tester purchase {}: {}", id, e);
                    report.purchases_skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(report)
    }
}
