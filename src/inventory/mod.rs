pub mod stock;

pub use stock::{apply_delta, LedgerChange, StockError, StockResult};
