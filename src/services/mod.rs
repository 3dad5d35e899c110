pub mod product_service;
pub mod purchase_service;
pub mod reference_service;
pub mod report_service;
pub mod sell_service;

pub use product_service::ProductService;
pub use purchase_service::PurchaseService;
pub use reference_service::ReferenceService;
pub use report_service::{PurchaseReport, ReportService, SellReport};
pub use sell_service::SellService;
