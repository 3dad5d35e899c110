pub mod product_repository;
pub mod purchase_repository;
pub mod reference_repository;
pub mod sell_repository;
pub mod stock_movement_repository;
pub mod user_repository;

// Re-export all repositories for convenient access
pub use product_repository::ProductRepository;
pub use purchase_repository::PurchaseRepository;
pub use reference_repository::ReferenceRepository;
pub use sell_repository::SellRepository;
pub use stock_movement_repository::{StockChange, StockMovementRepository};
pub use user_repository::UserRepository;
