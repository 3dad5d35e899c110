pub mod connection;

pub use connection::{connect, ping, prepare, verify_schema, DatabaseError, INVENTORY_TABLES};
