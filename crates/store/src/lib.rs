pub mod config;
pub mod error;
pub mod migrations;
pub mod store;

pub use config::StoreConfig;
pub use error::StoreError;
pub use store::{
    AuditEventFilter, DecisionFilter, IntegrationStatusRow, SqliteStore, Store, TokenBinding,
};
