//! Ledger and analytics services for the BIZMAX server

pub mod analytics;
pub mod records;
pub mod stock;

pub use analytics::AnalyticsService;
pub use records::RecordLedger;
pub use stock::StockLedger;
