//! HTTP handlers for the BIZMAX API

pub mod dashboard;
pub mod health;
pub mod inventory;
pub mod records;

pub use dashboard::*;
pub use health::*;
pub use inventory::*;
pub use records::*;
