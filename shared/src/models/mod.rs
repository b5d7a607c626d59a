//! Domain models for the bookkeeping ledger

mod analytics;
mod inventory;
mod record;
mod user;

pub use analytics::*;
pub use inventory::*;
pub use record::*;
pub use user::*;
