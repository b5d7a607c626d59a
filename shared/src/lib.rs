//! Shared types, ledger rules and analytics for the BIZMAX bookkeeping platform
//!
//! This crate contains the pure domain logic shared between the backend, the
//! offline client (via WASM), and the test suites. It performs no I/O.

pub mod error;
pub mod models;
pub mod types;
pub mod validation;

pub use error::*;
pub use models::*;
pub use types::*;
pub use validation::*;
