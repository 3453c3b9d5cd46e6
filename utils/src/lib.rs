//! Shared utilities for the tally vote ledger.

pub mod logging;

pub use logging::{init_logging, LogFormat};
