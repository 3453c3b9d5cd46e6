//! HTTP API for the vote ledger.
//!
//! Public endpoints:
//! - Vote submission (`/api/vote`, `/api/polls/:questionId/vote`)
//! - Rate-limited, threshold-suppressed results
//! - Registered poll lookup
//!
//! Admin endpoints (behind the `x-api-key` header):
//! - Poll registration
//! - Audit chain verification and listing
//! - Ledger summary and Prometheus metrics

pub mod client;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod metrics;
pub mod pagination;
pub mod rate_limit;
pub mod server;
pub mod state;

pub use error::RpcError;
pub use metrics::RpcMetrics;
pub use rate_limit::RateLimiter;
pub use server::{router, RpcServer};
pub use state::AppState;
