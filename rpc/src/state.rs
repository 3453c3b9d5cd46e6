//! Shared state handed to every handler.

use std::sync::Arc;

use tally_crypto::SharedSecret;
use tally_ledger::VoteLedger;
use tally_store::LedgerStore;

use crate::metrics::RpcMetrics;
use crate::rate_limit::RateLimiter;

pub struct AppState<S> {
    pub ledger: Arc<VoteLedger<S>>,
    /// `None` disables the admin surface: every admin request is refused.
    pub admin_key: Option<Arc<SharedSecret>>,
    pub results_limiter: Arc<RateLimiter>,
    pub metrics: Arc<RpcMetrics>,
    /// Key the results quota on `X-Forwarded-For` instead of the peer address.
    pub trust_forwarded_for: bool,
}

impl<S: LedgerStore> AppState<S> {
    pub fn new(
        ledger: VoteLedger<S>,
        admin_key: Option<SharedSecret>,
        results_limiter: RateLimiter,
        metrics: RpcMetrics,
    ) -> Self {
        Self {
            ledger: Arc::new(ledger),
            admin_key: admin_key.map(Arc::new),
            results_limiter: Arc::new(results_limiter),
            metrics: Arc::new(metrics),
            trust_forwarded_for: false,
        }
    }

    /// Only enable behind a reverse proxy that sets the header itself.
    pub fn trust_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }
}

// Manual impl: `S` itself need not be `Clone`.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            admin_key: self.admin_key.clone(),
            results_limiter: Arc::clone(&self.results_limiter),
            metrics: Arc::clone(&self.metrics),
            trust_forwarded_for: self.trust_forwarded_for,
        }
    }
}
