//! Request guards: the admin key check and the results rate limit.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tally_store::LedgerStore;
use tracing::{debug, warn};

use crate::client::caller_key;
use crate::state::AppState;
use crate::RpcError;

/// Header carrying the pre-shared admin secret.
pub const ADMIN_KEY_HEADER: &str = "x-api-key";

/// Let the request through only if it presents the configured admin key.
pub async fn require_admin<S: LedgerStore + 'static>(
    State(state): State<AppState<S>>,
    request: Request,
    next: Next,
) -> Result<Response, RpcError> {
    let Some(secret) = state.admin_key.as_deref() else {
        debug!("admin request refused: no admin key configured");
        return Err(RpcError::Forbidden);
    };
    let authorized = request
        .headers()
        .get(ADMIN_KEY_HEADER)
        .is_some_and(|v| secret.matches(v.as_bytes()));
    if !authorized {
        warn!(path = %request.uri().path(), "admin request refused: bad key");
        return Err(RpcError::Forbidden);
    }
    Ok(next.run(request).await)
}

/// Apply the per-caller results quota.
pub async fn limit_results<S: LedgerStore + 'static>(
    State(state): State<AppState<S>>,
    request: Request,
    next: Next,
) -> Result<Response, RpcError> {
    let caller = caller_key(&request, state.trust_forwarded_for);
    if !state.results_limiter.check(&caller) {
        state.metrics.rate_limited.inc();
        debug!(%caller, "results request rate limited");
        return Err(RpcError::RateLimited);
    }
    Ok(next.run(request).await)
}
