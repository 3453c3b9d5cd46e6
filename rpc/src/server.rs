//! Axum-based HTTP server.

use std::future::Future;
use std::net::SocketAddr;

use axum::http::Method;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tally_store::LedgerStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::guard::{limit_results, require_admin};
use crate::handlers;
use crate::state::AppState;

/// Build the full route table over `state`.
pub fn router<S: LedgerStore + 'static>(state: AppState<S>) -> Router {
    let results = Router::new()
        .route("/api/results", get(handlers::results::<S>))
        .route(
            "/api/polls/:questionId/results",
            get(handlers::poll_results::<S>),
        )
        .route_layer(from_fn_with_state(state.clone(), limit_results::<S>));

    let admin = Router::new()
        .route("/polls", post(handlers::create_poll::<S>))
        .route(
            "/polls/:questionId/activate",
            post(handlers::activate_poll::<S>),
        )
        .route(
            "/polls/:questionId/deactivate",
            post(handlers::deactivate_poll::<S>),
        )
        .route("/audit", get(handlers::audit_page::<S>))
        .route("/audit/verify", get(handlers::verify_audit::<S>))
        .route("/summary", get(handlers::summary::<S>))
        .route("/metrics", get(handlers::metrics::<S>))
        .route_layer(from_fn_with_state(state.clone(), require_admin::<S>));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/vote", post(handlers::submit_vote::<S>))
        .route("/api/polls/active", get(handlers::active_polls::<S>))
        .route("/api/polls/:questionId", get(handlers::get_poll::<S>))
        .route(
            "/api/polls/:questionId/vote",
            post(handlers::submit_poll_vote::<S>),
        )
        .merge(results)
        .nest("/admin", admin)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub struct RpcServer<S> {
    pub port: u16,
    state: AppState<S>,
}

impl<S: LedgerStore + 'static> RpcServer<S> {
    pub fn new(port: u16, state: AppState<S>) -> Self {
        Self { port, state }
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn start(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> std::io::Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("HTTP server listening on {}", listener.local_addr()?);

        let app = router(self.state).into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
