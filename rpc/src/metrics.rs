//! Prometheus metrics for the HTTP surface.
//!
//! [`RpcMetrics`] owns a dedicated [`Registry`] that `/admin/metrics`
//! encodes into the Prometheus text exposition format.

use prometheus::{
    register_int_counter_vec_with_registry, register_int_counter_with_registry, Encoder,
    IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

pub struct RpcMetrics {
    pub registry: Registry,

    /// Votes recorded in the ledger.
    pub votes_accepted: IntCounter,
    /// Votes turned away, labelled by `reason`.
    pub votes_rejected: IntCounterVec,
    /// Result queries answered.
    pub results_served: IntCounter,
    /// Requests refused by the rate limiter.
    pub rate_limited: IntCounter,
}

impl RpcMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let votes_accepted = register_int_counter_with_registry!(
            Opts::new("tally_votes_accepted_total", "Votes recorded in the ledger"),
            registry
        )?;

        let votes_rejected = register_int_counter_vec_with_registry!(
            Opts::new("tally_votes_rejected_total", "Votes rejected, by reason"),
            &["reason"],
            registry
        )?;

        let results_served = register_int_counter_with_registry!(
            Opts::new("tally_results_served_total", "Result queries answered"),
            registry
        )?;

        let rate_limited = register_int_counter_with_registry!(
            Opts::new(
                "tally_rate_limited_total",
                "Requests refused by the results rate limiter"
            ),
            registry
        )?;

        Ok(Self {
            registry,
            votes_accepted,
            votes_rejected,
            results_served,
            rate_limited,
        })
    }

    pub fn reject(&self, reason: &str) {
        self.votes_rejected.with_label_values(&[reason]).inc();
    }

    /// Render every registered metric in the text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
