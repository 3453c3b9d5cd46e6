//! Daemon configuration file.
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration. Secrets never live here; they come from the CLI or
//! the environment.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tally_ledger::LedgerConfig;
use tally_utils::LogFormat;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyConfig {
    /// HTTP listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Minimum votes before a choice appears in results.
    #[serde(default = "default_disclosure_threshold")]
    pub disclosure_threshold: u64,

    /// Result queries allowed per caller per window.
    #[serde(default = "default_results_quota")]
    pub results_quota: u32,

    #[serde(default = "default_results_window_secs")]
    pub results_window_secs: u64,

    /// Identify callers by the first `X-Forwarded-For` hop. Only safe behind
    /// a reverse proxy that overwrites the header.
    #[serde(default)]
    pub trust_forwarded_for: bool,

    /// Upper bound on a vote submission, lock wait included.
    #[serde(default = "default_submit_timeout_ms")]
    pub submit_timeout_ms: u64,

    /// LMDB map size in MiB.
    #[serde(default = "default_map_size_mb")]
    pub map_size_mb: usize,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_port() -> u16 {
    8080
}

fn default_disclosure_threshold() -> u64 {
    tally_ledger::config::DEFAULT_DISCLOSURE_THRESHOLD
}

fn default_results_quota() -> u32 {
    tally_rpc::rate_limit::DEFAULT_QUOTA
}

fn default_results_window_secs() -> u64 {
    tally_rpc::rate_limit::DEFAULT_WINDOW.as_secs()
}

fn default_submit_timeout_ms() -> u64 {
    tally_ledger::config::DEFAULT_SUBMIT_TIMEOUT.as_millis() as u64
}

fn default_map_size_mb() -> usize {
    256
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl TallyConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            disclosure_threshold: self.disclosure_threshold,
            submit_timeout: Duration::from_millis(self.submit_timeout_ms),
        }
    }

    pub fn results_window(&self) -> Duration {
        Duration::from_secs(self.results_window_secs)
    }

    pub fn map_size_bytes(&self) -> usize {
        self.map_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            disclosure_threshold: default_disclosure_threshold(),
            results_quota: default_results_quota(),
            results_window_secs: default_results_window_secs(),
            trust_forwarded_for: false,
            submit_timeout_ms: default_submit_timeout_ms(),
            map_size_mb: default_map_size_mb(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_defaults() {
        let config = TallyConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config, TallyConfig::default());
        assert_eq!(config.disclosure_threshold, 10);
        assert_eq!(config.results_quota, 30);
        assert_eq!(config.results_window_secs, 60);
        assert_eq!(config.submit_timeout_ms, 5000);
        assert!(!config.trust_forwarded_for);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            port = 9999
            disclosure_threshold = 3
            log_format = "json"
            trust_forwarded_for = true
        "#;
        let config = TallyConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.port, 9999);
        assert_eq!(config.ledger_config().disclosure_threshold, 3);
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.trust_forwarded_for);
        assert_eq!(config.map_size_bytes(), 256 * 1024 * 1024);
    }

    #[test]
    fn unknown_log_format_is_an_error() {
        assert!(TallyConfig::from_toml_str(r#"log_format = "xml""#).is_err());
    }

    #[test]
    fn config_file_is_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tally.toml");
        std::fs::write(&path, "results_quota = 5\n").unwrap();
        assert_eq!(TallyConfig::from_toml_file(&path).unwrap().results_quota, 5);
        assert!(TallyConfig::from_toml_file(&dir.path().join("missing.toml")).is_err());
    }
}
