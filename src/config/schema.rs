//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the filter
//! host. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// The single upstream every request is forwarded to.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Cookie path replacement rules.
    pub cookie_path: CookiePathConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream address (e.g., "127.0.0.1:3000").
    pub address: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Cookie path rewriting configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CookiePathConfig {
    /// Replacement rules, applied in declaration order.
    pub replacements: Vec<ReplacementConfig>,
}

/// A single cookie path replacement rule.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ReplacementConfig {
    /// Regex the whole cookie name must match. Empty or absent matches every cookie.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_regex: Option<String>,

    /// Regex the whole cookie path must match.
    pub original: String,

    /// Replacement path. `{{group}}` expands to the named capture from `original`.
    #[serde(default)]
    pub replacement: String,
}
