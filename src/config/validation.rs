//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Rule patterns are checked by the rule compiler, not here

use std::net::SocketAddr;

use axum::http::uri::Authority;
use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("upstream.address {0:?} is not a host:port authority")]
    UpstreamAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,
}

/// Check the configuration for semantic errors.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let upstream_ok = config
        .upstream
        .address
        .parse::<Authority>()
        .map(|a| a.port_u16().is_some())
        .unwrap_or(false);
    if !upstream_ok {
        errors.push(ValidationError::UpstreamAddress(
            config.upstream.address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
