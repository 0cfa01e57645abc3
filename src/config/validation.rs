//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate URLs, the contract hash and the interception pattern
//! - Validate value ranges (priority, quotas, intervals)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RedirectConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::RedirectConfig;
use crate::interceptor::UrlPattern;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &RedirectConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.node.rpc_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "node.rpc_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("node.rpc_url", e.to_string())),
    }

    if !is_script_hash(&config.node.contract_hash) {
        errors.push(ValidationError::new(
            "node.contract_hash",
            "expected 0x followed by 40 hex digits",
        ));
    }

    if config.node.rpc_timeout_secs == Some(0) {
        errors.push(ValidationError::new(
            "node.rpc_timeout_secs",
            "must be greater than 0 when set",
        ));
    }

    if let Err(e) = UrlPattern::parse(&config.interception.pattern) {
        errors.push(ValidationError::new("interception.pattern", e.to_string()));
    }

    if config.interception.resource_types.is_empty() {
        errors.push(ValidationError::new(
            "interception.resource_types",
            "at least one resource type is required",
        ));
    }

    if config.rules.priority == 0 {
        errors.push(ValidationError::new("rules.priority", "must be at least 1"));
    }

    if let Err(e) = Url::parse(&config.rules.error_page_url) {
        errors.push(ValidationError::new("rules.error_page_url", e.to_string()));
    }

    if config.rules.max_rules == 0 {
        errors.push(ValidationError::new("rules.max_rules", "must be at least 1"));
    }

    if config.lifecycle.keepalive_secs == 0 {
        errors.push(ValidationError::new(
            "lifecycle.keepalive_secs",
            "must be at least 1",
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid socket address '{}'", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_script_hash(hash: &str) -> bool {
    hash.strip_prefix("0x")
        .map(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false)
}
