//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::rules::ResourceType;

/// Root configuration for the resolver.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RedirectConfig {
    /// Neo N3 node and NeoNS contract settings.
    pub node: NodeConfig,

    /// Which navigation requests are intercepted.
    pub interception: InterceptionConfig,

    /// Shape of the rules written to the store.
    pub rules: RulesConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub lifecycle: LifecycleConfig,
}

/// Neo N3 JSON-RPC settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Script hash of the NeoNS contract (`0x` + 40 hex digits).
    pub contract_hash: String,

    /// Record type passed to `resolve` (5 = CNAME).
    pub record_type: u32,

    /// RPC request timeout in seconds. Unset means no timeout.
    pub rpc_timeout_secs: Option<u64>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://n3.edgeofneo.com:10332".to_string(),
            contract_hash: "0x50ac1c37690cc2cfc594472833cf57505d5f46de".to_string(),
            record_type: 5,
            rpc_timeout_secs: None,
        }
    }
}

/// Request interception settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InterceptionConfig {
    /// Browser match pattern (e.g., "*://*.neo/").
    pub pattern: String,

    /// Resource types that trigger reconciliation.
    pub resource_types: Vec<ResourceType>,
}

impl Default for InterceptionConfig {
    fn default() -> Self {
        Self {
            pattern: "*://*.neo/".to_string(),
            resource_types: vec![ResourceType::MainFrame],
        }
    }
}

/// What to do with an existing rule when resolution fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ErrorRulePolicy {
    /// Always add a fresh error rule, even if one already exists.
    #[default]
    Append,
    /// Treat the error page like any other target (create, keep or replace).
    Replace,
}

/// Redirect rule settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Priority assigned to every rule written.
    pub priority: u32,

    /// Redirect target used when a name does not resolve.
    pub error_page_url: String,

    pub error_rule_policy: ErrorRulePolicy,

    /// Maximum number of dynamic rules the bundled store accepts.
    pub max_rules: usize,

    /// Optional JSON file the bundled store persists to.
    pub store_path: Option<String>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            priority: 1,
            error_page_url: "chrome-extension://neons-redirect/error_page.html".to_string(),
            error_rule_policy: ErrorRulePolicy::Append,
            max_rules: 30_000,
            store_path: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus endpoint in watch mode.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Keep-alive heartbeat interval in seconds.
    pub keepalive_secs: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self { keepalive_secs: 60 }
    }
}
