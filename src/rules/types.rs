//! Dynamic rule types and error definitions.
//!
//! Rules serialize to the same JSON shape the browser's dynamic rule engine
//! accepts, so a host bridge can pass them through untouched.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rule identifier. Valid identifiers are `>= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub u32);

impl From<u32> for RuleId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<RuleId> for u32 {
    fn from(id: RuleId) -> Self {
        id.0
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resource types a rule condition can be scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    MainFrame,
    SubFrame,
    Stylesheet,
    Script,
    Image,
    Font,
    Object,
    Xmlhttprequest,
    Ping,
    Media,
    Websocket,
    Other,
}

impl std::str::FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| format!("unknown resource type '{}'", s))
    }
}

/// Kind of action a rule performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleActionType {
    Block,
    Redirect,
    Allow,
    UpgradeScheme,
}

/// Redirect destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    pub url: String,
}

/// What happens to a matching request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleAction {
    #[serde(rename = "type")]
    pub kind: RuleActionType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<Redirect>,
}

impl RuleAction {
    /// Redirect to `url`.
    pub fn redirect_to(url: impl Into<String>) -> Self {
        Self {
            kind: RuleActionType::Redirect,
            redirect: Some(Redirect { url: url.into() }),
        }
    }
}

/// Which requests a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleCondition {
    /// Request URL the rule matches. Rules written here use the exact URL.
    pub url_filter: String,

    #[serde(default)]
    pub resource_types: Vec<ResourceType>,
}

/// A persisted dynamic redirect rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectRule {
    pub id: RuleId,
    pub priority: u32,
    pub action: RuleAction,
    pub condition: RuleCondition,
}

impl RedirectRule {
    /// Build a rule redirecting `request_url` to `target`.
    pub fn redirect(
        id: RuleId,
        priority: u32,
        request_url: impl Into<String>,
        target: impl Into<String>,
        resource_types: Vec<ResourceType>,
    ) -> Self {
        Self {
            id,
            priority,
            action: RuleAction::redirect_to(target),
            condition: RuleCondition {
                url_filter: request_url.into(),
                resource_types,
            },
        }
    }

    /// The redirect target, if this is a redirect rule.
    pub fn redirect_target(&self) -> Option<&str> {
        match (&self.action.kind, &self.action.redirect) {
            (RuleActionType::Redirect, Some(redirect)) => Some(redirect.url.as_str()),
            _ => None,
        }
    }
}

/// One batch mutation against the rule store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleUpdate {
    #[serde(default)]
    pub add_rules: Vec<RedirectRule>,

    #[serde(default)]
    pub remove_rule_ids: Vec<RuleId>,
}

impl RuleUpdate {
    pub fn is_empty(&self) -> bool {
        self.add_rules.is_empty() && self.remove_rule_ids.is_empty()
    }
}

/// Errors reported by a rule store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Rule identifiers must be at least 1.
    #[error("Rule id {0} is invalid")]
    InvalidId(RuleId),

    /// An added rule collides with an existing or co-added rule.
    #[error("Rule with id {0} does not have a unique ID")]
    DuplicateId(RuleId),

    /// The highest stored id leaves no room for another.
    #[error("No rule id available after {0}")]
    IdsExhausted(RuleId),

    /// The batch would exceed the dynamic rule quota.
    #[error("Dynamic rule count exceeds the limit of {limit}")]
    QuotaExceeded { limit: usize },

    /// The committed state could not be persisted.
    #[error("Failed to persist rules: {0}")]
    Persistence(String),

    /// The host rule engine is not reachable.
    #[error("Rule store not available: {0}")]
    Unavailable(String),
}

/// Result type for rule store operations.
pub type StoreResult<T> = Result<T, StoreError>;
