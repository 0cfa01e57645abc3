//! Reconciliation inputs and outcomes.

use url::Url;

use crate::config::{ErrorRulePolicy, RedirectConfig};
use crate::resolver::canonical_domain;
use crate::rules::{ResourceType, RuleId};

/// Per-request context derived from the navigation event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Exact request URL, used as the rule's url filter.
    pub request_url: String,
    /// Lookup key sent to the contract.
    pub canonical_domain: String,
}

impl RequestContext {
    pub fn new(request_url: impl Into<String>) -> Self {
        let request_url = request_url.into();
        let canonical_domain = canonical_domain(&request_url);
        Self {
            request_url,
            canonical_domain,
        }
    }
}

/// Fixed parts of every rule the reconciler writes.
#[derive(Debug, Clone)]
pub struct RuleTemplate {
    pub priority: u32,
    pub resource_types: Vec<ResourceType>,
    /// Redirect target for names that do not resolve.
    pub error_page: Url,
    pub error_policy: ErrorRulePolicy,
}

impl RuleTemplate {
    /// Build the template from validated configuration.
    pub fn from_config(config: &RedirectConfig) -> Result<Self, url::ParseError> {
        Ok(Self {
            priority: config.rules.priority,
            resource_types: config.interception.resource_types.clone(),
            error_page: Url::parse(&config.rules.error_page_url)?,
            error_policy: config.rules.error_rule_policy,
        })
    }
}

/// What a reconciliation pass did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// No rule existed; one was added.
    Created { rule_id: RuleId, target: String },
    /// The existing rule already pointed at the resolved target. No commit.
    Unchanged { rule_id: RuleId },
    /// Stale rules for the URL were swapped for a new one in a single batch.
    Replaced {
        removed: Vec<RuleId>,
        added: RuleId,
        target: String,
    },
    /// Resolution failed; an error-page rule was added.
    ErrorRedirect { rule_id: RuleId },
}

impl ReconcileOutcome {
    /// Whether the pass wrote to the store.
    pub fn committed(&self) -> bool {
        !matches!(self, ReconcileOutcome::Unchanged { .. })
    }
}

impl std::fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconcileOutcome::Created { rule_id, target } => {
                write!(f, "created rule {} -> {}", rule_id, target)
            }
            ReconcileOutcome::Unchanged { rule_id } => write!(f, "rule {} unchanged", rule_id),
            ReconcileOutcome::Replaced {
                removed,
                added,
                target,
            } => {
                let removed: Vec<String> = removed.iter().map(ToString::to_string).collect();
                write!(f, "replaced rule {} with {} -> {}", removed.join(","), added, target)
            }
            ReconcileOutcome::ErrorRedirect { rule_id } => {
                write!(f, "unresolved, error rule {}", rule_id)
            }
        }
    }
}
