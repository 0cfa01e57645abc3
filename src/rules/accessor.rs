//! Read and commit helpers over a [`RuleStore`].
//!
//! Every read takes a fresh snapshot from the store. Nothing is cached, so
//! ids and lookups stay correct when rules are added or removed between
//! calls of the same reconciliation pass.

use std::sync::Arc;

use crate::observability::metrics;
use crate::rules::store::RuleStore;
use crate::rules::types::{RedirectRule, RuleId, RuleUpdate, StoreError, StoreResult};

/// Accessor used by the reconciler to read and mutate dynamic rules.
#[derive(Clone)]
pub struct RuleStoreAccessor {
    store: Arc<dyn RuleStore>,
}

impl RuleStoreAccessor {
    pub fn new(store: Arc<dyn RuleStore>) -> Self {
        Self { store }
    }

    /// Snapshot of the current rules.
    pub async fn list_rules(&self) -> StoreResult<Vec<RedirectRule>> {
        self.store.get_dynamic_rules().await
    }

    /// `1 + max(id)` over a fresh snapshot, or 1 for an empty store.
    pub async fn next_rule_id(&self) -> StoreResult<RuleId> {
        let rules = self.list_rules().await?;
        let highest = rules.iter().map(|rule| rule.id.0).max().unwrap_or(0);
        highest
            .checked_add(1)
            .map(RuleId)
            .ok_or(StoreError::IdsExhausted(RuleId(highest)))
    }

    /// The first rule whose url filter equals `request_url` exactly.
    pub async fn find_rule_for_url(&self, request_url: &str) -> StoreResult<Option<RedirectRule>> {
        let rules = self.list_rules().await?;
        Ok(rules
            .into_iter()
            .find(|rule| rule.condition.url_filter == request_url))
    }

    /// Every rule whose url filter equals `request_url`, in store order.
    pub async fn rules_for_url(&self, request_url: &str) -> StoreResult<Vec<RedirectRule>> {
        let rules = self.list_rules().await?;
        Ok(rules
            .into_iter()
            .filter(|rule| rule.condition.url_filter == request_url)
            .collect())
    }

    /// Apply additions and removals as a single batch.
    pub async fn commit(&self, add: Vec<RedirectRule>, remove_ids: Vec<RuleId>) -> StoreResult<()> {
        let update = RuleUpdate {
            add_rules: add,
            remove_rule_ids: remove_ids,
        };
        tracing::debug!(
            add = update.add_rules.len(),
            remove = update.remove_rule_ids.len(),
            "Committing rule update"
        );

        let result = self.store.update_dynamic_rules(update).await;
        if let Err(e) = &result {
            metrics::record_store_error();
            tracing::warn!(error = %e, "Rule update rejected");
        }
        result
    }

    /// Remove every dynamic rule. Returns how many were removed.
    pub async fn clear_all(&self) -> StoreResult<usize> {
        let ids: Vec<RuleId> = self.list_rules().await?.iter().map(|rule| rule.id).collect();
        let count = ids.len();
        if count == 0 {
            return Ok(0);
        }

        self.commit(Vec::new(), ids).await?;
        tracing::info!(count, "All dynamic rules cleared");
        Ok(count)
    }
}

impl std::fmt::Debug for RuleStoreAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleStoreAccessor").finish_non_exhaustive()
    }
}
