//! The rule engine seam.

use async_trait::async_trait;

use crate::rules::types::{RedirectRule, RuleUpdate, StoreResult};

/// A host-managed store of dynamic rules.
///
/// The store is the sole source of truth. Callers must not cache its
/// contents across reconciliation passes.
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Snapshot of every persisted rule, in no particular order.
    async fn get_dynamic_rules(&self) -> StoreResult<Vec<RedirectRule>>;

    /// Apply removals and additions together as one batch.
    async fn update_dynamic_rules(&self, update: RuleUpdate) -> StoreResult<()>;
}
