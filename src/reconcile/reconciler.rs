//! Rule reconciliation.
//!
//! # Responsibilities
//! - Resolve the request URL
//! - Compare the outcome with the rule already stored for that exact URL
//! - Create, keep, or replace the rule with at most one batch commit
//!
//! # Design Decisions
//! - No retries and no follow-up work; a failed commit is left for the next
//!   matching request to reconcile from scratch
//! - No locking across passes: two racing passes may both add a rule
//! - With the default error policy the error path never looks for an
//!   existing rule, so repeated failures can stack duplicate error rules;
//!   the next resolved pass removes all of them at once

use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use crate::config::ErrorRulePolicy;
use crate::observability::metrics;
use crate::reconcile::types::{ReconcileOutcome, RequestContext, RuleTemplate};
use crate::resolver::{DomainResolver, Resolution};
use crate::rules::{RedirectRule, RuleId, RuleStoreAccessor, StoreResult};

/// Reconciles navigation requests against the dynamic rule store.
pub struct Reconciler {
    resolver: Arc<dyn DomainResolver>,
    rules: RuleStoreAccessor,
    template: RuleTemplate,
}

impl Reconciler {
    pub fn new(
        resolver: Arc<dyn DomainResolver>,
        rules: RuleStoreAccessor,
        template: RuleTemplate,
    ) -> Self {
        Self {
            resolver,
            rules,
            template,
        }
    }

    /// Run one reconciliation pass for `request_url`.
    pub async fn reconcile(&self, request_url: &str) -> StoreResult<ReconcileOutcome> {
        let ctx = RequestContext::new(request_url);
        let span = tracing::info_span!(
            "reconcile",
            pass_id = %Uuid::new_v4(),
            domain = %ctx.canonical_domain
        );
        self.run(&ctx).instrument(span).await
    }

    async fn run(&self, ctx: &RequestContext) -> StoreResult<ReconcileOutcome> {
        match self.resolver.resolve(&ctx.request_url).await {
            Resolution::Unresolved => {
                tracing::info!(request_url = %ctx.request_url, "Invalid domain, redirecting to error page");
                let target = self.template.error_page.as_str();
                match self.template.error_policy {
                    ErrorRulePolicy::Append => {
                        let rule_id = self.add_rule(ctx, target).await?;
                        metrics::record_rule_commit("error_redirect");
                        Ok(ReconcileOutcome::ErrorRedirect { rule_id })
                    }
                    ErrorRulePolicy::Replace => self.sync_rule(ctx, target, true).await,
                }
            }
            Resolution::Resolved(url) => self.sync_rule(ctx, url.as_str(), false).await,
        }
    }

    /// Make the stored rule for this URL point at `target`.
    ///
    /// Every rule matching the URL is removed in the same batch that adds
    /// the replacement, so stacked error rules collapse into one.
    async fn sync_rule(
        &self,
        ctx: &RequestContext,
        target: &str,
        is_error: bool,
    ) -> StoreResult<ReconcileOutcome> {
        let matching = self.rules.rules_for_url(&ctx.request_url).await?;
        let Some(existing) = matching.first() else {
            tracing::debug!("No existing rule found, creating new rule");
            let rule_id = self.add_rule(ctx, target).await?;
            return Ok(if is_error {
                metrics::record_rule_commit("error_redirect");
                ReconcileOutcome::ErrorRedirect { rule_id }
            } else {
                metrics::record_rule_commit("created");
                ReconcileOutcome::Created {
                    rule_id,
                    target: target.to_string(),
                }
            });
        };

        if matching.len() == 1 && existing.redirect_target() == Some(target) {
            tracing::debug!(rule_id = %existing.id, "Existing rule has correct redirect, allowing request");
            return Ok(ReconcileOutcome::Unchanged {
                rule_id: existing.id,
            });
        }

        let removed: Vec<RuleId> = matching.iter().map(|rule| rule.id).collect();
        tracing::info!(
            rule_id = %existing.id,
            stale = removed.len(),
            old_target = existing.redirect_target().unwrap_or("<none>"),
            new_target = target,
            "Redirect URL is outdated, replacing rule"
        );
        let added = self.rules.next_rule_id().await?;
        let rule = self.build_rule(added, ctx, target);
        self.rules.commit(vec![rule], removed.clone()).await?;
        metrics::record_rule_commit("replaced");

        Ok(ReconcileOutcome::Replaced {
            removed,
            added,
            target: target.to_string(),
        })
    }

    async fn add_rule(&self, ctx: &RequestContext, target: &str) -> StoreResult<RuleId> {
        let rule_id = self.rules.next_rule_id().await?;
        let rule = self.build_rule(rule_id, ctx, target);
        self.rules.commit(vec![rule], Vec::new()).await?;
        tracing::info!(%rule_id, redirect = target, "Redirect rule added");
        Ok(rule_id)
    }

    fn build_rule(&self, id: RuleId, ctx: &RequestContext, target: &str) -> RedirectRule {
        RedirectRule::redirect(
            id,
            self.template.priority,
            ctx.request_url.clone(),
            target,
            self.template.resource_types.clone(),
        )
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("template", &self.template)
            .finish_non_exhaustive()
    }
}
