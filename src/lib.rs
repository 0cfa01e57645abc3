//! NeoNS `.neo` redirect library.
//!
//! Resolves `.neo` names through the NeoNS contract and keeps a store of
//! dynamic redirect rules in step with the answers.

pub mod config;
pub mod interceptor;
pub mod lifecycle;
pub mod observability;
pub mod reconcile;
pub mod resolver;
pub mod rules;

pub use config::RedirectConfig;
pub use interceptor::{Interception, NavigationRequest, RequestInterceptor};
pub use reconcile::{ReconcileOutcome, Reconciler};
pub use resolver::{DomainResolver, NeoRpcClient, Resolution};
pub use rules::{InMemoryRuleStore, RuleStore, RuleStoreAccessor};
