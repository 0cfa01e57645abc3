//! Dynamic rule subsystem.
//!
//! # Data Flow
//! ```text
//! host rule engine (or InMemoryRuleStore)
//!     ← store.rs (RuleStore trait: get / update)
//!     ← accessor.rs (list, next id, find by url, commit, clear)
//!     ← reconciler
//! ```
//!
//! # Design Decisions
//! - The store is the only source of truth; no in-process rule cache
//! - Rules are never edited in place; replacement is remove + add in one batch
//! - Ids are `max + 1` over a fresh snapshot, so freed ids may be reused later

pub mod accessor;
pub mod memory;
pub mod store;
pub mod types;

pub use accessor::RuleStoreAccessor;
pub use memory::InMemoryRuleStore;
pub use store::RuleStore;
pub use types::{
    Redirect, RedirectRule, ResourceType, RuleAction, RuleActionType, RuleCondition, RuleId,
    RuleUpdate, StoreError, StoreResult,
};
