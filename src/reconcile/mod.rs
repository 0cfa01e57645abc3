//! Rule reconciliation subsystem.
//!
//! # Data Flow
//! ```text
//! request URL
//!     → resolver (Resolved(url) | Unresolved)
//!     → rules accessor (existing rule for exact URL?)
//!     → reconciler.rs decides:
//!         Unresolved               → add error-page rule
//!         no rule                  → add rule
//!         rule already → url       → nothing
//!         rule → other target      → remove old + add new (one batch)
//! ```

pub mod reconciler;
pub mod types;

pub use reconciler::Reconciler;
pub use types::{ReconcileOutcome, RequestContext, RuleTemplate};
