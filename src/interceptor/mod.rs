//! Request interception subsystem.
//!
//! # Data Flow
//! ```text
//! host navigation event
//!     → listener.rs (NavigationRequest)
//!     → filter.rs (match pattern AND resource type)
//!     → reconciler (one pass per matching request)
//!     → Interception (Ignored | Reconciled | Failed)
//! ```

pub mod filter;
pub mod listener;
pub mod pattern;

pub use filter::{AndFilter, RequestFilter, ResourceTypeFilter, UrlPatternFilter};
pub use listener::{Interception, NavigationRequest, RequestInterceptor};
pub use pattern::{PatternError, UrlPattern};
