//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! resolver, rules, reconcile, interceptor produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stderr (fmt layer)
//!     → Prometheus scrape endpoint (watch mode, optional)
//! ```
//!
//! # Design Decisions
//! - Each reconciliation pass runs in a span carrying a pass ID
//! - Metrics are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
