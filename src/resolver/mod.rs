//! NeoNS name resolution subsystem.
//!
//! # Data Flow
//! ```text
//! request URL (http://test.neo/)
//!     → domain.rs (canonical domain: test.neo)
//!     → client.rs (invokefunction resolve(test.neo, 5))
//!     → domain.rs (base64 record → https:// URL)
//!     → Resolution::Resolved(url) | Resolution::Unresolved
//! ```
//!
//! # Design Decisions
//! - Failure to resolve is a normal outcome, never an error to the caller
//! - Exactly one RPC call per resolution; no retries, no caching

pub mod client;
pub mod domain;
pub mod types;

pub use client::NeoRpcClient;
pub use domain::{canonical_domain, decode_target};
pub use types::{DomainResolver, Resolution, ResolverError, ResolverResult};
