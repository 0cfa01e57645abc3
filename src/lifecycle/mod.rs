//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Watch mode:
//!     Load config → build resolver, store, interceptor → start keep-alive
//!     → dispatch requests until stdin closes or Ctrl-C
//!
//! Shutdown (shutdown.rs):
//!     Signal or EOF → broadcast → keep-alive and reader loops exit
//! ```

pub mod keepalive;
pub mod shutdown;
pub mod signals;

pub use keepalive::KeepAlive;
pub use shutdown::Shutdown;
