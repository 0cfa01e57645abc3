//! OS signal handling.
//!
//! Ctrl-C (SIGINT) triggers graceful shutdown of watch mode.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::Shutdown;

/// Spawn a task that triggers `shutdown` on Ctrl-C.
pub fn spawn_signal_handler(shutdown: Arc<Shutdown>) -> JoinHandle<()> {
    let mut done = shutdown.subscribe();
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                match result {
                    Ok(()) => tracing::info!("Interrupt received, shutting down"),
                    Err(e) => tracing::error!(error = %e, "Failed to listen for interrupt"),
                }
                shutdown.trigger();
            }
            _ = done.recv() => {}
        }
    })
}
