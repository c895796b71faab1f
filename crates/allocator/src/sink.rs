//! Observability sink the boundary reports failures to.

use std::error::Error;

use tracing::Level;

use crate::chain::DisplayChain;

/// Receives failure records from the boundary.
///
/// Implementations must tolerate concurrent calls; the boundary does not
/// serialize access.
///
/// # Example
///
/// ```rust
/// use std::error::Error;
/// use slotguard_allocator::ObservabilitySink;
///
/// struct StderrSink;
///
/// impl ObservabilitySink for StderrSink {
///     fn log(&self, level: tracing::Level, message: &str, cause: &(dyn Error + 'static)) {
///         eprintln!("[{level}] {message}: {cause}");
///     }
/// }
/// ```
pub trait ObservabilitySink: Send + Sync {
    /// Record `message` at `level`, with `cause` attached intact.
    fn log(&self, level: Level, message: &str, cause: &(dyn Error + 'static));
}

/// Sink that emits records as `tracing` events.
///
/// The cause is attached as the structured `error` field, so subscribers that
/// understand `dyn Error` values can walk its sources; the rendered chain is
/// attached as `causes` for plain-text output.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TracingSink {
    /// Create a new tracing sink
    pub fn new() -> Self {
        Self
    }
}

impl ObservabilitySink for TracingSink {
    fn log(&self, level: Level, message: &str, cause: &(dyn Error + 'static)) {
        let causes = DisplayChain(cause);

        macro_rules! log_at_level {
            ($level:expr) => {
                match $level {
                    Level::ERROR => tracing::error!(target: "slotguard_allocator::boundary", error = cause, causes = %causes, "{message}"),
                    Level::WARN => tracing::warn!(target: "slotguard_allocator::boundary", error = cause, causes = %causes, "{message}"),
                    Level::INFO => tracing::info!(target: "slotguard_allocator::boundary", error = cause, causes = %causes, "{message}"),
                    Level::DEBUG => tracing::debug!(target: "slotguard_allocator::boundary", error = cause, causes = %causes, "{message}"),
                    _ => tracing::trace!(target: "slotguard_allocator::boundary", error = cause, causes = %causes, "{message}"),
                }
            };
        }

        log_at_level!(level);
    }
}
