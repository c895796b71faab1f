//! # Slotguard Log
//!
//! Logging setup for applications that run slotguard allocators.
//!
//! The allocation boundary reports failures through `tracing`; this crate
//! installs the subscriber that turns those events into output.
//!
//! ```rust,no_run
//! fn main() -> slotguard_log::LogResult<()> {
//!     let _guard = slotguard_log::auto_init()?;
//!     slotguard_log::info!(pool = "db", "pool starting");
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod builder;
mod config;
mod error;
mod writer;

pub use builder::{LoggerBuilder, LoggerGuard, ReloadHandle};
pub use config::{Config, DisplayConfig, Format, Level, WriterConfig};
pub use error::{LogError, LogResult};

// Re-export tracing macros
pub use tracing::{debug, error, info, trace, warn};

/// Auto-detect and initialize the best logging configuration.
///
/// Uses the environment when `SLOTGUARD_LOG` or `RUST_LOG` is set, the
/// development preset in debug builds, and the production preset otherwise.
pub fn auto_init() -> LogResult<LoggerGuard> {
    if std::env::var("SLOTGUARD_LOG").is_ok() || std::env::var("RUST_LOG").is_ok() {
        init_with(Config::from_env())
    } else if cfg!(debug_assertions) {
        init_with(Config::development())
    } else {
        init_with(Config::production())
    }
}

/// Initialize with default configuration
pub fn init() -> LogResult<LoggerGuard> {
    init_with(Config::default())
}

/// Initialize with custom configuration
pub fn init_with(config: Config) -> LogResult<LoggerGuard> {
    LoggerBuilder::from_config(config).build()
}
