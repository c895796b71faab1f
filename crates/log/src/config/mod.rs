//! Configuration types and builders
//!
//! This module provides configuration types for the logging system, organized into:
//! - `base`: Core configuration structs (Config, Format, Level)
//! - `writer`: Writer and display configuration
//! - `presets`: Pre-configured setups (development, production, environment)

mod base;
mod presets;
mod writer;

// Re-export all public types
pub use base::{Config, Format, Level};
pub use writer::{DisplayConfig, WriterConfig};
