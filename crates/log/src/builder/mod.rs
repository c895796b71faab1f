//! Logger builder implementation
//!
//! This module is organized into:
//! - `format`: Format layer creation macro (reduces duplication)
//! - `reload`: Runtime filter reload logic

#[macro_use]
mod format;
mod reload;

// Re-export public types
pub use reload::ReloadHandle;

// External dependencies
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::{Layer, Layered};
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

// Internal crates
use crate::error::{LogError, LogResult};
use crate::{
    config::{Config, Format},
    writer,
};

type Base = Layered<reload::FilterLayer, Registry>;
type FmtLayer = Box<dyn Layer<Base> + Send + Sync + 'static>;

/// Logger builder
pub struct LoggerBuilder {
    config: Config,
    writer: Option<BoxMakeWriter>,
}

/// Guard that keeps the logger alive
///
/// Holds the reload handle when the configuration asked for one.
#[derive(Debug)]
pub struct LoggerGuard {
    reload_handle: Option<ReloadHandle>,
}

impl LoggerGuard {
    /// Handle for changing the filter at runtime, if `reloadable` was set
    pub fn reload_handle(&self) -> Option<&ReloadHandle> {
        self.reload_handle.as_ref()
    }
}

impl LoggerBuilder {
    /// Create builder from config
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self {
            config,
            writer: None,
        }
    }

    /// Send output to `writer` instead of the configured destination
    #[must_use]
    pub fn with_writer<W>(mut self, writer: W) -> Self
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        self.writer = Some(BoxMakeWriter::new(writer));
        self
    }

    /// Assemble the subscriber without installing it
    ///
    /// Useful for scoped installation with `tracing::subscriber::with_default`.
    ///
    /// # Errors
    ///
    /// Returns error if the filter string cannot be parsed
    pub fn into_subscriber(self) -> LogResult<impl tracing::Subscriber + Send + Sync + 'static> {
        self.into_parts().map(|(subscriber, _)| subscriber)
    }

    /// Assemble the subscriber and its reload handle without installing them
    ///
    /// # Errors
    ///
    /// Returns error if the filter string cannot be parsed
    pub fn into_parts(
        self,
    ) -> LogResult<(
        impl tracing::Subscriber + Send + Sync + 'static,
        Option<ReloadHandle>,
    )> {
        let filter = EnvFilter::try_new(&self.config.level)
            .map_err(|e| LogError::filter(&self.config.level, e))?;

        let (filter_layer, reload_handle) =
            reload::create_filter_layer(filter, &self.config.level, self.config.reloadable);

        let writer = self
            .writer
            .unwrap_or_else(|| writer::make_writer(&self.config.writer));
        let display = &self.config.display;

        let fmt_layer: FmtLayer = match self.config.format {
            Format::Pretty => boxed_fmt_layer!(
                tracing_subscriber::fmt::layer().pretty().with_writer(writer),
                display
            ),
            Format::Compact => boxed_fmt_layer!(
                tracing_subscriber::fmt::layer().compact().with_writer(writer),
                display
            ),
            Format::Json => boxed_fmt_layer!(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_current_span(true)
                    .with_span_list(display.span_list)
                    .flatten_event(display.flatten),
                display
            ),
        };

        let subscriber = Registry::default().with(filter_layer).with(fmt_layer);
        Ok((subscriber, reload_handle))
    }

    /// Build and install the logger as the global default
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Filter string cannot be parsed
    /// - A global subscriber is already installed
    pub fn build(self) -> LogResult<LoggerGuard> {
        let (subscriber, reload_handle) = self.into_parts()?;
        subscriber
            .try_init()
            .map_err(|e| LogError::Init(e.to_string()))?;
        Ok(LoggerGuard { reload_handle })
    }
}

impl std::fmt::Debug for LoggerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerBuilder")
            .field("config", &self.config)
            .field("custom_writer", &self.writer.is_some())
            .finish()
    }
}
