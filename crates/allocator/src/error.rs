//! Error types for slot allocation
use std::any::Any;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message carried by every failure the boundary signals to the pool.
pub const ALLOCATION_FAILED: &str = "Failed to allocate slot";

/// Rendered in place of an absent message.
const NO_MESSAGE: &str = "slot allocation error";

/// Type-erased failure produced by an allocation routine.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for allocation operations
pub type Result<T, E = SlotAllocationError> = std::result::Result<T, E>;

/// The single error kind a pool sees when allocation fails.
///
/// Whatever went wrong inside the allocation routine, the pool receives this
/// value. It never carries the original failure: [`source`] is always `None`,
/// so callers can match on the kind without walking nested causes. The
/// original failure is only available through the observability sink.
///
/// Suppressed failures can be attached for callers that want to carry extra
/// context along; the boundary itself never attaches any.
///
/// [`source`]: std::error::Error::source
#[derive(Error, Debug, Default)]
#[error("{}", display_message(.message))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SlotAllocationError {
    message: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip))]
    suppressed: Vec<BoxError>,
}

fn display_message(message: &Option<String>) -> &str {
    message.as_deref().unwrap_or(NO_MESSAGE)
}

impl SlotAllocationError {
    /// Create an error with the given message.
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: Some(message.into()),
            suppressed: Vec::new(),
        }
    }

    /// Create an error without a message.
    pub fn without_message() -> Self {
        Self::default()
    }

    /// The error the boundary signals for every failed allocation.
    pub(crate) fn allocation_failed() -> Self {
        Self::new(ALLOCATION_FAILED)
    }

    /// The message this error was created with, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Attach a failure that was suppressed while handling this one.
    pub fn add_suppressed<E: Into<BoxError>>(&mut self, error: E) {
        self.suppressed.push(error.into());
    }

    /// Suppressed failures, in the order they were attached.
    #[must_use]
    pub fn suppressed(&self) -> &[BoxError] {
        &self.suppressed
    }
}

/// A panic that unwound out of an allocation routine.
///
/// Panics are caught at the boundary and turned into this error so they are
/// logged and reported exactly like returned errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct PanicError {
    message: String,
}

impl PanicError {
    /// Build from a panic payload as returned by `catch_unwind`.
    pub fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(message) => *message,
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(message) => (*message).to_string(),
                Err(_) => "allocation routine panicked".to_string(),
            },
        };
        Self { message }
    }

    /// The panic message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
