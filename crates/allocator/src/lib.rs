//! # Slotguard Allocator
//!
//! Allocation fault boundary for object pools.
//!
//! A pool asks its allocator for a fresh object whenever a slot needs to be
//! filled. [`LoggingAllocator`] sits between the pool and the routine that
//! actually builds the object: it calls the routine exactly once, and when the
//! routine fails (returns an error or panics) it logs the original failure
//! with its whole cause chain and hands the pool a single, stable
//! [`SlotAllocationError`] instead.
//!
//! Test doubles live in the `testing` module behind the `testing` feature.
//!
//! ```rust
//! # #[cfg(feature = "testing")] {
//! use std::io;
//! use std::sync::Arc;
//!
//! use slotguard_allocator::testing::{RecordingSink, TestPoolable, TestSlot};
//! use slotguard_allocator::{Allocator, LoggingAllocator};
//!
//! let sink = RecordingSink::new();
//! let allocator = LoggingAllocator::from_fn(|_slot: &TestSlot| -> io::Result<TestPoolable> {
//!     Err(io::Error::other("disk full"))
//! })
//! .with_sink(Arc::new(sink.clone()));
//!
//! let err = allocator.allocate(&TestSlot::new()).unwrap_err();
//! assert_eq!(err.message(), Some("Failed to allocate slot"));
//! assert_eq!(sink.records()[0].cause, "disk full");
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod allocator;
pub mod boundary;
pub mod chain;
pub mod error;
pub mod sink;
pub mod slot;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use allocator::{Allocator, AsyncAllocator, AsyncTryAllocate, FnAllocator, TryAllocate};
pub use boundary::LoggingAllocator;
pub use chain::{Chain, DisplayChain};
pub use error::{ALLOCATION_FAILED, BoxError, PanicError, Result, SlotAllocationError};
pub use sink::{ObservabilitySink, TracingSink};
pub use slot::{Poolable, Slot};
