//! Allocation fault boundary.
//!
//! [`LoggingAllocator`] wraps a concrete allocation routine and makes every
//! failure inside it observable and uniform:
//!
//! - the routine is called exactly once per `allocate`;
//! - a successful object is handed back untouched;
//! - an error or a panic is logged once at WARN with the original failure
//!   attached, and the pool receives a [`SlotAllocationError`] with the fixed
//!   message [`ALLOCATION_FAILED`] and no source.
//!
//! The boundary keeps no state between calls and is safe to share across
//! threads and tasks.
//!
//! # Panics in the routine
//!
//! A panic is caught after unwinding, so the process panic hook has already
//! run by the time the boundary logs. With the default hook, one panicking
//! allocation produces two outputs: the unstructured
//! `thread '..' panicked at ..` report on stderr, followed by the WARN
//! record. Install a custom hook with [`std::panic::set_hook`] if only the
//! structured record is wanted. Builds with `panic = "abort"` never reach the
//! boundary at all.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::FutureExt;
use tracing::Level;

use crate::allocator::{self, Allocator, AsyncTryAllocate, FnAllocator, TryAllocate};
use crate::error::{ALLOCATION_FAILED, BoxError, PanicError, SlotAllocationError};
use crate::sink::{ObservabilitySink, TracingSink};

/// Fault boundary around an allocation routine.
///
/// Implements [`Allocator`] for blocking routines ([`TryAllocate`]) and
/// [`AsyncAllocator`](allocator::AsyncAllocator) for async ones
/// ([`AsyncTryAllocate`]).
pub struct LoggingAllocator<A> {
    inner: A,
    sink: Arc<dyn ObservabilitySink>,
}

impl<A> LoggingAllocator<A> {
    /// Wrap `inner`, reporting failures through [`TracingSink`].
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            sink: Arc::new(TracingSink),
        }
    }

    /// Report failures through `sink` instead.
    pub fn with_sink(mut self, sink: Arc<dyn ObservabilitySink>) -> Self {
        self.sink = sink;
        self
    }

    /// The wrapped routine.
    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Unwrap the routine.
    pub fn into_inner(self) -> A {
        self.inner
    }

    /// Log `cause` and replace it with the pool-facing error.
    fn reject(&self, cause: BoxError) -> SlotAllocationError {
        self.sink.log(Level::WARN, ALLOCATION_FAILED, &*cause);
        SlotAllocationError::allocation_failed()
    }

    fn settle<P, E>(
        &self,
        outcome: std::thread::Result<Result<P, E>>,
    ) -> Result<P, SlotAllocationError>
    where
        E: Into<BoxError>,
    {
        match outcome {
            Ok(Ok(poolable)) => Ok(poolable),
            Ok(Err(err)) => Err(self.reject(err.into())),
            Err(payload) => Err(self.reject(Box::new(PanicError::from_payload(payload)))),
        }
    }
}

impl<S: ?Sized, P, E, F> LoggingAllocator<FnAllocator<S, P, E, F>>
where
    F: Fn(&S) -> Result<P, E>,
{
    /// Wrap a closure as the allocation routine.
    pub fn from_fn(allocate: F) -> Self {
        Self::new(FnAllocator::new(allocate))
    }
}

impl<A: Clone> Clone for LoggingAllocator<A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<A: std::fmt::Debug> std::fmt::Debug for LoggingAllocator<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingAllocator")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl<A: TryAllocate> Allocator for LoggingAllocator<A> {
    type Slot = A::Slot;
    type Poolable = A::Poolable;
    type Error = SlotAllocationError;

    fn allocate(&self, slot: &A::Slot) -> Result<A::Poolable, SlotAllocationError> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.inner.try_allocate(slot)));
        self.settle(outcome)
    }

    fn deallocate(&self, poolable: A::Poolable) -> Result<(), BoxError> {
        self.inner.deallocate(poolable).map_err(Into::into)
    }
}

impl<A: AsyncTryAllocate> allocator::AsyncAllocator for LoggingAllocator<A> {
    type Slot = A::Slot;
    type Poolable = A::Poolable;
    type Error = SlotAllocationError;

    async fn allocate(&self, slot: &A::Slot) -> Result<A::Poolable, SlotAllocationError> {
        // The routine is created inside the guarded future so a panic while
        // building it is caught too.
        let outcome = AssertUnwindSafe(async { self.inner.try_allocate(slot).await })
            .catch_unwind()
            .await;
        self.settle(outcome)
    }

    async fn deallocate(&self, poolable: A::Poolable) -> Result<(), BoxError> {
        self.inner.deallocate(poolable).await.map_err(Into::into)
    }
}
