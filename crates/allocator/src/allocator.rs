//! Allocator capabilities.
//!
//! Two sides meet here:
//! - [`Allocator`] / [`AsyncAllocator`] are what a pool calls. A pool is
//!   generic over them and never sees how objects are built.
//! - [`TryAllocate`] / [`AsyncTryAllocate`] are what concrete allocators
//!   implement. They may fail with any error type; wrapping one in a
//!   [`LoggingAllocator`](crate::LoggingAllocator) turns it into a pool-facing
//!   allocator with a single error kind.

use std::future::Future;
use std::marker::PhantomData;

use crate::error::BoxError;
use crate::slot::{Poolable, Slot};

/// Blocking allocator capability consumed by a pool.
pub trait Allocator: Send + Sync {
    /// Slot type handed in by the pool.
    type Slot: Slot + ?Sized;
    /// Object type produced for the pool.
    type Poolable: Poolable;
    /// Error signaled when allocation fails.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Produce an object for `slot`.
    fn allocate(&self, slot: &Self::Slot) -> Result<Self::Poolable, Self::Error>;

    /// Return an object to its raw state before the pool drops it.
    fn deallocate(&self, poolable: Self::Poolable) -> Result<(), BoxError>;
}

/// Async allocator capability consumed by a pool.
pub trait AsyncAllocator: Send + Sync {
    /// Slot type handed in by the pool.
    type Slot: Slot + ?Sized;
    /// Object type produced for the pool.
    type Poolable: Poolable;
    /// Error signaled when allocation fails.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Produce an object for `slot`.
    fn allocate(
        &self,
        slot: &Self::Slot,
    ) -> impl Future<Output = Result<Self::Poolable, Self::Error>> + Send;

    /// Return an object to its raw state before the pool drops it.
    fn deallocate(&self, poolable: Self::Poolable)
    -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Allocation routine supplied by a concrete allocator.
pub trait TryAllocate: Send + Sync {
    /// Slot type handed in by the pool.
    type Slot: Slot + ?Sized;
    /// Object type this routine builds.
    type Poolable: Poolable;
    /// Any failure the routine can produce.
    type Error: Into<BoxError>;

    /// Build an object for `slot`.
    ///
    /// Cleaning up a partially built object on failure is this routine's job.
    fn try_allocate(&self, slot: &Self::Slot) -> Result<Self::Poolable, Self::Error>;

    /// Tear down an object the pool no longer needs.
    fn deallocate(&self, poolable: Self::Poolable) -> Result<(), Self::Error>;
}

/// Async allocation routine supplied by a concrete allocator.
pub trait AsyncTryAllocate: Send + Sync {
    /// Slot type handed in by the pool.
    type Slot: Slot + ?Sized;
    /// Object type this routine builds.
    type Poolable: Poolable;
    /// Any failure the routine can produce.
    type Error: Into<BoxError>;

    /// Build an object for `slot`.
    fn try_allocate(
        &self,
        slot: &Self::Slot,
    ) -> impl Future<Output = Result<Self::Poolable, Self::Error>> + Send;

    /// Tear down an object the pool no longer needs.
    fn deallocate(
        &self,
        poolable: Self::Poolable,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Adapts a closure into a [`TryAllocate`] routine.
///
/// Deallocation simply drops the object.
pub struct FnAllocator<S: ?Sized, P, E, F> {
    allocate: F,
    _marker: PhantomData<fn(&S) -> Result<P, E>>,
}

impl<S: ?Sized, P, E, F> FnAllocator<S, P, E, F>
where
    F: Fn(&S) -> Result<P, E>,
{
    /// Wrap `allocate`.
    pub fn new(allocate: F) -> Self {
        Self {
            allocate,
            _marker: PhantomData,
        }
    }
}

impl<S: ?Sized, P, E, F: Clone> Clone for FnAllocator<S, P, E, F> {
    fn clone(&self) -> Self {
        Self {
            allocate: self.allocate.clone(),
            _marker: PhantomData,
        }
    }
}

impl<S: ?Sized, P, E, F> std::fmt::Debug for FnAllocator<S, P, E, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnAllocator")
            .field("allocate", &std::any::type_name::<F>())
            .finish()
    }
}

impl<S, P, E, F> TryAllocate for FnAllocator<S, P, E, F>
where
    S: Slot + ?Sized,
    P: Poolable,
    E: Into<BoxError>,
    F: Fn(&S) -> Result<P, E> + Send + Sync,
{
    type Slot = S;
    type Poolable = P;
    type Error = E;

    fn try_allocate(&self, slot: &S) -> Result<P, E> {
        (self.allocate)(slot)
    }

    fn deallocate(&self, poolable: P) -> Result<(), E> {
        drop(poolable);
        Ok(())
    }
}
