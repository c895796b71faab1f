//! Testing utilities for allocators and sinks
#![allow(missing_docs)]

use std::error::Error;
use std::fmt;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::Level;
use uuid::Uuid;

use crate::allocator::{AsyncTryAllocate, TryAllocate};
use crate::chain::Chain;
use crate::error::BoxError;
use crate::sink::ObservabilitySink;
use crate::slot::{Poolable, Slot};

// ---------------------------------------------------------------------------
// TestSlot
// ---------------------------------------------------------------------------

struct SlotInner {
    id: Uuid,
    releases: AtomicUsize,
    expired: AtomicBool,
}

/// Slot handle that counts what the pool would be told.
///
/// Clones share identity; use [`TestSlot::same_as`] to compare handles.
#[derive(Clone)]
pub struct TestSlot {
    inner: Arc<SlotInner>,
}

impl TestSlot {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SlotInner {
                id: Uuid::new_v4(),
                releases: AtomicUsize::new(0),
                expired: AtomicBool::new(false),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Whether `other` is a handle to the same slot.
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn releases(&self) -> usize {
        self.inner.releases.load(Ordering::SeqCst)
    }

    pub fn is_expired(&self) -> bool {
        self.inner.expired.load(Ordering::SeqCst)
    }
}

impl Default for TestSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TestSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestSlot").field("id", &self.inner.id).finish()
    }
}

impl Slot for TestSlot {
    fn release(&self) {
        self.inner.releases.fetch_add(1, Ordering::SeqCst);
    }

    fn expire(&self) {
        self.inner.expired.store(true, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// TestPoolable
// ---------------------------------------------------------------------------

/// Object bound to the slot it was allocated for.
#[derive(Debug)]
pub struct TestPoolable {
    slot: TestSlot,
    value: String,
    released: bool,
}

impl TestPoolable {
    pub fn new(slot: TestSlot, value: impl Into<String>) -> Self {
        Self {
            slot,
            value: value.into(),
            released: false,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn slot(&self) -> &TestSlot {
        &self.slot
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Poolable for TestPoolable {
    /// Releases into the slot.
    ///
    /// # Panics
    ///
    /// Panics on a second release so double-release bugs surface in tests.
    fn release(&mut self) {
        assert!(!self.released, "object already released");
        self.released = true;
        self.slot.release();
    }
}

// ---------------------------------------------------------------------------
// TestAllocator
// ---------------------------------------------------------------------------

type AllocateFn = dyn Fn(&TestSlot) -> Result<TestPoolable, BoxError> + Send + Sync;

/// Allocation routine driven by a closure, with call counters.
///
/// Implements [`TryAllocate`]; see [`TestAllocator::into_async`] for the
/// async flavour.
#[derive(Clone)]
pub struct TestAllocator {
    allocate: Arc<AllocateFn>,
    calls: Arc<AtomicUsize>,
    deallocations: Arc<AtomicUsize>,
}

impl TestAllocator {
    pub fn new<F>(allocate: F) -> Self
    where
        F: Fn(&TestSlot) -> Result<TestPoolable, BoxError> + Send + Sync + 'static,
    {
        Self {
            allocate: Arc::new(allocate),
            calls: Arc::new(AtomicUsize::new(0)),
            deallocations: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Always succeeds with the value `"test-value"`.
    pub fn successful() -> Self {
        Self::successful_with("test-value")
    }

    /// Always succeeds with `value`.
    pub fn successful_with(value: &str) -> Self {
        let value = value.to_string();
        Self::new(move |slot| Ok(TestPoolable::new(slot.clone(), value.clone())))
    }

    /// Always fails with an I/O error carrying `message`.
    pub fn failing(message: &str) -> Self {
        let message = message.to_string();
        Self::new(move |_| Err(io::Error::other(message.clone()).into()))
    }

    /// Always fails with a fresh error from `make`.
    pub fn failing_with<F>(make: F) -> Self
    where
        F: Fn() -> BoxError + Send + Sync + 'static,
    {
        Self::new(move |_| Err(make()))
    }

    /// Always panics with `message`.
    pub fn panicking(message: &str) -> Self {
        let message = message.to_string();
        Self::new(move |_| panic!("{message}"))
    }

    /// How many times the routine ran.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// How many objects were deallocated.
    pub fn deallocations(&self) -> usize {
        self.deallocations.load(Ordering::SeqCst)
    }

    fn run(&self, slot: &TestSlot) -> Result<TestPoolable, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.allocate)(slot)
    }

    fn drop_poolable(&self, poolable: TestPoolable) {
        self.deallocations.fetch_add(1, Ordering::SeqCst);
        drop(poolable);
    }
}

impl fmt::Debug for TestAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestAllocator")
            .field("calls", &self.calls())
            .field("deallocations", &self.deallocations())
            .finish_non_exhaustive()
    }
}

impl TryAllocate for TestAllocator {
    type Slot = TestSlot;
    type Poolable = TestPoolable;
    type Error = BoxError;

    fn try_allocate(&self, slot: &TestSlot) -> Result<TestPoolable, BoxError> {
        self.run(slot)
    }

    fn deallocate(&self, poolable: TestPoolable) -> Result<(), BoxError> {
        self.drop_poolable(poolable);
        Ok(())
    }
}

/// Async view of a [`TestAllocator`], sharing its routine and counters.
#[derive(Debug, Clone)]
pub struct AsyncTestAllocator(TestAllocator);

impl TestAllocator {
    /// Drive the same routine through [`AsyncTryAllocate`].
    pub fn into_async(self) -> AsyncTestAllocator {
        AsyncTestAllocator(self)
    }
}

impl std::ops::Deref for AsyncTestAllocator {
    type Target = TestAllocator;

    fn deref(&self) -> &TestAllocator {
        &self.0
    }
}

impl AsyncTryAllocate for AsyncTestAllocator {
    type Slot = TestSlot;
    type Poolable = TestPoolable;
    type Error = BoxError;

    async fn try_allocate(&self, slot: &TestSlot) -> Result<TestPoolable, BoxError> {
        self.0.run(slot)
    }

    async fn deallocate(&self, poolable: TestPoolable) -> Result<(), BoxError> {
        self.0.drop_poolable(poolable);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RecordingSink
// ---------------------------------------------------------------------------

/// One record captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: Level,
    pub message: String,
    /// `Display` of the attached cause.
    pub cause: String,
    /// `Display` of the cause and each of its sources, outermost first.
    pub chain: Vec<String>,
}

impl LogRecord {
    /// The innermost entry of the cause chain.
    pub fn root_cause(&self) -> Option<&str> {
        self.chain.last().map(String::as_str)
    }
}

/// In-memory sink that keeps every record it receives.
///
/// Clones share the same record list.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of captured records.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl ObservabilitySink for RecordingSink {
    fn log(&self, level: Level, message: &str, cause: &(dyn Error + 'static)) {
        let record = LogRecord {
            level,
            message: message.to_string(),
            cause: cause.to_string(),
            chain: Chain::new(cause).map(ToString::to_string).collect(),
        };
        self.records.lock().push(record);
    }
}
