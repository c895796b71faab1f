//! Allocation boundary behavior tests.
//!
//! Drives `LoggingAllocator` with routines that succeed, fail with assorted
//! error types, fail with nested causes, and panic, and checks both what the
//! pool receives and what the sink records.

use std::error::Error as _;
use std::io;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use rstest::rstest;
use slotguard_allocator::testing::{LogRecord, RecordingSink, TestAllocator, TestPoolable, TestSlot};
use slotguard_allocator::{ALLOCATION_FAILED, Allocator, BoxError, LoggingAllocator, Slot};
use tracing::Level;

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

fn boundary(inner: TestAllocator) -> (LoggingAllocator<TestAllocator>, RecordingSink) {
    let sink = RecordingSink::new();
    let allocator = LoggingAllocator::new(inner).with_sink(Arc::new(sink.clone()));
    (allocator, sink)
}

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
struct Wrapping {
    message: String,
    #[source]
    source: BoxError,
}

fn wrap(message: &str, source: impl Into<BoxError>) -> Wrapping {
    Wrapping {
        message: message.to_string(),
        source: source.into(),
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Database connection failed (sqlstate {sqlstate}, code {code})")]
struct DatabaseError {
    sqlstate: &'static str,
    code: i32,
}

// ---------------------------------------------------------------------------
// Success
// ---------------------------------------------------------------------------

#[test]
fn success_returns_resource_for_the_given_slot() {
    let (allocator, sink) = boundary(TestAllocator::successful_with("A"));
    let s1 = TestSlot::new();

    let poolable = allocator.allocate(&s1).unwrap();

    assert_eq!(poolable.value(), "A");
    assert!(poolable.slot().same_as(&s1));
    assert_eq!(poolable.slot().id(), s1.id());
    assert!(sink.is_empty());
}

#[test]
fn slot_is_forwarded_unchanged() {
    let expected = TestSlot::new();
    let seen = expected.clone();
    let sink = RecordingSink::new();
    let allocator = LoggingAllocator::from_fn(move |slot: &TestSlot| -> io::Result<TestPoolable> {
        assert!(slot.same_as(&seen));
        Ok(TestPoolable::new(slot.clone(), "forwarded"))
    })
    .with_sink(Arc::new(sink.clone()));

    let poolable = allocator.allocate(&expected).unwrap();

    assert!(poolable.slot().same_as(&expected));
    assert_eq!(expected.releases(), 0, "boundary never touches the slot");
    assert!(sink.is_empty());
}

#[test]
fn consecutive_successes_are_independent() {
    use slotguard_allocator::Poolable as _;

    let (allocator, sink) = boundary(TestAllocator::successful());
    let slot = TestSlot::new();

    let mut first = allocator.allocate(&slot).unwrap();
    let second = allocator.allocate(&slot).unwrap();
    first.release();

    assert!(first.is_released());
    assert!(!second.is_released());
    assert_eq!(first.value(), second.value());
    assert_eq!(allocator.inner().calls(), 2);
    assert!(sink.is_empty());
}

#[test]
fn released_resource_reaches_its_slot() {
    use slotguard_allocator::Poolable as _;

    let (allocator, _sink) = boundary(TestAllocator::successful());
    let slot = TestSlot::new();

    let mut poolable = allocator.allocate(&slot).unwrap();
    poolable.release();

    assert!(poolable.is_released());
    assert_eq!(slot.releases(), 1);
}

#[test]
#[should_panic(expected = "object already released")]
fn double_release_is_caught_by_the_test_object() {
    use slotguard_allocator::Poolable as _;

    let (allocator, _sink) = boundary(TestAllocator::successful());
    let mut poolable = allocator.allocate(&TestSlot::new()).unwrap();

    poolable.release();
    poolable.release();
}

#[test]
fn expire_is_left_to_the_pool() {
    let (allocator, _sink) = boundary(TestAllocator::successful());
    let slot = TestSlot::new();

    let _poolable = allocator.allocate(&slot).unwrap();
    assert!(!slot.is_expired());

    slot.expire();
    assert!(slot.is_expired());
}

// ---------------------------------------------------------------------------
// Failure
// ---------------------------------------------------------------------------

#[rstest]
#[case::runtime(|| "Allocation failed".into(), "Allocation failed")]
#[case::io(|| io::Error::other("IO error during allocation").into(), "IO error during allocation")]
#[case::timeout(
    || io::Error::new(io::ErrorKind::TimedOut, "connect timed out").into(),
    "connect timed out"
)]
#[case::database(
    || -> BoxError { Box::new(DatabaseError { sqlstate: "08001", code: 1 }) },
    "Database connection failed (sqlstate 08001, code 1)"
)]
#[case::anyhow(|| anyhow::anyhow!("handshake rejected").into(), "handshake rejected")]
fn every_failure_kind_is_normalized(#[case] make: fn() -> BoxError, #[case] expected_cause: &str) {
    let (allocator, sink) = boundary(TestAllocator::failing_with(make));

    let err = allocator.allocate(&TestSlot::new()).unwrap_err();

    assert_eq!(err.message(), Some(ALLOCATION_FAILED));
    assert_eq!(err.to_string(), ALLOCATION_FAILED);
    assert!(err.source().is_none());
    assert!(err.suppressed().is_empty());

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].level, Level::WARN);
    assert_eq!(records[0].message, ALLOCATION_FAILED);
    assert_eq!(records[0].cause, expected_cause);
    assert_eq!(allocator.inner().calls(), 1);
}

#[test]
fn boom_is_logged_once() {
    let (allocator, sink) = boundary(TestAllocator::failing("boom"));

    let err = allocator.allocate(&TestSlot::new()).unwrap_err();

    assert_eq!(err.message(), Some("Failed to allocate slot"));
    assert_eq!(
        sink.records(),
        vec![LogRecord {
            level: Level::WARN,
            message: "Failed to allocate slot".to_string(),
            cause: "boom".to_string(),
            chain: vec!["boom".to_string()],
        }]
    );
}

#[test]
fn nested_root_cause_survives_in_the_log_only() {
    let (allocator, sink) = boundary(TestAllocator::failing_with(|| {
        let root = io::Error::other("disk full");
        Box::new(wrap("Middle exception", wrap("could not write segment", root)))
    }));

    let err = allocator.allocate(&TestSlot::new()).unwrap_err();

    assert_eq!(err.message(), Some(ALLOCATION_FAILED));
    assert!(err.source().is_none());

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].cause, "Middle exception");
    assert_eq!(
        records[0].chain,
        ["Middle exception", "could not write segment", "disk full"]
    );
    assert_eq!(records[0].root_cause(), Some("disk full"));
}

#[test]
fn panic_is_an_ordinary_failure() {
    let (allocator, sink) = boundary(TestAllocator::panicking("boom"));

    let err = allocator.allocate(&TestSlot::new()).unwrap_err();

    assert_eq!(err.message(), Some(ALLOCATION_FAILED));
    assert!(err.source().is_none());
    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].level, Level::WARN);
    assert_eq!(records[0].cause, "boom");
}

#[test]
fn boundary_survives_a_panic() {
    let (allocator, sink) = boundary(TestAllocator::panicking("allocation explodes"));

    for _ in 0..3 {
        assert!(allocator.allocate(&TestSlot::new()).is_err());
    }

    assert_eq!(sink.len(), 3);
    assert_eq!(allocator.inner().calls(), 3);
}

// ---------------------------------------------------------------------------
// Mixed sequences
// ---------------------------------------------------------------------------

#[test]
fn mixed_success_and_failure_calls() {
    let sink = RecordingSink::new();
    let succeeding =
        LoggingAllocator::new(TestAllocator::successful()).with_sink(Arc::new(sink.clone()));
    let failing = LoggingAllocator::new(TestAllocator::failing("Allocation failed"))
        .with_sink(Arc::new(sink.clone()));
    let slot = TestSlot::new();

    assert!(succeeding.allocate(&slot).is_ok());
    assert!(failing.allocate(&slot).is_err());
    assert!(succeeding.allocate(&slot).is_ok());

    assert_eq!(sink.len(), 1);
}

#[test]
fn deallocate_failures_are_not_wrapped() {
    struct BrokenTeardown;

    impl slotguard_allocator::TryAllocate for BrokenTeardown {
        type Slot = TestSlot;
        type Poolable = TestPoolable;
        type Error = io::Error;

        fn try_allocate(&self, slot: &TestSlot) -> io::Result<TestPoolable> {
            Ok(TestPoolable::new(slot.clone(), "ok"))
        }

        fn deallocate(&self, _poolable: TestPoolable) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "socket already closed"))
        }
    }

    let sink = RecordingSink::new();
    let allocator = LoggingAllocator::new(BrokenTeardown).with_sink(Arc::new(sink.clone()));

    let poolable = allocator.allocate(&TestSlot::new()).unwrap();
    let err = allocator.deallocate(poolable).unwrap_err();

    assert_eq!(err.to_string(), "socket already closed");
    assert!(sink.is_empty());
}
