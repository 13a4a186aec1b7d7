//! Integration tests for dispatch table construction.
//!
//! Covers completeness, idempotence, the concurrent first-call race, atomic
//! failure and slot placement.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use kindle_bytecode::{Opcode, OPCODE_COUNT};
use kindle_interpreter::{
    BuildError, BuildOutcome, CodeUnit, DirectEmitter, DispatchTable, EmissionError,
    HandlerEmitter, HandlerSpec, TableBuilder,
};

// ============================================================
// Helpers
// ============================================================

/// Emitter that counts calls and otherwise behaves like the direct backend.
#[derive(Default)]
struct CountingEmitter {
    inner: DirectEmitter,
    calls: Arc<AtomicUsize>,
}

impl HandlerEmitter for CountingEmitter {
    fn emit(&mut self, opcode: Opcode, spec: &HandlerSpec) -> Result<CodeUnit, EmissionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.emit(opcode, spec)
    }
}

fn counting_builder() -> (TableBuilder<CountingEmitter>, Arc<AtomicUsize>) {
    let emitter = CountingEmitter::default();
    let calls = Arc::clone(&emitter.calls);
    (TableBuilder::with_emitter(emitter), calls)
}

// ============================================================
// Completeness
// ============================================================

#[test]
fn every_opcode_has_a_matching_unit_after_build() {
    let table = DispatchTable::new();
    TableBuilder::new().ensure_built(&table).unwrap();

    assert!(table.is_built());
    assert_eq!(table.filled(), OPCODE_COUNT);
    for op in Opcode::ALL {
        assert_eq!(table.lookup(op).opcode(), op);
    }
}

#[test]
fn iter_lists_slots_in_opcode_order() {
    let table = DispatchTable::new();
    TableBuilder::new().ensure_built(&table).unwrap();

    let listed: Vec<_> = table.iter().map(|(op, _)| op).collect();
    assert_eq!(listed, Opcode::ALL.to_vec());
    assert!(table.iter().all(|(_, unit)| unit.is_some()));
}

// ============================================================
// Idempotence
// ============================================================

#[test]
fn repeated_calls_emit_each_handler_once() {
    let (builder, calls) = counting_builder();
    let table = DispatchTable::new();

    assert_eq!(
        builder.ensure_built(&table),
        Ok(BuildOutcome::Built {
            handlers: OPCODE_COUNT
        })
    );
    for _ in 0..10 {
        assert_eq!(builder.ensure_built(&table), Ok(BuildOutcome::AlreadyBuilt));
    }
    assert_eq!(calls.load(Ordering::SeqCst), OPCODE_COUNT);
    assert_eq!(builder.build_passes(), 1);
}

#[test]
fn rebuild_leaves_entries_unchanged() {
    let table = DispatchTable::new();
    let builder = TableBuilder::new();
    builder.ensure_built(&table).unwrap();
    let before: Vec<_> = Opcode::ALL
        .iter()
        .map(|&op| table.lookup(op).entry_address())
        .collect();

    builder.ensure_built(&table).unwrap();
    let after: Vec<_> = Opcode::ALL
        .iter()
        .map(|&op| table.lookup(op).entry_address())
        .collect();
    assert_eq!(before, after);
}

// ============================================================
// Concurrent first call
// ============================================================

#[test]
fn racing_first_calls_build_exactly_once() {
    const THREADS: usize = 8;
    let (builder, calls) = counting_builder();
    let table = DispatchTable::new();
    let barrier = Barrier::new(THREADS);

    let outcomes: Vec<BuildOutcome> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    let outcome = builder.ensure_built(&table).unwrap();
                    // Whoever returns must see a complete table.
                    assert!(table.is_built());
                    assert_eq!(table.filled(), OPCODE_COUNT);
                    outcome
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let built = outcomes
        .iter()
        .filter(|o| matches!(o, BuildOutcome::Built { .. }))
        .count();
    assert_eq!(built, 1);
    assert_eq!(outcomes.len() - built, THREADS - 1);
    assert_eq!(builder.build_passes(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), OPCODE_COUNT);
}

/// Emitter that sleeps on every emission so racing builds overlap.
struct SlowEmitter {
    inner: DirectEmitter,
    calls: Arc<AtomicUsize>,
}

impl HandlerEmitter for SlowEmitter {
    fn emit(&mut self, opcode: Opcode, spec: &HandlerSpec) -> Result<CodeUnit, EmissionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(2));
        self.inner.emit(opcode, spec)
    }
}

#[test]
fn separate_builders_racing_on_one_table_build_it_once() {
    const BUILDERS: usize = 4;
    let calls = Arc::new(AtomicUsize::new(0));
    let builders: Vec<_> = (0..BUILDERS)
        .map(|_| {
            TableBuilder::with_emitter(SlowEmitter {
                inner: DirectEmitter::new(),
                calls: Arc::clone(&calls),
            })
        })
        .collect();
    let table = DispatchTable::new();
    let barrier = Barrier::new(BUILDERS);

    let outcomes: Vec<BuildOutcome> = thread::scope(|s| {
        let handles: Vec<_> = builders
            .iter()
            .map(|builder| {
                let (table, barrier) = (&table, &barrier);
                s.spawn(move || {
                    barrier.wait();
                    let outcome = builder.ensure_built(table).unwrap();
                    assert_eq!(table.filled(), OPCODE_COUNT);
                    outcome
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let built = outcomes
        .iter()
        .filter(|o| matches!(o, BuildOutcome::Built { .. }))
        .count();
    assert_eq!(built, 1);
    let passes: usize = builders.iter().map(TableBuilder::build_passes).sum();
    assert_eq!(passes, 1);
    assert_eq!(calls.load(Ordering::SeqCst), OPCODE_COUNT);
}

#[test]
fn second_builder_sees_first_builders_failure() {
    let failing = TableBuilder::with_emitter(DirectEmitter::with_code_space(2));
    let healthy = TableBuilder::new();
    let table = DispatchTable::new();

    failing.ensure_built(&table).unwrap_err();
    assert!(matches!(
        healthy.ensure_built(&table),
        Err(BuildError::PreviouslyFailed(_))
    ));
    assert_eq!(healthy.build_passes(), 0);
    assert_eq!(table.filled(), 0);
}

#[test]
fn built_table_is_shared_across_threads() {
    let table = DispatchTable::new();
    TableBuilder::new().ensure_built(&table).unwrap();
    let expected = table.lookup(Opcode::Add).entry_address();

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| assert_eq!(table.lookup(Opcode::Add).entry_address(), expected));
        }
    });
}

// ============================================================
// Atomic failure
// ============================================================

#[test]
fn failed_build_writes_no_slot() {
    let builder = TableBuilder::with_emitter(DirectEmitter::with_code_space(3));
    let table = DispatchTable::new();

    let err = builder.ensure_built(&table).unwrap_err();
    assert_eq!(
        err,
        BuildError::Emission(EmissionError::CodeSpaceExhausted {
            opcode: Opcode::LdaNull,
            capacity: 3
        })
    );
    assert!(!table.is_built());
    assert_eq!(table.filled(), 0);
    assert!(table.iter().all(|(_, unit)| unit.is_none()));
    assert!(table.fingerprint().is_none());
}

#[test]
fn failed_build_is_not_retried() {
    let builder = TableBuilder::with_emitter(DirectEmitter::with_code_space(3));
    let table = DispatchTable::new();

    builder.ensure_built(&table).unwrap_err();
    let second = builder.ensure_built(&table).unwrap_err();
    assert!(matches!(second, BuildError::PreviouslyFailed(_)));
    assert_eq!(builder.build_passes(), 1);
    assert_eq!(builder.inspect_emitter(DirectEmitter::emitted), 3);
    assert!(table.failure().is_some());
}

#[test]
fn failure_display_names_the_opcode() {
    let builder = TableBuilder::with_emitter(DirectEmitter::with_code_space(10));
    let table = DispatchTable::new();
    let err = builder.ensure_built(&table).unwrap_err();
    assert_eq!(
        err.to_string(),
        "dispatch table build failed: code space exhausted emitting Add (capacity 10 units)"
    );
}

// ============================================================
// Placement and fingerprint
// ============================================================

#[test]
fn entry_addresses_survive_moving_the_table() {
    let table = DispatchTable::new();
    TableBuilder::new().ensure_built(&table).unwrap();
    let before: Vec<_> = Opcode::ALL.iter().map(|&op| table.entry_address(op)).collect();

    let moved = Box::new(table);
    let after: Vec<_> = Opcode::ALL.iter().map(|&op| moved.entry_address(op)).collect();
    assert_eq!(before, after);
    assert!(after.iter().all(|&a| moved.region().contains(a)));
}

#[test]
fn tables_built_from_the_same_contracts_share_a_fingerprint() {
    let a = DispatchTable::new();
    let b = DispatchTable::new();
    TableBuilder::new().ensure_built(&a).unwrap();
    let (counting, _) = counting_builder();
    counting.ensure_built(&b).unwrap();

    assert!(a.fingerprint().is_some());
    assert_eq!(a.fingerprint(), b.fingerprint());
}
