//! Single-flight construction of dispatch tables.

use std::sync::atomic::{AtomicUsize, Ordering};

use kindle_bytecode::{Opcode, OPCODE_COUNT};
use parking_lot::Mutex;
use tracing::{debug, debug_span, trace, warn};

use crate::code_unit::CodeUnit;
use crate::emitter::{DirectEmitter, HandlerEmitter};
use crate::error::{BuildError, EmissionError};
use crate::handlers;
use crate::table::DispatchTable;

/// What an [`ensure_built`](TableBuilder::ensure_built) call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// This call populated the table.
    Built { handlers: usize },
    /// The table was already built; nothing was emitted.
    AlreadyBuilt,
}

/// Builds dispatch tables, at most once per table, using an emitter.
///
/// Concurrent builds of one table are serialized on that table's build lock,
/// even when they come from different builders. The sentinel is re-checked
/// under the lock, so racing callers either build or observe the finished
/// table. The emitter has its own lock, taken after the table's.
pub struct TableBuilder<E = DirectEmitter> {
    emitter: Mutex<E>,
    passes: AtomicUsize,
}

impl TableBuilder<DirectEmitter> {
    pub fn new() -> Self {
        Self::with_emitter(DirectEmitter::new())
    }
}

impl Default for TableBuilder<DirectEmitter> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: HandlerEmitter> TableBuilder<E> {
    pub fn with_emitter(emitter: E) -> Self {
        Self {
            emitter: Mutex::new(emitter),
            passes: AtomicUsize::new(0),
        }
    }

    /// Emission passes this builder has run, summed over every table it
    /// has built. Any one table sees at most one pass.
    pub fn build_passes(&self) -> usize {
        self.passes.load(Ordering::Acquire)
    }

    /// Run `f` with exclusive access to the emitter.
    pub fn inspect_emitter<R>(&self, f: impl FnOnce(&E) -> R) -> R {
        let emitter = self.emitter.lock();
        f(&*emitter)
    }

    /// Populate every slot of `table`, unless that already happened.
    ///
    /// All handlers are emitted in opcode order and staged before any slot is
    /// written, so a failed build leaves the table untouched. A failure is
    /// recorded on the table and returned by every later call without retrying.
    pub fn ensure_built(&self, table: &DispatchTable) -> Result<BuildOutcome, BuildError> {
        if table.is_built() {
            return Ok(BuildOutcome::AlreadyBuilt);
        }

        let _build = table.lock_build();
        if table.is_built() {
            return Ok(BuildOutcome::AlreadyBuilt);
        }
        if let Some(previous) = table.failure() {
            return Err(BuildError::PreviouslyFailed(previous.clone()));
        }
        let mut emitter = self.emitter.lock();

        let _span = debug_span!("build_dispatch_table").entered();
        table.assert_placement();
        self.passes.fetch_add(1, Ordering::AcqRel);

        match stage(&mut *emitter) {
            Ok((units, fingerprint)) => {
                table.commit(units, fingerprint);
                debug!(
                    handlers = OPCODE_COUNT,
                    fingerprint = %fingerprint.to_hex(),
                    "dispatch table built"
                );
                Ok(BuildOutcome::Built {
                    handlers: OPCODE_COUNT,
                })
            }
            Err(error) => {
                warn!(%error, "dispatch table build failed");
                table.record_failure(error.clone());
                Err(BuildError::Emission(error))
            }
        }
    }
}

/// Emit every handler without touching the table.
fn stage<E: HandlerEmitter + ?Sized>(
    emitter: &mut E,
) -> Result<(Vec<CodeUnit>, blake3::Hash), EmissionError> {
    let mut units = Vec::with_capacity(OPCODE_COUNT);
    let mut hasher = blake3::Hasher::new();

    for opcode in Opcode::ALL {
        let spec = handlers::contract(opcode);
        let unit = emitter.emit(opcode, &spec)?;
        if unit.opcode() != opcode {
            return Err(EmissionError::ContractMismatch {
                requested: opcode,
                produced: unit.opcode(),
            });
        }
        trace!(%opcode, entry = unit.entry_address(), "emitted handler");

        hasher.update(&[opcode as u8, spec.operands().len() as u8]);
        hasher.update(opcode.mnemonic().as_bytes());
        for kind in spec.operands() {
            hasher.update(format!("{kind:?}").as_bytes());
        }
        units.push(unit);
    }

    Ok((units, hasher.finalize()))
}
