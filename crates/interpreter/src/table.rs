//! The dispatch table: one slot per opcode, written once by a build and read
//! without locks afterwards.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use kindle_bytecode::{Opcode, OPCODE_COUNT};
use parking_lot::{Mutex, MutexGuard};

use crate::code_unit::CodeUnit;
use crate::error::EmissionError;
use crate::placement::{PinnedSlots, Region};

/// Maps every opcode to the code unit that implements it.
///
/// A fresh table has every slot empty. Slots are filled by
/// [`TableBuilder::ensure_built`](crate::TableBuilder::ensure_built) and are
/// never overwritten. The slot array is pinned, so
/// [`entry_address`](Self::entry_address) stays valid for the table's lifetime.
///
/// Builds of one table are serialized on the table's own lock, whichever
/// builder runs them. Slot contents are visible only once the sentinel is
/// published, so readers never see a partly built table.
pub struct DispatchTable {
    slots: PinnedSlots<OnceLock<CodeUnit>, OPCODE_COUNT>,
    built: AtomicBool,
    build_lock: Mutex<()>,
    failure: OnceLock<EmissionError>,
    fingerprint: OnceLock<blake3::Hash>,
}

impl DispatchTable {
    /// Allocate an empty table at its final address.
    pub fn new() -> Self {
        Self {
            slots: PinnedSlots::new(|_| OnceLock::new()),
            built: AtomicBool::new(false),
            build_lock: Mutex::new(()),
            failure: OnceLock::new(),
            fingerprint: OnceLock::new(),
        }
    }

    /// Whether a build has completed.
    pub fn is_built(&self) -> bool {
        self.built.load(Ordering::Acquire)
    }

    /// The code unit for `opcode`.
    ///
    /// # Panics
    ///
    /// If the table has not been built. Looking up an unbuilt table is a
    /// programming error.
    #[inline]
    pub fn lookup(&self, opcode: Opcode) -> CodeUnit {
        match self.get(opcode) {
            Some(unit) => unit,
            None => panic!("dispatch table lookup of {opcode} before the table was built"),
        }
    }

    /// The code unit for `opcode`, once the table is built.
    pub fn get(&self, opcode: Opcode) -> Option<CodeUnit> {
        if !self.is_built() {
            return None;
        }
        self.slots.get(opcode.index()).get().copied()
    }

    /// Stable address of the slot for `opcode`.
    pub fn entry_address(&self, opcode: Opcode) -> usize {
        self.slots.address_of(opcode.index())
    }

    /// The region the slot array was placed in.
    pub fn region(&self) -> Region {
        self.slots.region()
    }

    /// Every opcode with its slot contents, in opcode order.
    pub fn iter(&self) -> impl Iterator<Item = (Opcode, Option<CodeUnit>)> + '_ {
        Opcode::ALL.into_iter().map(|op| (op, self.get(op)))
    }

    /// Number of filled slots. Zero until the table is built.
    pub fn filled(&self) -> usize {
        if !self.is_built() {
            return 0;
        }
        self.slots.iter().filter(|slot| slot.get().is_some()).count()
    }

    /// The failure that stopped this table's build, if any.
    pub fn failure(&self) -> Option<&EmissionError> {
        self.failure.get()
    }

    /// Digest of the built layout. Two tables built from the same contracts
    /// have the same fingerprint.
    pub fn fingerprint(&self) -> Option<blake3::Hash> {
        self.fingerprint.get().copied()
    }

    /// Exclusive right to build this table.
    pub(crate) fn lock_build(&self) -> MutexGuard<'_, ()> {
        self.build_lock.lock()
    }

    pub(crate) fn assert_placement(&self) {
        self.slots.assert_in_region();
    }

    /// Write every staged unit, then publish the sentinel.
    ///
    /// Callers hold [`lock_build`](Self::lock_build) and have checked the
    /// sentinel is unset.
    pub(crate) fn commit(&self, units: Vec<CodeUnit>, fingerprint: blake3::Hash) {
        self.write_slots(units);
        let _ = self.fingerprint.set(fingerprint);
        self.built.store(true, Ordering::Release);
    }

    fn write_slots(&self, units: Vec<CodeUnit>) {
        debug_assert_eq!(units.len(), OPCODE_COUNT);
        for unit in units {
            let written = self.slots.get(unit.opcode().index()).set(unit).is_ok();
            assert!(written, "dispatch table slot for {} written twice", unit.opcode());
        }
    }

    pub(crate) fn record_failure(&self, error: EmissionError) {
        let _ = self.failure.set(error);
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchTable")
            .field("built", &self.is_built())
            .field("filled", &self.filled())
            .field("failure", &self.failure())
            .finish()
    }
}
