//! Pinned storage for dispatch table slots.
//!
//! Callers may hold raw addresses of table entries, so the slot array is
//! requested as a pinned heap allocation and remembers the region it was
//! granted. Builds assert the array still lies inside that region before any
//! slot is written.

use std::mem;
use std::pin::Pin;

/// An address range `[start, end)` handed out for pinned storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    start: usize,
    end: usize,
}

impl Region {
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn contains(&self, addr: usize) -> bool {
        self.start <= addr && addr < self.end
    }
}

/// A fixed array of `N` slots that never moves once allocated.
pub struct PinnedSlots<T, const N: usize> {
    slots: Pin<Box<[T; N]>>,
    region: Region,
}

impl<T, const N: usize> PinnedSlots<T, N> {
    /// Allocate the slots, initializing slot `i` with `init(i)`.
    pub fn new(init: impl FnMut(usize) -> T) -> Self {
        let slots = Box::pin(std::array::from_fn(init));
        let start = slots.as_ptr() as usize;
        let region = Region {
            start,
            end: start + mem::size_of::<[T; N]>().max(1),
        };
        Self { slots, region }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn get(&self, index: usize) -> &T {
        &self.slots[index]
    }

    /// Address of slot `index`.
    pub fn address_of(&self, index: usize) -> usize {
        self.get(index) as *const T as usize
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.slots.iter()
    }

    /// Panics if the slot array is no longer where it was allocated.
    pub fn assert_in_region(&self) {
        let start = self.slots.as_ptr() as usize;
        let last = start + mem::size_of::<[T; N]>().saturating_sub(1);
        assert!(
            self.region.contains(start) && self.region.contains(last),
            "pinned slots at {start:#x} left their region {:#x}..{:#x}",
            self.region.start,
            self.region.end
        );
    }
}
