//! Fault definitions for the translation core.
//!
//! The only recoverable fault a walk can produce is a page fault: an entry
//! with the present bit clear at some level. Backpressure conditions are not
//! errors (the caller retries next cycle), and a page-table entry straddling
//! a 64-byte line is an invariant violation that aborts the simulation.

use std::fmt;

use crate::xlat::pte::PtLevel;

/// A page-table entry with the present bit clear was encountered while
/// translating `va` at walk level `level`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageFault {
    /// The canonicalized virtual address being translated.
    pub va: u64,
    /// The walk level whose entry was not present.
    pub level: PtLevel,
}

impl PageFault {
    /// Creates a page fault record for the given address and level.
    pub fn new(va: u64, level: PtLevel) -> Self {
        Self { va, level }
    }
}

impl fmt::Display for PageFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page fault at {} for VA {:#x}", self.level, self.va)
    }
}

impl std::error::Error for PageFault {}
