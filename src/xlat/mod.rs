//! Address-translation core.
//!
//! The two cooperating components that turn virtual addresses into physical
//! addresses under cycle-accurate timing:
//! 1. **Tlb:** The request front-end with hit-latency modeling and the
//!    software LRU translation cache.
//! 2. **Mmu:** The four-level page walker, functional and timed.
//!
//! Supporting pieces: walk-level iteration and entry decoding (`pte`), and
//! the LRU cache itself (`sw_tlb`).

/// Page walker (functional translate + asynchronous walk).
pub mod mmu;

/// Walk levels and page-table entry decoding.
pub mod pte;

/// Software-managed LRU translation cache.
pub mod sw_tlb;

/// Translation front-end.
pub mod tlb;

pub use mmu::{Completed, Mmu};
pub use pte::{PageTableEntry, PtLevel};
pub use sw_tlb::SwTlb;
pub use tlb::Tlb;
