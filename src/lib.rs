//! Address-translation core for a near-data-processing cycle simulator.
//!
//! This crate implements the virtual-to-physical translation subsystem of an
//! NDP timing simulator:
//! 1. **TLB front-end:** Hit-latency modeling, a software LRU translation
//!    cache, and the completion surface the processing unit polls.
//! 2. **MMU:** A four-level x86-64-style page walker whose line reads flow
//!    through the simulated memory system, plus a functional translation
//!    path for warm-up.
//! 3. **Memory-side types:** Request descriptors, the functional line store,
//!    and page-table construction.
//! 4. **Queues:** The delay and pipeline primitives all cycle-level
//!    asynchrony is built from.

/// Common types and constants (addresses, page-table geometry, faults).
pub mod common;
/// Translation-core configuration (defaults, serde deserialization).
pub mod config;
/// Memory-side types (MemFetch, MemoryMap, page-table construction).
pub mod mem;
/// Cycle-level queue primitives (delay queue, bounded pipeline).
pub mod queue;
/// Statistics collection and reporting.
pub mod stats;
/// The translation core (TLB, MMU, software LRU, entry decoding).
pub mod xlat;

/// Root configuration type; use `XlatConfig::default()` or deserialize from JSON.
pub use crate::config::XlatConfig;
/// Request descriptor exchanged with the memory system.
pub use crate::mem::MemFetch;
/// Functional store backing page-table contents.
pub use crate::mem::MemoryMap;
/// The page walker.
pub use crate::xlat::Mmu;
/// The translation front-end; constructs and owns its walker.
pub use crate::xlat::Tlb;
