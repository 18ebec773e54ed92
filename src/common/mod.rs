//! Common utilities and types used throughout the translation core.
//!
//! This module provides the building blocks shared by every component:
//! 1. **Address arithmetic:** Canonicalization and 64-byte line alignment.
//! 2. **Constants:** Page-table geometry and memory-line sizing.
//! 3. **Faults:** The page-fault type surfaced by the functional walk.

/// Address arithmetic helpers (canonicalization, line alignment).
pub mod addr;

/// System-wide constants.
pub mod constants;

/// Fault definitions.
pub mod error;

pub use addr::{canonicalize, line_base, line_offset};
pub use constants::{LINE_BYTES, PTE_BYTES};
pub use error::PageFault;
