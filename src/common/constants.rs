//! System-wide constants shared across the translation core.

/// Size of the unit at which the simulated memory returns data (one cache line).
pub const LINE_BYTES: u64 = 64;

/// Bit shift corresponding to [`LINE_BYTES`].
pub const LINE_SHIFT: u32 = 6;

/// Size of a single page-table entry in bytes.
pub const PTE_BYTES: u64 = 8;

/// Number of entries in one page-table page (512 for x86-64 4KB tables).
pub const PT_ENTRIES: u64 = 512;

/// Number of virtual-address bits consumed per walk level.
pub const PT_INDEX_BITS: u32 = 9;

/// Mask extracting one level's index from a shifted virtual address.
pub const PT_INDEX_MASK: u64 = 0x1FF;

/// Present bit of a page-table entry (bit 0).
pub const PTE_PRESENT_BIT: u64 = 1;

/// Mask selecting the next-level physical base (or final frame) from an entry.
pub const PTE_FRAME_MASK: u64 = !0xFFF;

/// Entry flags used when building page tables: present | read-write.
pub const PTE_BUILD_FLAGS: u64 = 0x3;

/// Highest architecturally meaningful virtual-address bit (48-bit canonical form).
pub const CANONICAL_BIT: u32 = 47;
