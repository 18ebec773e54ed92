//! Memory-request descriptor.
//!
//! `MemFetch` is the unit of work exchanged with the simulated memory system.
//! The translation core creates them for page-table line reads and rewrites
//! the address and channel of user requests once a translation completes.
//! Every descriptor carries a process-unique id so that returning fills can
//! be matched to the walk that issued them without relying on pointer
//! identity.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// What a memory request is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessType {
    /// An ordinary data access carried on behalf of the processing unit.
    Data,
    /// A page-table line read issued by the walker.
    PageTable,
}

/// A memory-request descriptor.
#[derive(Debug)]
pub struct MemFetch {
    id: u64,
    addr: u64,
    is_write: bool,
    access: AccessType,
    data_size: u32,
    from_ndp: bool,
    ndp_id: usize,
    channel: usize,
    timestamp: u64,
}

impl MemFetch {
    /// Creates a descriptor with a fresh unique id.
    pub fn new(addr: u64, is_write: bool, access: AccessType, data_size: u32, timestamp: u64) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            addr,
            is_write,
            access,
            data_size,
            from_ndp: false,
            ndp_id: 0,
            channel: 0,
            timestamp,
        }
    }

    /// Process-unique id of this descriptor.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Current address. Holds the virtual address until a translation
    /// completes, the physical address afterwards.
    #[inline]
    pub fn addr(&self) -> u64 {
        self.addr
    }

    /// Rewrites the address (virtual to physical on completion).
    pub fn set_addr(&mut self, addr: u64) {
        self.addr = addr;
    }

    /// Returns true for store requests.
    #[inline]
    pub fn is_write(&self) -> bool {
        self.is_write
    }

    /// Request classification.
    #[inline]
    pub fn access(&self) -> AccessType {
        self.access
    }

    /// Transfer size in bytes.
    #[inline]
    pub fn data_size(&self) -> u32 {
        self.data_size
    }

    /// Marks the request as originating from an NDP unit.
    pub fn set_from_ndp(&mut self, from_ndp: bool) {
        self.from_ndp = from_ndp;
    }

    /// Returns true if the request originates from an NDP unit.
    pub fn from_ndp(&self) -> bool {
        self.from_ndp
    }

    /// Records which NDP unit issued the request.
    pub fn set_ndp_id(&mut self, ndp_id: usize) {
        self.ndp_id = ndp_id;
    }

    /// The NDP unit that issued the request.
    pub fn ndp_id(&self) -> usize {
        self.ndp_id
    }

    /// Memory-controller channel derived from the physical address.
    #[inline]
    pub fn channel(&self) -> usize {
        self.channel
    }

    /// Records the memory-controller channel for this request.
    pub fn set_channel(&mut self, channel: usize) {
        self.channel = channel;
    }

    /// Cycle at which the request was created.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}
