//! Asynchronous page walker.
//!
//! Translates a virtual address by walking four page-table levels, each of
//! which costs one 64-byte line read through the simulated memory system.
//! Two paths share the entry decoding:
//! 1. **Functional:** `translate` resolves a VA immediately against the
//!    functional store, for warm-up and ideal-TLB studies.
//! 2. **Timed:** `submit` starts a walk whose line reads contend for memory
//!    bandwidth; completions are polled via `pop_completed` in the order the
//!    final fills return.
//!
//! The walker exclusively owns a walk's state (including the original user
//! request) from `submit` until the walk terminates. In-flight line reads
//! are tracked by descriptor id, one per live walk.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::common::addr::{canonicalize, line_base, line_offset};
use crate::common::constants::{LINE_BYTES, PTE_BYTES};
use crate::common::error::PageFault;
use crate::config::XlatConfig;
use crate::mem::fetch::{AccessType, MemFetch};
use crate::mem::map::MemoryMap;
use crate::queue::{DelayQueue, FifoPipeline};
use crate::stats::MmuStats;
use crate::xlat::pte::{PageTableEntry, PtLevel};

/// A finished translation, carrying the original request back to the TLB.
pub struct Completed {
    /// The user request, its address rewritten to the physical address.
    pub mf: MemFetch,
    /// The canonicalized virtual address that was translated.
    pub va: u64,
    /// The resulting physical address.
    pub pa: u64,
}

/// Per-walk state, alive from `submit` until the walk terminates.
struct WalkState {
    /// The user request that triggered the walk.
    orig: MemFetch,
    /// Canonicalized virtual address being translated.
    va: u64,
    /// Whether the original request is a store.
    is_write: bool,
    /// Level whose entry the outstanding line read covers.
    level: PtLevel,
    /// Physical address of that entry.
    entry_addr: u64,
}

/// Memory management unit: four-level x86-64 page walker.
pub struct Mmu {
    mem: Rc<RefCell<MemoryMap>>,
    cfg: XlatConfig,
    page_shift: u32,
    ndp_id: usize,
    cycles: u64,
    /// Walk reads waiting out their issue latency before the to-mem push.
    issue_q: DelayQueue<MemFetch>,
    /// Outstanding line-read descriptor id -> owning walk id.
    inflight: HashMap<u64, u64>,
    /// Live walks by walk id.
    walks: HashMap<u64, WalkState>,
    /// Completions awaiting pickup by the TLB.
    done: VecDeque<Completed>,
    next_walk_id: u64,
    stats: MmuStats,
}

impl Mmu {
    /// Creates a walker over the given functional store.
    pub fn new(mem: Rc<RefCell<MemoryMap>>, cfg: &XlatConfig, ndp_id: usize) -> Self {
        Self {
            mem,
            cfg: cfg.clone(),
            page_shift: cfg.page_shift(),
            ndp_id,
            cycles: 0,
            issue_q: DelayQueue::new(0),
            inflight: HashMap::new(),
            walks: HashMap::new(),
            done: VecDeque::new(),
            next_walk_id: 0,
            stats: MmuStats::default(),
        }
    }

    /// Resolves a virtual address against the functional store.
    ///
    /// Walks all four levels immediately, without touching any timing state.
    /// Returns the physical address, or the level at which a present bit was
    /// clear.
    pub fn translate(&mut self, va: u64, _is_write: bool) -> Result<u64, PageFault> {
        let va = canonicalize(va);
        let mut table = self.cfg.pt_base;
        for level in PtLevel::WALK {
            let entry = self.decode_entry(table, level, va);
            if !entry.is_present() {
                self.stats.fails += 1;
                return Err(PageFault::new(va, level));
            }
            if level == PtLevel::Pt {
                self.stats.hits += 1;
                return Ok(entry.frame() | self.page_offset(va));
            }
            table = entry.frame();
        }
        unreachable!("page walk passed the leaf level");
    }

    /// Begins an asynchronous walk for the VA carried by `orig`.
    ///
    /// Hands the request back if the concurrent-walk cap is reached; the
    /// caller retries next cycle. Otherwise the walker owns the request
    /// until the walk completes or faults.
    pub fn submit(&mut self, orig: MemFetch) -> Result<(), MemFetch> {
        if self.at_walk_limit() {
            return Err(orig);
        }

        let va = canonicalize(orig.addr());
        let is_write = orig.is_write();
        let entry_addr = self.cfg.pt_base + PtLevel::Pml4.index(va) * PTE_BYTES;

        let walk_id = self.next_walk_id;
        self.next_walk_id += 1;
        self.walks.insert(
            walk_id,
            WalkState {
                orig,
                va,
                is_write,
                level: PtLevel::Pml4,
                entry_addr,
            },
        );
        self.stats.walks += 1;
        self.issue_pt_read(walk_id, entry_addr);
        Ok(())
    }

    /// Returns true when the concurrent-walk cap is reached.
    pub fn at_walk_limit(&self) -> bool {
        self.cfg.max_outstanding_walks > 0 && self.inflight.len() >= self.cfg.max_outstanding_walks
    }

    /// Returns true if `mf` is a line read this walker is waiting on.
    pub fn waiting_for_fill(&self, mf: &MemFetch) -> bool {
        self.inflight.contains_key(&mf.id())
    }

    /// Consumes a returned line read and advances its walk.
    ///
    /// Decodes the entry the read covered from the functional store, then
    /// either issues the next level's read or terminates the walk: a present
    /// leaf completes the translation, a clear present bit at any level
    /// drops the walk. Fills for unknown descriptors are discarded.
    pub fn on_mem_fill(&mut self, mf: MemFetch) {
        let Some(walk_id) = self.inflight.remove(&mf.id()) else {
            log::warn!(
                "mmu{}: discarding fill for unknown request {:#x}",
                self.ndp_id,
                mf.addr()
            );
            return;
        };
        drop(mf);

        let mut walk = self
            .walks
            .remove(&walk_id)
            .expect("in-flight read without walk state");

        let entry = self.decode_entry_at(walk.entry_addr);
        if !entry.is_present() {
            self.stats.fails += 1;
            log::debug!(
                "mmu{}: {} walk for VA {:#x} faulted at {}",
                self.ndp_id,
                if walk.is_write { "store" } else { "load" },
                walk.va,
                walk.level
            );
            return;
        }

        match walk.level.next() {
            Some(next) => {
                walk.level = next;
                walk.entry_addr = entry.frame() + next.index(walk.va) * PTE_BYTES;
                let entry_addr = walk.entry_addr;
                self.walks.insert(walk_id, walk);
                self.issue_pt_read(walk_id, entry_addr);
            }
            None => {
                let pa = entry.frame() | self.page_offset(walk.va);
                walk.orig.set_addr(pa);
                walk.orig.set_channel(self.cfg.channel_index(pa));
                self.stats.hits += 1;
                self.done.push_back(Completed {
                    mf: walk.orig,
                    va: walk.va,
                    pa,
                });
            }
        }
    }

    /// Ticks the issue queue and offers mature reads to the to-mem pipeline.
    ///
    /// Stops at the first refused push to keep issue ordering; the refused
    /// read is retried next cycle.
    pub fn cycle(&mut self, to_mem: &mut FifoPipeline<MemFetch>) {
        self.cycles += 1;
        self.issue_q.cycle();

        while let Some(mf) = self.issue_q.pop_ready() {
            if let Err(mf) = to_mem.try_push(mf) {
                self.issue_q.push_front_ready(mf);
                break;
            }
        }
    }

    /// Returns true if a completion is waiting to be drained.
    pub fn has_completed(&self) -> bool {
        !self.done.is_empty()
    }

    /// Removes and returns the oldest completion.
    pub fn pop_completed(&mut self) -> Option<Completed> {
        self.done.pop_front()
    }

    /// Number of walks currently in flight.
    pub fn outstanding_walks(&self) -> usize {
        self.walks.len()
    }

    /// Number of line reads awaiting their fill.
    pub fn inflight_reads(&self) -> usize {
        self.inflight.len()
    }

    /// Counter snapshot.
    pub fn stats(&self) -> MmuStats {
        self.stats
    }

    /// Decodes the entry for `va` at `level` within the table at `table`.
    fn decode_entry(&mut self, table: u64, level: PtLevel, va: u64) -> PageTableEntry {
        self.decode_entry_at(table + level.index(va) * PTE_BYTES)
    }

    /// Loads one page-table entry from the functional store.
    fn decode_entry_at(&mut self, entry_addr: u64) -> PageTableEntry {
        PageTableEntry::new(self.read_qword(entry_addr))
    }

    /// Reads a little-endian quadword through the functional store.
    ///
    /// # Panics
    ///
    /// Panics if the quadword straddles a 64-byte line; 8-byte-aligned
    /// page-table entries never do.
    fn read_qword(&mut self, addr: u64) -> u64 {
        let base = line_base(addr);
        let off = line_offset(addr);
        if off as u64 > LINE_BYTES - PTE_BYTES {
            panic!(
                "page-table entry at {:#x} crosses a {}-byte line",
                addr, LINE_BYTES
            );
        }
        let line = self.mem.borrow().load(base);
        self.stats.walk_reads += 1;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&line[off..off + 8]);
        u64::from_le_bytes(bytes)
    }

    /// Creates, registers, and enqueues the line read covering `entry_addr`.
    fn issue_pt_read(&mut self, walk_id: u64, entry_addr: u64) {
        let line = line_base(entry_addr);
        let mut mf = MemFetch::new(
            line,
            false,
            AccessType::PageTable,
            LINE_BYTES as u32,
            self.cycles,
        );
        mf.set_from_ndp(true);
        mf.set_ndp_id(self.ndp_id);
        mf.set_channel(self.cfg.channel_index(line));

        // Register before enqueueing so the fill is claimable as soon as the
        // read leaves the issue queue.
        self.inflight.insert(mf.id(), walk_id);
        self.issue_q.push(mf, self.cfg.ptw_issue_latency);
    }

    fn page_offset(&self, va: u64) -> u64 {
        va & ((1u64 << self.page_shift) - 1)
    }
}
