//! Translation front-end.
//!
//! Accepts translation requests from a processing unit, models the TLB hit
//! latency with a delay queue, serves repeat translations from the software
//! LRU, and dispatches misses to the page walker it owns. Completed user
//! requests surface on a bounded finished queue the unit polls.
//!
//! The front-end is driven by two per-cycle entry points: `cycle` ticks the
//! delay queues and the walker, `bank_access_cycle` performs at most one
//! translation step of work. Backpressure never drops a request; every full
//! queue simply defers work to the next cycle.

use std::cell::RefCell;
use std::rc::Rc;

use crate::common::addr::canonicalize;
use crate::config::XlatConfig;
use crate::mem::fetch::MemFetch;
use crate::mem::map::MemoryMap;
use crate::queue::{DelayQueue, FifoPipeline};
use crate::stats::{TlbStats, XlatStats};
use crate::xlat::mmu::Mmu;
use crate::xlat::sw_tlb::SwTlb;

/// TLB front-end owning the page walker and the software translation cache.
pub struct Tlb {
    id: usize,
    cfg: XlatConfig,
    page_shift: u32,
    hit_latency: u64,
    ideal: bool,
    cycles: u64,
    /// Outbound port into the memory system, shared with the owning unit.
    to_mem: Rc<RefCell<FifoPipeline<MemFetch>>>,
    /// Incoming requests waiting out the hit latency.
    request_q: DelayQueue<MemFetch>,
    /// Translated user requests awaiting pickup by the processing unit.
    finished: FifoPipeline<MemFetch>,
    sw_tlb: SwTlb,
    mmu: Mmu,
    stats: TlbStats,
}

impl Tlb {
    /// Creates the TLB and its walker together.
    ///
    /// `mem` is the functional store backing page-table contents; `to_mem`
    /// is the bounded pipeline through which all outbound memory requests
    /// flow.
    pub fn new(
        id: usize,
        cfg: &XlatConfig,
        mem: Rc<RefCell<MemoryMap>>,
        to_mem: Rc<RefCell<FifoPipeline<MemFetch>>>,
    ) -> Self {
        let mmu = Mmu::new(mem, cfg, id);
        let mut tlb = Self {
            id,
            cfg: cfg.clone(),
            page_shift: cfg.page_shift(),
            hit_latency: cfg.tlb_hit_latency,
            ideal: false,
            cycles: 0,
            to_mem,
            request_q: DelayQueue::new(cfg.request_queue_size),
            finished: FifoPipeline::new(cfg.request_queue_size),
            sw_tlb: SwTlb::new(cfg.sw_tlb_capacity),
            mmu,
            stats: TlbStats::default(),
        };
        if cfg.ideal_tlb {
            tlb.set_ideal_tlb();
        }
        tlb
    }

    /// Forces every request to complete as a zero-latency hit, bypassing
    /// the software TLB and the walker.
    pub fn set_ideal_tlb(&mut self) {
        self.ideal = true;
        self.hit_latency = 0;
    }

    /// Returns true when the request queue has no room for another access.
    pub fn full(&self) -> bool {
        self.full_with(0)
    }

    /// Like [`Tlb::full`], with `extra` pending items counted in.
    pub fn full_with(&self, extra: usize) -> bool {
        self.request_q.len() + extra >= self.cfg.request_queue_size
    }

    /// Accepts a translation request.
    ///
    /// # Panics
    ///
    /// Panics if called while [`Tlb::full`] is true; callers gate on it.
    pub fn access(&mut self, mf: MemFetch) {
        assert!(!self.full(), "tlb{}: access on a full request queue", self.id);
        self.stats.accesses += 1;
        self.request_q.push(mf, self.hit_latency);
    }

    /// Delivers a previously issued line read back from the memory system.
    ///
    /// Reads the walker claims advance their walk; anything else is
    /// discarded.
    pub fn fill(&mut self, mf: MemFetch) {
        if self.mmu.waiting_for_fill(&mf) {
            self.mmu.on_mem_fill(mf);
        } else {
            log::warn!(
                "tlb{}: discarding fill for unclaimed request {:#x}",
                self.id,
                mf.addr()
            );
        }
    }

    /// Returns true if this TLB (via its walker) is awaiting `mf`.
    pub fn waiting_for_fill(&self, mf: &MemFetch) -> bool {
        self.mmu.waiting_for_fill(mf)
    }

    /// Offers an outbound request to the to-mem pipeline.
    ///
    /// Hands the request back when the pipeline is full; the caller retries
    /// next cycle.
    pub fn push_mem_req(&self, mf: MemFetch) -> Result<(), MemFetch> {
        self.to_mem.borrow_mut().try_push(mf)
    }

    /// Returns true if a completed request is ready for pickup.
    pub fn data_ready(&self) -> bool {
        !self.finished.is_empty()
    }

    /// The oldest completed request, without removing it.
    pub fn get_data(&self) -> Option<&MemFetch> {
        self.finished.top()
    }

    /// Removes and returns the oldest completed request.
    pub fn pop_data(&mut self) -> Option<MemFetch> {
        self.finished.pop()
    }

    /// Per-cycle tick: ages the request queue and drives the walker.
    pub fn cycle(&mut self) {
        self.cycles += 1;
        self.request_q.cycle();
        let mut to_mem = self.to_mem.borrow_mut();
        self.mmu.cycle(&mut to_mem);
    }

    /// Performs at most one translation step of work.
    ///
    /// First drains walker completions into the software TLB and the
    /// finished queue (bounded by the latter's capacity), then examines the
    /// front of the request queue once: a software-TLB hit completes
    /// immediately, a miss is handed to the walker.
    pub fn bank_access_cycle(&mut self) {
        self.drain_completions();

        if self.request_q.ready().is_none() {
            return;
        }

        if self.ideal {
            // Ideal mode: every request is a hit, address untouched.
            if self.finished.is_full() {
                return;
            }
            if let Some(mf) = self.request_q.pop_ready() {
                self.finished.try_push(mf).ok();
            }
            return;
        }

        let va = match self.request_q.ready() {
            Some(mf) => canonicalize(mf.addr()),
            None => return,
        };
        let vpn = va >> self.page_shift;

        if let Some(ppn) = self.sw_tlb.peek(vpn) {
            if self.finished.is_full() {
                return;
            }
            if let Some(mut mf) = self.request_q.pop_ready() {
                // Promote the entry only when the hit is consumed.
                self.sw_tlb.lookup(vpn);
                let pa = (ppn << self.page_shift) | (va & ((1u64 << self.page_shift) - 1));
                mf.set_addr(pa);
                mf.set_channel(self.cfg.channel_index(pa));
                self.stats.sw_hits += 1;
                self.finished.try_push(mf).ok();
            }
        } else if !self.mmu.at_walk_limit() {
            if let Some(mf) = self.request_q.pop_ready() {
                self.stats.sw_misses += 1;
                if let Err(mf) = self.mmu.submit(mf) {
                    // Refused after all; requeue for the next cycle.
                    self.stats.sw_misses -= 1;
                    self.request_q.push_front_ready(mf);
                }
            }
        }
        // Walker at capacity: leave the request queued and retry next cycle.
    }

    /// Access to the walker, for warm-up translation and statistics.
    pub fn mmu(&self) -> &Mmu {
        &self.mmu
    }

    /// Mutable access to the walker, for functional warm-up translation.
    pub fn mmu_mut(&mut self) -> &mut Mmu {
        &mut self.mmu
    }

    /// The software translation cache.
    pub fn sw_tlb(&self) -> &SwTlb {
        &self.sw_tlb
    }

    /// Counter snapshot for this TLB and its walker.
    pub fn stats(&self) -> XlatStats {
        XlatStats {
            tlb: self.stats,
            mmu: self.mmu.stats(),
        }
    }

    /// Cycles ticked so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Installs completed walks into the software TLB and the finished
    /// queue, newest installed last (MRU).
    fn drain_completions(&mut self) {
        while self.mmu.has_completed() && !self.finished.is_full() {
            let Some(done) = self.mmu.pop_completed() else {
                break;
            };
            let vpn = done.va >> self.page_shift;
            let ppn = done.pa >> self.page_shift;
            if self.sw_tlb.install(vpn, ppn).is_some() {
                self.stats.evictions += 1;
            }
            self.stats.completions += 1;
            self.finished.try_push(done.mf).ok();
        }
    }
}
