//! Translation statistics collection and reporting.
//!
//! Counters are monotonically increasing and exposed by value; the
//! surrounding simulator reads them at shutdown. `XlatStats::print` renders
//! the aligned-key report format used across the simulator.

/// Page-walker counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MmuStats {
    /// Walks initiated.
    pub walks: u64,
    /// Page-table entry decodes performed.
    pub walk_reads: u64,
    /// Translations that reached a present leaf entry.
    pub hits: u64,
    /// Walks abandoned on a clear present bit.
    pub fails: u64,
}

/// TLB front-end counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TlbStats {
    /// Requests accepted by the front-end.
    pub accesses: u64,
    /// Requests served from the software TLB.
    pub sw_hits: u64,
    /// Requests dispatched to the walker.
    pub sw_misses: u64,
    /// Walk completions drained into the finished queue.
    pub completions: u64,
    /// Software-TLB entries displaced by installs.
    pub evictions: u64,
}

/// Combined translation statistics.
#[derive(Clone, Copy, Debug, Default)]
pub struct XlatStats {
    /// TLB front-end counters.
    pub tlb: TlbStats,
    /// Page-walker counters.
    pub mmu: MmuStats,
}

impl XlatStats {
    /// Prints the full statistics report to stdout.
    pub fn print(&self) {
        let lookups = self.tlb.sw_hits + self.tlb.sw_misses;
        let hit_rate = if lookups > 0 {
            100.0 * (self.tlb.sw_hits as f64 / lookups as f64)
        } else {
            0.0
        };

        println!("\n==========================================================");
        println!("ADDRESS TRANSLATION STATISTICS");
        println!("==========================================================");
        println!("tlb.accesses             {}", self.tlb.accesses);
        println!("tlb.sw_hits              {}", self.tlb.sw_hits);
        println!("tlb.sw_misses            {}", self.tlb.sw_misses);
        println!("tlb.hit_rate             {:.2}%", hit_rate);
        println!("tlb.completions          {}", self.tlb.completions);
        println!("tlb.evictions            {}", self.tlb.evictions);
        println!("----------------------------------------------------------");
        println!("mmu.walks                {}", self.mmu.walks);
        println!("mmu.walk_reads           {}", self.mmu.walk_reads);
        println!("mmu.hits                 {}", self.mmu.hits);
        println!("mmu.fails                {}", self.mmu.fails);
        println!("==========================================================");
    }
}
