//! Configuration for the translation core.
//!
//! All knobs the TLB and MMU recognize, with the same shape as the rest of
//! the simulator's configuration: a flat `Deserialize` struct whose fields
//! default individually, so a JSON fragment from the enclosing simulator can
//! override any subset. Use `XlatConfig::default()` when no overrides apply.

use serde::Deserialize;

use crate::common::constants::LINE_SHIFT;

/// Default configuration constants for the translation core.
mod defaults {
    /// Page size in bytes (x86-64 4KB pages).
    pub const PAGE_SIZE: u64 = 4096;

    /// Size of one TLB entry in bytes.
    pub const TLB_ENTRY_SIZE: u32 = 8;

    /// Cycles a request spends in the TLB before its lookup is performed.
    pub const TLB_HIT_LATENCY: u64 = 2;

    /// Bound on the request and finished queues; the backpressure limit.
    pub const REQUEST_QUEUE_SIZE: usize = 32;

    /// Cycles between creating a page-walk read and offering it to memory.
    pub const PTW_ISSUE_LATENCY: u64 = 0;

    /// Concurrent page-walk cap; zero means unlimited.
    pub const MAX_OUTSTANDING_WALKS: usize = 0;

    /// Software TLB capacity in translations.
    pub const SW_TLB_CAPACITY: usize = 1024;

    /// Physical base of the PML4 page.
    pub const PT_BASE: u64 = 0x0009_0000_0000_0000;

    /// Number of memory-controller channels for address interleaving.
    pub const NUM_CHANNELS: usize = 16;
}

/// Translation-core configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct XlatConfig {
    /// Page size in bytes; drives VA slicing and offset extraction.
    #[serde(default = "XlatConfig::default_page_size")]
    pub page_size: u64,

    /// Size of one TLB entry in bytes.
    #[serde(default = "XlatConfig::default_tlb_entry_size")]
    pub tlb_entry_size: u32,

    /// Request-queue delay applied to every access.
    #[serde(default = "XlatConfig::default_tlb_hit_latency")]
    pub tlb_hit_latency: u64,

    /// Depth bound shared by the request and finished queues.
    #[serde(default = "XlatConfig::default_request_queue_size")]
    pub request_queue_size: usize,

    /// Per-read delay before a page-walk read is offered to memory.
    #[serde(default = "XlatConfig::default_ptw_issue_latency")]
    pub ptw_issue_latency: u64,

    /// Maximum concurrent page walks; zero means unlimited.
    #[serde(default = "XlatConfig::default_max_outstanding_walks")]
    pub max_outstanding_walks: usize,

    /// Software TLB capacity in translations.
    #[serde(default = "XlatConfig::default_sw_tlb_capacity")]
    pub sw_tlb_capacity: usize,

    /// Treat every access as a zero-latency hit, bypassing the walker.
    #[serde(default)]
    pub ideal_tlb: bool,

    /// Physical base of the PML4 page.
    #[serde(default = "XlatConfig::default_pt_base")]
    pub pt_base: u64,

    /// Number of memory-controller channels.
    #[serde(default = "XlatConfig::default_num_channels")]
    pub num_channels: usize,
}

impl XlatConfig {
    /// Returns the default page size.
    fn default_page_size() -> u64 {
        defaults::PAGE_SIZE
    }

    /// Returns the default TLB entry size.
    fn default_tlb_entry_size() -> u32 {
        defaults::TLB_ENTRY_SIZE
    }

    /// Returns the default TLB hit latency.
    fn default_tlb_hit_latency() -> u64 {
        defaults::TLB_HIT_LATENCY
    }

    /// Returns the default request-queue bound.
    fn default_request_queue_size() -> usize {
        defaults::REQUEST_QUEUE_SIZE
    }

    /// Returns the default page-walk issue latency.
    fn default_ptw_issue_latency() -> u64 {
        defaults::PTW_ISSUE_LATENCY
    }

    /// Returns the default concurrent-walk cap.
    fn default_max_outstanding_walks() -> usize {
        defaults::MAX_OUTSTANDING_WALKS
    }

    /// Returns the default software TLB capacity.
    fn default_sw_tlb_capacity() -> usize {
        defaults::SW_TLB_CAPACITY
    }

    /// Returns the default PML4 physical base.
    fn default_pt_base() -> u64 {
        defaults::PT_BASE
    }

    /// Returns the default channel count.
    fn default_num_channels() -> usize {
        defaults::NUM_CHANNELS
    }

    /// Bit shift corresponding to the configured page size.
    ///
    /// A non-power-of-two page size is rounded up, matching how the rest of
    /// the simulator sizes hardware structures.
    pub fn page_shift(&self) -> u32 {
        let size = if self.page_size.is_power_of_two() {
            self.page_size
        } else {
            self.page_size.next_power_of_two()
        };
        size.trailing_zeros()
    }

    /// Memory-controller channel for a physical address.
    ///
    /// Channels interleave at line granularity.
    pub fn channel_index(&self, pa: u64) -> usize {
        if self.num_channels == 0 {
            return 0;
        }
        ((pa >> LINE_SHIFT) % self.num_channels as u64) as usize
    }
}

impl Default for XlatConfig {
    fn default() -> Self {
        Self {
            page_size: defaults::PAGE_SIZE,
            tlb_entry_size: defaults::TLB_ENTRY_SIZE,
            tlb_hit_latency: defaults::TLB_HIT_LATENCY,
            request_queue_size: defaults::REQUEST_QUEUE_SIZE,
            ptw_issue_latency: defaults::PTW_ISSUE_LATENCY,
            max_outstanding_walks: defaults::MAX_OUTSTANDING_WALKS,
            sw_tlb_capacity: defaults::SW_TLB_CAPACITY,
            ideal_tlb: false,
            pt_base: defaults::PT_BASE,
            num_channels: defaults::NUM_CHANNELS,
        }
    }
}
