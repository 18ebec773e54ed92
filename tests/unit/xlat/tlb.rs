//! TLB Front-End Tests.
//!
//! Verifies the request path around the walker:
//! - Hit-latency modeling
//! - Software-TLB reuse after a walk
//! - Eviction accounting at small capacities
//! - Ideal-TLB mode
//! - Queue bounds and finished-queue backpressure

use ndp_xlat::config::XlatConfig;
use ndp_xlat::mem::fetch::{AccessType, MemFetch};

use crate::common::harness::TestContext;

const PAGE: u64 = 4096;

// ══════════════════════════════════════════════════════════
// 1. Hit latency
// ══════════════════════════════════════════════════════════

#[test]
fn software_hit_pays_exactly_the_hit_latency() {
    let mut cfg = XlatConfig::default();
    cfg.tlb_hit_latency = 3;
    let mut t = TestContext::with_config(cfg);
    t.map_page(0x4000, 0x0080_4000);

    // Warm the software TLB with one full walk.
    t.tlb.access(t.data_req(0x4000, false));
    t.run_until_data(50).expect("warm-up walk should complete");

    // A repeat access in the same page completes after the hit latency
    // alone, without touching memory.
    let reads_before = t.issued_reads.len();
    t.tlb.access(t.data_req(0x4010, false));
    let mut ticks = 0;
    while !t.tlb.data_ready() {
        t.tick();
        t.service_memory();
        ticks += 1;
        assert!(ticks < 20, "hit did not complete");
    }
    assert_eq!(ticks, 3);
    assert_eq!(t.issued_reads.len(), reads_before);
}

// ══════════════════════════════════════════════════════════
// 2. Software-TLB reuse
// ══════════════════════════════════════════════════════════

#[test]
fn second_access_in_a_page_skips_the_walker() {
    let mut t = TestContext::new();
    t.map_page(0x4000, 0x0080_4000);

    t.tlb.access(t.data_req(0x4000, false));
    let first = t.run_until_data(50).expect("walk should complete");
    assert_eq!(first.addr(), 0x0080_4000);
    assert_eq!(t.tlb.stats().mmu.walks, 1);

    t.tlb.access(t.data_req(0x4100, false));
    let second = t.run_until_data(50).expect("hit should complete");
    assert_eq!(second.addr(), 0x0080_4100);

    let stats = t.tlb.stats();
    assert_eq!(stats.mmu.walks, 1, "hit must not start a walk");
    assert_eq!(stats.tlb.sw_hits, 1);
    assert_eq!(stats.tlb.sw_misses, 1);
}

#[test]
fn eviction_is_counted_at_small_capacity() {
    let mut cfg = XlatConfig::default();
    cfg.sw_tlb_capacity = 2;
    let mut t = TestContext::with_config(cfg);

    for i in 0..3u64 {
        let va = 0x1000 + i * PAGE;
        t.map_identity(va);
        t.tlb.access(t.data_req(va, false));
        t.run_until_data(50).expect("walk should complete");
    }

    let stats = t.tlb.stats();
    assert_eq!(stats.tlb.completions, 3);
    assert_eq!(stats.tlb.evictions, 1);
    assert_eq!(t.tlb.sw_tlb().len(), 2);

    // The first page was evicted; touching it walks again.
    t.tlb.access(t.data_req(0x1000, false));
    t.run_until_data(50).expect("re-walk should complete");
    assert_eq!(t.tlb.stats().mmu.walks, 4);
}

#[test]
fn blocked_hit_does_not_touch_recency() {
    let mut cfg = XlatConfig::default();
    cfg.tlb_hit_latency = 0;
    cfg.request_queue_size = 2;
    let mut t = TestContext::with_config(cfg);
    t.map_identity(0x1000);
    t.map_identity(0x2000);

    t.tlb.access(t.data_req(0x1000, false));
    t.tlb.access(t.data_req(0x2000, false));
    t.run(30);

    // Both walks are done; the finished queue is at capacity and VPN 1 is
    // the LRU entry.
    assert!(t.tlb.data_ready());
    assert_eq!(t.tlb.sw_tlb().lru_vpn(), Some(1));

    // A repeat access for VPN 1 hits but cannot finish yet; recency must
    // not move until it does.
    t.tlb.access(t.data_req(0x1000, false));
    t.run(5);
    assert_eq!(t.tlb.sw_tlb().lru_vpn(), Some(1));

    // Freeing a slot lets the hit complete and promote its entry.
    t.tlb.pop_data();
    t.run(5);
    assert_eq!(t.tlb.sw_tlb().lru_vpn(), Some(2));
    assert_eq!(t.tlb.stats().tlb.sw_hits, 1);
}

// ══════════════════════════════════════════════════════════
// 3. Ideal mode
// ══════════════════════════════════════════════════════════

#[test]
fn ideal_tlb_bypasses_cache_and_walker() {
    let mut cfg = XlatConfig::default();
    cfg.ideal_tlb = true;
    cfg.tlb_hit_latency = 7; // forced to zero by ideal mode
    let mut t = TestContext::with_config(cfg);

    for i in 0..3u64 {
        t.tlb.access(t.data_req(0xA000 + i * PAGE, false));
    }
    for i in 0..3u64 {
        t.tick();
        let done = t.tlb.pop_data().expect("ideal access should finish");
        assert_eq!(done.addr(), 0xA000 + i * PAGE, "address must be untouched");
    }

    let stats = t.tlb.stats();
    assert_eq!(stats.mmu.walks, 0);
    assert_eq!(stats.mmu.walk_reads, 0);
    assert_eq!(stats.tlb.sw_hits, 0);
    assert_eq!(stats.tlb.sw_misses, 0);
    assert!(t.tlb.sw_tlb().is_empty());
    assert!(t.to_mem.borrow().is_empty());
}

#[test]
fn set_ideal_tlb_applies_mid_run() {
    let mut t = TestContext::new();
    t.tlb.set_ideal_tlb();
    t.tlb.access(t.data_req(0x123456, false));
    t.tick();
    assert_eq!(t.tlb.pop_data().map(|mf| mf.addr()), Some(0x123456));
}

// ══════════════════════════════════════════════════════════
// 4. Bounds and backpressure
// ══════════════════════════════════════════════════════════

#[test]
fn full_accounts_for_queued_requests() {
    let mut cfg = XlatConfig::default();
    cfg.request_queue_size = 2;
    let mut t = TestContext::with_config(cfg);

    assert!(!t.tlb.full());
    assert!(t.tlb.full_with(2));

    t.tlb.access(t.data_req(0x1000, false));
    assert!(!t.tlb.full());
    assert!(t.tlb.full_with(1));

    t.tlb.access(t.data_req(0x2000, false));
    assert!(t.tlb.full());
}

#[test]
#[should_panic(expected = "full request queue")]
fn access_on_a_full_queue_panics() {
    let mut cfg = XlatConfig::default();
    cfg.request_queue_size = 1;
    let mut t = TestContext::with_config(cfg);
    t.tlb.access(t.data_req(0x1000, false));
    t.tlb.access(t.data_req(0x2000, false));
}

#[test]
fn push_mem_req_applies_pipeline_backpressure() {
    let mut cfg = XlatConfig::default();
    cfg.request_queue_size = 1;
    let t = TestContext::with_config(cfg);

    let a = MemFetch::new(0x100, false, AccessType::Data, 8, 0);
    let b = MemFetch::new(0x200, false, AccessType::Data, 8, 0);
    assert!(t.tlb.push_mem_req(a).is_ok());
    let refused = t.tlb.push_mem_req(b).unwrap_err();
    assert_eq!(refused.addr(), 0x200);
}

#[test]
fn completions_wait_behind_a_full_finished_queue() {
    let mut cfg = XlatConfig::default();
    cfg.tlb_hit_latency = 0;
    cfg.request_queue_size = 2;
    let mut t = TestContext::with_config(cfg);

    let frames = [0x0011_0000u64, 0x0022_0000, 0x0033_0000, 0x0044_0000];
    for (i, &frame) in frames.iter().enumerate() {
        t.map_page(0x1000 + i as u64 * PAGE, frame);
    }

    t.tlb.access(t.data_req(0x1000, false));
    t.tlb.access(t.data_req(0x1000 + PAGE, false));
    t.run(30);

    // The finished queue is at capacity with both walks done.
    assert!(t.tlb.data_ready());

    t.tlb.access(t.data_req(0x1000 + 2 * PAGE, false));
    t.tlb.access(t.data_req(0x1000 + 3 * PAGE, false));
    t.run(30);

    // The later completions are held by the walker until slots free up.
    assert!(t.tlb.mmu().has_completed());

    let mut pas = Vec::new();
    for _ in 0..200 {
        if let Some(mf) = t.tlb.pop_data() {
            pas.push(mf.addr());
            if pas.len() == frames.len() {
                break;
            }
        } else {
            t.run(1);
        }
    }
    pas.sort_unstable();
    assert_eq!(pas, vec![0x0011_0000, 0x0022_0000, 0x0033_0000, 0x0044_0000]);
    assert_eq!(t.tlb.stats().tlb.completions, 4);
}
