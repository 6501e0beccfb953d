//! HeapEngine unit tests

use crate::runtime::engine::ExecutionEngine;
use crate::runtime::gc::GCConfig;
use crate::runtime::host::HeapEngine;
use crate::runtime::memory::AllocError;

fn tiny() -> HeapEngine {
    HeapEngine::new(GCConfig {
        initial_heap_size: 1024,
        region_size: 1024,
        max_heap_size: 4096,
        collection_threshold: usize::MAX,
        retained_regions: 0,
    })
}

#[test]
fn test_reports_heap_accounting() {
    let engine = tiny();
    assert_eq!(engine.total_managed_bytes(), 1024);
    assert_eq!(engine.free_managed_bytes(), 1024);

    engine.alloc(300).unwrap();
    assert_eq!(engine.total_managed_bytes(), 1024);
    assert_eq!(engine.free_managed_bytes(), 724);
}

#[test]
fn test_gc_pass_frees_retired_scope() {
    let engine = tiny();
    engine.alloc(300).unwrap();
    engine.retire_scope();
    assert_eq!(engine.free_managed_bytes(), 724);

    engine.gc_pass();
    // nothing retained: the region goes back to the system
    assert_eq!(engine.total_managed_bytes(), 0);
    assert_eq!(engine.free_managed_bytes(), 0);
    assert_eq!(engine.with_gc(|gc| gc.collections()), 1);
}

#[test]
fn test_out_of_memory_collects_and_retries() {
    let engine = tiny();
    for _ in 0..4 {
        engine.alloc(1024).unwrap();
    }
    engine.retire_scope();

    // heap is at its limit, only the retry after collecting can succeed
    assert!(engine.alloc(1024).is_ok());
    assert_eq!(engine.with_gc(|gc| gc.collections()), 1);
}

#[test]
fn test_out_of_memory_with_live_data() {
    let engine = tiny();
    for _ in 0..4 {
        engine.alloc(1024).unwrap();
    }
    assert_eq!(engine.alloc(1), Err(AllocError::OutOfMemory));
}

#[test]
fn test_threshold_triggers_collection() {
    let engine = HeapEngine::new(GCConfig {
        collection_threshold: 2048,
        ..GCConfig::default()
    });
    engine.alloc(2048).unwrap();
    engine.retire_scope();
    engine.alloc(16).unwrap();

    engine.with_gc(|gc| {
        assert_eq!(gc.collections(), 1);
        assert_eq!(gc.heap().garbage(), 0);
    });
}

#[test]
fn test_free_never_exceeds_total() {
    let engine = HeapEngine::default();
    for i in 1..50 {
        engine.alloc(i * 97).unwrap();
        if i % 7 == 0 {
            engine.retire_scope();
        }
        if i % 11 == 0 {
            engine.gc_pass();
        }
        assert!(engine.free_managed_bytes() <= engine.total_managed_bytes());
    }
}

#[test]
fn test_default_engine_name() {
    assert_eq!(crate::runtime::host::default_engine().name(), "heap");
}

#[test]
fn test_try_new_reports_unreservable_heap() {
    let result = HeapEngine::try_new(GCConfig {
        initial_heap_size: isize::MAX as usize,
        max_heap_size: isize::MAX as usize,
        ..GCConfig::default()
    });
    assert_eq!(result.err(), Some(AllocError::OutOfMemory));

    let engine = HeapEngine::try_new(GCConfig::default()).unwrap();
    assert_eq!(engine.total_managed_bytes(), 64 * 1024);
}
