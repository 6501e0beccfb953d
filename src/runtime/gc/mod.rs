//! Garbage collector
//!
//! Sweeps retired scope regions out of the managed heap. Collections are
//! triggered explicitly (`collect`) or by allocation volume
//! (`should_collect`).

use super::memory::{
    AllocError, ManagedHeap, SweepStats, DEFAULT_MAX_HEAP_SIZE, DEFAULT_REGION_SIZE,
};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// GC configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GCConfig {
    /// Size of the first heap region
    pub initial_heap_size: usize,
    /// Size of regions opened afterwards
    pub region_size: usize,
    /// Maximum heap size
    pub max_heap_size: usize,
    /// Bytes allocated between automatic collections
    pub collection_threshold: usize,
    /// Swept regions kept for reuse
    pub retained_regions: usize,
}

impl Default for GCConfig {
    fn default() -> Self {
        Self {
            initial_heap_size: DEFAULT_REGION_SIZE,
            region_size: DEFAULT_REGION_SIZE,
            max_heap_size: DEFAULT_MAX_HEAP_SIZE,
            collection_threshold: 1024 * 1024,
            retained_regions: 4,
        }
    }
}

/// GC state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GCState {
    Idle,
    Sweeping,
}

/// Garbage collector
#[derive(Debug)]
pub struct GC {
    /// Configuration
    config: GCConfig,
    /// State
    state: GCState,
    /// Heap
    heap: ManagedHeap,
    /// Heap allocation counter at the end of the last collection
    allocated_at_last_collection: usize,
    collections: u64,
    reclaimed_bytes: u64,
    last_sweep: SweepStats,
    /// Pause time tracking
    total_pause: Duration,
    last_pause: Duration,
}

impl GC {
    /// Create a new GC
    ///
    /// Starts with an empty heap if the first region cannot be reserved.
    pub fn new(config: GCConfig) -> Self {
        let heap = ManagedHeap::new(
            config.initial_heap_size,
            config.region_size,
            config.max_heap_size,
        );
        Self::with_heap(config, heap)
    }

    /// Create a new GC, failing if the first heap region cannot be reserved
    pub fn try_new(config: GCConfig) -> Result<Self, AllocError> {
        let heap = ManagedHeap::try_new(
            config.initial_heap_size,
            config.region_size,
            config.max_heap_size,
        )?;
        Ok(Self::with_heap(config, heap))
    }

    fn with_heap(
        config: GCConfig,
        heap: ManagedHeap,
    ) -> Self {
        Self {
            config,
            state: GCState::Idle,
            heap,
            allocated_at_last_collection: 0,
            collections: 0,
            reclaimed_bytes: 0,
            last_sweep: SweepStats::default(),
            total_pause: Duration::ZERO,
            last_pause: Duration::ZERO,
        }
    }

    /// Collect garbage
    pub fn collect(&mut self) -> SweepStats {
        let start = Instant::now();
        self.state = GCState::Sweeping;
        let stats = self.heap.sweep(self.config.retained_regions);
        self.state = GCState::Idle;
        let pause = start.elapsed();

        self.collections += 1;
        self.reclaimed_bytes += stats.reclaimed_bytes as u64;
        self.last_sweep = stats;
        self.allocated_at_last_collection = self.heap.allocated_bytes();
        self.last_pause = pause;
        self.total_pause += pause;

        debug!(
            "gc #{}: reclaimed {} bytes, pooled {}, released {} in {:?}",
            self.collections,
            stats.reclaimed_bytes,
            stats.pooled_regions,
            stats.released_regions,
            pause
        );
        stats
    }

    /// Check if collection is needed
    pub fn should_collect(&self) -> bool {
        let since = self.heap.allocated_bytes() - self.allocated_at_last_collection;
        since >= self.config.collection_threshold
    }

    /// Get the state
    pub fn state(&self) -> GCState {
        self.state
    }

    /// Get the heap
    pub fn heap(&self) -> &ManagedHeap {
        &self.heap
    }

    /// Get the heap mutably
    pub fn heap_mut(&mut self) -> &mut ManagedHeap {
        &mut self.heap
    }

    /// Get the configuration
    pub fn config(&self) -> &GCConfig {
        &self.config
    }

    /// Number of completed collections
    pub fn collections(&self) -> u64 {
        self.collections
    }

    /// Bytes reclaimed over all collections
    pub fn reclaimed_bytes(&self) -> u64 {
        self.reclaimed_bytes
    }

    /// Outcome of the most recent collection
    pub fn last_sweep(&self) -> SweepStats {
        self.last_sweep
    }

    /// Get total pause time
    pub fn total_pause(&self) -> Duration {
        self.total_pause
    }

    /// Get last pause time
    pub fn last_pause(&self) -> Duration {
        self.last_pause
    }
}

impl Default for GC {
    fn default() -> Self {
        Self::new(GCConfig::default())
    }
}
