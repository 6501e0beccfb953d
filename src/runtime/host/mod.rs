//! Default execution engine
//!
//! `HeapEngine` backs the runtime facade with the crate's own managed heap
//! and collector. Process exit goes straight to the operating system.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::engine::ExecutionEngine;
use super::gc::{GCConfig, GC};
use super::memory::{AllocError, Allocation, SweepStats};

/// Engine bound by `RuntimeHandle::acquire` when nothing was installed.
static DEFAULT_ENGINE: Lazy<HeapEngine> = Lazy::new(|| HeapEngine::new(GCConfig::default()));

/// The default heap engine
pub fn default_engine() -> &'static HeapEngine {
    &DEFAULT_ENGINE
}

/// Managed-heap execution engine
#[derive(Debug)]
pub struct HeapEngine {
    gc: Mutex<GC>,
}

impl HeapEngine {
    /// Create an engine with its own heap
    pub fn new(config: GCConfig) -> Self {
        Self {
            gc: Mutex::new(GC::new(config)),
        }
    }

    /// Create an engine, failing if its first heap region cannot be reserved
    pub fn try_new(config: GCConfig) -> Result<Self, AllocError> {
        Ok(Self {
            gc: Mutex::new(GC::try_new(config)?),
        })
    }

    /// Allocate managed memory in the current scope.
    ///
    /// Collects first once enough has been allocated since the last
    /// collection, and once more before giving up on `OutOfMemory`.
    pub fn alloc(
        &self,
        size: usize,
    ) -> Result<Allocation, AllocError> {
        let mut gc = self.gc.lock();
        if gc.should_collect() {
            gc.collect();
        }

        match gc.heap_mut().alloc(size) {
            Err(AllocError::OutOfMemory) => {
                warn!("heap exhausted allocating {} bytes, collecting", size);
                gc.collect();
                gc.heap_mut().alloc(size)
            }
            result => result,
        }
    }

    /// End the current allocation scope
    pub fn retire_scope(&self) -> usize {
        self.gc.lock().heap_mut().retire_scope()
    }

    /// Run a collection and report what it did
    pub fn collect(&self) -> SweepStats {
        self.gc.lock().collect()
    }

    /// Inspect the collector under its lock
    pub fn with_gc<R>(
        &self,
        f: impl FnOnce(&GC) -> R,
    ) -> R {
        f(&self.gc.lock())
    }
}

impl Default for HeapEngine {
    fn default() -> Self {
        Self::new(GCConfig::default())
    }
}

impl ExecutionEngine for HeapEngine {
    fn name(&self) -> &str {
        "heap"
    }

    fn process_exit(
        &self,
        code: i32,
    ) -> ! {
        debug!("process exit({})", code);
        std::process::exit(code)
    }

    fn gc_pass(&self) {
        let stats = self.collect();
        info!(
            "collection reclaimed {} bytes ({} regions released)",
            stats.reclaimed_bytes, stats.released_regions
        );
    }

    fn total_managed_bytes(&self) -> u64 {
        self.gc.lock().heap().capacity() as u64
    }

    fn free_managed_bytes(&self) -> u64 {
        self.gc.lock().heap().free() as u64
    }
}

#[cfg(test)]
mod tests;
