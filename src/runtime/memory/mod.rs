//! Managed heap with scope regions
//!
//! Memory is handed out from fixed-capacity regions. A scope owns every
//! region opened since the previous scope ended; `retire_scope` turns those
//! regions into garbage in one step and the collector later sweeps them.
//!
//! # Accounting
//! - `capacity`: bytes reserved by all regions, pooled ones included
//! - `used`: bytes handed out from live and retired regions
//! - `free`: `capacity - used`
//!
//! Retired bytes stay counted as used until a sweep reclaims them.

use std::mem;
use tracing::warn;

/// Default size of a freshly opened region (64KB).
pub const DEFAULT_REGION_SIZE: usize = 64 * 1024;

/// Default upper bound on heap capacity (256MB).
pub const DEFAULT_MAX_HEAP_SIZE: usize = 256 * 1024 * 1024;

/// Memory allocation error
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// Not enough memory to satisfy the allocation
    #[error("out of memory")]
    OutOfMemory,
    /// Zero-sized requests are rejected
    #[error("zero-sized allocation")]
    ZeroSized,
}

/// Region identifier. Never reused within one heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionId(u64);

/// A block handed out by the heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    region: RegionId,
    offset: usize,
    len: usize,
}

impl Allocation {
    /// Region holding this block
    pub fn region(&self) -> RegionId {
        self.region
    }

    /// Offset inside the region
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; the heap never hands out empty blocks
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Outcome of a sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Bytes that moved from used to free
    pub reclaimed_bytes: usize,
    /// Retired regions kept for reuse
    pub pooled_regions: usize,
    /// Retired regions returned to the system allocator
    pub released_regions: usize,
}

#[derive(Debug)]
struct Region {
    id: RegionId,
    buffer: Vec<u8>,
    retired: bool,
}

impl Region {
    /// Reserve a region. Fails instead of aborting when the system
    /// allocator cannot provide `capacity` bytes.
    fn try_with_capacity(
        id: RegionId,
        capacity: usize,
    ) -> Result<Self, AllocError> {
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(capacity)
            .map_err(|_| AllocError::OutOfMemory)?;
        Ok(Self {
            id,
            buffer,
            retired: false,
        })
    }

    fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    fn used(&self) -> usize {
        self.buffer.len()
    }

    fn remaining(&self) -> usize {
        self.capacity() - self.used()
    }

    /// Bump-allocate `size` zeroed bytes. Never grows the buffer.
    fn alloc(
        &mut self,
        size: usize,
    ) -> Option<usize> {
        if self.retired || self.remaining() < size {
            return None;
        }
        let offset = self.buffer.len();
        self.buffer.resize(offset + size, 0);
        Some(offset)
    }
}

/// Region-based managed heap
#[derive(Debug)]
pub struct ManagedHeap {
    /// Live and retired regions, in opening order
    regions: Vec<Region>,
    /// Index of the first region in the current scope
    scope_start: usize,
    /// Swept regions waiting for reuse
    pool: Vec<Region>,
    region_size: usize,
    max_heap_size: usize,
    next_id: u64,
    total_allocations: usize,
    allocated_bytes: usize,
}

impl ManagedHeap {
    /// Create a heap whose first region holds `initial_size` bytes.
    ///
    /// The first region is clamped to `max_heap_size`. If it cannot be
    /// reserved the heap starts empty; use `try_new` to get the error.
    pub fn new(
        initial_size: usize,
        region_size: usize,
        max_heap_size: usize,
    ) -> Self {
        Self::try_new(initial_size, region_size, max_heap_size).unwrap_or_else(|_| {
            warn!(
                "cannot reserve {} byte initial region, starting empty",
                initial_size.min(max_heap_size)
            );
            Self::empty(region_size, max_heap_size)
        })
    }

    /// Create a heap, failing if the first region cannot be reserved.
    pub fn try_new(
        initial_size: usize,
        region_size: usize,
        max_heap_size: usize,
    ) -> Result<Self, AllocError> {
        let mut heap = Self::empty(region_size, max_heap_size);
        let first = initial_size.min(max_heap_size);
        if first > 0 {
            let id = heap.fresh_id();
            heap.regions.push(Region::try_with_capacity(id, first)?);
        }
        Ok(heap)
    }

    fn empty(
        region_size: usize,
        max_heap_size: usize,
    ) -> Self {
        Self {
            regions: Vec::new(),
            scope_start: 0,
            pool: Vec::new(),
            region_size: region_size.max(1),
            max_heap_size,
            next_id: 0,
            total_allocations: 0,
            allocated_bytes: 0,
        }
    }

    fn fresh_id(&mut self) -> RegionId {
        let id = RegionId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Allocate `size` zeroed bytes in the current scope.
    pub fn alloc(
        &mut self,
        size: usize,
    ) -> Result<Allocation, AllocError> {
        if size == 0 {
            return Err(AllocError::ZeroSized);
        }

        if let Some(region) = self.current_region_mut() {
            if let Some(offset) = region.alloc(size) {
                let id = region.id;
                return Ok(self.record(id, offset, size));
            }
        }

        let mut region = match self.take_pooled(size) {
            Some(region) => region,
            None => self.open_region(size)?,
        };
        let offset = region.alloc(size).ok_or(AllocError::OutOfMemory)?;
        let id = region.id;
        self.regions.push(region);
        Ok(self.record(id, offset, size))
    }

    fn record(
        &mut self,
        region: RegionId,
        offset: usize,
        len: usize,
    ) -> Allocation {
        self.total_allocations += 1;
        self.allocated_bytes += len;
        Allocation {
            region,
            offset,
            len,
        }
    }

    /// Last region of the current scope, if it is still open.
    fn current_region_mut(&mut self) -> Option<&mut Region> {
        if self.regions.len() <= self.scope_start {
            return None;
        }
        self.regions.last_mut().filter(|r| !r.retired)
    }

    fn take_pooled(
        &mut self,
        size: usize,
    ) -> Option<Region> {
        let index = self.pool.iter().position(|r| r.capacity() >= size)?;
        let mut region = self.pool.swap_remove(index);
        region.id = self.fresh_id();
        Some(region)
    }

    fn open_region(
        &mut self,
        size: usize,
    ) -> Result<Region, AllocError> {
        let capacity = self.region_size.max(size);
        // Pooled regions too small for this request give way first.
        while self.capacity().saturating_add(capacity) > self.max_heap_size {
            if self.pool.pop().is_none() {
                return Err(AllocError::OutOfMemory);
            }
        }
        let id = self.fresh_id();
        Region::try_with_capacity(id, capacity)
    }

    /// End the current scope. Its regions become garbage.
    ///
    /// Returns the number of bytes retired.
    pub fn retire_scope(&mut self) -> usize {
        let mut retired = 0;
        for region in &mut self.regions[self.scope_start..] {
            region.retired = true;
            retired += region.used();
        }
        self.scope_start = self.regions.len();
        retired
    }

    /// Reclaim retired regions, keeping up to `retain` of them pooled.
    pub fn sweep(
        &mut self,
        retain: usize,
    ) -> SweepStats {
        let mut stats = SweepStats::default();
        let (dead, live): (Vec<Region>, Vec<Region>) = mem::take(&mut self.regions)
            .into_iter()
            .partition(|r| r.retired);

        for mut region in dead {
            stats.reclaimed_bytes += region.used();
            if self.pool.len() < retain {
                region.buffer.clear();
                region.retired = false;
                self.pool.push(region);
                stats.pooled_regions += 1;
            } else {
                stats.released_regions += 1;
            }
        }

        // Everything left is live, so it all belongs to the current scope.
        self.regions = live;
        self.scope_start = 0;
        stats
    }

    /// Read back an allocation. `None` once its region has been swept.
    pub fn bytes(
        &self,
        allocation: &Allocation,
    ) -> Option<&[u8]> {
        let region = self.regions.iter().find(|r| r.id == allocation.region)?;
        region
            .buffer
            .get(allocation.offset..allocation.offset + allocation.len)
    }

    /// Mutable access to an allocation. `None` once its region has been swept.
    pub fn bytes_mut(
        &mut self,
        allocation: &Allocation,
    ) -> Option<&mut [u8]> {
        let region = self
            .regions
            .iter_mut()
            .find(|r| r.id == allocation.region)?;
        region
            .buffer
            .get_mut(allocation.offset..allocation.offset + allocation.len)
    }

    /// Get total capacity
    pub fn capacity(&self) -> usize {
        self.regions.iter().map(Region::capacity).sum::<usize>()
            + self.pool.iter().map(Region::capacity).sum::<usize>()
    }

    /// Get used size
    pub fn used(&self) -> usize {
        self.regions.iter().map(Region::used).sum()
    }

    /// Get free size
    pub fn free(&self) -> usize {
        self.capacity() - self.used()
    }

    /// Bytes sitting in retired regions
    pub fn garbage(&self) -> usize {
        self.regions
            .iter()
            .filter(|r| r.retired)
            .map(Region::used)
            .sum()
    }

    /// Regions currently in use, retired ones included
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Regions waiting in the pool
    pub fn pooled_regions(&self) -> usize {
        self.pool.len()
    }

    /// Get total allocations
    pub fn total_allocations(&self) -> usize {
        self.total_allocations
    }

    /// Bytes handed out over the heap's lifetime
    pub fn allocated_bytes(&self) -> usize {
        self.allocated_bytes
    }

    /// Upper bound on capacity
    pub fn max_heap_size(&self) -> usize {
        self.max_heap_size
    }
}

impl Default for ManagedHeap {
    fn default() -> Self {
        Self::new(DEFAULT_REGION_SIZE, DEFAULT_REGION_SIZE, DEFAULT_MAX_HEAP_SIZE)
    }
}
