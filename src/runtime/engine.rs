//! Execution engine interface
//!
//! The runtime facade never collects, allocates or exits on its own. Every
//! operation is forwarded to an `ExecutionEngine` installed for the process.
//!
//! # Hooks
//! - `process_exit`: end the process with a status code
//! - `gc_pass`: perform or schedule a collection
//! - `total_managed_bytes` / `free_managed_bytes`: memory snapshots

/// Capabilities the host engine provides to the runtime facade.
///
/// Implementations must be `Send + Sync`: the facade is shared by every
/// thread in the process and performs no locking of its own.
pub trait ExecutionEngine: Send + Sync {
    /// Short engine name used in diagnostics.
    fn name(&self) -> &str {
        "engine"
    }

    /// End the process with the given status code.
    fn process_exit(
        &self,
        code: i32,
    ) -> !;

    /// Perform or schedule a collection pass. Advisory.
    fn gc_pass(&self);

    /// Current total managed allocation, in bytes.
    fn total_managed_bytes(&self) -> u64;

    /// Current estimate of allocated but unused managed memory, in bytes.
    fn free_managed_bytes(&self) -> u64;
}

/// A pair of memory readings taken back to back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryStats {
    /// Total managed bytes
    pub total: u64,
    /// Free managed bytes
    pub free: u64,
}

impl MemoryStats {
    /// Bytes in use. Saturates at zero when the two reads raced.
    pub fn used(&self) -> u64 {
        self.total.saturating_sub(self.free)
    }
}
