//! hostrt - process runtime control
//!
//! One process-wide runtime handle for terminating the process, requesting
//! a collection pass and reading managed-memory statistics. Every operation
//! is forwarded to an [`ExecutionEngine`]; the crate ships a managed-heap
//! engine that is used when nothing else is installed.
//!
//! # Example
//!
//! ```no_run
//! let runtime = hostrt::acquire();
//! runtime.request_collection();
//! assert!(runtime.free_memory() <= runtime.total_memory());
//! runtime.terminate(0);
//! ```

#![doc(html_root_url = "https://docs.rs/hostrt")]
#![warn(rust_2018_idioms)]

pub mod runtime;
pub mod util;

// Re-exports
pub use runtime::{
    acquire, ExecutionEngine, HeapEngine, MemoryStats, RuntimeError, RuntimeHandle,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = "hostrt";
