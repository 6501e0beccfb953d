//! Runtime system
//!
//! The process runtime handle, the engine interface it forwards to, and the
//! default managed-heap engine.

pub mod engine;
pub mod error;
pub mod gc;
pub mod handle;
pub mod host;
pub mod memory;
pub mod natives;

pub use engine::{ExecutionEngine, MemoryStats};
pub use error::RuntimeError;
pub use handle::{acquire, RuntimeHandle};
pub use host::HeapEngine;
