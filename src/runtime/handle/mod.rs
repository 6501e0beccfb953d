//! Process-wide runtime handle
//!
//! `RuntimeHandle` is the single entry point for process-level runtime
//! commands and queries. Exactly one instance exists per process; it is
//! created behind an initialize-once barrier and never replaced.
//!
//! # Usage
//!
//! ```no_run
//! use hostrt::RuntimeHandle;
//!
//! let runtime = RuntimeHandle::acquire();
//! let total = runtime.total_memory();
//! let free = runtime.free_memory();
//! runtime.request_collection();
//! println!("{} / {} bytes free", free, total);
//! ```

use std::fmt;

use once_cell::sync::OnceCell;
use tracing::{debug, info};

use super::engine::{ExecutionEngine, MemoryStats};
use super::error::RuntimeError;
use super::host;

/// The process runtime.
static RUNTIME: OnceCell<RuntimeHandle> = OnceCell::new();

/// Stateless delegator bound to the process execution engine.
///
/// The handle does not own the engine. Two handles are equal only if they
/// are the same instance.
pub struct RuntimeHandle {
    engine: &'static dyn ExecutionEngine,
}

impl RuntimeHandle {
    pub(crate) fn new(engine: &'static dyn ExecutionEngine) -> Self {
        Self { engine }
    }

    /// Get the process runtime.
    ///
    /// Binds the default heap engine if no engine was installed before the
    /// first call.
    pub fn acquire() -> &'static RuntimeHandle {
        RUNTIME.get_or_init(|| {
            let handle = RuntimeHandle::new(host::default_engine());
            info!("runtime bound to default engine `{}`", handle.engine_name());
            handle
        })
    }

    /// Bind the process runtime to `engine`.
    ///
    /// Only succeeds before the runtime has been initialized, by either
    /// `install` or `acquire`.
    pub fn install(
        engine: &'static dyn ExecutionEngine,
    ) -> Result<&'static RuntimeHandle, RuntimeError> {
        Self::bind(|| engine)
    }

    /// Like `install`, for an engine without a `'static` home.
    ///
    /// The box is leaked only if it becomes the process engine; otherwise it
    /// is dropped.
    pub fn install_boxed(
        engine: Box<dyn ExecutionEngine>,
    ) -> Result<&'static RuntimeHandle, RuntimeError> {
        Self::bind(|| &*Box::leak(engine))
    }

    fn bind(
        engine: impl FnOnce() -> &'static dyn ExecutionEngine,
    ) -> Result<&'static RuntimeHandle, RuntimeError> {
        let mut installed = false;
        let handle = RUNTIME.get_or_init(|| {
            installed = true;
            RuntimeHandle::new(engine())
        });

        if installed {
            info!("runtime bound to engine `{}`", handle.engine_name());
            Ok(handle)
        } else {
            Err(RuntimeError::AlreadyInitialized)
        }
    }

    /// Whether the process runtime has been created yet.
    pub fn is_initialized() -> bool {
        RUNTIME.get().is_some()
    }

    /// End the process with `code`. Does not return.
    pub fn terminate(
        &self,
        code: i32,
    ) -> ! {
        info!("terminating with status {}", code);
        self.engine.process_exit(code)
    }

    /// Ask the engine for a collection pass. Advisory only.
    pub fn request_collection(&self) {
        debug!("collection requested");
        self.engine.gc_pass();
    }

    /// Total managed memory in bytes, as reported by the engine.
    pub fn total_memory(&self) -> u64 {
        let total = self.engine.total_managed_bytes();
        debug!("total_memory = {}", total);
        total
    }

    /// Free managed memory in bytes, as reported by the engine.
    pub fn free_memory(&self) -> u64 {
        let free = self.engine.free_managed_bytes();
        debug!("free_memory = {}", free);
        free
    }

    /// Read total and free memory back to back.
    pub fn memory_stats(&self) -> MemoryStats {
        MemoryStats {
            total: self.total_memory(),
            free: self.free_memory(),
        }
    }

    /// Name of the bound engine
    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }
}

impl PartialEq for RuntimeHandle {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for RuntimeHandle {}

impl fmt::Debug for RuntimeHandle {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("RuntimeHandle")
            .field("engine", &self.engine.name())
            .finish()
    }
}

/// Get the process runtime. Shorthand for [`RuntimeHandle::acquire`].
pub fn acquire() -> &'static RuntimeHandle {
    RuntimeHandle::acquire()
}
