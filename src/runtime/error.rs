//! Runtime errors
//!
//! The four facade operations never fail. These errors belong to the
//! surfaces around them: engine installation and native bindings.

/// Errors raised while installing an engine or invoking a runtime native.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// The process runtime is already bound to an engine
    #[error("runtime already initialized")]
    AlreadyInitialized,

    /// No native is registered under this name
    #[error("unknown runtime native: {0}")]
    UnknownNative(String),

    /// Wrong number of arguments for a native
    #[error("{native} expects {expected} argument(s), got {found}")]
    Arity {
        native: String,
        expected: usize,
        found: usize,
    },

    /// Exit code does not fit a process status
    #[error("exit code out of range: {0}")]
    ExitCodeOutOfRange(i64),
}
