//! Runtime natives
//!
//! Interpreters resolve native methods by qualified name. This module binds
//! the `std.runtime` names to the process runtime handle.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use super::error::RuntimeError;
use super::handle::RuntimeHandle;

/// Native function signature. `None` means the native returns nothing.
type NativeFn = fn(&RuntimeHandle, &[i64]) -> Result<Option<i64>, RuntimeError>;

/// Declaration of a runtime native.
#[derive(Clone)]
pub struct NativeDeclaration {
    /// Short name (e.g., "gc")
    pub name: &'static str,
    /// Fully qualified name (e.g., "std.runtime.gc")
    pub native_name: &'static str,
    /// Function signature (e.g., "() -> Void")
    pub signature: &'static str,
    /// Whether a binding exists
    pub implemented: bool,
    arity: usize,
    func: NativeFn,
}

impl fmt::Debug for NativeDeclaration {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("NativeDeclaration")
            .field("native_name", &self.native_name)
            .field("signature", &self.signature)
            .field("implemented", &self.implemented)
            .finish()
    }
}

impl NativeDeclaration {
    /// Number of Int arguments the native takes
    pub fn arity(&self) -> usize {
        self.arity
    }
}

/// All `std.runtime` natives.
pub fn native_declarations() -> Vec<NativeDeclaration> {
    vec![
        NativeDeclaration {
            name: "exit",
            native_name: "std.runtime.exit",
            signature: "(code: Int) -> Never",
            implemented: true,
            arity: 1,
            func: native_exit,
        },
        NativeDeclaration {
            name: "gc",
            native_name: "std.runtime.gc",
            signature: "() -> Void",
            implemented: true,
            arity: 0,
            func: native_gc,
        },
        NativeDeclaration {
            name: "total_memory",
            native_name: "std.runtime.total_memory",
            signature: "() -> Int",
            implemented: true,
            arity: 0,
            func: native_total_memory,
        },
        NativeDeclaration {
            name: "free_memory",
            native_name: "std.runtime.free_memory",
            signature: "() -> Int",
            implemented: true,
            arity: 0,
            func: native_free_memory,
        },
    ]
}

static NATIVES: Lazy<HashMap<&'static str, NativeDeclaration>> = Lazy::new(|| {
    native_declarations()
        .into_iter()
        .map(|d| (d.native_name, d))
        .collect()
});

/// Look up a native by qualified name
pub fn lookup(native_name: &str) -> Option<&'static NativeDeclaration> {
    NATIVES.get(native_name)
}

/// Invoke a runtime native on `handle`.
pub fn invoke(
    handle: &RuntimeHandle,
    native_name: &str,
    args: &[i64],
) -> Result<Option<i64>, RuntimeError> {
    let decl =
        lookup(native_name).ok_or_else(|| RuntimeError::UnknownNative(native_name.to_string()))?;
    if args.len() != decl.arity {
        return Err(RuntimeError::Arity {
            native: decl.native_name.to_string(),
            expected: decl.arity,
            found: args.len(),
        });
    }
    debug!("native call {}({:?})", decl.native_name, args);
    (decl.func)(handle, args)
}

/// Byte counts saturate rather than wrap into negative Ints.
fn to_int(bytes: u64) -> i64 {
    i64::try_from(bytes).unwrap_or(i64::MAX)
}

fn native_exit(
    handle: &RuntimeHandle,
    args: &[i64],
) -> Result<Option<i64>, RuntimeError> {
    let code = i32::try_from(args[0]).map_err(|_| RuntimeError::ExitCodeOutOfRange(args[0]))?;
    handle.terminate(code)
}

fn native_gc(
    handle: &RuntimeHandle,
    _args: &[i64],
) -> Result<Option<i64>, RuntimeError> {
    handle.request_collection();
    Ok(None)
}

fn native_total_memory(
    handle: &RuntimeHandle,
    _args: &[i64],
) -> Result<Option<i64>, RuntimeError> {
    Ok(Some(to_int(handle.total_memory())))
}

fn native_free_memory(
    handle: &RuntimeHandle,
    _args: &[i64],
) -> Result<Option<i64>, RuntimeError> {
    Ok(Some(to_int(handle.free_memory())))
}

#[cfg(test)]
mod tests;
