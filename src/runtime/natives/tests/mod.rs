//! Runtime natives unit tests

use crate::runtime::error::RuntimeError;
use crate::runtime::gc::GCConfig;
use crate::runtime::handle::RuntimeHandle;
use crate::runtime::host::HeapEngine;
use crate::runtime::natives::{invoke, lookup, native_declarations};

fn handle() -> RuntimeHandle {
    let engine: &'static HeapEngine = Box::leak(Box::new(HeapEngine::new(GCConfig {
        initial_heap_size: 2048,
        ..GCConfig::default()
    })));
    RuntimeHandle::new(engine)
}

#[test]
fn test_declarations_are_qualified() {
    let decls = native_declarations();
    assert_eq!(decls.len(), 4);
    for decl in &decls {
        assert!(decl.implemented);
        assert_eq!(decl.native_name, format!("std.runtime.{}", decl.name));
        assert!(lookup(decl.native_name).is_some());
    }
    assert_eq!(lookup("std.runtime.exit").map(|d| d.arity()), Some(1));
}

#[test]
fn test_memory_natives() {
    let rt = handle();
    assert_eq!(invoke(&rt, "std.runtime.total_memory", &[]), Ok(Some(2048)));
    assert_eq!(invoke(&rt, "std.runtime.free_memory", &[]), Ok(Some(2048)));
}

#[test]
fn test_gc_native_returns_nothing() {
    let rt = handle();
    assert_eq!(invoke(&rt, "std.runtime.gc", &[]), Ok(None));
}

#[test]
fn test_unknown_native() {
    let rt = handle();
    assert_eq!(
        invoke(&rt, "std.runtime.halt", &[]),
        Err(RuntimeError::UnknownNative("std.runtime.halt".to_string()))
    );
}

#[test]
fn test_arity_checked() {
    let rt = handle();
    let err = invoke(&rt, "std.runtime.gc", &[1]).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::Arity {
            native: "std.runtime.gc".to_string(),
            expected: 0,
            found: 1,
        }
    );
    assert_eq!(err.to_string(), "std.runtime.gc expects 0 argument(s), got 1");

    assert!(matches!(
        invoke(&rt, "std.runtime.exit", &[]),
        Err(RuntimeError::Arity { expected: 1, .. })
    ));
}

#[test]
fn test_exit_code_range_checked() {
    let rt = handle();
    let code = i64::from(i32::MAX) + 1;
    assert_eq!(
        invoke(&rt, "std.runtime.exit", &[code]),
        Err(RuntimeError::ExitCodeOutOfRange(code))
    );
}
