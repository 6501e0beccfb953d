//! Process runtime identity tests

use std::sync::Barrier;
use std::thread;

use hostrt::RuntimeHandle;

/// Every acquisition returns the same instance.
#[test]
fn test_acquire_is_stable() {
    let first = hostrt::acquire();
    for _ in 0..100 {
        assert!(std::ptr::eq(first, RuntimeHandle::acquire()));
    }
}

/// Concurrent first acquisitions still agree on one instance.
#[test]
fn test_acquire_from_many_threads() {
    const THREADS: usize = 16;
    let barrier = Barrier::new(THREADS);

    let addresses: Vec<usize> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    hostrt::acquire() as *const RuntimeHandle as usize
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(addresses.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(
        addresses[0],
        hostrt::acquire() as *const RuntimeHandle as usize
    );
}

/// Repeated acquisition has no effect on what the runtime reports.
#[test]
fn test_acquire_has_no_side_effects() {
    let runtime = hostrt::acquire();
    let before = runtime.total_memory();
    for _ in 0..1000 {
        hostrt::acquire();
    }
    assert_eq!(runtime.total_memory(), before);
    assert_eq!(runtime.engine_name(), "heap");
}
