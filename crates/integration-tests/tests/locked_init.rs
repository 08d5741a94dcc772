//! Locked Init Tests - protected initialization vs shutdown
//!
//! A resource opened under `locked_init` is always torn down by shutdown,
//! and shutdown never begins while an init is in flight.

use shutter_core::{Shutter, ShutterError};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Barrier};
use std::thread;
use std::time::Duration;

fn decrementing_shutter(counter: &Arc<AtomicI64>) -> Shutter {
    let counter = Arc::clone(counter);
    Shutter::with_callback(move |_| {
        counter.fetch_sub(1, Ordering::SeqCst);
    })
}

#[test]
fn test_locked_init_not_shutdown() {
    let a = Arc::new(AtomicI64::new(0));
    let shutter = decrementing_shutter(&a);

    let result = shutter.locked_init(|| {
        a.fetch_add(1, Ordering::SeqCst);
        Ok::<_, ShutterError>(())
    });
    assert!(result.is_ok());

    shutter.shutdown(None);
    assert_eq!(a.load(Ordering::SeqCst), 0);
}

#[test]
fn test_locked_init_already_shutdown() {
    let a = Arc::new(AtomicI64::new(0));
    let shutter = decrementing_shutter(&a);
    shutter.shutdown(None);

    let result = shutter.locked_init(|| {
        a.fetch_add(1, Ordering::SeqCst);
        Ok::<_, ShutterError>(())
    });

    assert_eq!(result, Err(ShutterError::AlreadyShutDown));
    assert_eq!(a.load(Ordering::SeqCst), -1, "Init closure must not run");
}

#[test]
fn test_shutdown_during_locked_init() {
    let a = Arc::new(AtomicI64::new(0));
    let seen_by_callback = Arc::new(AtomicI64::new(i64::MIN));
    let shutter = {
        let a = Arc::clone(&a);
        let seen_by_callback = Arc::clone(&seen_by_callback);
        Shutter::with_callback(move |_| {
            seen_by_callback.store(a.load(Ordering::SeqCst), Ordering::SeqCst);
            a.fetch_sub(1, Ordering::SeqCst);
        })
    };
    let shutdown_returned = Arc::new(AtomicBool::new(false));
    let (entered_tx, entered_rx) = mpsc::channel::<()>();

    let init = {
        let shutter = shutter.clone();
        let a = Arc::clone(&a);
        let shutdown_returned = Arc::clone(&shutdown_returned);
        thread::spawn(move || {
            shutter.locked_init(|| {
                entered_tx.send(()).unwrap();
                thread::sleep(Duration::from_millis(50));

                let interleaved = shutter.is_terminating() || shutdown_returned.load(Ordering::SeqCst);
                a.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ShutterError>(interleaved)
            })
        })
    };

    entered_rx.recv().unwrap();
    let closer = {
        let shutter = shutter.clone();
        let shutdown_returned = Arc::clone(&shutdown_returned);
        thread::spawn(move || {
            shutter.shutdown(None);
            shutdown_returned.store(true, Ordering::SeqCst);
        })
    };

    let interleaved = init.join().unwrap();
    closer.join().unwrap();

    assert_eq!(interleaved, Ok(false), "Shutdown began while locked init was running");
    assert_eq!(seen_by_callback.load(Ordering::SeqCst), 1, "Callback ran before init finished");
    assert_eq!(a.load(Ordering::SeqCst), 0);
    assert!(shutter.is_terminated());
}

#[test]
fn test_resources_registered_under_lock_are_always_released() {
    const INITS: usize = 64;

    let shutter = Shutter::new();
    let opened = Arc::new(AtomicUsize::new(0));
    let released = Arc::new(AtomicUsize::new(0));
    let rejected = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(INITS + 1));

    let mut workers = Vec::with_capacity(INITS);
    for _ in 0..INITS {
        let shutter = shutter.clone();
        let opened = Arc::clone(&opened);
        let released = Arc::clone(&released);
        let rejected = Arc::clone(&rejected);
        let barrier = Arc::clone(&barrier);
        workers.push(thread::spawn(move || {
            barrier.wait();
            let result = shutter.locked_init(|| {
                opened.fetch_add(1, Ordering::SeqCst);
                shutter.on_shutdown(move |_| {
                    released.fetch_add(1, Ordering::SeqCst);
                });
                Ok::<_, ShutterError>(())
            });
            if result == Err(ShutterError::AlreadyShutDown) {
                rejected.fetch_add(1, Ordering::SeqCst);
            }
        }));
    }

    barrier.wait();
    shutter.shutdown(None);
    for worker in workers {
        worker.join().unwrap();
    }

    let opened = opened.load(Ordering::SeqCst);
    assert_eq!(opened + rejected.load(Ordering::SeqCst), INITS);
    assert_eq!(
        released.load(Ordering::SeqCst),
        opened,
        "Every resource opened before shutdown must be released by it"
    );
}

#[test]
fn test_locked_init_propagates_result() {
    let shutter = Shutter::new();

    let value: Result<&str, ShutterError> = shutter.locked_init(|| Ok("ready"));
    assert_eq!(value, Ok("ready"));

    let failed: Result<(), ShutterError> = shutter.locked_init(|| Err(ShutterError::AlreadyShutDown));
    assert_eq!(failed, Err(ShutterError::AlreadyShutDown));
    assert!(!shutter.is_terminating(), "A failing init must not shut the shutter");
}
