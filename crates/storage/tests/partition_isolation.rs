//! Lock isolation between partitions
//!
//! - A held partition lock never blocks another symbol
//! - A held partition lock does block its own symbol
//! - Concurrent first access creates exactly one partition

use chrono::{TimeZone, Utc};
use kestrel_clock::ManualClock;
use kestrel_storage::Storage;
use kestrel_timeseries::{RetentionPolicy, Series, TimeSeries};
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, mpsc};
use std::thread;
use std::time::Duration;

fn storage() -> Arc<Storage> {
    let _ = env_logger::builder().is_test(true).try_init();
    let clock = ManualClock::new(Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
    Arc::new(Storage::with_retention(RetentionPolicy::count(100), clock).unwrap())
}

#[test]
fn test_held_lock_does_not_block_other_symbol() {
    let storage = storage();
    let partition_a = storage.get("A");
    let guard = partition_a.lock();

    let (tx, rx) = mpsc::channel();
    let worker = {
        let storage = Arc::clone(&storage);
        thread::spawn(move || {
            storage.with_partition("B", |s| s.append(dec!(1), None));
            tx.send(()).unwrap();
        })
    };

    assert!(
        rx.recv_timeout(Duration::from_secs(5)).is_ok(),
        "append to B waited on A's lock"
    );
    drop(guard);
    worker.join().unwrap();

    assert_eq!(storage.with_partition("A", |s| s.len()), 0);
    assert_eq!(storage.with_partition("B", |s| s.len()), 1);
}

#[test]
fn test_held_lock_blocks_same_symbol() {
    let storage = storage();
    let partition_a = storage.get("A");
    let guard = partition_a.lock();

    let (tx, rx) = mpsc::channel();
    let worker = {
        let storage = Arc::clone(&storage);
        thread::spawn(move || {
            storage.with_partition("A", |s| s.append(dec!(1), None));
            tx.send(()).unwrap();
        })
    };

    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    drop(guard);
    assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    worker.join().unwrap();

    assert_eq!(storage.with_partition("A", |s| s.len()), 1);
}

#[test]
fn test_concurrent_first_access_creates_one_partition() {
    let created = Arc::new(AtomicUsize::new(0));
    let storage = {
        let created = Arc::clone(&created);
        let clock = ManualClock::new(None);
        Arc::new(Storage::new(Arc::new(move || -> Box<dyn Series> {
            created.fetch_add(1, Ordering::SeqCst);
            Box::new(TimeSeries::new(clock.clone()))
        })))
    };

    let threads = 16;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let storage = Arc::clone(&storage);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                storage.get("ETHUSD")
            })
        })
        .collect();

    let partitions: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(created.load(Ordering::SeqCst), 1);
    assert!(partitions.iter().all(|p| Arc::ptr_eq(p, &partitions[0])));
}

#[test]
fn test_concurrent_appends_are_all_recorded() {
    let storage = {
        let _ = env_logger::builder().is_test(true).try_init();
        Arc::new(Storage::new(Arc::new(|| -> Box<dyn Series> {
            Box::new(TimeSeries::new(ManualClock::new(None)))
        })))
    };
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    let handles: Vec<_> = (0..8i64)
        .map(|worker| {
            let storage = Arc::clone(&storage);
            thread::spawn(move || {
                for i in 0..250i64 {
                    let ts = base + chrono::Duration::milliseconds(worker * 1_000 + i);
                    storage.with_partition("A", |s| s.append(dec!(1), Some(ts)));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(storage.with_partition("A", |s| s.len()), 2_000);
}

#[test]
fn test_panic_inside_partition_releases_lock() {
    let storage = storage();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        storage.with_partition::<()>("A", |_| panic!("boom"));
    }));
    assert!(result.is_err());

    let (tx, rx) = mpsc::channel();
    let worker = {
        let storage = Arc::clone(&storage);
        thread::spawn(move || {
            storage.with_partition("A", |s| s.append(dec!(1), None));
            tx.send(()).unwrap();
        })
    };

    assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    worker.join().unwrap();
}
