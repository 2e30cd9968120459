//! Bounded fan-out of per-device work.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

/// Runs `task` once per device on at most `workers` threads.
///
/// Workers claim devices from a shared cursor, so a slow device only holds
/// up its own worker. Results travel back over a channel and only the calling
/// thread writes the map; the first result for a key wins.
pub fn fan_out<T, F>(devices: &[String], workers: usize, task: F) -> BTreeMap<String, T>
where
    T: Send,
    F: Fn(&str) -> T + Sync,
{
    if devices.is_empty() {
        return BTreeMap::new();
    }
    let workers = workers.clamp(1, devices.len());
    let cursor = AtomicUsize::new(0);
    let (sender, receiver) = mpsc::channel();

    thread::scope(|scope| {
        for _ in 0..workers {
            let sender = sender.clone();
            let cursor = &cursor;
            let task = &task;
            scope.spawn(move || loop {
                let index = cursor.fetch_add(1, Ordering::Relaxed);
                let Some(device) = devices.get(index) else {
                    break;
                };
                let result = task(device);
                if sender.send((device.clone(), result)).is_err() {
                    break;
                }
            });
        }
        drop(sender);

        let mut results = BTreeMap::new();
        for (device, result) in receiver {
            results.entry(device).or_insert(result);
        }
        results
    })
}
