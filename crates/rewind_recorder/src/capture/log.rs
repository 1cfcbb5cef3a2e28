//! Fixed-capacity, thread-safe record log.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Counters describing what happened to appended records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogStats {
    /// Records accepted into the log.
    pub appended: u64,
    /// Records rejected because capture was paused.
    pub dropped: u64,
    /// Records pushed out by newer ones.
    pub evicted: u64,
}

/// Append-only log holding the `capacity` most recent records.
///
/// Insertion order is treated as temporal order and never re-sorted.
/// When full, each append evicts the oldest record. While capture is
/// paused, appends are silently dropped.
#[derive(Debug)]
pub struct BoundedRecordLog<T> {
    records: Mutex<VecDeque<T>>,
    capacity: usize,
    capturing: AtomicBool,
    appended: AtomicU64,
    dropped: AtomicU64,
    evicted: AtomicU64,
}

impl<T> BoundedRecordLog<T> {
    /// Create an empty log that is capturing.
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Mutex::new(VecDeque::with_capacity(capacity.min(4096))),
            capacity,
            capturing: AtomicBool::new(true),
            appended: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            evicted: AtomicU64::new(0),
        }
    }

    /// Append a record, evicting from the front to stay within capacity.
    pub fn append(&self, record: T) {
        if !self.is_capturing() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            tracing::trace!("capture paused, dropping record");
            return;
        }

        let mut records = self.records.lock();
        records.push_back(record);
        self.appended.fetch_add(1, Ordering::Relaxed);

        let mut evicted = 0;
        while records.len() > self.capacity {
            records.pop_front();
            evicted += 1;
        }
        if evicted > 0 {
            self.evicted.fetch_add(evicted, Ordering::Relaxed);
        }
    }

    /// Count a record that was rejected before it reached the log.
    pub(crate) fn note_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// True when no records are held.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Maximum number of records held at once.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every record. The capture flag is left as is.
    pub fn clear(&self) {
        self.records.lock().clear();
    }

    /// Stop accepting records.
    pub fn pause(&self) {
        if self.capturing.swap(false, Ordering::AcqRel) {
            tracing::debug!("record capture paused");
        }
    }

    /// Accept records again.
    pub fn resume(&self) {
        if !self.capturing.swap(true, Ordering::AcqRel) {
            tracing::debug!("record capture resumed");
        }
    }

    /// Whether appends are currently accepted.
    pub fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::Acquire)
    }

    /// Lifetime append, drop and eviction counts.
    pub fn stats(&self) -> LogStats {
        LogStats {
            appended: self.appended.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
        }
    }
}

impl<T: Clone> BoundedRecordLog<T> {
    /// Copy of the last `min(n, len)` records, oldest first.
    pub fn get_recent(&self, n: usize) -> Vec<T> {
        let records = self.records.lock();
        let skip = records.len().saturating_sub(n);
        records.iter().skip(skip).cloned().collect()
    }

    /// Copy of every record, oldest first.
    ///
    /// This is the fixed sequence a replay session runs over; later appends
    /// do not affect it.
    pub fn snapshot(&self) -> Vec<T> {
        self.records.lock().iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_len_never_exceeds_capacity() {
        for capacity in [1, 3, 10] {
            for appends in 0..25 {
                let log = BoundedRecordLog::new(capacity);
                for i in 0..appends {
                    log.append(i);
                }
                assert_eq!(log.len(), appends.min(capacity));
            }
        }
    }

    #[test]
    fn test_eviction_keeps_most_recent_window() {
        let log = BoundedRecordLog::new(3);
        for i in 0..5 {
            log.append(i);
        }

        assert_eq!(log.snapshot(), vec![2, 3, 4]);
        assert_eq!(log.stats().evicted, 2);
        assert_eq!(log.stats().appended, 5);
    }

    #[test]
    fn test_paused_appends_are_dropped() {
        let log = BoundedRecordLog::new(10);
        log.append(1);
        log.pause();
        log.append(2);
        log.append(3);

        assert_eq!(log.len(), 1);
        assert_eq!(log.stats().dropped, 2);

        log.resume();
        log.append(4);
        assert_eq!(log.snapshot(), vec![1, 4]);
    }

    #[test]
    fn test_pause_resume_idempotent() {
        let log: BoundedRecordLog<u32> = BoundedRecordLog::new(4);
        log.pause();
        log.pause();
        assert!(!log.is_capturing());

        log.resume();
        log.resume();
        assert!(log.is_capturing());
    }

    #[test]
    fn test_get_recent() {
        let log = BoundedRecordLog::new(10);
        for i in 0..5 {
            log.append(i);
        }

        assert_eq!(log.get_recent(2), vec![3, 4]);
        assert_eq!(log.get_recent(0), Vec::<i32>::new());
        assert_eq!(log.get_recent(100), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_clear_keeps_capture_flag() {
        let log = BoundedRecordLog::new(10);
        log.append(1);
        log.pause();
        log.clear();

        assert!(log.is_empty());
        assert!(!log.is_capturing());
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let log = BoundedRecordLog::new(0);
        log.append(1);
        assert!(log.is_empty());
        assert_eq!(log.stats().evicted, 1);
    }

    #[test]
    fn test_concurrent_appends_stay_bounded() {
        let log = Arc::new(BoundedRecordLog::new(50));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let log = log.clone();
                thread::spawn(move || {
                    for i in 0..100 {
                        log.append(t * 1000 + i);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(log.len(), 50);
        assert_eq!(log.stats().appended, 400);
        assert_eq!(log.stats().evicted, 350);
    }
}
