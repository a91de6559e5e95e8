// ── In-memory reference log ──
//
// Append-only, capacity-bounded connection log. The producer side
// (append / clear) serializes through a mutex; the consumer side only
// ever observes committed state via the `ConnLog` trait. Every mutation
// bumps a version counter broadcast over a `watch` channel, which is
// the "log changed" signal consumers subscribe to.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use super::{ConnLog, IdRange, RawConn};
use crate::error::StoreError;
use crate::model::ConnId;

const DEFAULT_CAPACITY: usize = 10_000;

struct Inner {
    /// Records ordered by id; `front` holds the oldest.
    rows: VecDeque<RawConn>,
    /// Next id to assign. Monotonic across `clear()` — ids are never reused.
    next_id: ConnId,
}

/// Capacity-bounded in-memory connection log.
pub struct MemoryConnLog {
    inner: Mutex<Inner>,
    capacity: usize,
    /// Version counter, bumped on every mutation.
    changed: watch::Sender<u64>,
}

impl MemoryConnLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// `capacity` is the retention bound: appending beyond it trims the
    /// oldest records from the front.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "log capacity must be non-zero");
        let (changed, _) = watch::channel(0u64);

        Self {
            inner: Mutex::new(Inner {
                rows: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
                next_id: 1,
            }),
            capacity,
            changed,
        }
    }

    /// Append a record, assigning it the next id (any id on `entry` is
    /// overwritten). Returns the assigned id.
    pub fn append(&self, mut entry: RawConn) -> ConnId {
        let id = {
            let mut inner = self.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            entry.conn_id = id;
            inner.rows.push_back(entry);
            while inner.rows.len() > self.capacity {
                inner.rows.pop_front();
            }
            id
        };
        self.bump_version();
        id
    }

    /// Drop all records. Ids keep increasing from where they left off.
    pub fn clear(&self) {
        {
            let mut inner = self.lock();
            if inner.rows.is_empty() {
                return;
            }
            inner.rows.clear();
        }
        self.bump_version();
    }

    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().rows.is_empty()
    }

    /// Subscribe to mutation signals. The value is an opaque version;
    /// only its changes matter.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changed.subscribe()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// A poisoned mutex only means a producer panicked mid-append; the
    /// row deque itself is always left structurally valid, so recover.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bump_version(&self) {
        self.changed.send_modify(|v| *v += 1);
    }
}

impl Default for MemoryConnLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnLog for MemoryConnLog {
    fn id_range(&self) -> Result<IdRange, StoreError> {
        let inner = self.lock();
        let range = match (inner.rows.front(), inner.rows.back()) {
            (Some(front), Some(back)) => IdRange {
                min: front.conn_id,
                max: back.conn_id,
            },
            _ => IdRange::EMPTY,
        };
        Ok(range)
    }

    fn fetch(&self, id: ConnId) -> Result<Option<RawConn>, StoreError> {
        let inner = self.lock();
        let Some(front) = inner.rows.front() else {
            return Ok(None);
        };
        if id < front.conn_id {
            return Ok(None);
        }
        #[allow(clippy::cast_possible_truncation)]
        let offset = (id - front.conn_id) as usize;
        Ok(inner.rows.get(offset).cloned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::RawEndpoints;

    fn entry(port: u16) -> RawConn {
        RawConn {
            conn_id: 0,
            app_id: 1,
            conn_time: 1_700_000_000,
            process_id: 4321,
            reason: 8,
            blocked: false,
            inherited: false,
            inbound: false,
            ip_proto: 6,
            local_port: port,
            remote_port: 443,
            endpoints: RawEndpoints::V4 {
                local: [10, 0, 0, 2],
                remote: [93, 184, 216, 34],
            },
            app_path: Some("/usr/bin/curl".into()),
        }
    }

    #[test]
    fn ids_start_at_one_and_increase() {
        let log = MemoryConnLog::new();
        assert_eq!(log.append(entry(1)), 1);
        assert_eq!(log.append(entry(2)), 2);
        assert_eq!(log.id_range().unwrap(), IdRange { min: 1, max: 2 });
    }

    #[test]
    fn empty_log_reports_empty_range() {
        let log = MemoryConnLog::new();
        assert_eq!(log.id_range().unwrap(), IdRange::EMPTY);
        assert!(log.fetch(1).unwrap().is_none());
    }

    #[test]
    fn capacity_trims_the_front() {
        let log = MemoryConnLog::with_capacity(3);
        for port in 1..=5 {
            log.append(entry(port));
        }
        assert_eq!(log.id_range().unwrap(), IdRange { min: 3, max: 5 });
        assert!(log.fetch(2).unwrap().is_none());
        assert_eq!(log.fetch(3).unwrap().unwrap().local_port, 3);
    }

    #[test]
    fn fetch_returns_the_exact_record() {
        let log = MemoryConnLog::new();
        log.append(entry(7));
        log.append(entry(8));
        let raw = log.fetch(2).unwrap().unwrap();
        assert_eq!(raw.conn_id, 2);
        assert_eq!(raw.local_port, 8);
        assert!(log.fetch(99).unwrap().is_none());
    }

    #[test]
    fn clear_keeps_ids_monotonic() {
        let log = MemoryConnLog::new();
        log.append(entry(1));
        log.append(entry(2));
        log.clear();
        assert_eq!(log.id_range().unwrap(), IdRange::EMPTY);
        // Ids are never reused after a clear.
        assert_eq!(log.append(entry(3)), 3);
        assert_eq!(log.id_range().unwrap(), IdRange { min: 3, max: 3 });
    }

    #[test]
    fn mutations_bump_the_version() {
        let log = MemoryConnLog::new();
        let rx = log.subscribe();
        assert_eq!(*rx.borrow(), 0);
        log.append(entry(1));
        assert_eq!(*rx.borrow(), 1);
        log.clear();
        assert_eq!(*rx.borrow(), 2);
        // Clearing an already-empty log is not a change.
        log.clear();
        assert_eq!(*rx.borrow(), 2);
    }
}
