// ── Windowed incremental view synchronization ──
//
// `ConnView` keeps a row-indexed projection consistent with the
// append-only connection log without re-reading the log when only its
// edges changed. It owns the id window and a single-row decode cache;
// every collaborator is constructor-injected and the host observes
// changes through an ordered event channel.

mod notify;
mod window;

use std::sync::Arc;

use chrono::DateTime;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::columns::{self, CellRole, CellValue, Column, Resolvers};
use crate::enrich::{AppInfoCache, HostInfoCache};
use crate::error::StoreError;
use crate::model::{ConnId, ConnReason, ConnRecord};
use crate::store::{ConnLog, RawConn};

use window::{IdWindow, RangeDelta};

pub use notify::ViewEvent;

/// Row-indexed projection over a [`ConnLog`].
///
/// Single-threaded-cooperative: `sync`, `row_at` and friends are meant
/// to be driven from one logical context (the UI event loop), in
/// response to discrete external signals. Events pushed during a call
/// are fully ordered before the call returns.
pub struct ConnView<S> {
    store: S,
    apps: Arc<AppInfoCache>,
    hosts: Arc<HostInfoCache>,
    window: IdWindow,
    /// Most recently decoded row, if any. Never holds a failed read.
    row_cache: Option<(usize, ConnRecord)>,
    events: mpsc::UnboundedSender<ViewEvent>,
    resolve_address: bool,
}

impl<S: ConnLog> ConnView<S> {
    /// Build a view over `store` with its enrichment collaborators.
    /// Returns the view and the receiver for its change events.
    pub fn new(
        store: S,
        apps: Arc<AppInfoCache>,
        hosts: Arc<HostInfoCache>,
    ) -> (Self, mpsc::UnboundedReceiver<ViewEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let view = Self {
            store,
            apps,
            hosts,
            window: IdWindow::empty(),
            row_cache: None,
            events,
            resolve_address: false,
        };
        (view, events_rx)
    }

    /// Number of rows currently in the window.
    pub fn row_count(&self) -> usize {
        self.window.row_count()
    }

    /// Whether endpoint addresses render as resolved host names.
    pub fn resolve_address(&self) -> bool {
        self.resolve_address
    }

    /// Toggle host-name resolution for endpoint columns. Row identity
    /// is unaffected, so cached rows stay valid; the host just needs to
    /// repaint.
    pub fn set_resolve_address(&mut self, resolve: bool) {
        if self.resolve_address != resolve {
            self.resolve_address = resolve;
            self.emit(ViewEvent::Redisplay);
        }
    }

    /// Identifier shown at `row`.
    ///
    /// # Panics
    /// A row index outside `[0, row_count())` is a caller bug —
    /// `row_count()` is always available first — and fails fast.
    pub fn map_row(&self, row: usize) -> ConnId {
        assert!(
            row < self.row_count(),
            "row {row} out of range 0..{}",
            self.row_count()
        );
        self.window.id_at(row)
    }

    /// Re-observe the log's id range and reconcile the window with it.
    ///
    /// Called whenever the log signals it may have changed. Emits
    /// nothing when the range is unchanged; otherwise emits either a
    /// single `Reset`, or `RowsRemoved` followed by `RowsInserted`,
    /// with the window (and `row_count()`) updated before each event
    /// is pushed. A range query failure leaves all state untouched so
    /// the next signal can retry.
    pub fn sync(&mut self) {
        let range = match self.store.id_range() {
            Ok(range) => range,
            Err(err) => {
                warn!(error = %err, "connection log range query failed");
                return;
            }
        };

        if range == self.window.range() {
            return;
        }

        // The log went away under us; resolved names are for
        // connections that no longer exist.
        if range.is_empty() {
            self.hosts.clear();
        }

        match self.window.diff(range) {
            RangeDelta::Unchanged => {}
            RangeDelta::Reset => {
                debug!(min = range.min, max = range.max, "window reset");
                self.window.reset_to(range);
                self.invalidate();
                self.emit(ViewEvent::Reset);
            }
            RangeDelta::Patch { removed, inserted } => {
                // Removal first: insertion-point arithmetic below uses
                // the already-trimmed window.
                if removed > 0 {
                    self.window.trim_front(removed);
                    self.invalidate();
                    self.emit(ViewEvent::RowsRemoved { count: removed });
                }
                if inserted > 0 {
                    let at = self.window.row_count();
                    self.window.grow_back(inserted);
                    self.invalidate();
                    self.emit(ViewEvent::RowsInserted { at, count: inserted });
                }
            }
        }
    }

    /// An enrichment cache changed underneath the view: cached rows may
    /// render differently, row identity is untouched.
    pub fn enrichment_changed(&mut self) {
        self.invalidate();
        self.emit(ViewEvent::Redisplay);
    }

    /// The record at `row`, or `None` when the store has no data for it
    /// (trimmed underneath the window, unreadable, undecodable). `None`
    /// means "render nothing for this row", never an error, and is not
    /// cached — the next access retries.
    ///
    /// # Panics
    /// Same contract as [`map_row`](Self::map_row).
    pub fn row_at(&mut self, row: usize) -> Option<&ConnRecord> {
        let hit = self
            .row_cache
            .as_ref()
            .is_some_and(|(cached, _)| *cached == row);
        if !hit {
            let record = self.load_row(row)?;
            self.row_cache = Some((row, record));
        }
        self.row_cache.as_ref().map(|(_, record)| record)
    }

    /// One projected cell, using the injected enrichment caches.
    pub fn cell(&mut self, row: usize, column: Column, role: CellRole) -> CellValue {
        let resolve = self.resolve_address;
        let apps = Arc::clone(&self.apps);
        let hosts = Arc::clone(&self.hosts);
        match self.row_at(row) {
            Some(record) => columns::project(
                record,
                column,
                &Resolvers {
                    apps: &apps,
                    hosts: &hosts,
                },
                resolve,
                role,
            ),
            None => CellValue::Empty,
        }
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn load_row(&self, row: usize) -> Option<ConnRecord> {
        let id = self.map_row(row);
        match self.store.fetch(id) {
            Ok(Some(raw)) => match decode(raw) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(id, error = %err, "undecodable connection record");
                    None
                }
            },
            Ok(None) => {
                debug!(id, "connection record trimmed under the view");
                None
            }
            Err(err) => {
                warn!(id, error = %err, "connection record query failed");
                None
            }
        }
    }

    fn invalidate(&mut self) {
        self.row_cache = None;
    }

    fn emit(&self, event: ViewEvent) {
        // A dropped receiver just means nobody is listening anymore.
        let _ = self.events.send(event);
    }
}

/// Decode one raw store row into an immutable record.
fn decode(raw: RawConn) -> Result<ConnRecord, StoreError> {
    let time = DateTime::from_timestamp(raw.conn_time, 0).ok_or_else(|| StoreError::Corrupt {
        id: raw.conn_id,
        reason: format!("timestamp {} out of range", raw.conn_time),
    })?;
    let (local, remote) = raw
        .endpoints
        .to_socket_addrs(raw.local_port, raw.remote_port);

    Ok(ConnRecord {
        id: raw.conn_id,
        app_id: raw.app_id,
        time,
        pid: raw.process_id,
        reason: ConnReason::from_raw(raw.reason),
        inherited: raw.inherited,
        blocked: raw.blocked,
        inbound: raw.inbound,
        proto: raw.ip_proto,
        local,
        remote,
        app_path: raw.app_path,
    })
}
