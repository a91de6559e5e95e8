// ── View change notifications ──

/// Change notification emitted by [`ConnView`](super::ConnView).
///
/// Events are pushed in the exact order they are computed; a patch is
/// always `RowsRemoved` before `RowsInserted`, so host row bookkeeping
/// never observes an inconsistent intermediate window. `row_count()`
/// already reflects an event by the time the host receives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    /// The whole projection is stale; reload from scratch.
    Reset,
    /// `count` rows disappeared from the front (start row is always 0).
    RowsRemoved { count: usize },
    /// `count` rows appeared at row index `at`.
    RowsInserted { at: usize, count: usize },
    /// Row identity is untouched but rendered values may differ
    /// (enrichment cache refresh, resolve-mode toggle).
    Redisplay,
}
