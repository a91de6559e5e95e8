// ── Id window and range diffing ──
//
// The log is append-only at the back and trimmed only at the front, so
// between two observations exactly four outcomes are possible: no
// change, growth/trim reachable by a patch, or a range the old window
// cannot explain (clear, regression, gap) — which always resets.

use crate::model::ConnId;
use crate::store::IdRange;

/// Classification of a newly observed range against the held window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RangeDelta {
    Unchanged,
    /// Incremental reasoning cannot be proven safe; reload everything.
    Reset,
    /// Front rows trimmed and/or back rows appended.
    Patch { removed: usize, inserted: usize },
}

/// The currently tracked `[min, max]` identifier range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IdWindow {
    range: IdRange,
}

impl IdWindow {
    pub(crate) fn empty() -> Self {
        Self {
            range: IdRange::EMPTY,
        }
    }

    pub(crate) fn range(self) -> IdRange {
        self.range
    }

    pub(crate) fn row_count(self) -> usize {
        self.range.len()
    }

    /// Map a row index to its identifier. The caller must already have
    /// range-checked the index against `row_count`.
    pub(crate) fn id_at(self, row: usize) -> ConnId {
        self.range.min + row as u64
    }

    /// Classify `new` against the held range without reading any rows.
    ///
    /// An empty old window always resets: there is no incremental
    /// baseline to patch against, even when the new range looks like a
    /// plain superset.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn diff(self, new: IdRange) -> RangeDelta {
        let old = self.range;
        if new == old {
            return RangeDelta::Unchanged;
        }

        let min_out = new.min < old.min || new.min >= old.max;
        let max_out = new.max < old.max || old.max == 0;
        if min_out || max_out {
            return RangeDelta::Reset;
        }

        RangeDelta::Patch {
            removed: (new.min - old.min) as usize,
            inserted: (new.max - old.max) as usize,
        }
    }

    /// Replace the window outright (reset path).
    pub(crate) fn reset_to(&mut self, range: IdRange) {
        self.range = range;
    }

    /// Advance the lower bound after a front trim.
    pub(crate) fn trim_front(&mut self, removed: usize) {
        self.range.min += removed as u64;
    }

    /// Advance the upper bound after a back append.
    pub(crate) fn grow_back(&mut self, inserted: usize) {
        self.range.max += inserted as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(min: ConnId, max: ConnId) -> IdWindow {
        IdWindow {
            range: IdRange { min, max },
        }
    }

    #[test]
    fn identical_range_is_unchanged() {
        let w = window(10, 15);
        assert_eq!(w.diff(IdRange { min: 10, max: 15 }), RangeDelta::Unchanged);
    }

    #[test]
    fn front_trim_patches() {
        let w = window(10, 15);
        assert_eq!(
            w.diff(IdRange { min: 12, max: 15 }),
            RangeDelta::Patch {
                removed: 2,
                inserted: 0
            }
        );
    }

    #[test]
    fn back_growth_patches() {
        let w = window(10, 15);
        assert_eq!(
            w.diff(IdRange { min: 10, max: 18 }),
            RangeDelta::Patch {
                removed: 0,
                inserted: 3
            }
        );
    }

    #[test]
    fn simultaneous_trim_and_growth_patch_together() {
        let w = window(10, 15);
        assert_eq!(
            w.diff(IdRange { min: 11, max: 20 }),
            RangeDelta::Patch {
                removed: 1,
                inserted: 5
            }
        );
    }

    #[test]
    fn min_regression_resets() {
        // The log never hands out an id twice; a lower min means the
        // store was rebuilt underneath us.
        let w = window(10, 15);
        assert_eq!(w.diff(IdRange { min: 8, max: 15 }), RangeDelta::Reset);
    }

    #[test]
    fn min_past_the_old_window_resets() {
        // Bulk purge: nothing previously visible survived.
        let w = window(10, 15);
        assert_eq!(w.diff(IdRange { min: 20, max: 25 }), RangeDelta::Reset);
        // Boundary: new min landing exactly on the old max is also out.
        assert_eq!(w.diff(IdRange { min: 15, max: 25 }), RangeDelta::Reset);
    }

    #[test]
    fn max_shrink_resets() {
        let w = window(10, 15);
        assert_eq!(w.diff(IdRange { min: 10, max: 14 }), RangeDelta::Reset);
        assert_eq!(w.diff(IdRange::EMPTY), RangeDelta::Reset);
    }

    #[test]
    fn empty_baseline_always_resets() {
        // Deliberate conservatism: with no incremental baseline, even a
        // trivially insertable range goes through a reset.
        let w = IdWindow::empty();
        assert_eq!(w.diff(IdRange { min: 5, max: 5 }), RangeDelta::Reset);
        assert_eq!(w.diff(IdRange { min: 1, max: 3 }), RangeDelta::Reset);
    }

    #[test]
    fn row_count_and_id_mapping_track_the_range() {
        let w = window(10, 15);
        assert_eq!(w.row_count(), 6);
        assert_eq!(w.id_at(0), 10);
        assert_eq!(w.id_at(5), 15);
        assert_eq!(IdWindow::empty().row_count(), 0);
    }

    #[test]
    fn patch_application_keeps_arithmetic_consistent() {
        let mut w = window(10, 15);
        w.trim_front(2);
        assert_eq!(w.range(), IdRange { min: 12, max: 15 });
        assert_eq!(w.row_count(), 4);
        w.grow_back(3);
        assert_eq!(w.range(), IdRange { min: 12, max: 18 });
        assert_eq!(w.row_count(), 7);
    }
}
