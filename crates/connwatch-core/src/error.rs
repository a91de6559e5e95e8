// ── Store-boundary error types ──
//
// The only errors that cross the backing-store boundary. The view layer
// absorbs every one of them: a failed read becomes "no data for this
// row", never a crash, and the window/row-cache state is left untouched
// so the next access can retry against a recovered store.

use thiserror::Error;

use crate::model::ConnId;

/// Failure reported by a [`ConnLog`](crate::store::ConnLog) implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The log cannot be queried at all (I/O failure, lost handle, ...).
    #[error("connection log unavailable: {reason}")]
    Unavailable { reason: String },

    /// The store returned a record that cannot be decoded.
    #[error("malformed connection record {id}: {reason}")]
    Corrupt { id: ConnId, reason: String },
}
