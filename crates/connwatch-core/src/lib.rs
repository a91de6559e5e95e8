//! Windowed incremental view synchronization over a firewall
//! connection log.
//!
//! The log is append-only at the back and trimmed only at the front
//! (retention), keyed by a monotonically increasing id. This crate
//! keeps a row-indexed, UI-facing projection consistent with that log
//! without ever re-reading it when only its edges changed:
//!
//! - **[`ConnView`]** — the synchronizer. Owns the current `[idMin,
//!   idMax]` window and a single-row decode cache; classifies each
//!   observed range change as an incremental patch (front removal +
//!   back insertion) or a full reset, and emits ordered [`ViewEvent`]s
//!   the host applies to its own row bookkeeping.
//! - **[`ConnLog`]** — read-only accessor trait over the backing log
//!   (`id_range` / `fetch`), with [`MemoryConnLog`] as the bundled
//!   capacity-bounded reference implementation.
//! - **[`columns`]** — a fixed table of pure projection functions
//!   turning a [`ConnRecord`] into per-column label/tooltip/icon cell
//!   values.
//! - **[`enrich`]** — externally filled lookup caches (app path →
//!   display name, address → host name) consulted at projection time
//!   only, so their refresh never disturbs row identity.

pub mod columns;
pub mod enrich;
pub mod error;
pub mod model;
pub mod net;
pub mod store;
pub mod view;

pub use columns::{CellRole, CellValue, Column, IconKey};
pub use enrich::{AppInfo, AppInfoCache, HostInfoCache};
pub use error::StoreError;
pub use model::{ConnId, ConnReason, ConnRecord};
pub use store::{ConnLog, IdRange, MemoryConnLog, RawConn, RawEndpoints};
pub use view::{ConnView, ViewEvent};
