// ── Domain model ──

mod conn;

pub use conn::{ConnId, ConnReason, ConnRecord};
