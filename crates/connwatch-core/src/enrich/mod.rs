// ── Enrichment caches ──
//
// External, independently invalidated lookup tables consulted at
// projection time. Their contents are orthogonal to row identity: a
// cache refresh forces a redisplay but never touches the id window.

mod app_info;
mod host_info;

pub use app_info::{AppInfo, AppInfoCache};
pub use host_info::HostInfoCache;
