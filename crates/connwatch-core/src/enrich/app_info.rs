// ── Application info cache ──

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

/// Resolved metadata for one executable path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    /// Display name, e.g. product name from the executable's metadata.
    pub name: String,
}

/// Executable path → display metadata, filled by an external resolver.
///
/// Lookups never block: an unresolved path falls back to the
/// executable stem so the view always has something to show.
pub struct AppInfoCache {
    apps: DashMap<String, Arc<AppInfo>>,
    /// Version counter, bumped whenever resolved entries change.
    changed: watch::Sender<u64>,
}

impl AppInfoCache {
    pub fn new() -> Self {
        let (changed, _) = watch::channel(0u64);
        Self {
            apps: DashMap::new(),
            changed,
        }
    }

    /// Resolved info for a path, if the resolver has filled it in.
    pub fn lookup(&self, path: &str) -> Option<Arc<AppInfo>> {
        self.apps.get(path).map(|r| Arc::clone(r.value()))
    }

    /// Display name for a path: the resolved name when present,
    /// otherwise the executable stem of the path itself.
    pub fn app_name(&self, path: &str) -> String {
        match self.lookup(path) {
            Some(info) if !info.name.is_empty() => info.name.clone(),
            _ => executable_stem(path).to_owned(),
        }
    }

    /// Record a resolved name for a path (resolver-side entry point).
    pub fn insert(&self, path: String, info: AppInfo) {
        self.apps.insert(path, Arc::new(info));
        self.changed.send_modify(|v| *v += 1);
    }

    /// Subscribe to cache-changed signals.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changed.subscribe()
    }
}

impl Default for AppInfoCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Final path component without its extension. Handles both separator
/// conventions, since logged paths come from the firewall host.
fn executable_stem(path: &str) -> &str {
    let name = path
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(path);
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_executable_stem() {
        let cache = AppInfoCache::new();
        assert_eq!(cache.app_name("/usr/bin/curl"), "curl");
        assert_eq!(
            cache.app_name(r"C:\Program Files\App\app.exe"),
            "app"
        );
        assert_eq!(cache.app_name(".hidden"), ".hidden");
    }

    #[test]
    fn resolved_name_wins_over_stem() {
        let cache = AppInfoCache::new();
        cache.insert(
            "/usr/bin/curl".into(),
            AppInfo {
                name: "cURL".into(),
            },
        );
        assert_eq!(cache.app_name("/usr/bin/curl"), "cURL");
    }

    #[test]
    fn insert_bumps_the_version() {
        let cache = AppInfoCache::new();
        let rx = cache.subscribe();
        assert_eq!(*rx.borrow(), 0);
        cache.insert("/bin/sh".into(), AppInfo { name: "sh".into() });
        assert_eq!(*rx.borrow(), 1);
    }
}
