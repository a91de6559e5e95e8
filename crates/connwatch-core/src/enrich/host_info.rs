// ── Host name cache ──

use std::net::IpAddr;

use dashmap::DashMap;
use tokio::sync::watch;

/// IP address → resolved host name, filled by an external resolver.
pub struct HostInfoCache {
    hosts: DashMap<IpAddr, String>,
    changed: watch::Sender<u64>,
}

impl HostInfoCache {
    pub fn new() -> Self {
        let (changed, _) = watch::channel(0u64);
        Self {
            hosts: DashMap::new(),
            changed,
        }
    }

    /// Resolved name for an address, if known. An empty cached name is
    /// treated as unknown.
    pub fn host_name(&self, addr: &IpAddr) -> Option<String> {
        self.hosts
            .get(addr)
            .filter(|name| !name.value().is_empty())
            .map(|name| name.value().clone())
    }

    /// Record a resolved name (resolver-side entry point).
    pub fn insert(&self, addr: IpAddr, name: String) {
        self.hosts.insert(addr, name);
        self.changed.send_modify(|v| *v += 1);
    }

    /// Drop every entry. Called when the log itself is emptied — stale
    /// names must not outlive the connections they were resolved for.
    pub fn clear(&self) {
        if self.hosts.is_empty() {
            return;
        }
        self.hosts.clear();
        self.changed.send_modify(|v| *v += 1);
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Subscribe to cache-changed signals.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changed.subscribe()
    }
}

impl Default for HostInfoCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn addr() -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34))
    }

    #[test]
    fn lookup_misses_then_hits() {
        let cache = HostInfoCache::new();
        assert_eq!(cache.host_name(&addr()), None);
        cache.insert(addr(), "example.org".into());
        assert_eq!(cache.host_name(&addr()).unwrap(), "example.org");
    }

    #[test]
    fn empty_names_read_as_unknown() {
        let cache = HostInfoCache::new();
        cache.insert(addr(), String::new());
        assert_eq!(cache.host_name(&addr()), None);
    }

    #[test]
    fn clear_drops_entries_and_signals_once() {
        let cache = HostInfoCache::new();
        let rx = cache.subscribe();
        cache.insert(addr(), "example.org".into());
        assert_eq!(*rx.borrow(), 1);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(*rx.borrow(), 2);
        // Clearing an empty cache is not a change.
        cache.clear();
        assert_eq!(*rx.borrow(), 2);
    }
}
