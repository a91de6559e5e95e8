// ── Backing store abstraction ──
//
// Read-only query surface over an ordered log keyed by a monotonically
// increasing id. The view layer never sees how the log is persisted;
// it only observes committed state through `id_range` / `fetch`.

mod memory;

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::ConnId;

pub use memory::MemoryConnLog;

/// The currently valid id span of the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRange {
    pub min: ConnId,
    pub max: ConnId,
}

impl IdRange {
    /// The range of an empty log.
    pub const EMPTY: IdRange = IdRange { min: 0, max: 0 };

    /// Number of records in the range. `max == 0` means empty; `min` is
    /// unspecified in that case.
    #[allow(clippy::cast_possible_truncation)]
    pub fn len(self) -> usize {
        if self.max == 0 {
            0
        } else {
            (self.max - self.min + 1) as usize
        }
    }

    pub fn is_empty(self) -> bool {
        self.max == 0
    }
}

/// Raw local/remote addresses as the driver logged them, tagged v4/v6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawEndpoints {
    V4 { local: [u8; 4], remote: [u8; 4] },
    V6 { local: [u8; 16], remote: [u8; 16] },
}

impl RawEndpoints {
    /// Combine the tagged address bytes with the port columns.
    pub(crate) fn to_socket_addrs(self, local_port: u16, remote_port: u16) -> (SocketAddr, SocketAddr) {
        match self {
            Self::V4 { local, remote } => (
                SocketAddr::new(IpAddr::V4(Ipv4Addr::from(local)), local_port),
                SocketAddr::new(IpAddr::V4(Ipv4Addr::from(remote)), remote_port),
            ),
            Self::V6 { local, remote } => (
                SocketAddr::new(IpAddr::V6(Ipv6Addr::from(local)), local_port),
                SocketAddr::new(IpAddr::V6(Ipv6Addr::from(remote)), remote_port),
            ),
        }
    }
}

/// One undecoded row, shaped like the store's own record layout.
///
/// `app_path` is the result of the store-side app join; `None` means the
/// owning app entity is gone, which is displayable, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawConn {
    #[serde(default)]
    pub conn_id: ConnId,
    pub app_id: u64,
    /// Unix timestamp, seconds.
    pub conn_time: i64,
    pub process_id: u32,
    pub reason: u8,
    pub blocked: bool,
    pub inherited: bool,
    pub inbound: bool,
    pub ip_proto: u8,
    pub local_port: u16,
    pub remote_port: u16,
    pub endpoints: RawEndpoints,
    pub app_path: Option<String>,
}

/// Read-only accessor over the connection log.
pub trait ConnLog {
    /// Current valid id span. `max == 0` signals an empty log.
    fn id_range(&self) -> Result<IdRange, StoreError>;

    /// Point lookup by exact id. `Ok(None)` when the id has been trimmed
    /// or never existed.
    fn fetch(&self, id: ConnId) -> Result<Option<RawConn>, StoreError>;
}

impl<T: ConnLog + ?Sized> ConnLog for &T {
    fn id_range(&self) -> Result<IdRange, StoreError> {
        (**self).id_range()
    }

    fn fetch(&self, id: ConnId) -> Result<Option<RawConn>, StoreError> {
        (**self).fetch(id)
    }
}

impl<T: ConnLog + ?Sized> ConnLog for Arc<T> {
    fn id_range(&self) -> Result<IdRange, StoreError> {
        (**self).id_range()
    }

    fn fetch(&self, id: ConnId) -> Result<Option<RawConn>, StoreError> {
        (**self).fetch(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_range_has_no_rows() {
        assert_eq!(IdRange::EMPTY.len(), 0);
        assert!(IdRange::EMPTY.is_empty());
        // min is unspecified for an empty range; len must still be 0
        assert_eq!(IdRange { min: 7, max: 0 }.len(), 0);
    }

    #[test]
    fn range_len_is_inclusive() {
        assert_eq!(IdRange { min: 10, max: 15 }.len(), 6);
        assert_eq!(IdRange { min: 3, max: 3 }.len(), 1);
    }

    #[test]
    fn endpoints_tag_address_family() {
        let (local, remote) = RawEndpoints::V4 {
            local: [192, 168, 1, 2],
            remote: [1, 1, 1, 1],
        }
        .to_socket_addrs(55_000, 443);
        assert!(local.is_ipv4());
        assert_eq!(local.to_string(), "192.168.1.2:55000");
        assert_eq!(remote.to_string(), "1.1.1.1:443");

        let mut v6 = [0u8; 16];
        v6[15] = 1;
        let (local, _) = RawEndpoints::V6 {
            local: v6,
            remote: v6,
        }
        .to_socket_addrs(8080, 80);
        assert!(local.is_ipv6());
        assert_eq!(local.to_string(), "[::1]:8080");
    }
}
