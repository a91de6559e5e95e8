// ── Address and protocol formatting ──

use std::net::SocketAddr;

use crate::enrich::HostInfoCache;

/// Name for an IANA protocol number, for the ones a firewall log
/// actually contains.
pub fn protocol_name(proto: u8) -> Option<&'static str> {
    let name = match proto {
        1 => "ICMP",
        2 => "IGMP",
        6 => "TCP",
        17 => "UDP",
        47 => "GRE",
        50 => "ESP",
        51 => "AH",
        58 => "ICMPv6",
        132 => "SCTP",
        136 => "UDP-Lite",
        _ => return None,
    };
    Some(name)
}

/// Protocol name, or the bare number when unrecognized.
pub fn protocol_label(proto: u8) -> String {
    protocol_name(proto).map_or_else(|| proto.to_string(), str::to_owned)
}

/// Render an endpoint as `host:port`.
///
/// With `resolve` set, the address is substituted by its cached host
/// name when one is known. IPv6 stays bracketed either way, so the
/// port separator never collides with the address text.
pub fn format_endpoint(addr: SocketAddr, resolve: bool, hosts: &HostInfoCache) -> String {
    let mut host = match resolve.then(|| hosts.host_name(&addr.ip())).flatten() {
        Some(name) => name,
        None => addr.ip().to_string(),
    };
    if addr.is_ipv6() {
        host = format!("[{host}]");
    }
    format!("{host}:{}", addr.port())
}
