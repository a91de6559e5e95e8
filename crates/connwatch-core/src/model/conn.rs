// ── Decoded connection record and its closed vocabularies ──

use std::net::SocketAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Log sequence number of a connection record.
///
/// Strictly increasing and never reused, even across a log clear.
/// `0` is never a valid id — an id range with `max == 0` means "empty".
pub type ConnId = u64;

/// Why the filtering engine allowed or blocked a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ConnReason {
    InternetAddress,
    OldConnection,
    ProgramAction,
    AppGroup,
    FilterMode,
    LanOnly,
    Zone,
    Rule,
    GlobalRuleBefore,
    GlobalRuleAfter,
    AskLimit,
    /// A code this build does not know; the raw value is preserved.
    Unknown(u8),
}

impl ConnReason {
    /// Decode the raw driver code. Codes start at 1; anything outside
    /// the known span is preserved as [`ConnReason::Unknown`].
    pub fn from_raw(code: u8) -> Self {
        match code {
            1 => Self::InternetAddress,
            2 => Self::OldConnection,
            3 => Self::ProgramAction,
            4 => Self::AppGroup,
            5 => Self::FilterMode,
            6 => Self::LanOnly,
            7 => Self::Zone,
            8 => Self::Rule,
            9 => Self::GlobalRuleBefore,
            10 => Self::GlobalRuleAfter,
            11 => Self::AskLimit,
            other => Self::Unknown(other),
        }
    }

    /// Human-readable reason text shown in tooltips.
    pub fn label(self) -> &'static str {
        match self {
            Self::InternetAddress => "Internet address",
            Self::OldConnection => "Old connection",
            Self::ProgramAction => "Program's action",
            Self::AppGroup => "App. Group",
            Self::FilterMode => "Filter Mode",
            Self::LanOnly => "LAN only",
            Self::Zone => "Zone",
            Self::Rule => "Rule",
            Self::GlobalRuleBefore => "Global Rule before App Rules",
            Self::GlobalRuleAfter => "Global Rule after App Rules",
            Self::AskLimit => "Limit of Ask to Connect",
            Self::Unknown(_) => "Unknown",
        }
    }
}

/// One decoded row of the connection log. Immutable after decode.
///
/// Enrichment values (hostnames, app display names) are never stored
/// here — they are looked up through the enrichment caches at
/// projection time, so a cache refresh does not invalidate records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnRecord {
    pub id: ConnId,
    /// Foreign key into the store's application table.
    pub app_id: u64,
    pub time: DateTime<Utc>,
    pub pid: u32,
    pub reason: ConnReason,
    pub inherited: bool,
    pub blocked: bool,
    pub inbound: bool,
    /// IANA protocol number (6 = TCP, 17 = UDP, ...).
    pub proto: u8,
    pub local: SocketAddr,
    pub remote: SocketAddr,
    /// Executable path of the owning program. `None` when the app
    /// entity is missing from the store (referential inconsistency) —
    /// the record is still displayable.
    pub app_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_roundtrips_known_codes() {
        assert_eq!(ConnReason::from_raw(1), ConnReason::InternetAddress);
        assert_eq!(ConnReason::from_raw(8), ConnReason::Rule);
        assert_eq!(ConnReason::from_raw(11), ConnReason::AskLimit);
    }

    #[test]
    fn reason_preserves_unknown_codes() {
        assert_eq!(ConnReason::from_raw(0), ConnReason::Unknown(0));
        assert_eq!(ConnReason::from_raw(42), ConnReason::Unknown(42));
        assert_eq!(ConnReason::Unknown(42).label(), "Unknown");
    }

    #[test]
    fn reason_labels_are_nonempty() {
        for code in 1..=11 {
            assert!(!ConnReason::from_raw(code).label().is_empty());
        }
    }
}
