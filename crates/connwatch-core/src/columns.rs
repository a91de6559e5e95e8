// ── Column projections ──
//
// A fixed table of pure functions mapping a decoded record to one cell
// value per (column, role). The functions are stateless apart from
// reads through the enrichment caches, and total over every record the
// decode pipeline can produce — a missing app path renders empty, it
// never panics. Icon values are semantic keys; mapping them to glyphs
// or image assets is the host's business.

use chrono::{DateTime, Utc};

use crate::enrich::{AppInfoCache, HostInfoCache};
use crate::model::{ConnRecord, ConnReason};
use crate::net::{format_endpoint, protocol_label};

/// Displayable columns, oldest-first table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Program,
    ProcessId,
    Protocol,
    LocalEndpoint,
    RemoteEndpoint,
    Direction,
    Action,
    Reason,
    Time,
}

/// Presentation a cell value is being produced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRole {
    Label,
    Tooltip,
    Icon,
}

/// Semantic icon identity. Asset resolution happens host-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconKey {
    Application,
    Inbound,
    Outbound,
    Allowed,
    Blocked,
    Reason(ConnReason),
    Help,
}

/// One projected cell value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    /// Nothing to show for this (column, role).
    Empty,
    Text(String),
    Integer(u64),
    Time(DateTime<Utc>),
    Icon(IconKey),
}

/// Enrichment caches the projections read through.
pub struct Resolvers<'a> {
    pub apps: &'a AppInfoCache,
    pub hosts: &'a HostInfoCache,
}

impl Column {
    pub const ALL: [Column; 9] = [
        Column::Program,
        Column::ProcessId,
        Column::Protocol,
        Column::LocalEndpoint,
        Column::RemoteEndpoint,
        Column::Direction,
        Column::Action,
        Column::Reason,
        Column::Time,
    ];

    /// Header label. The icon-only columns have none.
    pub fn title(self) -> Option<&'static str> {
        match self {
            Self::Program => Some("Program"),
            Self::ProcessId => Some("Proc. ID"),
            Self::Protocol => Some("Protocol"),
            Self::LocalEndpoint => Some("Local IP and Port"),
            Self::RemoteEndpoint => Some("Remote IP and Port"),
            Self::Direction | Self::Action | Self::Reason => None,
            Self::Time => Some("Time"),
        }
    }

    /// Header tooltip; present for every column.
    pub fn tooltip(self) -> &'static str {
        match self {
            Self::Program => "Program",
            Self::ProcessId => "Process ID",
            Self::Protocol => "Protocol",
            Self::LocalEndpoint => "Local IP and Port",
            Self::RemoteEndpoint => "Remote IP and Port",
            Self::Direction => "Direction",
            Self::Action => "Action",
            Self::Reason => "Reason",
            Self::Time => "Time",
        }
    }

    /// Header icon for the icon-only columns.
    pub fn header_icon(self) -> Option<IconKey> {
        match self {
            Self::Direction => Some(IconKey::Inbound),
            Self::Action => Some(IconKey::Allowed),
            Self::Reason => Some(IconKey::Help),
            _ => None,
        }
    }

    #[allow(clippy::as_conversions)]
    const fn index(self) -> usize {
        self as usize
    }
}

type CellFn = fn(&ConnRecord, &Resolvers<'_>, bool, CellRole) -> CellValue;

static CELL_FNS: [CellFn; 9] = [
    program_cell,
    process_id_cell,
    protocol_cell,
    local_endpoint_cell,
    remote_endpoint_cell,
    direction_cell,
    action_cell,
    reason_cell,
    time_cell,
];

/// Project one cell of one record.
pub fn project(
    record: &ConnRecord,
    column: Column,
    resolvers: &Resolvers<'_>,
    resolve_address: bool,
    role: CellRole,
) -> CellValue {
    CELL_FNS[column.index()](record, resolvers, resolve_address, role)
}

fn program_cell(
    record: &ConnRecord,
    resolvers: &Resolvers<'_>,
    _resolve: bool,
    role: CellRole,
) -> CellValue {
    match role {
        CellRole::Icon => CellValue::Icon(IconKey::Application),
        CellRole::Label | CellRole::Tooltip => match record.app_path.as_deref() {
            Some(path) => CellValue::Text(resolvers.apps.app_name(path)),
            None => CellValue::Empty,
        },
    }
}

fn process_id_cell(
    record: &ConnRecord,
    _resolvers: &Resolvers<'_>,
    _resolve: bool,
    role: CellRole,
) -> CellValue {
    match role {
        CellRole::Icon => CellValue::Empty,
        CellRole::Label | CellRole::Tooltip => CellValue::Integer(u64::from(record.pid)),
    }
}

fn protocol_cell(
    record: &ConnRecord,
    _resolvers: &Resolvers<'_>,
    _resolve: bool,
    role: CellRole,
) -> CellValue {
    match role {
        CellRole::Icon => CellValue::Empty,
        CellRole::Label | CellRole::Tooltip => CellValue::Text(protocol_label(record.proto)),
    }
}

fn local_endpoint_cell(
    record: &ConnRecord,
    resolvers: &Resolvers<'_>,
    resolve: bool,
    role: CellRole,
) -> CellValue {
    match role {
        CellRole::Icon => CellValue::Empty,
        CellRole::Label | CellRole::Tooltip => {
            CellValue::Text(format_endpoint(record.local, resolve, resolvers.hosts))
        }
    }
}

fn remote_endpoint_cell(
    record: &ConnRecord,
    resolvers: &Resolvers<'_>,
    resolve: bool,
    role: CellRole,
) -> CellValue {
    match role {
        CellRole::Icon => CellValue::Empty,
        CellRole::Label | CellRole::Tooltip => {
            CellValue::Text(format_endpoint(record.remote, resolve, resolvers.hosts))
        }
    }
}

fn direction_cell(
    record: &ConnRecord,
    _resolvers: &Resolvers<'_>,
    _resolve: bool,
    role: CellRole,
) -> CellValue {
    match role {
        CellRole::Label => CellValue::Empty,
        CellRole::Tooltip => CellValue::Text(if record.inbound { "In" } else { "Out" }.into()),
        CellRole::Icon => CellValue::Icon(if record.inbound {
            IconKey::Inbound
        } else {
            IconKey::Outbound
        }),
    }
}

fn action_cell(
    record: &ConnRecord,
    _resolvers: &Resolvers<'_>,
    _resolve: bool,
    role: CellRole,
) -> CellValue {
    match role {
        CellRole::Label => CellValue::Empty,
        CellRole::Tooltip => {
            CellValue::Text(if record.blocked { "Blocked" } else { "Allowed" }.into())
        }
        CellRole::Icon => CellValue::Icon(if record.blocked {
            IconKey::Blocked
        } else {
            IconKey::Allowed
        }),
    }
}

fn reason_cell(
    record: &ConnRecord,
    _resolvers: &Resolvers<'_>,
    _resolve: bool,
    role: CellRole,
) -> CellValue {
    match role {
        CellRole::Label => CellValue::Empty,
        CellRole::Tooltip => {
            let mut text = record.reason.label().to_owned();
            if record.inherited {
                text.push_str(" (Inherited)");
            }
            CellValue::Text(text)
        }
        CellRole::Icon => CellValue::Icon(IconKey::Reason(record.reason)),
    }
}

fn time_cell(
    record: &ConnRecord,
    _resolvers: &Resolvers<'_>,
    _resolve: bool,
    role: CellRole,
) -> CellValue {
    match role {
        CellRole::Icon => CellValue::Empty,
        CellRole::Label | CellRole::Tooltip => CellValue::Time(record.time),
    }
}
