//! Capture replay — feeds a recorded connection log back into the
//! in-memory store.
//!
//! A capture is a JSON-lines file. Each line is one of:
//!
//! ```text
//! {"conn": { ...raw record... }}       append a connection
//! {"host": {"ip": "...", "name": ".."}} resolver learned a host name
//! {"app": {"path": "...", "name": ".."}} resolver learned an app name
//! "clear"                               the log was cleared
//! ```
//!
//! Host/app lines drive the enrichment caches, so a replay exercises
//! the whole collaborator set, not just the log.

use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr};
use serde::Deserialize;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use connwatch_core::{AppInfo, AppInfoCache, HostInfoCache, MemoryConnLog, RawConn};

use crate::action::Action;

/// One parsed capture line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayLine {
    Conn(Box<RawConn>),
    Host { ip: IpAddr, name: String },
    App { path: String, name: String },
    Clear,
}

/// Load a capture file. Unparsable lines are skipped with a warning —
/// a truncated capture tail must not kill the viewer.
pub fn load(path: &Path) -> Result<Vec<ReplayLine>> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("cannot read capture {}", path.display()))?;

    let mut lines = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ReplayLine>(line) {
            Ok(parsed) => lines.push(parsed),
            Err(err) => {
                warn!(lineno = lineno + 1, error = %err, "skipping malformed capture line");
            }
        }
    }
    info!(lines = lines.len(), path = %path.display(), "capture loaded");
    Ok(lines)
}

/// Spawn the feeder task: applies one capture line per `interval` tick
/// until the capture is exhausted or the token is cancelled.
pub fn spawn_feeder(
    lines: Vec<ReplayLine>,
    interval: Duration,
    log: Arc<MemoryConnLog>,
    apps: Arc<AppInfoCache>,
    hosts: Arc<HostInfoCache>,
    action_tx: UnboundedSender<Action>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        for line in lines {
            tokio::select! {
                () = cancel.cancelled() => return,
                _ = ticker.tick() => {}
            }

            match line {
                ReplayLine::Conn(raw) => {
                    log.append(*raw);
                }
                ReplayLine::Host { ip, name } => {
                    hosts.insert(ip, name);
                }
                ReplayLine::App { path, name } => {
                    apps.insert(path, AppInfo { name });
                }
                ReplayLine::Clear => {
                    log.clear();
                }
            }
        }

        info!("capture replay finished");
        let _ = action_tx.send(Action::ReplayFinished);
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    use pretty_assertions::assert_eq;

    #[test]
    fn parses_every_line_kind() {
        let conn: ReplayLine = serde_json::from_str(
            r#"{"conn": {"app_id": 1, "conn_time": 1700000000, "process_id": 42,
                "reason": 8, "blocked": false, "inherited": false, "inbound": true,
                "ip_proto": 6, "local_port": 443, "remote_port": 50000,
                "endpoints": {"v4": {"local": [10,0,0,2], "remote": [1,1,1,1]}},
                "app_path": "/usr/sbin/nginx"}}"#,
        )
        .unwrap();
        assert!(matches!(conn, ReplayLine::Conn(_)));

        let host: ReplayLine =
            serde_json::from_str(r#"{"host": {"ip": "1.1.1.1", "name": "one.one.one.one"}}"#)
                .unwrap();
        assert_eq!(
            host,
            ReplayLine::Host {
                ip: "1.1.1.1".parse().unwrap(),
                name: "one.one.one.one".into()
            }
        );

        let app: ReplayLine =
            serde_json::from_str(r#"{"app": {"path": "/usr/bin/curl", "name": "cURL"}}"#).unwrap();
        assert!(matches!(app, ReplayLine::App { .. }));

        let clear: ReplayLine = serde_json::from_str(r#""clear""#).unwrap();
        assert_eq!(clear, ReplayLine::Clear);
    }

    #[test]
    fn load_skips_malformed_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#""clear""#).unwrap();
        writeln!(file, "this is not json").unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"host": {{"ip": "::1", "name": "router.lan"}}}}"#).unwrap();

        let lines = load(file.path()).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], ReplayLine::Clear);
        assert!(matches!(lines[1], ReplayLine::Host { .. }));
    }
}
