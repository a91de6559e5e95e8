// End-to-end engine behavior over the bundled in-memory log: the view
// only ever talks to the log through `ConnLog`, the host only ever
// learns about changes through the event channel.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use tokio::sync::mpsc::UnboundedReceiver;

use connwatch_core::{
    AppInfoCache, CellRole, CellValue, Column, ConnView, HostInfoCache, MemoryConnLog, RawConn,
    RawEndpoints, ViewEvent,
};

fn entry(remote_port: u16) -> RawConn {
    RawConn {
        conn_id: 0,
        app_id: 7,
        conn_time: 1_700_000_000,
        process_id: 1234,
        reason: 8,
        blocked: false,
        inherited: false,
        inbound: false,
        ip_proto: 6,
        local_port: 50_000,
        remote_port,
        endpoints: RawEndpoints::V4 {
            local: [10, 0, 0, 2],
            remote: [203, 0, 113, 9],
        },
        app_path: Some("/usr/bin/ssh".into()),
    }
}

fn drain(rx: &mut UnboundedReceiver<ViewEvent>) -> Vec<ViewEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn setup(capacity: usize) -> (
    Arc<MemoryConnLog>,
    ConnView<Arc<MemoryConnLog>>,
    UnboundedReceiver<ViewEvent>,
) {
    let log = Arc::new(MemoryConnLog::with_capacity(capacity));
    let (view, rx) = ConnView::new(
        Arc::clone(&log),
        Arc::new(AppInfoCache::new()),
        Arc::new(HostInfoCache::new()),
    );
    (log, view, rx)
}

#[test]
fn growth_after_baseline_is_incremental() {
    let (log, mut view, mut rx) = setup(100);

    log.append(entry(1));
    view.sync();
    assert_eq!(drain(&mut rx), vec![ViewEvent::Reset]);
    assert_eq!(view.row_count(), 1);

    log.append(entry(2));
    log.append(entry(3));
    view.sync();
    assert_eq!(
        drain(&mut rx),
        vec![ViewEvent::RowsInserted { at: 1, count: 2 }]
    );
    assert_eq!(view.row_count(), 3);
}

#[test]
fn retention_trimming_patches_the_front() {
    let (log, mut view, mut rx) = setup(3);

    for port in 1..=3 {
        log.append(entry(port));
    }
    view.sync();
    assert_eq!(drain(&mut rx), vec![ViewEvent::Reset]);

    // One more append pushes the oldest row out of retention.
    log.append(entry(4));
    view.sync();
    assert_eq!(
        drain(&mut rx),
        vec![
            ViewEvent::RowsRemoved { count: 1 },
            ViewEvent::RowsInserted { at: 2, count: 1 },
        ]
    );
    assert_eq!(view.row_count(), 3);

    // Row 0 is now the oldest surviving record.
    assert_eq!(view.row_at(0).map(|r| r.remote.port()), Some(2));

    // A burst large enough that nothing previously visible survives
    // cannot be expressed as a patch.
    for port in 5..=9 {
        log.append(entry(port));
    }
    view.sync();
    assert_eq!(drain(&mut rx), vec![ViewEvent::Reset]);
    assert_eq!(view.row_count(), 3);
}

#[test]
fn clearing_the_log_resets_to_empty() {
    let (log, mut view, mut rx) = setup(100);

    log.append(entry(1));
    log.append(entry(2));
    view.sync();
    assert_eq!(drain(&mut rx), vec![ViewEvent::Reset]);

    log.clear();
    view.sync();
    assert_eq!(drain(&mut rx), vec![ViewEvent::Reset]);
    assert_eq!(view.row_count(), 0);

    // Ids continue past the clear, so repopulation is another reset,
    // never a bogus patch.
    log.append(entry(3));
    view.sync();
    assert_eq!(drain(&mut rx), vec![ViewEvent::Reset]);
    assert_eq!(view.row_count(), 1);
    assert_eq!(view.map_row(0), 3);
}

#[test]
fn event_deltas_conserve_the_row_count() {
    let (log, mut view, mut rx) = setup(5);

    let mut tracked: i64 = 0;
    let mut step = |log: &MemoryConnLog, view: &mut ConnView<Arc<MemoryConnLog>>,
                    rx: &mut UnboundedReceiver<ViewEvent>,
                    appends: usize| {
        for _ in 0..appends {
            log.append(entry(0));
        }
        view.sync();
        for event in drain(rx) {
            match event {
                ViewEvent::Reset => tracked = i64::try_from(view.row_count()).unwrap_or(0),
                ViewEvent::RowsRemoved { count } => tracked -= i64::try_from(count).unwrap_or(0),
                ViewEvent::RowsInserted { count, .. } => {
                    tracked += i64::try_from(count).unwrap_or(0);
                }
                ViewEvent::Redisplay => {}
            }
        }
        assert_eq!(tracked, i64::try_from(view.row_count()).unwrap_or(-1));
    };

    step(&log, &mut view, &mut rx, 2); // baseline reset
    step(&log, &mut view, &mut rx, 1); // pure growth
    step(&log, &mut view, &mut rx, 2); // growth up to capacity
    step(&log, &mut view, &mut rx, 1); // growth + retention trim
    step(&log, &mut view, &mut rx, 0); // no change
    step(&log, &mut view, &mut rx, 7); // everything visible replaced
}

#[test]
fn cells_render_through_the_enrichment_caches() {
    let log = Arc::new(MemoryConnLog::new());
    let apps = Arc::new(AppInfoCache::new());
    let hosts = Arc::new(HostInfoCache::new());
    let (mut view, mut rx) = ConnView::new(Arc::clone(&log), Arc::clone(&apps), Arc::clone(&hosts));

    log.append(entry(443));
    view.sync();
    assert_eq!(drain(&mut rx), vec![ViewEvent::Reset]);

    assert_eq!(
        view.cell(0, Column::Program, CellRole::Label),
        CellValue::Text("ssh".into())
    );
    assert_eq!(
        view.cell(0, Column::RemoteEndpoint, CellRole::Label),
        CellValue::Text("203.0.113.9:443".into())
    );

    // The resolver learns a host name; flipping resolve mode picks it
    // up and the view asks for a repaint.
    hosts.insert([203, 0, 113, 9].into(), "bastion.example".into());
    view.set_resolve_address(true);
    assert_eq!(drain(&mut rx), vec![ViewEvent::Redisplay]);
    assert_eq!(
        view.cell(0, Column::RemoteEndpoint, CellRole::Label),
        CellValue::Text("bastion.example:443".into())
    );
}
