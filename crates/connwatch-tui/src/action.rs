//! Actions dispatched through the app's event loop.

/// Everything the main loop knows how to process. Terminal events,
/// collaborator change signals, and key-driven commands all funnel
/// through this one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    /// Periodic tick for status refresh.
    Tick,
    /// Render tick (~30 FPS).
    Render,

    /// The backing log signalled a change; reconcile the view.
    LogChanged,
    /// An enrichment cache signalled a change; repaint.
    CacheChanged,
    /// The replay source ran out of capture lines.
    ReplayFinished,

    CursorUp(usize),
    CursorDown(usize),
    JumpTop,
    JumpBottom,
    ToggleResolve,
    ToggleFollow,
}
