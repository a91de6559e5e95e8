//! Application core — event loop, engine driving, table rendering.
//!
//! The app is the engine's "host view": it drains the action channel,
//! maps change signals to `sync()` / `enrichment_changed()` calls, and
//! applies the resulting [`ViewEvent`]s to its own cursor and scroll
//! bookkeeping before repainting.

use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table},
};
use tokio::sync::mpsc;
use tracing::info;

use connwatch_core::{CellRole, CellValue, Column, ConnView, MemoryConnLog, ViewEvent};

use crate::action::Action;
use crate::event::{Event, EventReader};
use crate::theme;
use crate::tui::Tui;

const PAGE_STEP: usize = 10;

/// Top-level application state and event loop.
pub struct App {
    view: ConnView<Arc<MemoryConnLog>>,
    view_events: mpsc::UnboundedReceiver<ViewEvent>,
    /// Action sender — background tasks dispatch through clones of this.
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// Selected row index, window-relative.
    selected: usize,
    /// First visible row index.
    offset: usize,
    /// Stick the cursor to the newest row as records arrive.
    follow: bool,
    replay_done: bool,
    running: bool,
}

impl App {
    pub fn new(
        view: ConnView<Arc<MemoryConnLog>>,
        view_events: mpsc::UnboundedReceiver<ViewEvent>,
    ) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            view,
            view_events,
            action_tx,
            action_rx,
            selected: 0,
            offset: 0,
            follow: true,
            replay_done: false,
            running: true,
        }
    }

    /// Sender for background tasks (replay feeder, change forwarder).
    pub fn action_sender(&self) -> mpsc::UnboundedSender<Action> {
        self.action_tx.clone()
    }

    /// Run the main event loop.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        // Pick up anything appended before the loop started.
        self.action_tx.send(Action::LogChanged)?;

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = Self::map_key(key) {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(_, _) => {
                    // Layout follows the frame area; just repaint.
                    self.action_tx.send(Action::Render)?;
                }
                Event::Tick => {
                    self.action_tx.send(Action::Tick)?;
                }
                Event::Render => {
                    self.action_tx.send(Action::Render)?;
                }
            }

            // Drain and process all queued actions
            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(action);

                if action == Action::Render {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        events.stop();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key press to an action.
    fn map_key(key: KeyEvent) -> Option<Action> {
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(Action::Quit),
            (KeyModifiers::NONE, KeyCode::Char('q')) => Some(Action::Quit),

            (KeyModifiers::NONE, KeyCode::Char('j') | KeyCode::Down) => {
                Some(Action::CursorDown(1))
            }
            (KeyModifiers::NONE, KeyCode::Char('k') | KeyCode::Up) => Some(Action::CursorUp(1)),
            (KeyModifiers::CONTROL, KeyCode::Char('d')) | (KeyModifiers::NONE, KeyCode::PageDown) => {
                Some(Action::CursorDown(PAGE_STEP))
            }
            (KeyModifiers::CONTROL, KeyCode::Char('u')) | (KeyModifiers::NONE, KeyCode::PageUp) => {
                Some(Action::CursorUp(PAGE_STEP))
            }
            (KeyModifiers::NONE, KeyCode::Char('g') | KeyCode::Home) => Some(Action::JumpTop),
            (KeyModifiers::SHIFT, KeyCode::Char('G')) | (KeyModifiers::NONE, KeyCode::End) => {
                Some(Action::JumpBottom)
            }
            (KeyModifiers::NONE, KeyCode::Char('r')) => Some(Action::ToggleResolve),
            (KeyModifiers::NONE, KeyCode::Char('f')) => Some(Action::ToggleFollow),
            _ => None,
        }
    }

    /// Process a single action — drive the engine, update cursor state.
    fn process_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::Tick | Action::Render => {}

            Action::LogChanged => {
                self.view.sync();
                self.apply_view_events();
            }
            Action::CacheChanged => {
                self.view.enrichment_changed();
                self.apply_view_events();
            }
            Action::ReplayFinished => self.replay_done = true,

            Action::CursorUp(step) => {
                self.follow = false;
                self.selected = self.selected.saturating_sub(step);
            }
            Action::CursorDown(step) => {
                let last = self.last_row();
                self.selected = (self.selected + step).min(last);
                // Reaching the newest row re-engages follow mode.
                self.follow = self.selected == last;
            }
            Action::JumpTop => {
                self.follow = false;
                self.selected = 0;
            }
            Action::JumpBottom => {
                self.follow = true;
                self.selected = self.last_row();
            }
            Action::ToggleResolve => {
                let resolve = !self.view.resolve_address();
                self.view.set_resolve_address(resolve);
                self.apply_view_events();
            }
            Action::ToggleFollow => {
                self.follow = !self.follow;
                if self.follow {
                    self.selected = self.last_row();
                }
            }
        }
    }

    /// Apply the engine's pending change events to cursor bookkeeping.
    ///
    /// `row_count()` already reflects an event by the time it is
    /// received, so only the cursor needs adjusting here.
    fn apply_view_events(&mut self) {
        while let Ok(event) = self.view_events.try_recv() {
            match event {
                ViewEvent::Reset => {
                    self.offset = 0;
                    self.selected = if self.follow { self.last_row() } else { 0 };
                }
                ViewEvent::RowsRemoved { count } => {
                    // Keep the cursor on the same record as rows shift up.
                    self.selected = self.selected.saturating_sub(count);
                    self.offset = self.offset.saturating_sub(count);
                }
                ViewEvent::RowsInserted { .. } => {
                    if self.follow {
                        self.selected = self.last_row();
                    }
                }
                ViewEvent::Redisplay => {}
            }
        }
        self.selected = self.selected.min(self.last_row());
    }

    fn last_row(&self) -> usize {
        self.view.row_count().saturating_sub(1)
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::vertical([
            Constraint::Min(1),    // connection table
            Constraint::Length(3), // detail bar
            Constraint::Length(1), // status bar
        ])
        .split(area);

        self.render_table(frame, layout[0]);
        self.render_detail(frame, layout[1]);
        self.render_status(frame, layout[2]);
    }

    fn render_table(&mut self, frame: &mut Frame, area: Rect) {
        let row_count = self.view.row_count();

        let title = format!(" Connections ({row_count}) ");
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if row_count == 0 {
            let waiting = Paragraph::new(Line::from(Span::styled(
                "  waiting for connection records…",
                theme::key_hint(),
            )));
            frame.render_widget(waiting, inner);
            return;
        }

        // Keep the selection inside the visible slice.
        let visible = usize::from(inner.height.saturating_sub(1)).max(1);
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + visible {
            self.offset = self.selected + 1 - visible;
        }
        self.offset = self.offset.min(row_count.saturating_sub(1));

        let header = Row::new(Column::ALL.iter().map(|column| {
            match column.title() {
                Some(title) => Cell::from(title),
                None => column
                    .header_icon()
                    .map_or_else(|| Cell::from(""), |key| Cell::from(theme::icon_glyph(key))),
            }
        }))
        .style(theme::table_header());

        let end = (self.offset + visible).min(row_count);
        let rows: Vec<Row<'_>> = (self.offset..end)
            .map(|row| {
                let cells: Vec<Cell<'_>> = Column::ALL
                    .iter()
                    .map(|&column| self.render_cell(row, column))
                    .collect();
                let style = if row == self.selected {
                    theme::table_selected()
                } else {
                    theme::table_row()
                };
                Row::new(cells).style(style)
            })
            .collect();

        let widths = [
            Constraint::Fill(2),    // program
            Constraint::Length(7),  // process id
            Constraint::Length(8),  // protocol
            Constraint::Fill(3),    // local endpoint
            Constraint::Fill(3),    // remote endpoint
            Constraint::Length(2),  // direction
            Constraint::Length(2),  // action
            Constraint::Length(2),  // reason
            Constraint::Length(19), // time
        ];

        let table = Table::new(rows, widths).header(header);
        frame.render_widget(table, inner);
    }

    /// One table cell: icon-only columns render their glyph, the rest
    /// render their label.
    fn render_cell(&mut self, row: usize, column: Column) -> Cell<'static> {
        if column.title().is_none() {
            return match self.view.cell(row, column, CellRole::Icon) {
                CellValue::Icon(key) => {
                    Cell::from(theme::icon_glyph(key)).style(theme::icon_style(key))
                }
                _ => Cell::from(""),
            };
        }
        Cell::from(cell_text(&self.view.cell(row, column, CellRole::Label)))
    }

    /// Tooltip-role projections for the selected row.
    fn render_detail(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.view.row_count() == 0 {
            return;
        }

        let row = self.selected;
        let tooltip = |app: &mut Self, column: Column| -> String {
            cell_text(&app.view.cell(row, column, CellRole::Tooltip))
        };

        let program = tooltip(self, Column::Program);
        let direction = tooltip(self, Column::Direction);
        let action = tooltip(self, Column::Action);
        let reason = tooltip(self, Column::Reason);
        let local = tooltip(self, Column::LocalEndpoint);
        let remote = tooltip(self, Column::RemoteEndpoint);

        let action_style = if action == "Blocked" {
            Style::default().fg(theme::ERROR_RED)
        } else {
            Style::default().fg(theme::SUCCESS_GREEN)
        };

        let line = Line::from(vec![
            Span::styled(format!(" {program}  "), Style::default().fg(theme::CORAL)),
            Span::styled(format!("{local} → {remote}  "), theme::table_row()),
            Span::styled(format!("{direction}  "), Style::default().fg(theme::LIGHT_BLUE)),
            Span::styled(format!("{action}  "), action_style),
            Span::styled(reason, Style::default().fg(theme::ELECTRIC_YELLOW)),
        ]);
        frame.render_widget(Paragraph::new(line), inner);
    }

    fn render_status(&mut self, frame: &mut Frame, area: Rect) {
        let feed = if self.replay_done {
            Span::styled("○ replay done", theme::key_hint())
        } else {
            Span::styled("● live", Style::default().fg(theme::SUCCESS_GREEN))
        };

        let row_count = self.view.row_count();
        let ids = if row_count == 0 {
            "ids ─".to_owned()
        } else {
            format!(
                "ids {}–{}",
                self.view.map_row(0),
                self.view.map_row(row_count - 1)
            )
        };

        let mode = format!(
            " │ {ids} │ resolve {} │ follow {}",
            if self.view.resolve_address() { "on" } else { "off" },
            if self.follow { "on" } else { "off" },
        );

        let line = Line::from(vec![
            Span::raw(" "),
            feed,
            Span::styled(mode, theme::key_hint()),
            Span::styled("  │ ", theme::key_hint()),
            Span::styled("r", theme::key_hint_key()),
            Span::styled(" resolve  ", theme::key_hint()),
            Span::styled("f", theme::key_hint_key()),
            Span::styled(" follow  ", theme::key_hint()),
            Span::styled("q", theme::key_hint_key()),
            Span::styled(" quit", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

fn cell_text(value: &CellValue) -> String {
    match value {
        CellValue::Empty | CellValue::Icon(_) => String::new(),
        CellValue::Text(text) => text.clone(),
        CellValue::Integer(n) => n.to_string(),
        CellValue::Time(time) => time.format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}
