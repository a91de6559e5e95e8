//! Palette, semantic styles, and icon-key glyph mapping.

use connwatch_core::{ConnReason, IconKey};
use ratatui::style::{Color, Modifier, Style};

// ── Core Palette ──────────────────────────────────────────────────────

pub const NEON_CYAN: Color = Color::Rgb(128, 255, 234); // #80ffea
pub const ELECTRIC_PURPLE: Color = Color::Rgb(225, 53, 255); // #e135ff
pub const ELECTRIC_YELLOW: Color = Color::Rgb(241, 250, 140); // #f1fa8c
pub const SUCCESS_GREEN: Color = Color::Rgb(80, 250, 123); // #50fa7b
pub const ERROR_RED: Color = Color::Rgb(255, 99, 99); // #ff6363
pub const CORAL: Color = Color::Rgb(255, 106, 193); // #ff6ac1
pub const LIGHT_BLUE: Color = Color::Rgb(139, 233, 253); // #8be9fd

pub const DIM_WHITE: Color = Color::Rgb(189, 193, 207); // #bdc1cf
pub const BORDER_GRAY: Color = Color::Rgb(98, 114, 164); // #6272a4
pub const BG_HIGHLIGHT: Color = Color::Rgb(40, 42, 54); // #282a36

// ── Semantic Styles ───────────────────────────────────────────────────

/// Title text for blocks/panels.
pub fn title_style() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}

/// Panel border.
pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Table header row.
pub fn table_header() -> Style {
    Style::default()
        .fg(NEON_CYAN)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

/// Normal table row text.
pub fn table_row() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Selected / highlighted table row.
pub fn table_selected() -> Style {
    Style::default()
        .fg(ELECTRIC_PURPLE)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Key hint text (e.g., "q quit  r resolve").
pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Key hint key character.
pub fn key_hint_key() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}

// ── Icon keys → glyphs ────────────────────────────────────────────────
//
// The engine hands out semantic icon keys; picking concrete glyphs and
// colors is this host's job.

pub fn icon_glyph(key: IconKey) -> &'static str {
    match key {
        IconKey::Application => "≡",
        IconKey::Inbound => "▼",
        IconKey::Outbound => "▲",
        IconKey::Allowed => "✔",
        IconKey::Blocked => "✘",
        IconKey::Reason(reason) => reason_glyph(reason),
        IconKey::Help => "?",
    }
}

pub fn icon_style(key: IconKey) -> Style {
    let color = match key {
        IconKey::Application | IconKey::Help => DIM_WHITE,
        IconKey::Inbound => SUCCESS_GREEN,
        IconKey::Outbound => LIGHT_BLUE,
        IconKey::Allowed => SUCCESS_GREEN,
        IconKey::Blocked => ERROR_RED,
        IconKey::Reason(_) => ELECTRIC_YELLOW,
    };
    Style::default().fg(color)
}

fn reason_glyph(reason: ConnReason) -> &'static str {
    match reason {
        ConnReason::InternetAddress => "@",
        ConnReason::OldConnection => "↻",
        ConnReason::ProgramAction => "≡",
        ConnReason::AppGroup => "⧉",
        ConnReason::FilterMode => "◉",
        ConnReason::LanOnly => "⌂",
        ConnReason::Zone => "▦",
        ConnReason::Rule | ConnReason::GlobalRuleBefore | ConnReason::GlobalRuleAfter => "§",
        ConnReason::AskLimit => "!",
        _ => "?",
    }
}
