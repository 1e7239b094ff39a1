//! Identity prompt
//!
//! Modal asking for a display name. Shown until the first successful join
//! and again whenever the user reopens it to change their name.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use sunona_app::App;
use sunona_client::{Environment, ROOM_TITLE};
use sunona_core::MAX_IDENTITY_LEN;

use super::centered;

const POPUP_WIDTH: u16 = 40;
const POPUP_HEIGHT: u16 = 6;

/// Render the prompt centered in `area`.
pub fn render<E: Environment>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let popup = centered(area, POPUP_WIDTH, POPUP_HEIGHT);
    let name = app.name_input();

    let lines = vec![
        Line::from(Span::styled(
            format!("Enter your name (max {MAX_IDENTITY_LEN})"),
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            format!("> {}", name.text()),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Enter to join, Esc to quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Welcome to {ROOM_TITLE} "))
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);

    // Border, then "> ".
    let cursor_x = popup.x.saturating_add(3).saturating_add(name.cursor() as u16);
    let max_x = popup.x.saturating_add(popup.width).saturating_sub(2);
    frame.set_cursor_position((cursor_x.min(max_x), popup.y.saturating_add(2)));
}
