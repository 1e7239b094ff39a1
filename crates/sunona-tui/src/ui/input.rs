//! Input line
//!
//! Displays the composer with cursor.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};
use sunona_app::{App, Focus};
use sunona_client::Environment;

const PROMPT_WIDTH: u16 = 2; // "> "
const INPUT_LINE_OFFSET_Y: u16 = 1; // inside top border
const LEFT_BORDER: u16 = 1;
const RIGHT_PADDING: u16 = 1; // inside right border

/// Render the composer.
pub fn render<E: Environment>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let draft = app.draft_input();
    let style = if app.session().can_send() {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::Gray)
    };

    let block = Block::default().borders(Borders::ALL).title(" Message ");
    let paragraph = Paragraph::new(format!("> {}", draft.text())).style(style).block(block);
    frame.render_widget(paragraph, area);

    if app.focus() != Focus::Draft {
        return;
    }

    let origin_x = area.x.saturating_add(LEFT_BORDER + PROMPT_WIDTH);
    let max_x = area.x.saturating_add(area.width).saturating_sub(RIGHT_PADDING + 1);
    let cursor_x = origin_x.saturating_add(draft.cursor() as u16).min(max_x);
    let cursor_y = area.y.saturating_add(INPUT_LINE_OFFSET_Y);

    frame.set_cursor_position((cursor_x, cursor_y));
}
