//! Emoji picker
//!
//! One-row overlay above the composer listing the quick emoji.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use sunona_client::QUICK_EMOJIS;

const PICKER_HEIGHT: u16 = 3;

/// Render the picker directly above `anchor`.
pub fn render(frame: &mut Frame, selected: usize, anchor: Rect) {
    let area = Rect {
        x: anchor.x,
        y: anchor.y.saturating_sub(PICKER_HEIGHT),
        width: anchor.width,
        height: PICKER_HEIGHT.min(anchor.y),
    };
    if area.height == 0 {
        return;
    }

    let spans: Vec<Span> = QUICK_EMOJIS
        .iter()
        .enumerate()
        .flat_map(|(i, emoji)| {
            let style = if i == selected {
                Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            [Span::styled(format!("{}:{emoji}", i + 1), style), Span::raw(" ")]
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Emoji (1-8, Enter, Tab to close) ");

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
