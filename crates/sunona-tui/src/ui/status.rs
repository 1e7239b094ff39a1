//! Status bar
//!
//! Displays connectivity, identity and key hints.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use sunona_app::App;
use sunona_client::{Connectivity, Environment};

/// Render the status bar.
pub fn render<E: Environment>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let connection_status = match app.connectivity() {
        Connectivity::Disconnected => Span::styled("Disconnected", Style::default().fg(Color::Red)),
        Connectivity::Connected => Span::styled(
            "Connected",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    };

    let identity =
        app.session().identity().map_or_else(String::new, |name| format!(" | {name}"));
    let info = format!(
        "{identity} | {} | Messages: {}",
        app.server_addr(),
        app.session().messages().len()
    );

    let mut spans = vec![
        Span::raw(" "),
        connection_status,
        Span::styled(info, Style::default().fg(Color::Gray)),
    ];
    if let Some(message) = app.status_message() {
        spans.push(Span::styled(format!(" | {message}"), Style::default().fg(Color::Yellow)));
    }
    spans.push(Span::styled(
        " | Tab emoji, Ctrl+N rename, Esc quit",
        Style::default().fg(Color::Gray),
    ));

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}
