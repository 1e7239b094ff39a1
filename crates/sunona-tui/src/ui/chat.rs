//! Chat area
//!
//! Displays the conversation log and the typing indicator.

use chrono::{DateTime, Local, TimeZone, Utc};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};
use sunona_app::App;
use sunona_client::{Environment, Message, ROOM_TITLE};

const BORDER_SIZE: u16 = 2;

/// Render the chat area.
pub fn render<E: Environment>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let title = format!(" {ROOM_TITLE} ");
    let block = Block::default().borders(Borders::ALL).title(title);
    let session = app.session();

    let items: Vec<ListItem> = if session.messages().is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "No messages yet",
            Style::default().fg(Color::DarkGray),
        )))]
    } else {
        session
            .messages()
            .iter()
            .map(|msg| ListItem::new(message_line(msg, session.is_own(msg))))
            .collect()
    };

    let visible_height = area.height.saturating_sub(BORDER_SIZE) as usize;
    let skip = items.len().saturating_sub(visible_height);
    let visible_items: Vec<_> = items.into_iter().skip(skip).collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}

fn message_line(msg: &Message, own: bool) -> Line<'static> {
    let time =
        Span::styled(format_time_in(msg.timestamp, &Local), Style::default().fg(Color::DarkGray));

    if msg.is_system() {
        return Line::from(vec![
            time,
            Span::raw(" "),
            Span::styled(
                format!("* {}", msg.text),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
            ),
        ]);
    }

    let sender = msg.sender.clone().unwrap_or_default();
    if own {
        return Line::from(vec![
            Span::styled(msg.text.clone(), Style::default().fg(Color::Cyan)),
            Span::raw(" "),
            time,
        ])
        .right_aligned();
    }

    Line::from(vec![
        time,
        Span::raw(" "),
        Span::styled(
            format!("<{sender}>"),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::raw(msg.text.clone()),
    ])
}

/// Format Unix milliseconds as `HH:MM` in `tz`.
pub fn format_time_in<Tz: TimeZone>(millis: u64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    i64::try_from(millis)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| t.with_timezone(tz).format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

/// Render the typing indicator line.
pub fn render_typing<E: Environment>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let text = app.session().typing_indicator().unwrap_or_default();
    let paragraph = Paragraph::new(Span::styled(
        format!(" {text}"),
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    ));
    frame.render_widget(paragraph, area);
}
