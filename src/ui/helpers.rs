use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::Book;
use crate::theme::Palette;

/// Cut `text` to at most `width` characters, marking the cut with an ellipsis.
pub(crate) fn truncate_to_width(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let count = text.chars().count();
    if count <= width {
        return text.to_string();
    }
    if width == 1 {
        return "…".to_string();
    }
    let mut cut: String = text.chars().take(width - 1).collect();
    cut.push('…');
    cut
}

/// Build the card shown for one book inside a shelf list.
pub(crate) fn book_card_lines(book: &Book, palette: Palette, width: u16) -> Vec<Line<'static>> {
    let width = width as usize;
    let title = if book.title.is_empty() {
        "(untitled)".to_string()
    } else {
        book.title.clone()
    };

    vec![
        Line::from(Span::styled(
            truncate_to_width(&title, width),
            Style::default()
                .fg(palette.text)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            truncate_to_width(&format!("Author: {}", book.author), width),
            Style::default().fg(palette.text),
        )),
        Line::from(Span::styled(
            truncate_to_width(&format!("Year: {}", book.display_year()), width),
            Style::default().fg(palette.text),
        )),
        Line::from(Span::styled(
            truncate_to_width(&format!("Cover: {}", book.cover_or_placeholder()), width),
            Style::default().fg(palette.muted),
        )),
    ]
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}
