use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use strikemark::keymap::HELP_ENTRIES;

/// Rect of `percent_x` x `percent_y` centred in `area`
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

pub struct HelpOverlay;

impl Widget for HelpOverlay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let popup = centered_rect(60, 80, area);
        Clear.render(popup, buf);

        let key_style = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
        let lines: Vec<Line> = HELP_ENTRIES
            .iter()
            .map(|(key, what)| {
                Line::from(vec![
                    Span::styled(format!("{:>14}  ", key), key_style),
                    Span::raw(*what),
                ])
            })
            .collect();

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Keyboard shortcuts (? or esc to close) "),
            )
            .render(popup, buf);
    }
}

/// Read-only view of the document `w` would write
pub struct ExportPreview<'a> {
    pub text: &'a str,
}

impl Widget for ExportPreview<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let popup = centered_rect(70, 80, area);
        Clear.render(popup, buf);

        Paragraph::new(self.text)
            .style(Style::default().fg(Color::Gray))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(
                        " Export preview · {:.1} KB (w to write, v or esc to close) ",
                        self.text.len() as f64 / 1024.0
                    )),
            )
            .render(popup, buf);
    }
}
