use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, Widget},
};

use strikemark::{
    catalog::ActionCatalog,
    segment::Segment,
    session::ListState,
    util::format_time_range,
};

use super::timeline::category_color;

/// Pure presenter for a single segment row
pub fn present_row(segment: &Segment, catalog: &ActionCatalog, highlighted: bool) -> Row<'static> {
    let (name, color) = match catalog.lookup(segment.action_id) {
        Some(action) => (
            action.name.clone(),
            category_color(Some(action.category)),
        ),
        None => (format!("Unknown action {}", segment.action_id), Color::DarkGray),
    };

    let style = if highlighted {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };

    Row::new(vec![
        Cell::from(format!("#{}", segment.id)),
        Cell::from(name).style(Style::default().fg(color)),
        Cell::from(format_time_range(segment.start_time, segment.end_time)),
        Cell::from(format!("{:.2}s", segment.duration())),
        Cell::from(format!("{}f", segment.frame_count())),
    ])
    .style(style)
}

/// "3 of 7 segments" style summary for the list title
pub fn summary(shown: usize, total: usize) -> String {
    format!("{} of {} segments", shown, total)
}

pub struct SegmentList<'a> {
    pub segments: Vec<&'a Segment>,
    pub total: usize,
    pub catalog: &'a ActionCatalog,
    pub list: ListState,
}

impl Widget for SegmentList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = format!(
            " Segments ({}) · {} · {} ",
            summary(self.segments.len(), self.total),
            self.list.sort,
            self.list.filter.label()
        );
        let block = Block::default().borders(Borders::ALL).title(title);

        // keep the cursor row on screen
        let visible_rows = area.height.saturating_sub(3) as usize;
        let skip = if visible_rows > 0 && self.list.cursor >= visible_rows {
            self.list.cursor + 1 - visible_rows
        } else {
            0
        };

        let rows: Vec<Row> = self
            .segments
            .iter()
            .enumerate()
            .skip(skip)
            .map(|(idx, segment)| present_row(segment, self.catalog, idx == self.list.cursor))
            .collect();

        let header = Row::new(vec!["ID", "Action", "Range", "Length", "Frames"]).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let table = Table::new(
            rows,
            [
                Constraint::Length(5),
                Constraint::Min(18),
                Constraint::Length(19),
                Constraint::Length(8),
                Constraint::Length(6),
            ],
        )
        .header(header)
        .block(block);

        Widget::render(table, area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strikemark::segment::{CategoryFilter, SortKey};

    fn segment(id: u64, action_id: u32, start: f64) -> Segment {
        Segment {
            id,
            action_id,
            start_time: start,
            end_time: start + 0.5,
            start_frame: (start * 30.0) as i64,
            end_frame: ((start + 0.5) * 30.0) as i64,
        }
    }

    fn rendered(buf: &Buffer) -> String {
        buf.content.iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_summary() {
        assert_eq!(summary(2, 5), "2 of 5 segments");
    }

    #[test]
    fn test_list_renders_names_and_title() {
        let catalog = ActionCatalog::boxing();
        let a = segment(1, 0, 5.0);
        let b = segment(2, 99, 7.0);
        let area = Rect::new(0, 0, 80, 8);
        let mut buf = Buffer::empty(area);

        SegmentList {
            segments: vec![&a, &b],
            total: 2,
            catalog: &catalog,
            list: ListState {
                sort: SortKey::ByTime,
                filter: CategoryFilter::All,
                cursor: 0,
            },
        }
        .render(area, &mut buf);

        let content = rendered(&buf);
        assert!(content.contains("2 of 2 segments"));
        assert!(content.contains("By Time"));
        assert!(content.contains("Jab to Head"));
        assert!(content.contains("Unknown action 99"));
    }
}
