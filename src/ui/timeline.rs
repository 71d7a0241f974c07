use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

use unicode_width::UnicodeWidthStr;

use strikemark::{
    catalog::{ActionCatalog, ActionCategory},
    marking::MarkState,
    segment::{Segment, SegmentId},
    timeline::{percent_to_column, Span, TimelineView},
    util::format_time_short,
};

/// Rows the timeline occupies: tick labels, segments, pending marks
pub const TIMELINE_HEIGHT: u16 = 3;

pub fn category_color(category: Option<ActionCategory>) -> Color {
    match category {
        Some(ActionCategory::Straight) => Color::Cyan,
        Some(ActionCategory::Hook) => Color::Magenta,
        Some(ActionCategory::Uppercut) => Color::Green,
        Some(ActionCategory::Other) => Color::Blue,
        None => Color::DarkGray,
    }
}

/// Columns covered by a span. Zero-width spans still get one cell.
fn span_columns(span: &Span, width: u16) -> Option<(u16, u16)> {
    let start = percent_to_column(span.start_percent, width)?;
    let end = percent_to_column(span.end_percent(), width).unwrap_or(width - 1);
    Some((start, end.max(start)))
}

pub struct TimelineWidget<'a> {
    pub view: TimelineView,
    pub segments: &'a [Segment],
    pub marks: MarkState,
    pub catalog: &'a ActionCatalog,
    pub highlighted: Option<SegmentId>,
}

impl Widget for TimelineWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height < TIMELINE_HEIGHT {
            return;
        }

        let dim = Style::default().add_modifier(Modifier::DIM);
        let labels_y = area.y;
        let segments_y = area.y + 1;
        let marks_y = area.y + 2;

        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, segments_y)) {
                cell.set_symbol("─").set_style(dim);
            }
        }

        for tick in self.view.tick_marks() {
            let Some(col) = percent_to_column(self.view.time_to_percent(tick), area.width) else {
                continue;
            };
            let label = format_time_short(tick);
            if col as usize + label.width() <= area.width as usize {
                buf.set_string(area.x + col, labels_y, &label, dim);
            }
            if let Some(cell) = buf.cell_mut((area.x + col, segments_y)) {
                cell.set_symbol("┼").set_style(dim);
            }
        }

        for segment in self.segments {
            let Some(span) = self.view.segment_span(segment) else {
                continue;
            };
            let Some((start, end)) = span_columns(&span, area.width) else {
                continue;
            };
            let mut style = Style::default().fg(category_color(self.catalog.category_of(segment.action_id)));
            if self.highlighted == Some(segment.id) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            for col in start..=end {
                if let Some(cell) = buf.cell_mut((area.x + col, segments_y)) {
                    cell.set_symbol("█").set_style(style);
                }
            }
        }

        if let Some(span) = self.view.mark_span(&self.marks) {
            if let Some((start, end)) = span_columns(&span, area.width) {
                let style = Style::default().fg(Color::Yellow);
                for col in start..=end {
                    if let Some(cell) = buf.cell_mut((area.x + col, marks_y)) {
                        cell.set_symbol("▀").set_style(style);
                    }
                }
                if let Some(cell) = buf.cell_mut((area.x + start, marks_y)) {
                    cell.set_symbol("[").set_style(style.add_modifier(Modifier::BOLD));
                }
                if self.marks.mark_out().is_some() {
                    if let Some(cell) = buf.cell_mut((area.x + end, marks_y)) {
                        cell.set_symbol("]").set_style(style.add_modifier(Modifier::BOLD));
                    }
                }
            }
        }

        let playhead = self.view.time_to_percent(self.view.current_time);
        if let Some(col) = percent_to_column(playhead, area.width) {
            let style = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);
            for y in [segments_y, marks_y] {
                if let Some(cell) = buf.cell_mut((area.x + col, y)) {
                    cell.set_symbol("│").set_style(style);
                }
            }
        }
    }
}
