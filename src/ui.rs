pub mod action_panel;
pub mod help;
pub mod screen;
pub mod segment_list;
pub mod timeline;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use strikemark::{
    marking::MarkState,
    queue::QualityReport,
    session::{AnnotationSession, FeedbackLevel},
    util::{format_time_centis, format_timecode},
};

use crate::App;

use self::{
    action_panel::ActionPanel,
    segment_list::SegmentList,
    timeline::{TimelineWidget, TIMELINE_HEIGHT},
};

const ACTION_PANEL_WIDTH: u16 = 34;

fn header_line(session: &AnnotationSession) -> Line<'static> {
    let queue = session.queue();
    let video = queue.current();
    let sep = Span::styled(" │ ", Style::default().add_modifier(Modifier::DIM));

    Line::from(vec![
        Span::styled(
            " strikemark",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        sep.clone(),
        Span::styled(
            format!(
                "{} ({}/{})",
                video.filename,
                queue.current_index() + 1,
                queue.len()
            ),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        sep.clone(),
        Span::raw(video.status.to_string()),
        sep.clone(),
        Span::raw(format!("{} @ {}fps", video.resolution, video.fps)),
        sep.clone(),
        Span::raw(format!(
            "{}/{} segments",
            video.segments_labeled, video.estimated_segments
        )),
        sep,
        Span::raw(format!("queue {:.0}% complete", queue.progress_percent())),
    ])
}

fn quality_line(report: &QualityReport) -> Line<'static> {
    if report.all_passed() {
        return Line::from(Span::styled(
            "Quality ✓",
            Style::default().fg(Color::Green),
        ));
    }

    let mut failed = vec![];
    if !report.fps.passed {
        failed.push(format!("fps {} < {}", report.fps.value, report.fps.required));
    }
    if !report.resolution.passed {
        failed.push(format!(
            "resolution {} < {}",
            report.resolution.value, report.resolution.required
        ));
    }
    if !report.bitrate.passed {
        failed.push(format!(
            "bitrate {}kbps < {}kbps",
            report.bitrate.value, report.bitrate.required
        ));
    }
    if !report.duration.passed {
        failed.push(format!(
            "duration {:.0}s < {:.0}s",
            report.duration.value, report.duration.required
        ));
    }
    Line::from(Span::styled(
        format!("Quality ⚠ {}", failed.join(", ")),
        Style::default().fg(Color::Yellow),
    ))
}

fn playback_lines(session: &AnnotationSession) -> Vec<Line<'static>> {
    let clock = session.clock();
    let marks = session.marks();
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let transport = if clock.is_playing() {
        Span::styled("▶ Playing", bold.fg(Color::Green))
    } else {
        Span::styled("⏸ Paused", bold)
    };

    let fmt_mark = |t: Option<f64>| t.map(format_time_centis).unwrap_or_else(|| "—".to_string());
    let state = marks.state();
    let mark_style = match state {
        MarkState::Idle => Style::default().add_modifier(Modifier::DIM),
        _ => Style::default().fg(Color::Yellow),
    };

    let action = match (marks.selected(), marks.editing()) {
        (Some(action), Some(id)) => format!("{} (editing #{})", action.name, id),
        (Some(action), None) => action.name.clone(),
        (None, _) => "none, press a hotkey".to_string(),
    };

    vec![
        Line::from(vec![
            transport,
            Span::raw(format!("  {}x  zoom {:.1}x", clock.speed(), session.zoom())),
        ]),
        Line::from(vec![
            Span::styled(format_timecode(clock.current_time()), bold),
            Span::raw(format!(
                " / {}   frame {} / {}",
                format_timecode(clock.duration()),
                clock.current_frame(),
                clock.total_frames()
            )),
        ]),
        Line::from(Span::styled(
            format!(
                "In {}   Out {}   Length {}",
                fmt_mark(state.mark_in()),
                fmt_mark(state.mark_out()),
                state
                    .duration()
                    .map(|d| format!("{:.2}s", d))
                    .unwrap_or_else(|| "—".to_string())
            ),
            mark_style,
        )),
        Line::from(format!("Action: {}", action)),
        quality_line(&session.quality()),
    ]
}

fn footer_line(app: &App) -> Line<'static> {
    match &app.toast {
        Some(toast) => {
            let (icon, color) = match toast.feedback.level {
                FeedbackLevel::Success => ("✓", Color::Green),
                FeedbackLevel::Info => ("•", Color::Cyan),
                FeedbackLevel::Error => ("✗", Color::Red),
            };
            let mut spans = vec![Span::styled(
                format!(" {} {}", icon, toast.feedback.title),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )];
            if let Some(detail) = &toast.feedback.detail {
                spans.push(Span::raw(format!(": {}", detail)));
            }
            Line::from(spans)
        }
        None => Line::from(Span::styled(
            " [ mark in · ] mark out · 1-0/O/D/I action · enter save · ? help · q quit",
            Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
        )),
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = &self.session;

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(8),
                Constraint::Length(TIMELINE_HEIGHT + 2),
                Constraint::Length(1),
            ])
            .split(area);

        Paragraph::new(header_line(session)).render(rows[0], buf);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(40), Constraint::Length(ACTION_PANEL_WIDTH)])
            .split(rows[1]);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Min(3)])
            .split(body[0]);

        Paragraph::new(playback_lines(session))
            .block(Block::default().borders(Borders::ALL).title(" Playback "))
            .render(left[0], buf);

        SegmentList {
            segments: session.visible_segments(),
            total: session.store().count(),
            catalog: session.catalog(),
            list: session.list_state(),
        }
        .render(left[1], buf);

        ActionPanel {
            catalog: session.catalog(),
            selected: session.marks().selected_action(),
            flashed: session.flashed_key(),
        }
        .render(body[1], buf);

        let view = session.view();
        let visible_end = view.scroll_offset() + view.visible_duration();
        let timeline_block = Block::default().borders(Borders::ALL).title(format!(
            " Timeline · zoom {:.1}x · {}-{} ",
            view.zoom,
            format_time_centis(view.scroll_offset()),
            format_time_centis(visible_end.min(view.total_duration))
        ));
        let track = timeline_block.inner(rows[2]);
        timeline_block.render(rows[2], buf);
        self.timeline_area.set(track);

        TimelineWidget {
            view,
            segments: session.store().segments(),
            marks: session.marks().state(),
            catalog: session.catalog(),
            highlighted: session.highlighted_segment().map(|s| s.id),
        }
        .render(track, buf);

        Paragraph::new(footer_line(self)).render(rows[3], buf);
    }
}
