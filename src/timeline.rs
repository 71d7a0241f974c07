//! Time <-> percent mapping for the zoomed, auto-scrolled timeline window.
//!
//! Everything here is a pure function of its inputs. Percentages are on a
//! 0-100 scale spanning the visible window; callers are responsible for
//! keeping `visible_duration` positive (zoom >= 1 and a positive video duration).

use crate::marking::MarkState;
use crate::segment::Segment;

pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 10.0;
pub const ZOOM_STEP: f64 = 0.5;

pub fn time_to_percent(time: f64, scroll_offset: f64, visible_duration: f64) -> f64 {
    ((time - scroll_offset) / visible_duration) * 100.0
}

pub fn percent_to_time(percent: f64, scroll_offset: f64, visible_duration: f64) -> f64 {
    scroll_offset + (percent / 100.0) * visible_duration
}

pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_nan() {
        return MIN_ZOOM;
    }
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Evenly spaced tick times covering the visible window.
///
/// Spacing is a whole number of seconds, roughly a tenth of the window. The
/// first tick sits at or before `scroll_offset`.
pub fn compute_tick_marks(total_duration: f64, visible_duration: f64, scroll_offset: f64) -> Vec<f64> {
    let interval = (visible_duration / 10.0).floor().max(1.0);
    let start = (scroll_offset / interval).floor() * interval;
    let limit = total_duration.min(scroll_offset + visible_duration + interval);

    // multiply instead of accumulating so the step stays exact
    (0..)
        .map(|k| start + k as f64 * interval)
        .take_while(|t| *t <= limit)
        .collect()
}

/// Horizontal placement of a time span inside the visible window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start_percent: f64,
    pub width_percent: f64,
}

impl Span {
    pub fn end_percent(&self) -> f64 {
        self.start_percent + self.width_percent
    }
}

/// Clip `[start, end]` to the window. `None` when it lies entirely outside.
pub fn span_for_range(start: f64, end: f64, scroll_offset: f64, visible_duration: f64) -> Option<Span> {
    let start_percent = time_to_percent(start, scroll_offset, visible_duration);
    let end_percent = time_to_percent(end, scroll_offset, visible_duration);
    if end_percent < 0.0 || start_percent > 100.0 {
        return None;
    }

    let left = start_percent.max(0.0);
    let right = end_percent.min(100.0);
    Some(Span {
        start_percent: left,
        width_percent: (right - left).max(0.0),
    })
}

pub fn segment_span(segment: &Segment, scroll_offset: f64, visible_duration: f64) -> Option<Span> {
    span_for_range(
        segment.start_time,
        segment.end_time,
        scroll_offset,
        visible_duration,
    )
}

/// The visible window derived from zoom and playhead position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineView {
    pub total_duration: f64,
    pub zoom: f64,
    pub current_time: f64,
}

impl TimelineView {
    pub fn new(total_duration: f64, zoom: f64, current_time: f64) -> Self {
        Self {
            total_duration,
            zoom: clamp_zoom(zoom),
            current_time,
        }
    }

    pub fn visible_duration(&self) -> f64 {
        self.total_duration / self.zoom
    }

    /// Keeps the playhead centred, except near the start of the video
    pub fn scroll_offset(&self) -> f64 {
        (self.current_time - self.visible_duration() / 2.0).max(0.0)
    }

    pub fn time_to_percent(&self, time: f64) -> f64 {
        time_to_percent(time, self.scroll_offset(), self.visible_duration())
    }

    pub fn percent_to_time(&self, percent: f64) -> f64 {
        percent_to_time(percent, self.scroll_offset(), self.visible_duration())
    }

    /// Seek target for a click at `fraction` (0.0-1.0) of the track width
    pub fn seek_time(&self, fraction: f64) -> f64 {
        self.percent_to_time(fraction * 100.0)
            .clamp(0.0, self.total_duration)
    }

    pub fn tick_marks(&self) -> Vec<f64> {
        compute_tick_marks(
            self.total_duration,
            self.visible_duration(),
            self.scroll_offset(),
        )
    }

    pub fn segment_span(&self, segment: &Segment) -> Option<Span> {
        segment_span(segment, self.scroll_offset(), self.visible_duration())
    }

    /// Pending selection; an in point alone is drawn as a zero-width span
    pub fn mark_span(&self, marks: &MarkState) -> Option<Span> {
        let mark_in = marks.mark_in()?;
        let mark_out = marks.mark_out().unwrap_or(mark_in);
        span_for_range(
            mark_in,
            mark_out,
            self.scroll_offset(),
            self.visible_duration(),
        )
    }
}

/// Map a 0-100 position onto one of `width` cells
pub fn percent_to_column(percent: f64, width: u16) -> Option<u16> {
    if width == 0 || !(0.0..=100.0).contains(&percent) {
        return None;
    }
    let col = ((percent / 100.0) * width as f64).floor() as u16;
    Some(col.min(width - 1))
}
