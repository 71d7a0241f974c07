use crate::catalog::{Action, ActionCatalog, ActionId};
use crate::segment::{Segment, SegmentId, SegmentStore};
use itertools::Itertools;
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_MIN_SEGMENT_FRAMES: i64 = 5;

/// Transient in/out selection. Illegal combinations (an out point
/// without an in point) cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MarkState {
    #[default]
    Idle,
    InMarked {
        mark_in: f64,
    },
    Ready {
        mark_in: f64,
        mark_out: f64,
    },
}

impl MarkState {
    pub fn mark_in(&self) -> Option<f64> {
        match *self {
            MarkState::Idle => None,
            MarkState::InMarked { mark_in } | MarkState::Ready { mark_in, .. } => Some(mark_in),
        }
    }

    pub fn mark_out(&self) -> Option<f64> {
        match *self {
            MarkState::Ready { mark_out, .. } => Some(mark_out),
            _ => None,
        }
    }

    pub fn duration(&self) -> Option<f64> {
        match *self {
            MarkState::Ready { mark_in, mark_out } => Some(mark_out - mark_in),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum MissingPiece {
    #[strum(serialize = "mark in")]
    MarkIn,
    #[strum(serialize = "mark out")]
    MarkOut,
    #[strum(serialize = "action")]
    Action,
}

/// Rejected user input. None of these are fatal; the caller decides how to present them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarkError {
    #[error("mark out must be after mark in")]
    InvalidMarkOut,

    #[error("mark in, out, and select an action first (missing {})", join_missing(.missing))]
    IncompleteSelection { missing: Vec<MissingPiece> },

    #[error("segment too short: minimum {min_frames} frames required, got {frames}")]
    SegmentTooShort { min_frames: i64, frames: i64 },

    #[error("unknown action id {0}")]
    UnknownAction(ActionId),
}

fn join_missing(missing: &[MissingPiece]) -> String {
    missing.iter().join(", ")
}

/// Drives the mark-in / mark-out / commit cycle for one editing session
#[derive(Debug, Clone)]
pub struct MarkController {
    catalog: Arc<ActionCatalog>,
    state: MarkState,
    selected_action: Option<ActionId>,
    editing: Option<SegmentId>,
    min_segment_frames: i64,
}

impl MarkController {
    pub fn new(catalog: Arc<ActionCatalog>) -> Self {
        Self::with_min_frames(catalog, DEFAULT_MIN_SEGMENT_FRAMES)
    }

    /// A floor below one frame is raised to one so a segment never has
    /// `end_frame == start_frame`.
    pub fn with_min_frames(catalog: Arc<ActionCatalog>, min_segment_frames: i64) -> Self {
        if min_segment_frames < 1 {
            log::warn!("minimum segment frames {} raised to 1", min_segment_frames);
        }
        Self {
            catalog,
            state: MarkState::Idle,
            selected_action: None,
            editing: None,
            min_segment_frames: min_segment_frames.max(1),
        }
    }

    pub fn state(&self) -> MarkState {
        self.state
    }

    pub fn selected_action(&self) -> Option<ActionId> {
        self.selected_action
    }

    pub fn selected(&self) -> Option<&Action> {
        self.selected_action.and_then(|id| self.catalog.lookup(id))
    }

    /// Segment currently loaded for editing, replaced on the next successful commit
    pub fn editing(&self) -> Option<SegmentId> {
        self.editing
    }

    pub fn min_segment_frames(&self) -> i64 {
        self.min_segment_frames
    }

    /// Always succeeds. An existing out point survives only while it stays after the new in point.
    pub fn set_mark_in(&mut self, current_time: f64) -> f64 {
        self.state = match self.state.mark_out() {
            Some(mark_out) if mark_out > current_time => MarkState::Ready {
                mark_in: current_time,
                mark_out,
            },
            _ => MarkState::InMarked {
                mark_in: current_time,
            },
        };
        current_time
    }

    pub fn set_mark_out(&mut self, current_time: f64) -> Result<f64, MarkError> {
        match self.state.mark_in() {
            Some(mark_in) if current_time > mark_in => {
                self.state = MarkState::Ready {
                    mark_in,
                    mark_out: current_time,
                };
                Ok(current_time)
            }
            _ => Err(MarkError::InvalidMarkOut),
        }
    }

    pub fn select_action(&mut self, action_id: ActionId) -> Result<&Action, MarkError> {
        let action = self
            .catalog
            .lookup(action_id)
            .ok_or(MarkError::UnknownAction(action_id))?;
        self.selected_action = Some(action_id);
        Ok(action)
    }

    /// Validate the pending selection and append it to `store` as a new segment.
    ///
    /// Frame numbers are derived from `fps` once, here. On success the marks are
    /// cleared but the selected action is kept so the same strike can be labeled
    /// again without reselecting. If a segment was loaded for editing it is
    /// removed from `store` in the same step.
    pub fn commit(&mut self, fps: f64, store: &mut SegmentStore) -> Result<Segment, MarkError> {
        let (mark_in, mark_out, action_id) =
            match (self.state.mark_in(), self.state.mark_out(), self.selected_action) {
                (Some(mark_in), Some(mark_out), Some(action_id)) => (mark_in, mark_out, action_id),
                (mark_in, mark_out, action) => {
                    let mut missing = vec![];
                    if mark_in.is_none() {
                        missing.push(MissingPiece::MarkIn);
                    }
                    if mark_out.is_none() {
                        missing.push(MissingPiece::MarkOut);
                    }
                    if action.is_none() {
                        missing.push(MissingPiece::Action);
                    }
                    return Err(MarkError::IncompleteSelection { missing });
                }
            };

        let duration_frames = ((mark_out - mark_in) * fps).round() as i64;
        let start_frame = (mark_in * fps).round() as i64;
        let end_frame = (mark_out * fps).round() as i64;
        let frames = duration_frames.min(end_frame - start_frame);
        if frames < self.min_segment_frames {
            return Err(MarkError::SegmentTooShort {
                min_frames: self.min_segment_frames,
                frames,
            });
        }

        if let Some(original) = self.editing.take() {
            if store.remove(original).is_some() {
                log::debug!("replacing segment {} with edited copy", original);
            }
        }

        let segment = Segment {
            id: store.allocate_id(),
            action_id,
            start_time: mark_in,
            end_time: mark_out,
            start_frame,
            end_frame,
        };
        store.add(segment.clone());
        self.state = MarkState::Idle;

        log::info!(
            "committed segment {} action={} {:.3}s-{:.3}s frames {}-{}",
            segment.id,
            segment.action_id,
            segment.start_time,
            segment.end_time,
            segment.start_frame,
            segment.end_frame
        );

        Ok(segment)
    }

    /// Drops both marks; the selected action stays
    pub fn clear_marks(&mut self) {
        self.state = MarkState::Idle;
        self.editing = None;
    }

    pub fn cancel_selection(&mut self) {
        self.clear_marks();
        self.selected_action = None;
    }

    /// Load a committed segment back into the marks. Returns the time to seek to.
    pub fn load_for_edit(&mut self, segment: &Segment) -> f64 {
        self.state = MarkState::Ready {
            mark_in: segment.start_time,
            mark_out: segment.end_time,
        };
        self.selected_action = Some(segment.action_id);
        self.editing = Some(segment.id);
        segment.start_time
    }

    /// Fresh state for a newly opened video
    pub fn reset(&mut self) {
        self.cancel_selection();
    }
}
