use crate::catalog::{ActionCatalog, ActionCategory, ActionId};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

pub type SegmentId = u64;

/// A committed, labeled time interval of the current video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub action_id: ActionId,
    pub start_time: f64,
    pub end_time: f64,
    pub start_frame: i64,
    pub end_frame: i64,
}

impl Segment {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn frame_count(&self) -> i64 {
        self.end_frame - self.start_frame
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum SortKey {
    #[default]
    #[strum(serialize = "By Time")]
    ByTime,
    #[strum(serialize = "By Action")]
    ByAction,
}

impl SortKey {
    pub fn toggled(self) -> Self {
        match self {
            SortKey::ByTime => SortKey::ByAction,
            SortKey::ByAction => SortKey::ByTime,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(ActionCategory),
}

impl CategoryFilter {
    /// all -> straight -> hook -> uppercut -> other -> all
    pub fn next(self) -> Self {
        match self {
            CategoryFilter::All => CategoryFilter::Only(ActionCategory::Straight),
            CategoryFilter::Only(ActionCategory::Straight) => {
                CategoryFilter::Only(ActionCategory::Hook)
            }
            CategoryFilter::Only(ActionCategory::Hook) => {
                CategoryFilter::Only(ActionCategory::Uppercut)
            }
            CategoryFilter::Only(ActionCategory::Uppercut) => {
                CategoryFilter::Only(ActionCategory::Other)
            }
            CategoryFilter::Only(ActionCategory::Other) => CategoryFilter::All,
        }
    }

    pub fn label(&self) -> String {
        match self {
            CategoryFilter::All => "all".to_string(),
            CategoryFilter::Only(category) => category.to_string(),
        }
    }
}

/// Committed segments of the active video, in insertion order.
///
/// Owns id allocation: ids are handed out from a monotonic counter that
/// always stays above every id the store has seen.
#[derive(Debug, Clone)]
pub struct SegmentStore {
    segments: Vec<Segment>,
    next_id: SegmentId,
}

impl Default for SegmentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentStore {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
            next_id: 1,
        }
    }

    /// Rebuild a store from a previously persisted segment set
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        let next_id = segments.iter().map(|s| s.id).max().map_or(1, |max| max + 1);
        Self { segments, next_id }
    }

    pub fn allocate_id(&mut self) -> SegmentId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn add(&mut self, segment: Segment) {
        if segment.id >= self.next_id {
            self.next_id = segment.id + 1;
        }
        self.segments.push(segment);
    }

    /// Removes the segment with `id`. Absent ids are not an error.
    pub fn remove(&mut self, id: SegmentId) -> Option<Segment> {
        let pos = self.segments.iter().position(|s| s.id == id)?;
        Some(self.segments.remove(pos))
    }

    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == id)
    }

    /// Insertion order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// A fresh, sorted and filtered snapshot of the store.
    ///
    /// With a category filter, segments whose action is missing from the
    /// catalog never match. `CategoryFilter::All` keeps everything.
    pub fn list(
        &self,
        sort: SortKey,
        filter: CategoryFilter,
        catalog: &ActionCatalog,
    ) -> Vec<&Segment> {
        self.segments
            .iter()
            .filter(|segment| match filter {
                CategoryFilter::All => true,
                CategoryFilter::Only(category) => {
                    catalog.category_of(segment.action_id) == Some(category)
                }
            })
            .sorted_by(|a, b| match sort {
                SortKey::ByTime => a.start_time.total_cmp(&b.start_time),
                SortKey::ByAction => a.action_id.cmp(&b.action_id),
            })
            .collect()
    }

    pub fn count(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
