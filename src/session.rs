//! The annotation session: every operator input becomes a [`Command`] that is
//! applied atomically by [`AnnotationSession::handle`]. Playback time only
//! advances through [`Command::Tick`], so a user seek or mark issued in the
//! same turn always wins over the clock.

use crate::catalog::{ActionCatalog, ActionId};
use crate::config::Config;
use crate::db::SegmentRepository;
use crate::export::{build_export, ExportDocument, ExportFormat};
use crate::marking::{MarkController, MarkError};
use crate::playback::PlaybackClock;
use crate::queue::{QualityReport, VideoQueue};
use crate::segment::{CategoryFilter, Segment, SegmentId, SegmentStore, SortKey};
use crate::timeline::{clamp_zoom, TimelineView, ZOOM_STEP};
use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// How long a pressed action hotkey stays highlighted
pub const KEY_FLASH: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    TogglePlay,
    StepFrames(i32),
    Jump(f64),
    Seek(f64),
    /// Click at a fraction (0.0-1.0) of the timeline track width
    SeekFraction(f64),
    MarkIn,
    MarkOut,
    Commit,
    ClearMarks,
    CancelSelection,
    SelectAction(ActionId),
    SelectHotkey(char),
    NextVideo,
    PreviousVideo,
    ToggleHelp,
    ToggleExportPreview,
    ZoomIn,
    ZoomOut,
    SpeedUp,
    SpeedDown,
    ToggleSort,
    CycleFilter,
    ListUp,
    ListDown,
    EditSelected,
    DeleteSelected,
    EditSegment(SegmentId),
    DeleteSegment(SegmentId),
    ToggleComplete,
    Save,
    Export,
    Tick(Duration),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackLevel {
    Success,
    Info,
    Error,
}

/// Transient user-facing notification produced by a command
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub level: FeedbackLevel,
    pub title: String,
    pub detail: Option<String>,
}

impl Feedback {
    pub fn success(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            level: FeedbackLevel::Success,
            title: title.into(),
            detail: Some(detail.into()),
        }
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self {
            level: FeedbackLevel::Info,
            title: title.into(),
            detail: None,
        }
    }

    pub fn error(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            level: FeedbackLevel::Error,
            title: title.into(),
            detail: Some(detail.into()),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl From<MarkError> for Feedback {
    fn from(err: MarkError) -> Self {
        let title = match &err {
            MarkError::InvalidMarkOut => "Invalid mark out",
            MarkError::IncompleteSelection { .. } => "Cannot save",
            MarkError::SegmentTooShort { .. } => "Segment too short",
            MarkError::UnknownAction(_) => "Unknown action",
        };
        Feedback::error(title, err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub labeled_by: String,
    pub zoom: f64,
    pub playback_speed: f64,
    pub min_segment_frames: i64,
    pub autosave: bool,
    pub export_dir: Option<PathBuf>,
    pub export_format: ExportFormat,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SessionOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            labeled_by: cfg.labeled_by.clone(),
            zoom: cfg.default_zoom,
            playback_speed: cfg.playback_speed,
            min_segment_frames: cfg.min_segment_frames,
            autosave: cfg.autosave,
            export_dir: None,
            export_format: ExportFormat::Json,
        }
    }
}

/// Sort, filter and cursor of the segment list panel
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ListState {
    pub sort: SortKey,
    pub filter: CategoryFilter,
    pub cursor: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct KeyFlash {
    key: char,
    remaining: Duration,
}

pub struct AnnotationSession {
    catalog: Arc<ActionCatalog>,
    queue: VideoQueue,
    store: SegmentStore,
    marks: MarkController,
    clock: PlaybackClock,
    repository: Box<dyn SegmentRepository>,
    options: SessionOptions,
    zoom: f64,
    list: ListState,
    show_help: bool,
    show_export_preview: bool,
    flash: Option<KeyFlash>,
}

impl AnnotationSession {
    pub fn new(
        catalog: Arc<ActionCatalog>,
        mut queue: VideoQueue,
        repository: Box<dyn SegmentRepository>,
        options: SessionOptions,
    ) -> Self {
        match repository.segment_counts() {
            Ok(counts) => {
                for (video_file, count) in counts {
                    queue.set_labeled_count(&video_file, count);
                }
            }
            Err(e) => log::warn!("unable to read stored segment counts: {}", e),
        }

        let video = queue.current();
        let mut clock = PlaybackClock::new(video.duration, video.fps);
        clock.set_speed(options.playback_speed);

        let mut session = Self {
            marks: MarkController::with_min_frames(Arc::clone(&catalog), options.min_segment_frames),
            catalog,
            store: SegmentStore::new(),
            clock,
            repository,
            zoom: clamp_zoom(options.zoom),
            options,
            queue,
            list: ListState::default(),
            show_help: false,
            show_export_preview: false,
            flash: None,
        };
        session.load_current_video();
        session
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    pub fn queue(&self) -> &VideoQueue {
        &self.queue
    }

    pub fn store(&self) -> &SegmentStore {
        &self.store
    }

    pub fn marks(&self) -> &MarkController {
        &self.marks
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn list_state(&self) -> ListState {
        self.list
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn show_export_preview(&self) -> bool {
        self.show_export_preview
    }

    /// Hotkey pressed within the last [`KEY_FLASH`]
    pub fn flashed_key(&self) -> Option<char> {
        self.flash.map(|f| f.key)
    }

    pub fn view(&self) -> TimelineView {
        TimelineView::new(self.clock.duration(), self.zoom, self.clock.current_time())
    }

    pub fn quality(&self) -> QualityReport {
        QualityReport::for_video(self.queue.current())
    }

    /// Segments as shown in the list panel
    pub fn visible_segments(&self) -> Vec<&Segment> {
        self.store.list(self.list.sort, self.list.filter, &self.catalog)
    }

    pub fn highlighted_segment(&self) -> Option<&Segment> {
        self.visible_segments().get(self.list.cursor).copied()
    }

    /// Segment under a click at `fraction` of the timeline width
    pub fn segment_at_fraction(&self, fraction: f64) -> Option<SegmentId> {
        let time = self.view().percent_to_time(fraction * 100.0);
        self.store
            .segments()
            .iter()
            .find(|s| s.start_time <= time && time <= s.end_time)
            .map(|s| s.id)
    }

    pub fn export_document(&self, date: NaiveDate) -> ExportDocument {
        build_export(
            &self.queue.current().filename,
            &self.options.labeled_by,
            date,
            &self.store,
            &self.catalog,
        )
    }

    pub fn handle(&mut self, command: Command) -> Option<Feedback> {
        match command {
            Command::TogglePlay => {
                self.clock.toggle();
                None
            }
            Command::StepFrames(frames) => {
                self.clock.step_frames(frames);
                None
            }
            Command::Jump(seconds) => {
                self.clock.jump(seconds);
                None
            }
            Command::Seek(time) => {
                self.clock.seek(time);
                None
            }
            Command::SeekFraction(fraction) => {
                let time = self.view().seek_time(fraction);
                self.clock.seek(time);
                None
            }
            Command::MarkIn => {
                self.clock.pause();
                let at = self.marks.set_mark_in(self.clock.current_time());
                Some(Feedback::success("Mark In set", format!("At {:.2}s", at)))
            }
            Command::MarkOut => {
                self.clock.pause();
                match self.marks.set_mark_out(self.clock.current_time()) {
                    Ok(at) => Some(Feedback::success("Mark Out set", format!("At {:.2}s", at))),
                    Err(e) => Some(e.into()),
                }
            }
            Command::Commit => Some(self.commit()),
            Command::ClearMarks => {
                self.marks.clear_marks();
                Some(Feedback::info("Selection cleared"))
            }
            Command::CancelSelection => {
                if self.show_help || self.show_export_preview {
                    self.show_help = false;
                    self.show_export_preview = false;
                } else {
                    self.marks.cancel_selection();
                }
                None
            }
            Command::SelectAction(id) => self.marks.select_action(id).err().map(Feedback::from),
            Command::SelectHotkey(key) => {
                let id = self.catalog.find_by_hotkey(key).map(|a| a.id)?;
                self.flash = Some(KeyFlash {
                    key,
                    remaining: KEY_FLASH,
                });
                self.marks.select_action(id).err().map(Feedback::from)
            }
            Command::NextVideo => self.switch_video(VideoQueue::next),
            Command::PreviousVideo => self.switch_video(VideoQueue::previous),
            Command::ToggleHelp => {
                self.show_help = !self.show_help;
                None
            }
            Command::ToggleExportPreview => {
                self.show_export_preview = !self.show_export_preview;
                None
            }
            Command::ZoomIn => {
                self.zoom = clamp_zoom(self.zoom + ZOOM_STEP);
                None
            }
            Command::ZoomOut => {
                self.zoom = clamp_zoom(self.zoom - ZOOM_STEP);
                None
            }
            Command::SpeedUp => {
                self.clock.faster();
                None
            }
            Command::SpeedDown => {
                self.clock.slower();
                None
            }
            Command::ToggleSort => {
                self.list.sort = self.list.sort.toggled();
                self.list.cursor = 0;
                None
            }
            Command::CycleFilter => {
                self.list.filter = self.list.filter.next();
                self.list.cursor = 0;
                None
            }
            Command::ListUp => {
                self.list.cursor = self.list.cursor.saturating_sub(1);
                None
            }
            Command::ListDown => {
                let len = self.visible_segments().len();
                if self.list.cursor + 1 < len {
                    self.list.cursor += 1;
                }
                None
            }
            Command::EditSelected => {
                let id = self.highlighted_segment()?.id;
                self.edit_segment(id)
            }
            Command::DeleteSelected => {
                let id = self.highlighted_segment()?.id;
                self.delete_segment(id)
            }
            Command::EditSegment(id) => self.edit_segment(id),
            Command::DeleteSegment(id) => self.delete_segment(id),
            Command::ToggleComplete => {
                let status = self.queue.toggle_complete();
                Some(Feedback::info(format!("Video marked {}", status.to_string().to_lowercase())))
            }
            Command::Save => Some(match self.persist() {
                Ok(()) => Feedback::success("Progress saved", format!("{} segments", self.store.count())),
                Err(e) => Feedback::error("Save failed", e.to_string()),
            }),
            Command::Export => Some(self.export()),
            Command::Tick(elapsed) => {
                self.clock.tick();
                if let Some(flash) = self.flash.as_mut() {
                    flash.remaining = flash.remaining.saturating_sub(elapsed);
                    if flash.remaining.is_zero() {
                        self.flash = None;
                    }
                }
                None
            }
            Command::Quit => {
                self.persist_if_autosave();
                None
            }
        }
    }

    fn commit(&mut self) -> Feedback {
        match self.marks.commit(self.clock.fps(), &mut self.store) {
            Ok(segment) => {
                self.queue.update_progress(self.store.count());
                self.persist_if_autosave();
                let name = self
                    .catalog
                    .lookup(segment.action_id)
                    .map(|a| a.name.clone())
                    .unwrap_or_default();
                Feedback::success("Segment saved", name)
            }
            Err(e) => e.into(),
        }
    }

    fn edit_segment(&mut self, id: SegmentId) -> Option<Feedback> {
        let segment = self.store.get(id)?.clone();
        let seek_to = self.marks.load_for_edit(&segment);
        self.clock.seek(seek_to);
        Some(Feedback::info("Editing segment").with_detail(format!(
            "Commit replaces segment #{}",
            segment.id
        )))
    }

    fn delete_segment(&mut self, id: SegmentId) -> Option<Feedback> {
        self.store.remove(id)?;
        log::info!("deleted segment {}", id);
        let len = self.visible_segments().len();
        if self.list.cursor >= len {
            self.list.cursor = len.saturating_sub(1);
        }
        self.queue.update_progress(self.store.count());
        self.persist_if_autosave();
        Some(Feedback::info("Segment deleted"))
    }

    fn export(&mut self) -> Feedback {
        let Some(dir) = self.options.export_dir.clone() else {
            return Feedback::error("Export failed", "no export directory configured");
        };
        let doc = self.export_document(Local::now().date_naive());
        match doc.write_to_dir(&dir, self.options.export_format) {
            Ok(path) => {
                log::info!("exported {} segments to {}", doc.segments.len(), path.display());
                Feedback::success("Exported", path.display().to_string())
            }
            Err(e) => {
                log::error!("export failed: {}", e);
                Feedback::error("Export failed", e.to_string())
            }
        }
    }

    pub fn persist(&mut self) -> rusqlite::Result<()> {
        let video_file = self.queue.current().filename.clone();
        self.repository
            .save_video_segments(&video_file, self.store.segments())
    }

    fn persist_if_autosave(&mut self) {
        if self.options.autosave {
            if let Err(e) = self.persist() {
                log::error!("autosave failed: {}", e);
            }
        }
    }

    /// Committed labels of the outgoing video are written regardless of
    /// autosave. A failed write keeps the operator on the current video.
    fn switch_video(&mut self, advance: fn(&mut VideoQueue) -> bool) -> Option<Feedback> {
        if let Err(e) = self.persist() {
            log::error!("unable to save segments before switching video: {}", e);
            return Some(Feedback::error(
                "Save failed",
                format!("still on {}: {}", self.queue.current().filename, e),
            ));
        }
        if advance(&mut self.queue) {
            Some(self.load_current_video())
        } else {
            None
        }
    }

    fn load_current_video(&mut self) -> Feedback {
        let video = self.queue.current().clone();
        let segments = match self.repository.load_video_segments(&video.filename) {
            Ok(segments) => segments,
            Err(e) => {
                log::error!("unable to load segments for {}: {}", video.filename, e);
                Vec::new()
            }
        };

        self.store = SegmentStore::from_segments(segments);
        self.marks.reset();
        self.clock.load(video.duration, video.fps);
        self.list.cursor = 0;
        self.queue.update_progress(self.store.count());
        log::info!(
            "opened {} ({} segments, {}fps)",
            video.filename,
            self.store.count(),
            video.fps
        );

        Feedback::info(format!("Loaded {}", video.filename))
            .with_detail(format!("{} segments", self.store.count()))
    }
}
