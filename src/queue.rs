use crate::catalog::embedded_file;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
pub enum VideoStatus {
    #[strum(serialize = "Not started")]
    NotStarted,
    #[strum(serialize = "In progress")]
    InProgress,
    #[strum(serialize = "Complete")]
    Complete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoFile {
    pub id: String,
    pub filename: String,
    pub duration: f64,
    pub resolution: String,
    pub fps: f64,
    /// kbps
    pub bitrate: u32,
    pub status: VideoStatus,
    #[serde(default)]
    pub segments_labeled: usize,
    #[serde(default)]
    pub estimated_segments: usize,
}

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("unable to read video manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to parse video manifest: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("video manifest is empty")]
    Empty,

    #[error("video {0} must have a positive duration and frame rate")]
    InvalidVideo(String),
}

fn is_positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Ordered list of videos to label, with a cursor on the open one
#[derive(Debug, Clone)]
pub struct VideoQueue {
    videos: Vec<VideoFile>,
    current: usize,
}

impl VideoQueue {
    pub fn new(videos: Vec<VideoFile>) -> Result<Self, QueueError> {
        if videos.is_empty() {
            return Err(QueueError::Empty);
        }
        if let Some(bad) = videos
            .iter()
            .find(|v| !is_positive_finite(v.duration) || !is_positive_finite(v.fps))
        {
            return Err(QueueError::InvalidVideo(bad.filename.clone()));
        }
        Ok(Self { videos, current: 0 })
    }

    pub fn from_json(json: &str) -> Result<Self, QueueError> {
        Self::new(serde_json::from_str(json)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, QueueError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Sample queue bundled with the binary
    pub fn embedded() -> Result<Self, QueueError> {
        let contents = embedded_file("videos.json").ok_or(QueueError::Empty)?;
        Self::from_json(contents)
    }

    pub fn videos(&self) -> &[VideoFile] {
        &self.videos
    }

    pub fn current(&self) -> &VideoFile {
        &self.videos[self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    /// Move to the video with `id` or `filename`. Returns false if unknown.
    pub fn select(&mut self, key: &str) -> bool {
        match self
            .videos
            .iter()
            .position(|v| v.id == key || v.filename == key)
        {
            Some(idx) => {
                self.current = idx;
                true
            }
            None => false,
        }
    }

    /// Advance without wrapping. Returns false at the end of the queue.
    pub fn next(&mut self) -> bool {
        if self.current + 1 < self.videos.len() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    pub fn previous(&mut self) -> bool {
        if self.current > 0 {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    pub fn completed_count(&self) -> usize {
        self.videos
            .iter()
            .filter(|v| v.status == VideoStatus::Complete)
            .count()
    }

    pub fn progress_percent(&self) -> f64 {
        (self.completed_count() as f64 / self.videos.len() as f64) * 100.0
    }

    /// Record the current video's segment count; a first segment starts the video
    pub fn update_progress(&mut self, segments_labeled: usize) {
        let video = &mut self.videos[self.current];
        video.segments_labeled = segments_labeled;
        if video.status == VideoStatus::NotStarted && segments_labeled > 0 {
            video.status = VideoStatus::InProgress;
        }
    }

    pub fn set_labeled_count(&mut self, filename: &str, segments_labeled: usize) {
        if let Some(video) = self.videos.iter_mut().find(|v| v.filename == filename) {
            video.segments_labeled = segments_labeled;
        }
    }

    /// Flip the current video between complete and in progress
    pub fn toggle_complete(&mut self) -> VideoStatus {
        let video = &mut self.videos[self.current];
        video.status = match video.status {
            VideoStatus::Complete => VideoStatus::InProgress,
            _ => VideoStatus::Complete,
        };
        video.status
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualityCheck<T> {
    pub value: T,
    pub required: T,
    pub passed: bool,
}

/// Minimum-quality report for a video. Informational: labeling is never blocked.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityReport {
    pub fps: QualityCheck<f64>,
    pub resolution: QualityCheck<String>,
    pub bitrate: QualityCheck<u32>,
    pub duration: QualityCheck<f64>,
    pub codec: String,
}

pub const MIN_FPS: f64 = 24.0;
pub const MIN_BITRATE_KBPS: u32 = 1000;
pub const MIN_DURATION_SECS: f64 = 30.0;
pub const MIN_RESOLUTION: (u32, u32) = (640, 480);

fn parse_resolution(resolution: &str) -> Option<(u32, u32)> {
    let (w, h) = resolution.split_once(['x', 'X'])?;
    Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
}

impl QualityReport {
    pub fn for_video(video: &VideoFile) -> Self {
        let resolution_passed = parse_resolution(&video.resolution)
            .map(|(w, h)| w >= MIN_RESOLUTION.0 && h >= MIN_RESOLUTION.1)
            .unwrap_or(false);

        Self {
            fps: QualityCheck {
                value: video.fps,
                required: MIN_FPS,
                passed: video.fps >= MIN_FPS,
            },
            resolution: QualityCheck {
                value: video.resolution.clone(),
                required: format!("{}x{}", MIN_RESOLUTION.0, MIN_RESOLUTION.1),
                passed: resolution_passed,
            },
            bitrate: QualityCheck {
                value: video.bitrate,
                required: MIN_BITRATE_KBPS,
                passed: video.bitrate >= MIN_BITRATE_KBPS,
            },
            duration: QualityCheck {
                value: video.duration,
                required: MIN_DURATION_SECS,
                passed: video.duration >= MIN_DURATION_SECS,
            },
            codec: "h264".to_string(),
        }
    }

    pub fn all_passed(&self) -> bool {
        self.fps.passed && self.resolution.passed && self.bitrate.passed && self.duration.passed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn video(id: &str, status: VideoStatus) -> VideoFile {
        VideoFile {
            id: id.to_string(),
            filename: format!("fight_{}.mp4", id),
            duration: 60.0,
            resolution: "1280x720".to_string(),
            fps: 30.0,
            bitrate: 2000,
            status,
            segments_labeled: 0,
            estimated_segments: 10,
        }
    }

    #[test]
    fn test_embedded_queue() {
        let queue = VideoQueue::embedded().unwrap();
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.current().filename, "fight_001.mp4");
        assert_eq!(queue.completed_count(), 1);
    }

    #[test]
    fn test_next_previous_do_not_wrap() {
        let mut queue = VideoQueue::new(vec![
            video("1", VideoStatus::NotStarted),
            video("2", VideoStatus::NotStarted),
        ])
        .unwrap();
        assert!(!queue.previous());
        assert!(queue.next());
        assert_eq!(queue.current().id, "2");
        assert!(!queue.next());
        assert_eq!(queue.current_index(), 1);
        assert!(queue.previous());
        assert_eq!(queue.current().id, "1");
    }

    #[test]
    fn test_select_by_id_or_filename() {
        let mut queue = VideoQueue::new(vec![
            video("1", VideoStatus::NotStarted),
            video("2", VideoStatus::NotStarted),
        ])
        .unwrap();
        assert!(queue.select("fight_2.mp4"));
        assert_eq!(queue.current_index(), 1);
        assert!(queue.select("1"));
        assert_eq!(queue.current_index(), 0);
        assert!(!queue.select("missing.mp4"));
        assert_eq!(queue.current_index(), 0);
    }

    #[test]
    fn test_progress_starts_video() {
        let mut queue = VideoQueue::new(vec![video("1", VideoStatus::NotStarted)]).unwrap();
        queue.update_progress(0);
        assert_eq!(queue.current().status, VideoStatus::NotStarted);
        queue.update_progress(2);
        assert_eq!(queue.current().status, VideoStatus::InProgress);
        assert_eq!(queue.current().segments_labeled, 2);
    }

    #[test]
    fn test_toggle_complete_and_progress_percent() {
        let mut queue = VideoQueue::new(vec![
            video("1", VideoStatus::InProgress),
            video("2", VideoStatus::NotStarted),
        ])
        .unwrap();
        assert_eq!(queue.toggle_complete(), VideoStatus::Complete);
        assert_eq!(queue.progress_percent(), 50.0);
        assert_eq!(queue.toggle_complete(), VideoStatus::InProgress);
        assert_eq!(queue.progress_percent(), 0.0);
    }

    #[test]
    fn test_invalid_manifests() {
        assert_matches!(VideoQueue::new(vec![]), Err(QueueError::Empty));
        let mut broken = video("1", VideoStatus::NotStarted);
        broken.duration = 0.0;
        assert_matches!(VideoQueue::new(vec![broken]), Err(QueueError::InvalidVideo(_)));
        for bad in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let mut broken = video("1", VideoStatus::NotStarted);
            broken.duration = bad;
            assert_matches!(VideoQueue::new(vec![broken]), Err(QueueError::InvalidVideo(_)));
            let mut broken = video("1", VideoStatus::NotStarted);
            broken.fps = bad;
            assert_matches!(VideoQueue::new(vec![broken]), Err(QueueError::InvalidVideo(_)));
        }
        assert_matches!(VideoQueue::from_json("{"), Err(QueueError::Parse(_)));
    }

    #[test]
    fn test_quality_report() {
        let queue = VideoQueue::embedded().unwrap();
        let report = QualityReport::for_video(queue.current());
        assert!(report.all_passed());

        let mut poor = video("9", VideoStatus::NotStarted);
        poor.fps = 15.0;
        poor.resolution = "320x240".to_string();
        poor.bitrate = 800;
        poor.duration = 12.0;
        let report = QualityReport::for_video(&poor);
        assert!(!report.fps.passed);
        assert!(!report.resolution.passed);
        assert!(!report.bitrate.passed);
        assert!(!report.duration.passed);
        assert!(!report.all_passed());
    }

    #[test]
    fn test_unparsable_resolution_fails_check() {
        let mut odd = video("1", VideoStatus::NotStarted);
        odd.resolution = "hd".to_string();
        assert!(!QualityReport::for_video(&odd).resolution.passed);
    }
}
