use crate::catalog::{ActionCatalog, ActionId};
use crate::segment::{CategoryFilter, SegmentId, SegmentStore, SortKey};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const UNKNOWN_ACTION: &str = "UNKNOWN";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSegment {
    pub id: SegmentId,
    pub action: String,
    pub action_id: ActionId,
    pub start_time: f64,
    pub end_time: f64,
    pub start_frame: i64,
    pub end_frame: i64,
}

/// Labels for one video, as handed to the training pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub video_file: String,
    pub labeled_by: String,
    pub date: String,
    pub segments: Vec<ExportSegment>,
}

fn round_millis(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

/// Build the export for `store`, segments in ascending start time
pub fn build_export(
    video_file: &str,
    labeled_by: &str,
    date: NaiveDate,
    store: &SegmentStore,
    catalog: &ActionCatalog,
) -> ExportDocument {
    let segments = store
        .list(SortKey::ByTime, CategoryFilter::All, catalog)
        .into_iter()
        .map(|segment| ExportSegment {
            id: segment.id,
            action: catalog
                .lookup(segment.action_id)
                .map(|a| a.export_name())
                .unwrap_or_else(|| UNKNOWN_ACTION.to_string()),
            action_id: segment.action_id,
            start_time: round_millis(segment.start_time),
            end_time: round_millis(segment.end_time),
            start_frame: segment.start_frame,
            end_frame: segment.end_frame,
        })
        .collect();

    ExportDocument {
        video_file: video_file.to_string(),
        labeled_by: labeled_by.to_string(),
        date: date.format("%Y-%m-%d").to_string(),
        segments,
    }
}

impl ExportDocument {
    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// One row per segment, prefixed with the video file name
    pub fn to_csv(&self) -> Result<String, ExportError> {
        #[derive(Serialize)]
        struct Row<'a> {
            video_file: &'a str,
            id: SegmentId,
            action: &'a str,
            action_id: ActionId,
            start_time: f64,
            end_time: f64,
            start_frame: i64,
            end_frame: i64,
        }

        let mut writer = csv::Writer::from_writer(vec![]);
        for segment in &self.segments {
            writer.serialize(Row {
                video_file: &self.video_file,
                id: segment.id,
                action: &segment.action,
                action_id: segment.action_id,
                start_time: segment.start_time,
                end_time: segment.end_time,
                start_frame: segment.start_frame,
                end_frame: segment.end_frame,
            })?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| ExportError::Io(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn render(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Json => self.to_json_pretty(),
            ExportFormat::Csv => self.to_csv(),
        }
    }

    /// Write into `dir` as `<video stem>.labels.<ext>`, returning the path written
    pub fn write_to_dir<P: AsRef<Path>>(
        &self,
        dir: P,
        format: ExportFormat,
    ) -> Result<PathBuf, ExportError> {
        let path = dir.as_ref().join(export_file_name(&self.video_file, format));
        self.write_to_path(&path, format)?;
        Ok(path)
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, path: P, format: ExportFormat) -> Result<(), ExportError> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.render(format)?)?;
        Ok(())
    }
}

pub fn export_file_name(video_file: &str, format: ExportFormat) -> String {
    let stem = Path::new(video_file)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(video_file);
    format!("{}.labels.{}", stem, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Segment;
    use tempfile::tempdir;

    fn store() -> SegmentStore {
        SegmentStore::from_segments(vec![
            Segment {
                id: 2,
                action_id: 4,
                start_time: 18.1,
                end_time: 18.9,
                start_frame: 543,
                end_frame: 567,
            },
            Segment {
                id: 1,
                action_id: 0,
                start_time: 5.2000004,
                end_time: 5.8,
                start_frame: 156,
                end_frame: 174,
            },
            Segment {
                id: 3,
                action_id: 77,
                start_time: 30.0,
                end_time: 31.0,
                start_frame: 900,
                end_frame: 930,
            },
        ])
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    #[test]
    fn test_build_export_orders_by_time_and_names_actions() {
        let catalog = ActionCatalog::boxing();
        let doc = build_export("fight_001.mp4", "annotator", date(), &store(), &catalog);

        assert_eq!(doc.video_file, "fight_001.mp4");
        assert_eq!(doc.labeled_by, "annotator");
        assert_eq!(doc.date, "2026-03-14");

        let ids: Vec<SegmentId> = doc.segments.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        assert_eq!(doc.segments[0].action, "JAB_H");
        assert_eq!(doc.segments[0].start_time, 5.2);
        assert_eq!(doc.segments[1].action, "L_HOOK_H");
        assert_eq!(doc.segments[1].start_frame, 543);
        assert_eq!(doc.segments[2].action, UNKNOWN_ACTION);
    }

    #[test]
    fn test_json_field_names() {
        let catalog = ActionCatalog::boxing();
        let doc = build_export("fight_001.mp4", "annotator", date(), &store(), &catalog);
        let json: serde_json::Value = serde_json::from_str(&doc.to_json_pretty().unwrap()).unwrap();

        assert_eq!(json["video_file"], "fight_001.mp4");
        assert_eq!(json["date"], "2026-03-14");
        let first = &json["segments"][0];
        assert_eq!(first["id"], 1);
        assert_eq!(first["action"], "JAB_H");
        assert_eq!(first["action_id"], 0);
        assert_eq!(first["start_time"], 5.2);
        assert_eq!(first["end_time"], 5.8);
        assert_eq!(first["start_frame"], 156);
        assert_eq!(first["end_frame"], 174);
    }

    #[test]
    fn test_csv_export() {
        let catalog = ActionCatalog::boxing();
        let doc = build_export("fight_001.mp4", "annotator", date(), &store(), &catalog);
        let csv = doc.to_csv().unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("video_file,id,action,action_id,start_time,end_time,start_frame,end_frame")
        );
        assert_eq!(lines.next(), Some("fight_001.mp4,1,JAB_H,0,5.2,5.8,156,174"));
        assert_eq!(csv.lines().count(), 4);
    }

    #[test]
    fn test_write_to_dir() {
        let dir = tempdir().unwrap();
        let catalog = ActionCatalog::boxing();
        let doc = build_export("fight_001.mp4", "annotator", date(), &store(), &catalog);

        let path = doc.write_to_dir(dir.path(), ExportFormat::Json).unwrap();
        assert_eq!(path.file_name().unwrap(), "fight_001.labels.json");

        let loaded: ExportDocument =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_empty_store_exports_empty_list() {
        let catalog = ActionCatalog::boxing();
        let doc = build_export("x.mp4", "me", date(), &SegmentStore::new(), &catalog);
        assert!(doc.segments.is_empty());
        assert_eq!(export_file_name("x.mp4", ExportFormat::Csv), "x.labels.csv");
    }
}
