use crate::app_dirs::AppDirs;
use crate::segment::Segment;
use chrono::Local;
use rusqlite::{params, Connection, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Per-video segment persistence, keyed by video file name
pub trait SegmentRepository {
    fn load_video_segments(&self, video_file: &str) -> Result<Vec<Segment>>;
    fn save_video_segments(&mut self, video_file: &str, segments: &[Segment]) -> Result<()>;
    fn segment_counts(&self) -> Result<HashMap<String, usize>>;
}

/// SQLite-backed segment storage
#[derive(Debug)]
pub struct SegmentDb {
    conn: Connection,
}

impl SegmentDb {
    /// Open the database at the default state location
    pub fn new() -> Result<Self> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("strikemark.db"));
        Self::open(db_path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS segments (
                video_file TEXT NOT NULL,
                id INTEGER NOT NULL,
                position INTEGER NOT NULL,
                action_id INTEGER NOT NULL,
                start_time REAL NOT NULL,
                end_time REAL NOT NULL,
                start_frame INTEGER NOT NULL,
                end_frame INTEGER NOT NULL,
                saved_at TEXT NOT NULL,
                PRIMARY KEY (video_file, id)
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_segments_video ON segments(video_file, position)",
            [],
        )?;

        Ok(SegmentDb { conn })
    }

    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM segments", [])?;
        Ok(())
    }
}

impl SegmentRepository for SegmentDb {
    fn load_video_segments(&self, video_file: &str) -> Result<Vec<Segment>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, action_id, start_time, end_time, start_frame, end_frame
            FROM segments
            WHERE video_file = ?1
            ORDER BY position
            "#,
        )?;

        let rows = stmt.query_map([video_file], |row| {
            Ok(Segment {
                id: row.get::<_, i64>(0)? as u64,
                action_id: row.get(1)?,
                start_time: row.get(2)?,
                end_time: row.get(3)?,
                start_frame: row.get(4)?,
                end_frame: row.get(5)?,
            })
        })?;

        let segments = rows.collect::<Result<Vec<_>>>()?;
        Ok(segments)
    }

    /// Replace the stored set for `video_file` in one transaction
    fn save_video_segments(&mut self, video_file: &str, segments: &[Segment]) -> Result<()> {
        let saved_at = Local::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM segments WHERE video_file = ?1", [video_file])?;

        for (position, segment) in segments.iter().enumerate() {
            tx.execute(
                r#"
                INSERT INTO segments
                (video_file, id, position, action_id, start_time, end_time, start_frame, end_frame, saved_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    video_file,
                    segment.id as i64,
                    position as i64,
                    segment.action_id,
                    segment.start_time,
                    segment.end_time,
                    segment.start_frame,
                    segment.end_frame,
                    saved_at,
                ],
            )?;
        }

        tx.commit()
    }

    fn segment_counts(&self) -> Result<HashMap<String, usize>> {
        let mut stmt = self
            .conn
            .prepare("SELECT video_file, COUNT(*) FROM segments GROUP BY video_file")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
        })?;
        let counts = rows.collect::<Result<HashMap<_, _>>>()?;
        Ok(counts)
    }
}

/// Volatile repository used when persistence is disabled and in tests
#[derive(Debug, Default, Clone)]
pub struct MemoryRepository {
    videos: HashMap<String, Vec<Segment>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_video(mut self, video_file: &str, segments: Vec<Segment>) -> Self {
        self.videos.insert(video_file.to_string(), segments);
        self
    }
}

impl SegmentRepository for MemoryRepository {
    fn load_video_segments(&self, video_file: &str) -> Result<Vec<Segment>> {
        Ok(self.videos.get(video_file).cloned().unwrap_or_default())
    }

    fn save_video_segments(&mut self, video_file: &str, segments: &[Segment]) -> Result<()> {
        self.videos
            .insert(video_file.to_string(), segments.to_vec());
        Ok(())
    }

    fn segment_counts(&self) -> Result<HashMap<String, usize>> {
        Ok(self
            .videos
            .iter()
            .map(|(video, segments)| (video.clone(), segments.len()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn segment(id: u64, action_id: u32, start_time: f64) -> Segment {
        Segment {
            id,
            action_id,
            start_time,
            end_time: start_time + 1.0,
            start_frame: (start_time * 30.0).round() as i64,
            end_frame: ((start_time + 1.0) * 30.0).round() as i64,
        }
    }

    #[test]
    fn test_save_and_load_preserves_insertion_order() {
        let mut db = SegmentDb::open_in_memory().unwrap();
        let segments = vec![segment(5, 2, 9.0), segment(2, 0, 1.5), segment(9, 11, 4.25)];
        db.save_video_segments("fight_001.mp4", &segments).unwrap();

        let loaded = db.load_video_segments("fight_001.mp4").unwrap();
        assert_eq!(loaded, segments);
        assert!(db.load_video_segments("fight_002.mp4").unwrap().is_empty());
    }

    #[test]
    fn test_save_replaces_previous_set() {
        let mut db = SegmentDb::open_in_memory().unwrap();
        db.save_video_segments("a.mp4", &[segment(1, 0, 1.0), segment(2, 1, 3.0)])
            .unwrap();
        db.save_video_segments("b.mp4", &[segment(1, 4, 2.0)]).unwrap();
        db.save_video_segments("a.mp4", &[segment(2, 1, 3.0)]).unwrap();

        assert_eq!(db.load_video_segments("a.mp4").unwrap(), vec![segment(2, 1, 3.0)]);
        let counts = db.segment_counts().unwrap();
        assert_eq!(counts.get("a.mp4"), Some(&1));
        assert_eq!(counts.get("b.mp4"), Some(&1));
    }

    #[test]
    fn test_file_database_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("segments.db");
        {
            let mut db = SegmentDb::open(&path).unwrap();
            db.save_video_segments("a.mp4", &[segment(1, 0, 1.0)]).unwrap();
        }
        let db = SegmentDb::open(&path).unwrap();
        assert_eq!(db.load_video_segments("a.mp4").unwrap().len(), 1);

        db.clear_all().unwrap();
        assert!(db.segment_counts().unwrap().is_empty());
    }

    #[test]
    fn test_memory_repository() {
        let mut repo = MemoryRepository::new().with_video("a.mp4", vec![segment(1, 0, 1.0)]);
        assert_eq!(repo.load_video_segments("a.mp4").unwrap().len(), 1);
        repo.save_video_segments("a.mp4", &[]).unwrap();
        assert!(repo.load_video_segments("a.mp4").unwrap().is_empty());
        assert_eq!(repo.segment_counts().unwrap().get("a.mp4"), Some(&0));
    }
}
