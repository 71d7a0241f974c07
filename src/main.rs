mod ui;

use chrono::Local;
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyEvent, MouseButton, MouseEvent,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Frame, Terminal,
};
use std::{
    cell::Cell,
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};
use strikemark::{
    app_dirs::AppDirs,
    catalog::ActionCatalog,
    config::{Config, ConfigStore, FileConfigStore},
    db::{MemoryRepository, SegmentDb, SegmentRepository},
    export::ExportFormat,
    keymap::map_key,
    logging::init_file_logger,
    queue::VideoQueue,
    runtime::{AppEvent, ChannelEventSource, EventSource, FixedTicker, Runner, Ticker},
    session::{AnnotationSession, Command, Feedback, SessionOptions},
};

/// How long a feedback message stays in the footer
const TOAST_DURATION: Duration = Duration::from_millis(2500);

/// keyboard-driven tui for labeling boxing strike segments
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    version,
    about,
    long_about = "Mark in and out points on fight footage, tag each segment with a strike from the boxing catalog, and export frame-accurate labels for model training."
)]
pub struct Cli {
    /// annotator name written into exports (saved to config)
    #[clap(short = 'u', long)]
    labeled_by: Option<String>,

    /// video id or file name to open first
    #[clap(short = 'v', long)]
    video: Option<String>,

    /// video manifest json; defaults to the bundled sample queue
    #[clap(short = 'm', long)]
    manifest: Option<PathBuf>,

    /// initial timeline zoom (1-10, saved to config)
    #[clap(short = 'z', long)]
    zoom: Option<f64>,

    /// playback speed (0.25, 0.5, 1 or 2, saved to config)
    #[clap(short = 's', long)]
    speed: Option<f64>,

    /// minimum segment length in frames, at least 1 (saved to config)
    #[clap(long, value_parser = clap::value_parser!(i64).range(1..))]
    min_frames: Option<i64>,

    /// write the stored labels of the start video to this path and exit
    #[clap(short = 'e', long)]
    export: Option<PathBuf>,

    /// export format
    #[clap(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// segment database path
    #[clap(long)]
    db: Option<PathBuf>,

    /// keep segments in memory only
    #[clap(long)]
    no_db: bool,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => ExportFormat::Json,
            OutputFormat::Csv => ExportFormat::Csv,
        }
    }
}

impl Cli {
    /// Fold command line overrides into the persisted config
    fn apply_to(&self, config: &mut Config) {
        if let Some(name) = &self.labeled_by {
            config.labeled_by = name.clone();
        }
        if let Some(zoom) = self.zoom {
            config.default_zoom = zoom;
        }
        if let Some(speed) = self.speed {
            config.playback_speed = speed;
        }
        if let Some(frames) = self.min_frames {
            config.min_segment_frames = frames;
        }
    }

    fn repository(&self) -> Box<dyn SegmentRepository> {
        if self.no_db {
            return Box::new(MemoryRepository::new());
        }
        let opened = match &self.db {
            Some(path) => SegmentDb::open(path),
            None => SegmentDb::new(),
        };
        match opened {
            Ok(db) => Box::new(db),
            Err(e) => {
                log::warn!("segment database unavailable, labels will not persist: {}", e);
                Box::new(MemoryRepository::new())
            }
        }
    }

    fn build_session(&self, config: &Config) -> Result<AnnotationSession, Box<dyn Error>> {
        let catalog = Arc::new(ActionCatalog::embedded("boxing")?);
        let mut queue = match &self.manifest {
            Some(path) => VideoQueue::from_path(path)?,
            None => VideoQueue::embedded()?,
        };
        if let Some(video) = &self.video {
            if !queue.select(video) {
                return Err(format!("unknown video: {}", video).into());
            }
        }

        let options = SessionOptions {
            export_dir: AppDirs::export_dir(),
            export_format: self.format.into(),
            ..SessionOptions::from(config)
        };

        Ok(AnnotationSession::new(catalog, queue, self.repository(), options))
    }
}

/// Feedback currently shown in the footer
#[derive(Debug, Clone)]
pub struct Toast {
    pub feedback: Feedback,
    pub remaining: Duration,
}

pub struct App {
    pub session: AnnotationSession,
    pub toast: Option<Toast>,
    /// Inner area of the timeline from the last draw, for mouse hit-testing
    timeline_area: Cell<Rect>,
}

impl App {
    pub fn new(session: AnnotationSession) -> Self {
        Self {
            session,
            toast: None,
            timeline_area: Cell::new(Rect::default()),
        }
    }

    /// Apply a command; returns true when the app should exit
    pub fn apply(&mut self, command: Command) -> bool {
        let quit = command == Command::Quit;
        if let Some(feedback) = self.session.handle(command) {
            self.toast = Some(Toast {
                feedback,
                remaining: TOAST_DURATION,
            });
        }
        quit
    }

    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        match map_key(key) {
            Some(command) => self.apply(command),
            None => false,
        }
    }

    /// Left click on the segment row edits the segment under the cursor;
    /// anywhere else on the timeline seeks.
    pub fn on_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let track = self.timeline_area.get();
        if track.width == 0
            || mouse.column < track.x
            || mouse.column >= track.x + track.width
            || mouse.row < track.y
            || mouse.row >= track.y + track.height
        {
            return;
        }

        let fraction = (mouse.column - track.x) as f64 / track.width as f64;
        let on_segment_row = mouse.row == track.y + 1;
        let command = match self.session.segment_at_fraction(fraction) {
            Some(id) if on_segment_row => Command::EditSegment(id),
            _ => Command::SeekFraction(fraction),
        };
        self.apply(command);
    }

    pub fn on_tick(&mut self, elapsed: Duration) {
        self.session.handle(Command::Tick(elapsed));
        if let Some(toast) = self.toast.as_mut() {
            toast.remaining = toast.remaining.saturating_sub(elapsed);
            if toast.remaining.is_zero() {
                self.toast = None;
            }
        }
    }

    pub fn export_preview_text(&self) -> String {
        let doc = self.session.export_document(Local::now().date_naive());
        doc.render(self.session.options().export_format)
            .unwrap_or_else(|e| format!("unable to render export: {}", e))
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(log_path) = AppDirs::log_path() {
        if let Err(e) = init_file_logger(&log_path) {
            eprintln!("logging disabled: {}", e);
        }
    }

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    cli.apply_to(&mut config);
    if let Err(e) = config_store.save(&config) {
        log::warn!("unable to save config {}: {}", config_store.path().display(), e);
    }

    let session = cli.build_session(&config)?;

    if let Some(path) = &cli.export {
        let doc = session.export_document(Local::now().date_naive());
        doc.write_to_path(path, cli.format.into())?;
        println!(
            "wrote {} segments for {} to {}",
            doc.segments.len(),
            doc.video_file,
            path.display()
        );
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session);
    let runner = Runner::new(ChannelEventSource::terminal(), FixedTicker::default());
    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    let tick_rate = runner.tick_interval();
    let mut last_tick = Instant::now();

    terminal.draw(|f| ui(app, f))?;

    loop {
        let quit = match runner.step() {
            AppEvent::Key(key) => app.on_key(key),
            AppEvent::Mouse(mouse) => {
                app.on_mouse(mouse);
                false
            }
            AppEvent::Resize | AppEvent::Tick => false,
        };
        if quit {
            break;
        }

        // keys arriving faster than the tick rate must not stall playback
        if last_tick.elapsed() >= tick_rate {
            app.on_tick(last_tick.elapsed());
            last_tick = Instant::now();
        }

        terminal.draw(|f| ui(app, f))?;
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    ui::screen::current_screen(app).render(app, f);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::backend::TestBackend;
    use strikemark::{
        runtime::ChannelEventSource,
        session::FeedbackLevel,
    };
    use tempfile::tempdir;

    fn test_app() -> App {
        let cli = Cli {
            no_db: true,
            ..Cli::default()
        };
        App::new(cli.build_session(&Config::default()).unwrap())
    }

    fn press(app: &mut App, c: char) -> bool {
        app.on_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 32)).unwrap();
        terminal.draw(|f| ui(app, f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["strikemark"]);
        assert_eq!(cli.labeled_by, None);
        assert_eq!(cli.video, None);
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.export.is_none());
        assert!(!cli.no_db);
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "strikemark",
            "--labeled-by",
            "sam",
            "--zoom",
            "2.5",
            "--speed",
            "0.5",
            "--min-frames",
            "8",
        ]);
        let mut config = Config::default();
        cli.apply_to(&mut config);
        assert_eq!(config.labeled_by, "sam");
        assert_eq!(config.default_zoom, 2.5);
        assert_eq!(config.playback_speed, 0.5);
        assert_eq!(config.min_segment_frames, 8);
        assert!(config.autosave);
    }

    #[test]
    fn test_cli_format_value_enum() {
        let cli = Cli::parse_from(["strikemark", "--format", "csv"]);
        assert_eq!(cli.format, OutputFormat::Csv);
        assert_eq!(ExportFormat::from(cli.format), ExportFormat::Csv);
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_cli_min_frames_must_be_positive() {
        assert!(Cli::try_parse_from(["strikemark", "--min-frames", "0"]).is_err());
        assert!(Cli::try_parse_from(["strikemark", "--min-frames", "-3"]).is_err());
        let cli = Cli::try_parse_from(["strikemark", "--min-frames", "1"]).unwrap();
        assert_eq!(cli.min_frames, Some(1));
    }

    #[test]
    fn test_unknown_start_video_is_an_error() {
        let cli = Cli {
            video: Some("nope.mp4".to_string()),
            no_db: true,
            ..Cli::default()
        };
        assert!(cli.build_session(&Config::default()).is_err());
    }

    #[test]
    fn test_start_video_and_config_applied() {
        let cli = Cli {
            video: Some("fight_002".to_string()),
            no_db: true,
            ..Cli::default()
        };
        let config = Config {
            default_zoom: 3.0,
            playback_speed: 2.0,
            ..Config::default()
        };
        let session = cli.build_session(&config).unwrap();
        assert_eq!(session.queue().current().filename, "fight_002.mp4");
        assert_eq!(session.zoom(), 3.0);
        assert_eq!(session.clock().speed(), 2.0);
    }

    #[test]
    fn test_keyboard_labeling_flow() {
        let mut app = test_app();
        app.apply(Command::Seek(5.2));
        press(&mut app, '[');
        app.apply(Command::Seek(5.8));
        press(&mut app, ']');
        press(&mut app, '3');
        app.on_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));

        let toast = app.toast.as_ref().unwrap();
        assert_eq!(toast.feedback.level, FeedbackLevel::Success);
        assert_eq!(toast.feedback.title, "Segment saved");
        assert_eq!(app.session.store().count(), 1);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = test_app();
        assert!(!press(&mut app, ' '));
        assert!(press(&mut app, 'q'));
        assert!(app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn test_toast_expires() {
        let mut app = test_app();
        press(&mut app, '[');
        assert!(app.toast.is_some());
        app.on_tick(Duration::from_millis(2000));
        assert!(app.toast.is_some());
        app.on_tick(Duration::from_millis(600));
        assert!(app.toast.is_none());
    }

    #[test]
    fn test_ui_renders_annotation_screen() {
        let app = test_app();
        let content = render(&app);
        assert!(content.contains("fight_001.mp4 (1/3)"));
        assert!(content.contains("Jab to Head"));
        assert!(content.contains("0 of 0 segments"));
        assert!(content.contains("Timeline"));
    }

    #[test]
    fn test_ui_renders_overlays() {
        let mut app = test_app();
        press(&mut app, '?');
        assert!(render(&app).contains("Keyboard shortcuts"));

        app.on_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        press(&mut app, 'v');
        let content = render(&app);
        assert!(content.contains("Export preview"));
        assert!(content.contains("fight_001.mp4"));
    }

    #[test]
    fn test_mouse_click_seeks_after_draw() {
        let mut app = test_app();
        render(&app);
        let track = app.timeline_area.get();
        assert!(track.width > 0);

        app.on_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: track.x + track.width / 2,
            row: track.y + 2,
            modifiers: KeyModifiers::NONE,
        });
        let expected = app.session.clock().duration() * (track.width / 2) as f64 / track.width as f64;
        assert!((app.session.clock().current_time() - expected).abs() < 1e-6);

        // clicks outside the track are ignored
        app.on_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        });
        assert!((app.session.clock().current_time() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_start_tui_exits_on_quit() {
        let (tx, rx) = std::sync::mpsc::channel();
        tx.send(AppEvent::Key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE)))
            .unwrap();
        tx.send(AppEvent::Tick).unwrap();
        tx.send(AppEvent::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)))
            .unwrap();

        let runner = Runner::new(
            ChannelEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(1)),
        );
        let mut app = test_app();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        start_tui(&mut terminal, &mut app, &runner).unwrap();
        assert!(app.session.clock().is_playing());
    }

    #[test]
    fn test_labels_persist_across_sessions() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("segments.db");
        let cli = Cli {
            db: Some(db.clone()),
            ..Cli::default()
        };

        let mut app = App::new(cli.build_session(&Config::default()).unwrap());
        app.apply(Command::SelectAction(8));
        app.apply(Command::Seek(40.0));
        app.apply(Command::MarkIn);
        app.apply(Command::Seek(40.5));
        app.apply(Command::MarkOut);
        app.apply(Command::Commit);
        drop(app);

        let session = cli.build_session(&Config::default()).unwrap();
        assert_eq!(session.store().count(), 1);
        assert_eq!(session.store().segments()[0].action_id, 8);
    }
}
