use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind, MouseEvent};

/// Playback tick interval, one video frame at 30fps
pub const TICK_RATE_MS: u64 = 33;

/// Input the annotation loop reacts to
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    Tick,
}

impl AppEvent {
    /// Terminal events the loop cares about. Key releases (reported on
    /// Windows) and focus/paste events are dropped.
    pub fn from_terminal(event: CtEvent) -> Option<Self> {
        match event {
            CtEvent::Key(key) if key.kind != KeyEventKind::Release => Some(AppEvent::Key(key)),
            CtEvent::Mouse(mouse) => Some(AppEvent::Mouse(mouse)),
            CtEvent::Resize(_, _) => Some(AppEvent::Resize),
            _ => None,
        }
    }
}

pub trait EventSource: Send + 'static {
    /// Next event, or `Err(Timeout)` once `timeout` passes without one
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Events delivered over a channel: fed by a terminal reader thread in the
/// binary, or directly by tests.
pub struct ChannelEventSource {
    rx: Receiver<AppEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }

    /// Spawn a thread reading crossterm events until the receiver is dropped
    pub fn terminal() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(raw) => match AppEvent::from_terminal(raw) {
                    Some(evt) => evt,
                    None => continue,
                },
                Err(e) => {
                    log::error!("terminal event stream failed: {}", e);
                    break;
                }
            };
            if tx.send(evt).is_err() {
                break;
            }
        });

        Self::new(rx)
    }
}

impl EventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for FixedTicker {
    fn default() -> Self {
        Self::new(Duration::from_millis(TICK_RATE_MS))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Hands the loop one event at a time, substituting a tick when input is idle
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        self.ticker.interval()
    }

    /// A closed source also yields ticks so playback keeps running
    pub fn step(&self) -> AppEvent {
        self.event_source
            .recv_timeout(self.ticker.interval())
            .unwrap_or(AppEvent::Tick)
    }
}
