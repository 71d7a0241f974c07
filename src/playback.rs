//! Simulated playhead: play/pause, frame stepping, jumps and variable speed.

/// Seconds of video time advanced per tick at 1x
pub const BASE_STEP: f64 = 1.0 / 30.0;

pub const SPEEDS: [f64; 4] = [0.25, 0.5, 1.0, 2.0];

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackClock {
    current_time: f64,
    duration: f64,
    fps: f64,
    speed: f64,
    playing: bool,
}

impl PlaybackClock {
    pub fn new(duration: f64, fps: f64) -> Self {
        Self {
            current_time: 0.0,
            duration,
            fps,
            speed: 1.0,
            playing: false,
        }
    }

    /// Switch to another video: playhead back at 0, paused, speed kept
    pub fn load(&mut self, duration: f64, fps: f64) {
        self.duration = duration;
        self.fps = fps;
        self.current_time = 0.0;
        self.playing = false;
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn current_frame(&self) -> i64 {
        (self.current_time * self.fps).round() as i64
    }

    pub fn total_frames(&self) -> i64 {
        (self.duration * self.fps).round() as i64
    }

    pub fn play(&mut self) {
        self.playing = true;
        log::debug!("playback started at {:.3}s ({}x)", self.current_time, self.speed);
    }

    pub fn pause(&mut self) {
        if self.playing {
            log::debug!("playback paused at {:.3}s", self.current_time);
        }
        self.playing = false;
    }

    pub fn toggle(&mut self) {
        if self.playing {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Advance one tick while playing. Stops at the end of the video.
    pub fn tick(&mut self) -> bool {
        if !self.playing {
            return false;
        }

        let next = self.current_time + BASE_STEP * self.speed;
        if next >= self.duration {
            self.current_time = self.duration;
            self.playing = false;
        } else {
            self.current_time = next;
        }
        true
    }

    /// User-driven seek. Pauses so the tick can't overwrite the new position.
    pub fn seek(&mut self, time: f64) {
        self.pause();
        self.current_time = time.clamp(0.0, self.duration);
    }

    pub fn step_frames(&mut self, frames: i32) {
        if self.fps > 0.0 {
            self.seek(self.current_time + frames as f64 / self.fps);
        }
    }

    pub fn jump(&mut self, seconds: f64) {
        self.seek(self.current_time + seconds);
    }

    /// Snap to the nearest supported speed
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = SPEEDS
            .iter()
            .copied()
            .min_by(|a, b| (a - speed).abs().total_cmp(&(b - speed).abs()))
            .unwrap_or(1.0);
    }

    pub fn faster(&mut self) {
        if let Some(next) = SPEEDS.iter().copied().find(|s| *s > self.speed) {
            self.speed = next;
        }
    }

    pub fn slower(&mut self) {
        if let Some(prev) = SPEEDS.iter().rev().copied().find(|s| *s < self.speed) {
            self.speed = prev;
        }
    }
}
