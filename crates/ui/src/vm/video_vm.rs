//! Transport controls for a native video surface.
//!
//! [`VideoController`] never touches the surface itself: every mutation
//! returns the [`PlayerCommand`]s the host must forward, and time enters only
//! through the `now` arguments so overlay auto-hide is testable without sleeping.

use std::time::{Duration, Instant};

use crate::vm::time_fmt::format_position;

/// Playback rates offered by the speed button, in cycle order.
pub const SPEED_STEPS: [f64; 6] = [0.5, 0.75, 1.0, 1.25, 1.5, 2.0];

const NORMAL_SPEED_INDEX: usize = 2;

/// Inactivity after which the overlay hides while playing.
pub const OVERLAY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default jump for the skip buttons.
pub const SKIP_SECONDS: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayerCommand {
    Play,
    Pause,
    SeekTo(f64),
    SetRate(f64),
    LockOrientation(Orientation),
    /// Show or hide the host's status and navigation bars.
    SetHostChrome { visible: bool },
}

#[derive(Clone, Debug, PartialEq)]
pub struct VideoOverlayVm {
    pub visible: bool,
    pub play_label: &'static str,
    pub position_label: String,
    pub duration_label: String,
    pub progress: f64,
    pub speed_label: String,
    pub fullscreen: bool,
}

#[derive(Clone, Debug)]
pub struct VideoController {
    duration: f64,
    position: f64,
    playing: bool,
    fullscreen: bool,
    speed_index: usize,
    overlay_visible: bool,
    hide_at: Option<Instant>,
}

impl VideoController {
    /// Starts paused at zero with the overlay shown.
    #[must_use]
    pub fn new(duration_seconds: f64) -> Self {
        Self {
            duration: sanitize(duration_seconds),
            position: 0.0,
            playing: false,
            fullscreen: false,
            speed_index: NORMAL_SPEED_INDEX,
            overlay_visible: true,
            hide_at: None,
        }
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    #[must_use]
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    #[must_use]
    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    #[must_use]
    pub fn position(&self) -> f64 {
        self.position
    }

    #[must_use]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    #[must_use]
    pub fn speed(&self) -> f64 {
        SPEED_STEPS[self.speed_index]
    }

    /// When the host should next call [`VideoController::tick`], if ever.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.hide_at
    }

    pub fn play(&mut self, now: Instant) -> Vec<PlayerCommand> {
        if self.playing {
            return Vec::new();
        }
        let mut commands = Vec::new();
        if self.position >= self.duration && self.duration > 0.0 {
            self.position = 0.0;
            commands.push(PlayerCommand::SeekTo(0.0));
        }
        self.playing = true;
        self.show_overlay(now);
        commands.push(PlayerCommand::Play);
        commands
    }

    pub fn pause(&mut self, now: Instant) -> Vec<PlayerCommand> {
        if !self.playing {
            return Vec::new();
        }
        self.playing = false;
        self.show_overlay(now);
        vec![PlayerCommand::Pause]
    }

    pub fn toggle_play(&mut self, now: Instant) -> Vec<PlayerCommand> {
        if self.playing {
            self.pause(now)
        } else {
            self.play(now)
        }
    }

    /// A tap on the surface: shows the overlay and restarts the hide countdown.
    pub fn tap(&mut self, now: Instant) {
        self.show_overlay(now);
    }

    /// Hides the overlay once its deadline passed. Returns true if it changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.hide_at {
            Some(at) if now >= at => {
                self.overlay_visible = false;
                self.hide_at = None;
                true
            }
            _ => false,
        }
    }

    pub fn seek_to(&mut self, seconds: f64, now: Instant) -> Vec<PlayerCommand> {
        self.position = self.clamp(seconds);
        self.show_overlay(now);
        vec![PlayerCommand::SeekTo(self.position)]
    }

    /// Relative seek; negative deltas rewind.
    pub fn skip(&mut self, delta_seconds: f64, now: Instant) -> Vec<PlayerCommand> {
        self.seek_to(self.position + sanitize_signed(delta_seconds), now)
    }

    pub fn cycle_speed(&mut self, now: Instant) -> Vec<PlayerCommand> {
        self.speed_index = (self.speed_index + 1) % SPEED_STEPS.len();
        self.show_overlay(now);
        vec![PlayerCommand::SetRate(self.speed())]
    }

    pub fn toggle_fullscreen(&mut self, now: Instant) -> Vec<PlayerCommand> {
        self.fullscreen = !self.fullscreen;
        self.show_overlay(now);
        let orientation = if self.fullscreen {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        };
        vec![
            PlayerCommand::LockOrientation(orientation),
            PlayerCommand::SetHostChrome {
                visible: !self.fullscreen,
            },
        ]
    }

    /// Position report from the native surface.
    pub fn on_progress(&mut self, seconds: f64) {
        self.position = self.clamp(seconds);
    }

    /// Playback reached the end: stop and keep the controls up.
    pub fn on_ended(&mut self) {
        self.position = self.duration;
        self.playing = false;
        self.overlay_visible = true;
        self.hide_at = None;
    }

    #[must_use]
    pub fn overlay(&self) -> VideoOverlayVm {
        let progress = if self.duration > 0.0 {
            self.position / self.duration
        } else {
            0.0
        };
        VideoOverlayVm {
            visible: self.overlay_visible,
            play_label: if self.playing { "Pause" } else { "Play" },
            position_label: format_position(self.position),
            duration_label: format_position(self.duration),
            progress,
            speed_label: format!("{}x", self.speed()),
            fullscreen: self.fullscreen,
        }
    }

    fn show_overlay(&mut self, now: Instant) {
        self.overlay_visible = true;
        // Paused video keeps its controls up.
        self.hide_at = self.playing.then(|| now + OVERLAY_TIMEOUT);
    }

    fn clamp(&self, seconds: f64) -> f64 {
        sanitize(seconds).min(self.duration)
    }
}

fn sanitize(seconds: f64) -> f64 {
    if seconds.is_finite() { seconds.max(0.0) } else { 0.0 }
}

fn sanitize_signed(seconds: f64) -> f64 {
    if seconds.is_finite() { seconds } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn overlay_hides_after_inactivity_only_while_playing() {
        let t0 = Instant::now();
        let mut video = VideoController::new(120.0);
        assert!(!video.tick(t0 + secs(60)));
        assert!(video.overlay_visible());

        assert_eq!(video.play(t0), vec![PlayerCommand::Play]);
        assert!(!video.tick(t0 + secs(4)));
        assert!(video.tick(t0 + secs(5)));
        assert!(!video.overlay_visible());
        assert_eq!(video.next_deadline(), None);
    }

    #[test]
    fn tap_rearms_the_hide_countdown() {
        let t0 = Instant::now();
        let mut video = VideoController::new(120.0);
        video.play(t0);
        video.tap(t0 + secs(4));
        assert!(!video.tick(t0 + secs(6)));
        assert!(video.tick(t0 + secs(9)));

        video.tap(t0 + secs(10));
        assert!(video.overlay_visible());
        video.pause(t0 + secs(11));
        assert!(!video.tick(t0 + secs(60)));
    }

    #[test]
    fn seeking_clamps_to_the_video() {
        let now = Instant::now();
        let mut video = VideoController::new(90.0);
        assert_eq!(video.skip(-SKIP_SECONDS, now), vec![PlayerCommand::SeekTo(0.0)]);
        assert_eq!(video.seek_to(500.0, now), vec![PlayerCommand::SeekTo(90.0)]);
        video.seek_to(45.0, now);
        video.skip(SKIP_SECONDS, now);
        assert_eq!(video.position(), 55.0);
        assert_eq!(video.seek_to(f64::NAN, now), vec![PlayerCommand::SeekTo(0.0)]);
    }

    #[test]
    fn speed_cycles_through_fixed_steps() {
        let now = Instant::now();
        let mut video = VideoController::new(10.0);
        assert_eq!(video.speed(), 1.0);
        let seen: Vec<f64> = (0..6)
            .map(|_| {
                video.cycle_speed(now);
                video.speed()
            })
            .collect();
        assert_eq!(seen, vec![1.25, 1.5, 2.0, 0.5, 0.75, 1.0]);
        assert_eq!(video.overlay().speed_label, "1x");
    }

    #[test]
    fn fullscreen_switches_orientation_and_host_chrome() {
        let now = Instant::now();
        let mut video = VideoController::new(10.0);
        assert_eq!(
            video.toggle_fullscreen(now),
            vec![
                PlayerCommand::LockOrientation(Orientation::Landscape),
                PlayerCommand::SetHostChrome { visible: false },
            ]
        );
        assert_eq!(
            video.toggle_fullscreen(now),
            vec![
                PlayerCommand::LockOrientation(Orientation::Portrait),
                PlayerCommand::SetHostChrome { visible: true },
            ]
        );
    }

    #[test]
    fn play_after_end_restarts_from_zero() {
        let now = Instant::now();
        let mut video = VideoController::new(30.0);
        video.play(now);
        video.on_ended();
        assert!(!video.is_playing());
        assert_eq!(
            video.play(now),
            vec![PlayerCommand::SeekTo(0.0), PlayerCommand::Play]
        );
        video.on_progress(15.0);
        let overlay = video.overlay();
        assert_eq!(overlay.position_label, "00:15");
        assert_eq!(overlay.progress, 0.5);
    }
}
