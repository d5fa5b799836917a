// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

//! Transport state mirrored from the playback widget.
//!
//! Every operation takes the current instant and returns the command the
//! widget should receive; the controller itself never talks to the widget.
//! Timers are deadlines checked by [`PlayerController::tick`].

use std::time::{Duration, Instant};

use super::PlaybackState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlTiming {
    /// Idle time before the overlay hides while playing.
    pub controls_timeout: Duration,
    /// Period of the position sampler while playing.
    pub sample_interval: Duration,
}

impl Default for ControlTiming {
    fn default() -> Self {
        Self {
            controls_timeout: Duration::from_millis(3000),
            sample_interval: Duration::from_millis(250),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerRuntimeState {
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: f64,
    pub buffered_fraction: f64,
    pub is_muted: bool,
    pub controls_visible: bool,
}

impl Default for PlayerRuntimeState {
    fn default() -> Self {
        Self {
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            buffered_fraction: 0.0,
            is_muted: false,
            controls_visible: true,
        }
    }
}

impl PlayerRuntimeState {
    pub fn progress_fraction(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSample {
    pub current_time: f64,
    pub duration: f64,
    pub buffered_fraction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WidgetCommand {
    Play,
    Pause,
    SeekTo { seconds: f64, allow_seek_ahead: bool },
    Mute,
    Unmute,
}

/// What became due during a [`PlayerController::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tick {
    pub sample_due: bool,
    pub controls_hidden: bool,
}

#[derive(Debug, Clone)]
pub struct PlayerController {
    runtime: PlayerRuntimeState,
    playback: PlaybackState,
    timing: ControlTiming,
    hide_at: Option<Instant>,
    next_sample_at: Option<Instant>,
    torn_down: bool,
}

impl PlayerController {
    pub fn new(timing: ControlTiming) -> Self {
        Self {
            runtime: PlayerRuntimeState::default(),
            playback: PlaybackState::Unstarted,
            timing,
            hide_at: None,
            next_sample_at: None,
            torn_down: false,
        }
    }

    pub fn runtime(&self) -> &PlayerRuntimeState {
        &self.runtime
    }

    pub fn playback(&self) -> PlaybackState {
        self.playback
    }

    pub fn timing(&self) -> ControlTiming {
        self.timing
    }

    pub fn hide_deadline(&self) -> Option<Instant> {
        self.hide_at
    }

    pub fn is_sampling(&self) -> bool {
        self.next_sample_at.is_some()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Key press, pointer move, touch or click: show the overlay and restart
    /// the countdown (armed only while playing).
    pub fn note_activity(&mut self, now: Instant) {
        if self.torn_down {
            return;
        }
        self.runtime.controls_visible = true;
        self.hide_at = self
            .runtime
            .is_playing
            .then(|| now + self.timing.controls_timeout);
    }

    pub fn toggle_play_pause(&mut self, now: Instant) -> WidgetCommand {
        self.note_activity(now);
        if self.playback == PlaybackState::Playing {
            WidgetCommand::Pause
        } else {
            WidgetCommand::Play
        }
    }

    /// Seek by `delta` seconds. The local position moves immediately so the
    /// overlay does not wait for the widget to confirm.
    pub fn seek_relative(&mut self, delta: f64, now: Instant) -> WidgetCommand {
        let target = self.clamp_time(self.runtime.current_time + delta);
        self.seek_to(target, now)
    }

    /// Seek to a fraction of the duration (pointer scrubbing).
    pub fn seek_absolute(&mut self, fraction: f64, now: Instant) -> WidgetCommand {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let target = self.clamp_time(fraction * self.runtime.duration);
        self.seek_to(target, now)
    }

    fn seek_to(&mut self, seconds: f64, now: Instant) -> WidgetCommand {
        self.note_activity(now);
        if !self.torn_down {
            self.runtime.current_time = seconds;
        }
        WidgetCommand::SeekTo {
            seconds,
            allow_seek_ahead: true,
        }
    }

    /// Duration 0 means the widget has not reported one yet; only the lower
    /// bound applies then.
    fn clamp_time(&self, seconds: f64) -> f64 {
        let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        if self.runtime.duration > 0.0 {
            seconds.min(self.runtime.duration)
        } else {
            seconds
        }
    }

    pub fn toggle_mute(&mut self, now: Instant) -> WidgetCommand {
        self.note_activity(now);
        if !self.torn_down {
            self.runtime.is_muted = !self.runtime.is_muted;
        }
        if self.runtime.is_muted {
            WidgetCommand::Mute
        } else {
            WidgetCommand::Unmute
        }
    }

    /// The widget finished loading. Autoplay starts muted, so a muted widget
    /// is unmuted right away.
    pub fn on_ready(&mut self, widget_muted: bool, now: Instant) -> Option<WidgetCommand> {
        if self.torn_down {
            return None;
        }
        self.note_activity(now);
        self.runtime.is_muted = false;
        widget_muted.then_some(WidgetCommand::Unmute)
    }

    pub fn on_state_change(&mut self, state: PlaybackState, now: Instant) {
        if self.torn_down {
            return;
        }
        self.playback = state;

        match state {
            PlaybackState::Playing => {
                self.runtime.is_playing = true;
                self.next_sample_at = Some(now + self.timing.sample_interval);
                self.note_activity(now);
            }
            PlaybackState::Paused | PlaybackState::Buffering => {
                self.runtime.is_playing = false;
                self.next_sample_at = None;
                self.hide_at = None;
            }
            PlaybackState::Ended => {
                self.runtime.is_playing = false;
                self.next_sample_at = None;
                self.hide_at = None;
                self.runtime.controls_visible = true;
            }
            PlaybackState::Unstarted | PlaybackState::Cued => {
                self.runtime.is_playing = false;
                self.next_sample_at = None;
                self.hide_at = None;
            }
        }
    }

    pub fn apply_sample(&mut self, sample: PlaybackSample) {
        if self.torn_down {
            return;
        }
        if sample.duration.is_finite() {
            self.runtime.duration = sample.duration.max(0.0);
        }
        if sample.current_time.is_finite() {
            self.runtime.current_time = sample.current_time.max(0.0);
        }
        if sample.buffered_fraction.is_finite() {
            self.runtime.buffered_fraction = sample.buffered_fraction.clamp(0.0, 1.0);
        }
    }

    pub fn tick(&mut self, now: Instant) -> Tick {
        let mut tick = Tick::default();
        if self.torn_down {
            return tick;
        }

        if let Some(at) = self.hide_at
            && now >= at
        {
            self.hide_at = None;
            if self.runtime.is_playing && self.runtime.controls_visible {
                self.runtime.controls_visible = false;
                tick.controls_hidden = true;
            }
        }

        if let Some(at) = self.next_sample_at
            && now >= at
        {
            tick.sample_due = true;
            let next = at + self.timing.sample_interval;
            self.next_sample_at = Some(if next <= now {
                now + self.timing.sample_interval
            } else {
                next
            });
        }

        tick
    }

    /// Cancel both timers. Nothing fires afterwards.
    pub fn teardown(&mut self) {
        self.hide_at = None;
        self.next_sample_at = None;
        self.runtime.is_playing = false;
        self.torn_down = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(3000);
    const INTERVAL: Duration = Duration::from_millis(250);

    fn playing(now: Instant) -> PlayerController {
        let mut c = PlayerController::new(ControlTiming {
            controls_timeout: TIMEOUT,
            sample_interval: INTERVAL,
        });
        c.on_state_change(PlaybackState::Playing, now);
        c
    }

    #[test]
    fn hides_after_exact_idle_interval() {
        let t0 = Instant::now();
        let mut c = playing(t0);

        assert!(!c.tick(t0 + TIMEOUT - Duration::from_millis(1)).controls_hidden);
        assert!(c.runtime().controls_visible);

        assert!(c.tick(t0 + TIMEOUT).controls_hidden);
        assert!(!c.runtime().controls_visible);
    }

    #[test]
    fn activity_restarts_the_countdown() {
        let t0 = Instant::now();
        let mut c = playing(t0);

        let t1 = t0 + Duration::from_millis(2000);
        c.note_activity(t1);
        c.tick(t0 + TIMEOUT);
        assert!(c.runtime().controls_visible);
        assert_eq!(c.hide_deadline(), Some(t1 + TIMEOUT));

        c.tick(t1 + TIMEOUT);
        assert!(!c.runtime().controls_visible);

        c.note_activity(t1 + TIMEOUT + Duration::from_millis(10));
        assert!(c.runtime().controls_visible);
    }

    #[test]
    fn never_hides_while_paused() {
        let t0 = Instant::now();
        let mut c = playing(t0);
        c.on_state_change(PlaybackState::Paused, t0 + Duration::from_millis(100));
        c.note_activity(t0 + Duration::from_millis(200));

        c.tick(t0 + TIMEOUT * 5);
        assert!(c.runtime().controls_visible);
        assert_eq!(c.hide_deadline(), None);
        assert!(!c.is_sampling());
    }

    #[test]
    fn ended_forces_controls_visible() {
        let t0 = Instant::now();
        let mut c = playing(t0);
        c.tick(t0 + TIMEOUT);
        assert!(!c.runtime().controls_visible);

        c.on_state_change(PlaybackState::Ended, t0 + TIMEOUT);
        assert!(c.runtime().controls_visible);
        assert_eq!(c.hide_deadline(), None);
        assert!(!c.is_sampling());
    }

    #[test]
    fn sampler_runs_only_while_playing() {
        let t0 = Instant::now();
        let mut c = playing(t0);

        assert!(!c.tick(t0 + Duration::from_millis(100)).sample_due);
        assert!(c.tick(t0 + INTERVAL).sample_due);
        assert!(!c.tick(t0 + INTERVAL + Duration::from_millis(10)).sample_due);
        assert!(c.tick(t0 + INTERVAL * 2).sample_due);

        c.on_state_change(PlaybackState::Buffering, t0 + INTERVAL * 2);
        assert!(!c.tick(t0 + INTERVAL * 10).sample_due);
    }

    #[test]
    fn seek_relative_clamps_to_zero() {
        let t0 = Instant::now();
        let mut c = playing(t0);
        c.apply_sample(PlaybackSample {
            current_time: 10.0,
            duration: 120.0,
            buffered_fraction: 0.5,
        });

        let cmd = c.seek_relative(-30.0, t0);
        assert_eq!(
            cmd,
            WidgetCommand::SeekTo {
                seconds: 0.0,
                allow_seek_ahead: true
            }
        );
        assert_eq!(c.runtime().current_time, 0.0);
    }

    #[test]
    fn seek_relative_clamps_to_duration() {
        let t0 = Instant::now();
        let mut c = playing(t0);
        c.apply_sample(PlaybackSample {
            current_time: 115.0,
            duration: 120.0,
            buffered_fraction: 1.0,
        });
        c.seek_relative(10.0, t0);
        assert_eq!(c.runtime().current_time, 120.0);
    }

    #[test]
    fn seek_absolute_uses_fraction_of_duration() {
        let t0 = Instant::now();
        let mut c = playing(t0);
        c.apply_sample(PlaybackSample {
            current_time: 0.0,
            duration: 200.0,
            buffered_fraction: 0.0,
        });
        c.seek_absolute(0.25, t0);
        assert_eq!(c.runtime().current_time, 50.0);
        c.seek_absolute(1.7, t0);
        assert_eq!(c.runtime().current_time, 200.0);
    }

    #[test]
    fn toggle_play_pause_follows_widget_state() {
        let t0 = Instant::now();
        let mut c = PlayerController::new(ControlTiming::default());
        assert_eq!(c.toggle_play_pause(t0), WidgetCommand::Play);
        c.on_state_change(PlaybackState::Playing, t0);
        assert_eq!(c.toggle_play_pause(t0), WidgetCommand::Pause);
    }

    #[test]
    fn mute_toggles_and_ready_unmutes() {
        let t0 = Instant::now();
        let mut c = PlayerController::new(ControlTiming::default());
        assert_eq!(c.on_ready(true, t0), Some(WidgetCommand::Unmute));
        assert_eq!(c.on_ready(false, t0), None);
        assert_eq!(c.toggle_mute(t0), WidgetCommand::Mute);
        assert!(c.runtime().is_muted);
        assert_eq!(c.toggle_mute(t0), WidgetCommand::Unmute);
    }

    #[test]
    fn samples_are_sanitized() {
        let mut c = PlayerController::new(ControlTiming::default());
        c.apply_sample(PlaybackSample {
            current_time: -3.0,
            duration: f64::NAN,
            buffered_fraction: 1.5,
        });
        assert_eq!(c.runtime().current_time, 0.0);
        assert_eq!(c.runtime().duration, 0.0);
        assert_eq!(c.runtime().buffered_fraction, 1.0);
    }

    #[test]
    fn teardown_stops_every_timer() {
        let t0 = Instant::now();
        let mut c = playing(t0);
        c.teardown();
        let before = *c.runtime();

        for step in 1..20u32 {
            let tick = c.tick(t0 + INTERVAL * step + TIMEOUT);
            assert_eq!(tick, Tick::default());
        }
        c.on_state_change(PlaybackState::Playing, t0 + TIMEOUT * 10);
        c.apply_sample(PlaybackSample {
            current_time: 99.0,
            duration: 100.0,
            buffered_fraction: 1.0,
        });
        assert_eq!(*c.runtime(), before);
    }
}
