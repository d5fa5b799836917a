// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

pub mod controller;
pub mod mpv;

use anyhow::Result;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::video_ref::VideoReference;
use controller::{ControlTiming, PlaybackSample, PlayerController, WidgetCommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    Unstarted,
    Playing,
    Paused,
    Buffering,
    Ended,
    Cued,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    Ready,
    StateChange(PlaybackState),
    /// The player window went away on its own. Handled like Back.
    Exited(Option<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetOptions {
    pub autoplay: bool,
    pub start_muted: bool,
    /// The overlay replaces the widget's own controls and key bindings.
    pub hide_native_controls: bool,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            autoplay: true,
            start_muted: true,
            hide_native_controls: true,
        }
    }
}

/// A playback surface the overlay can drive.
pub trait PlaybackWidget {
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self) -> Result<()>;
    fn seek_to(&mut self, seconds: f64, allow_seek_ahead: bool) -> Result<()>;
    fn current_time(&mut self) -> Result<f64>;
    fn duration(&mut self) -> Result<f64>;
    fn loaded_fraction(&mut self) -> Result<f64>;
    fn is_muted(&mut self) -> Result<bool>;
    fn mute(&mut self) -> Result<()>;
    fn unmute(&mut self) -> Result<()>;
    fn player_state(&mut self) -> Result<PlaybackState>;
    /// Notifications raised since the last poll. Must not block.
    fn poll_events(&mut self) -> Vec<WidgetEvent>;
    fn destroy(&mut self);
}

/// An opaque surface for sources the widget cannot drive.
pub trait ExternalFrame {
    fn close(&mut self);
    fn is_open(&mut self) -> bool;
}

pub trait WidgetFactory {
    fn create(
        &mut self,
        reference: &VideoReference,
        options: &WidgetOptions,
    ) -> Result<Box<dyn PlaybackWidget>>;

    fn open_frame(&mut self, source_url: &str) -> Result<Box<dyn ExternalFrame>>;
}

pub enum Playback {
    Controlled {
        widget: Box<dyn PlaybackWidget>,
        controller: PlayerController,
    },
    Frame(Box<dyn ExternalFrame>),
    /// Nothing could be opened; only Back does anything.
    Unavailable(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTick {
    /// The widget or frame closed itself, with an optional reason.
    pub exited: Option<Option<String>>,
    pub controls_hidden: bool,
    pub sampled: bool,
    pub warnings: Vec<String>,
}

/// One open player. Dropping the session releases the widget or frame and
/// cancels the controller's timers.
pub struct PlayerSession {
    pub reference: VideoReference,
    pub title: String,
    playback: Playback,
}

impl PlayerSession {
    /// Native sources get a controllable widget; everything else, or a widget
    /// that fails to start, falls back to the external frame.
    pub fn open(
        factory: &mut dyn WidgetFactory,
        reference: VideoReference,
        title: impl Into<String>,
        options: &WidgetOptions,
        timing: ControlTiming,
        now: Instant,
    ) -> Self {
        let title = title.into();

        let playback = if reference.is_native {
            match factory.create(&reference, options) {
                Ok(widget) => {
                    info!("Opened playback widget for {}", reference.watch_url());
                    let mut controller = PlayerController::new(timing);
                    controller.note_activity(now);
                    Playback::Controlled { widget, controller }
                }
                Err(e) => {
                    warn!("Playback widget failed for {}: {:#}", reference.source_url, e);
                    Self::open_frame(factory, &reference.source_url)
                }
            }
        } else {
            Self::open_frame(factory, &reference.source_url)
        };

        Self {
            reference,
            title,
            playback,
        }
    }

    fn open_frame(factory: &mut dyn WidgetFactory, url: &str) -> Playback {
        match factory.open_frame(url) {
            Ok(frame) => {
                info!("Opened external frame for {}", url);
                Playback::Frame(frame)
            }
            Err(e) => {
                warn!("External frame failed for {}: {:#}", url, e);
                Playback::Unavailable(format!("{:#}", e))
            }
        }
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    pub fn controller(&self) -> Option<&PlayerController> {
        match &self.playback {
            Playback::Controlled { controller, .. } => Some(controller),
            _ => None,
        }
    }

    pub fn has_transport(&self) -> bool {
        self.controller().is_some()
    }

    /// Frame and unavailable modes always show their back control.
    pub fn controls_visible(&self) -> bool {
        self.controller()
            .is_none_or(|c| c.runtime().controls_visible)
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.playback {
            Playback::Unavailable(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn note_activity(&mut self, now: Instant) {
        if let Playback::Controlled { controller, .. } = &mut self.playback {
            controller.note_activity(now);
        }
    }

    pub fn toggle_play_pause(&mut self, now: Instant) -> Result<()> {
        self.command(|c| c.toggle_play_pause(now))
    }

    pub fn seek_relative(&mut self, delta: f64, now: Instant) -> Result<()> {
        self.command(|c| c.seek_relative(delta, now))
    }

    pub fn seek_absolute(&mut self, fraction: f64, now: Instant) -> Result<()> {
        self.command(|c| c.seek_absolute(fraction, now))
    }

    pub fn toggle_mute(&mut self, now: Instant) -> Result<()> {
        self.command(|c| c.toggle_mute(now))
    }

    fn command<F>(&mut self, op: F) -> Result<()>
    where
        F: FnOnce(&mut PlayerController) -> WidgetCommand,
    {
        match &mut self.playback {
            Playback::Controlled { widget, controller } => {
                let command = op(controller);
                send(widget.as_mut(), command)
            }
            _ => Ok(()),
        }
    }

    /// Drain widget notifications, then fire whatever timers are due.
    pub fn tick(&mut self, now: Instant) -> SessionTick {
        let mut result = SessionTick::default();

        match &mut self.playback {
            Playback::Controlled { widget, controller } => {
                for event in widget.poll_events() {
                    match event {
                        WidgetEvent::Ready => {
                            let muted = widget.is_muted().unwrap_or(false);
                            if let Some(command) = controller.on_ready(muted, now)
                                && let Err(e) = send(widget.as_mut(), command)
                            {
                                result.warnings.push(format!("Unmute failed: {:#}", e));
                            }
                        }
                        WidgetEvent::StateChange(state) => {
                            debug!("Playback state -> {:?}", state);
                            controller.on_state_change(state, now);
                        }
                        WidgetEvent::Exited(reason) => {
                            result.exited = Some(reason);
                            return result;
                        }
                    }
                }

                let due = controller.tick(now);
                result.controls_hidden = due.controls_hidden;

                if due.sample_due {
                    match sample(widget.as_mut()) {
                        Ok(s) => {
                            controller.apply_sample(s);
                            result.sampled = true;
                        }
                        Err(e) => debug!("Sample skipped: {:#}", e),
                    }
                }
            }
            Playback::Frame(frame) => {
                if !frame.is_open() {
                    result.exited = Some(Some("External player closed".to_string()));
                }
            }
            Playback::Unavailable(_) => {}
        }

        result
    }

    /// Release the widget or frame. Safe to call more than once.
    pub fn close(&mut self) {
        match &mut self.playback {
            Playback::Controlled { widget, controller } => {
                if !controller.is_torn_down() {
                    controller.teardown();
                    widget.destroy();
                    debug!("Playback widget destroyed");
                }
            }
            Playback::Frame(frame) => {
                frame.close();
                debug!("External frame closed");
            }
            Playback::Unavailable(_) => {}
        }
    }
}

impl Drop for PlayerSession {
    fn drop(&mut self) {
        self.close();
    }
}

fn send(widget: &mut dyn PlaybackWidget, command: WidgetCommand) -> Result<()> {
    match command {
        WidgetCommand::Play => widget.play(),
        WidgetCommand::Pause => widget.pause(),
        WidgetCommand::SeekTo {
            seconds,
            allow_seek_ahead,
        } => widget.seek_to(seconds, allow_seek_ahead),
        WidgetCommand::Mute => widget.mute(),
        WidgetCommand::Unmute => widget.unmute(),
    }
}

fn sample(widget: &mut dyn PlaybackWidget) -> Result<PlaybackSample> {
    Ok(PlaybackSample {
        current_time: widget.current_time()?,
        duration: widget.duration()?,
        buffered_fraction: widget.loaded_fraction()?,
    })
}

/// `MM:SS`, or `HH:MM:SS` from one hour up.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "00:00".to_string();
    }

    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}
