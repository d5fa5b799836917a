// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::focus::{FocusId, FocusRegistry};
use crate::input::{self, RawKey, RemoteCommand};
use crate::navigation::{self, Direction, Topology};
use crate::player::{PlayerSession, WidgetFactory};
use crate::video_ref;
use crate::view::{GridView, PlayerView, ViewKind, ViewState, ViewStateMachine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
}

/// Outcome of one key press. `consumed` means the default handling of the
/// key (page scroll) must be suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dispatch {
    pub consumed: bool,
    pub action: Option<Action>,
}

impl Dispatch {
    fn consumed() -> Self {
        Self {
            consumed: true,
            action: None,
        }
    }

    fn ignored() -> Self {
        Self::default()
    }

    fn quit() -> Self {
        Self {
            consumed: true,
            action: Some(Action::Quit),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Moved,
    Pressed,
    Touched,
    /// Click on the seek bar at a fraction of its width.
    Scrub(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogDisplayMode {
    Side,
    None,
}

pub struct App {
    pub config: Config,
    pub catalog: Catalog,
    views: ViewStateMachine,
    factory: Box<dyn WidgetFactory>,
    pub logs: Vec<(DateTime<Local>, String)>,
    pub show_help: bool,
    pub log_display_mode: LogDisplayMode,
}

impl App {
    pub fn new(config: Config, catalog: Catalog, factory: Box<dyn WidgetFactory>) -> Self {
        let views = ViewStateMachine::new(config.ui.restore_delay(), config.ui.restore_attempts);

        Self {
            config,
            catalog,
            views,
            factory,
            logs: Vec::new(),
            show_help: false,
            log_display_mode: LogDisplayMode::None,
        }
    }

    pub fn views(&self) -> &ViewStateMachine {
        &self.views
    }

    pub fn view_kind(&self) -> ViewKind {
        self.views.kind()
    }

    pub fn focus(&self) -> Option<FocusId> {
        self.views.focus()
    }

    pub fn session(&self) -> Option<&PlayerSession> {
        self.views.player().map(|view| &view.session)
    }

    fn session_mut(&mut self) -> Option<&mut PlayerSession> {
        self.views.player_mut().map(|view| &mut view.session)
    }

    /// Focusable elements of the active view.
    pub fn registry(&self) -> FocusRegistry {
        match self.views.current() {
            ViewState::Catalog => {
                FocusRegistry::for_catalog(&self.catalog, self.config.ui.carousel_limit)
            }
            ViewState::ExpandedGrid(grid) => {
                FocusRegistry::for_grid(grid.entries.len(), self.config.ui.grid_columns)
            }
            ViewState::Player(view) => FocusRegistry::for_player(
                view.session.has_transport(),
                view.session.controls_visible(),
            ),
        }
    }

    fn topology(&self) -> Topology {
        match self.views.kind() {
            ViewKind::ExpandedGrid => Topology::ColumnGrid {
                columns: self.config.ui.grid_columns,
            },
            ViewKind::Catalog | ViewKind::Player => Topology::RowOverride,
        }
    }

    /// Terminal keys: application shortcuts first, then the remote mapping.
    pub fn handle_key_event(&mut self, key: KeyEvent, now: Instant) -> Dispatch {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Dispatch::quit();
        }

        let raw = RawKey::from(&key);

        // Back always leaves the player, even under the help overlay
        if self.views.kind() == ViewKind::Player
            && input::normalize(&raw) == Some(RemoteCommand::Back)
        {
            self.show_help = false;
            self.leave_player(now, None);
            return Dispatch::consumed();
        }

        if self.show_help {
            self.show_help = false;
            self.reveal_player_controls(now);
            return Dispatch::consumed();
        }

        match key.code {
            KeyCode::Char('?') | KeyCode::F(1) => {
                self.show_help = true;
                self.reveal_player_controls(now);
                return Dispatch::consumed();
            }
            KeyCode::Char('L') => {
                self.log_display_mode = match self.log_display_mode {
                    LogDisplayMode::Side => LogDisplayMode::None,
                    LogDisplayMode::None => LogDisplayMode::Side,
                };
                self.reveal_player_controls(now);
                return Dispatch::consumed();
            }
            KeyCode::Char('q') if self.views.kind() != ViewKind::Player => {
                return Dispatch::quit();
            }
            _ => {}
        }

        self.handle_key(&raw, now)
    }

    pub fn handle_key(&mut self, raw: &RawKey, now: Instant) -> Dispatch {
        match input::normalize(raw) {
            Some(command) => self.handle_command(command, now),
            None => {
                // Any key counts as activity on the player overlay
                self.reveal_player_controls(now);
                Dispatch::ignored()
            }
        }
    }

    pub fn handle_command(&mut self, command: RemoteCommand, now: Instant) -> Dispatch {
        debug!("Remote command {:?} in {:?}", command, self.views.kind());
        match self.views.kind() {
            ViewKind::Catalog | ViewKind::ExpandedGrid => self.handle_browse(command, now),
            ViewKind::Player => self.handle_player(command, now),
        }
    }

    fn handle_browse(&mut self, command: RemoteCommand, now: Instant) -> Dispatch {
        let registry = self.registry();
        let focused = self.views.focus().filter(|id| registry.contains(*id));

        match command {
            RemoteCommand::Navigate(direction) => {
                let Some(current) = focused else {
                    return Dispatch::ignored();
                };
                if let Some(target) = navigation::next(current, direction, &registry, self.topology())
                {
                    self.views.set_focus(target.id);
                }
                Dispatch::consumed()
            }
            RemoteCommand::Activate => {
                match focused {
                    Some(id) => self.activate(id, now),
                    None => {
                        let anchor = self.views.current().anchor();
                        self.views.set_focus(anchor);
                    }
                }
                Dispatch::consumed()
            }
            RemoteCommand::Back => {
                if self.go_back(now) {
                    Dispatch::consumed()
                } else {
                    Dispatch::ignored()
                }
            }
            RemoteCommand::PlayPause | RemoteCommand::ToggleMute => Dispatch::ignored(),
        }
    }

    fn activate(&mut self, id: FocusId, now: Instant) {
        match id {
            FocusId::HeroPlay => {
                let hero = self.catalog.hero.clone();
                self.open_player(&hero.title, &hero.source_url, now);
            }
            FocusId::Card { category, index } => {
                let entry = self
                    .catalog
                    .category(category)
                    .and_then(|c| c.entries.get(index))
                    .cloned();
                if let Some(entry) = entry {
                    self.open_player(&entry.title, &entry.source_url, now);
                }
            }
            FocusId::ShowMore { category } => self.open_grid(category),
            FocusId::GridClose => {
                self.go_back(now);
            }
            FocusId::GridCard { index } => {
                let entry = self.views.grid().and_then(|g| g.entries.get(index)).cloned();
                if let Some(entry) = entry {
                    self.open_player(&entry.title, &entry.source_url, now);
                }
            }
            FocusId::PlayerBack
            | FocusId::PlayerSeekBar
            | FocusId::PlayerPlayPause
            | FocusId::PlayerMute => {}
        }
    }

    fn open_grid(&mut self, category_index: usize) {
        let Some(category) = self.catalog.category(category_index) else {
            return;
        };
        let name = category.name.clone();
        let grid = GridView {
            category_index,
            category: name.clone(),
            entries: category.entries.clone(),
        };
        if self.views.open_grid(grid) {
            self.add_log(format!("Showing all of {}", name));
        }
    }

    fn open_player(&mut self, title: &str, url: &str, now: Instant) {
        if !self.views.can_open_player() {
            return;
        }

        let reference = video_ref::resolve_with_tier(url, self.config.player.thumbnail_tier);
        let session = PlayerSession::open(
            self.factory.as_mut(),
            reference,
            title,
            &self.config.player.widget_options(),
            self.config.ui.control_timing(),
            now,
        );

        match session.unavailable_reason() {
            Some(reason) => self.add_log(format!("Playback unavailable for {}: {}", title, reason)),
            None if session.has_transport() => self.add_log(format!("Playing: {}", title)),
            None => self.add_log(format!("Playing in external window: {}", title)),
        }

        self.views.open_player(PlayerView {
            source_url: url.to_string(),
            session,
        });
    }

    fn go_back(&mut self, now: Instant) -> bool {
        if !self.views.back(now) {
            return false;
        }
        self.restore_focus(now);
        true
    }

    fn leave_player(&mut self, now: Instant, reason: Option<String>) {
        if let Some(reason) = reason {
            self.add_log(reason);
        }
        if self.go_back(now) {
            info!("Player closed");
        }
    }

    fn restore_focus(&mut self, now: Instant) -> bool {
        let registry = self.registry();
        self.views.tick_restore(&registry, now)
    }

    /// Returns true when the overlay was hidden and is now shown.
    fn reveal_player_controls(&mut self, now: Instant) -> bool {
        let Some(session) = self.session_mut() else {
            return false;
        };
        let was_visible = session.controls_visible();
        session.note_activity(now);
        let revealed = !was_visible && session.controls_visible();
        if revealed {
            self.views.set_focus(FocusId::PlayerBack);
        }
        revealed
    }

    fn handle_player(&mut self, command: RemoteCommand, now: Instant) -> Dispatch {
        if command == RemoteCommand::Back {
            self.leave_player(now, None);
            return Dispatch::consumed();
        }

        // A hidden overlay only comes back; the key does nothing else
        if self.reveal_player_controls(now) {
            return Dispatch::consumed();
        }

        let registry = self.registry();
        let focused = self.views.focus().filter(|id| registry.contains(*id));
        let seek_step = self.config.player.seek_step_secs;

        let result = match command {
            RemoteCommand::Navigate(direction)
                if focused == Some(FocusId::PlayerSeekBar) && direction.is_horizontal() =>
            {
                let delta = if direction == Direction::Right {
                    seek_step
                } else {
                    -seek_step
                };
                self.with_session(|s| s.seek_relative(delta, now))
            }
            RemoteCommand::Navigate(direction) => {
                if let Some(current) = focused
                    && let Some(target) =
                        navigation::next(current, direction, &registry, self.topology())
                {
                    self.views.set_focus(target.id);
                }
                Ok(())
            }
            RemoteCommand::Activate => match focused {
                Some(FocusId::PlayerBack) => {
                    self.leave_player(now, None);
                    return Dispatch::consumed();
                }
                Some(FocusId::PlayerPlayPause) | Some(FocusId::PlayerSeekBar) => {
                    self.with_session(|s| s.toggle_play_pause(now))
                }
                Some(FocusId::PlayerMute) => self.with_session(|s| s.toggle_mute(now)),
                _ => {
                    self.views.set_focus(FocusId::PlayerBack);
                    Ok(())
                }
            },
            RemoteCommand::PlayPause => self.with_session(|s| s.toggle_play_pause(now)),
            RemoteCommand::ToggleMute => self.with_session(|s| s.toggle_mute(now)),
            RemoteCommand::Back => Ok(()),
        };

        if let Err(e) = result {
            warn!("Player command failed: {:#}", e);
            self.add_log(format!("Player command failed: {:#}", e));
        }

        Dispatch::consumed()
    }

    fn with_session<F>(&mut self, op: F) -> anyhow::Result<()>
    where
        F: FnOnce(&mut PlayerSession) -> anyhow::Result<()>,
    {
        match self.session_mut() {
            Some(session) => op(session),
            None => Ok(()),
        }
    }

    pub fn handle_pointer(&mut self, event: PointerEvent, now: Instant) -> Dispatch {
        if self.views.kind() != ViewKind::Player {
            return Dispatch::ignored();
        }

        if self.reveal_player_controls(now) {
            return Dispatch::consumed();
        }

        if let PointerEvent::Scrub(fraction) = event
            && let Err(e) = self.with_session(|s| s.seek_absolute(fraction, now))
        {
            warn!("Seek failed: {:#}", e);
            self.add_log(format!("Seek failed: {:#}", e));
        }

        Dispatch::consumed()
    }

    /// Fire whatever is due: widget notifications, auto-hide, sampling and
    /// pending focus restores.
    pub fn tick(&mut self, now: Instant) {
        let mut exited = None;
        let mut revealed = false;
        let mut warnings = Vec::new();

        if let Some(session) = self.session_mut() {
            let was_visible = session.controls_visible();
            let tick = session.tick(now);
            revealed = !was_visible && session.controls_visible();
            exited = tick.exited;
            warnings = tick.warnings;
        }

        for warning in warnings {
            warn!("{}", warning);
            self.add_log(warning);
        }

        if revealed {
            self.views.set_focus(FocusId::PlayerBack);
        }

        if let Some(reason) = exited {
            self.leave_player(now, reason);
        }

        self.restore_focus(now);
    }

    /// Close any open player before the terminal is restored.
    pub fn shutdown(&mut self, now: Instant) {
        while self.views.kind() != ViewKind::Catalog {
            if !self.views.back(now) {
                break;
            }
        }
    }

    pub fn add_log(&mut self, message: String) {
        debug!("{}", message);
        self.logs.push((Local::now(), message));
        let capacity = self.config.ui.log_capacity.max(1);
        if self.logs.len() > capacity {
            let excess = self.logs.len() - capacity;
            self.logs.drain(..excess);
        }
    }
}
