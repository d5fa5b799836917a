// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

pub mod event;
pub mod ui;
pub mod widgets;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use std::io;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::app::{Action, App, PointerEvent};
use crate::catalog::Catalog;
use crate::config::Config;
use crate::player::mpv::MpvFactory;

pub use event::{Event, EventHandler, PointerKind};

pub struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    pub event_handler: EventHandler,
    /// Where the seek bar was last drawn, for pointer scrubbing.
    seek_bar: Option<Rect>,
}

impl Tui {
    pub fn new(tick_rate: Duration) -> Result<Self> {
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;
        let event_handler = EventHandler::new(tick_rate);
        Ok(Self {
            terminal,
            event_handler,
            seek_bar: None,
        })
    }

    pub fn init(&mut self) -> Result<()> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
        self.terminal.hide_cursor()?;
        self.terminal.clear()?;
        Ok(())
    }

    pub fn draw(&mut self, app: &App) -> Result<()> {
        let mut seek_bar = None;
        self.terminal.draw(|frame| seek_bar = ui::draw(frame, app).seek_bar)?;
        self.seek_bar = seek_bar;
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    fn pointer_event(&self, kind: PointerKind, column: u16, row: u16) -> PointerEvent {
        match kind {
            PointerKind::Moved => PointerEvent::Moved,
            PointerKind::Primary => self
                .seek_bar
                .and_then(|area| scrub_fraction(area, column, row))
                .map_or(PointerEvent::Pressed, PointerEvent::Scrub),
            PointerKind::Secondary => PointerEvent::Touched,
        }
    }
}

/// Horizontal position of a click inside `area` as a fraction of its width.
fn scrub_fraction(area: Rect, column: u16, row: u16) -> Option<f64> {
    let inside = column >= area.x
        && column < area.x + area.width
        && row >= area.y
        && row < area.y + area.height;
    if !inside || area.width == 0 {
        return None;
    }
    Some(f64::from(column - area.x) / f64::from(area.width.saturating_sub(1).max(1)))
}

pub async fn run_tui(config: Config, catalog: Catalog) -> Result<()> {
    let mut tui = Tui::new(config.ui.tick_rate())?;
    tui.init()?;

    let factory = MpvFactory::new(config.player.clone());
    let player_available = factory.is_available();
    let mut app = App::new(config, catalog, Box::new(factory));
    if !player_available {
        app.add_log("Video player not found; playback is unavailable".to_string());
    }

    let res = run_app(&mut tui, &mut app).await;

    // Release any open player before the terminal comes back
    app.shutdown(Instant::now());

    tui.exit()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app(tui: &mut Tui, app: &mut App) -> Result<()> {
    let tick_rate = app.config.ui.tick_rate();
    tui.draw(app)?;

    loop {
        let event = tokio::time::timeout(tick_rate, tui.event_handler.next()).await;
        let now = Instant::now();

        match event {
            Ok(Ok(Event::Key(key_event))) => {
                let dispatch = app.handle_key_event(key_event, now);
                if dispatch.action == Some(Action::Quit) {
                    debug!("Quit requested");
                    break;
                }
            }
            Ok(Ok(Event::Pointer { kind, column, row })) => {
                let pointer = tui.pointer_event(kind, column, row);
                app.handle_pointer(pointer, now);
            }
            Ok(Ok(Event::Resize(_, _))) | Ok(Ok(Event::Tick)) | Err(_) => {}
            Ok(Err(e)) => return Err(e),
        }

        app.tick(now);
        tui.draw(app)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrub_fraction_spans_the_bar() {
        let area = Rect::new(10, 5, 11, 1);
        assert_eq!(scrub_fraction(area, 10, 5), Some(0.0));
        assert_eq!(scrub_fraction(area, 20, 5), Some(1.0));
        assert_eq!(scrub_fraction(area, 15, 5), Some(0.5));
        assert_eq!(scrub_fraction(area, 15, 6), None);
        assert_eq!(scrub_fraction(area, 9, 5), None);
    }
}
