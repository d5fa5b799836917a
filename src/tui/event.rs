// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::Result;
use crossterm::event::{
    self, Event as CrosstermEvent, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Moved,
    /// Primary button: scrubs when it lands on the seek bar.
    Primary,
    Secondary,
}

#[derive(Debug, Clone)]
pub enum Event {
    /// Nothing arrived within one tick period.
    Tick,
    Key(KeyEvent),
    Pointer {
        kind: PointerKind,
        column: u16,
        row: u16,
    },
    Resize(u16, u16),
}

/// Key releases and scroll wheel events never reach the remote dispatcher.
/// Held D-pad keys arrive as repeats and navigate like presses.
pub fn translate(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind != KeyEventKind::Release => Some(Event::Key(key)),
        CrosstermEvent::Mouse(mouse) => pointer(&mouse),
        CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
        _ => None,
    }
}

fn pointer(mouse: &MouseEvent) -> Option<Event> {
    let kind = match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(_) => PointerKind::Moved,
        MouseEventKind::Down(MouseButton::Left) => PointerKind::Primary,
        MouseEventKind::Down(_) => PointerKind::Secondary,
        _ => return None,
    };
    Some(Event::Pointer {
        kind,
        column: mouse.column,
        row: mouse.row,
    })
}

/// Terminal input read on a blocking task. Every timer in the app is driven
/// from the UI loop, so the reader only has to guarantee a wake-up at least
/// once per tick.
pub struct EventHandler {
    receiver: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        tokio::task::spawn_blocking(move || {
            loop {
                let event = match event::poll(tick_rate) {
                    Ok(true) => match event::read() {
                        Ok(raw) => translate(raw),
                        Err(e) => {
                            debug!("Terminal read failed: {}", e);
                            None
                        }
                    },
                    Ok(false) => Some(Event::Tick),
                    Err(e) => {
                        debug!("Terminal poll failed: {}", e);
                        Some(Event::Tick)
                    }
                };

                if let Some(event) = event
                    && sender.send(event).is_err()
                {
                    break;
                }
            }
        });

        Self { receiver }
    }

    pub async fn next(&mut self) -> Result<Event> {
        self.receiver
            .recv()
            .await
            .ok_or_else(|| anyhow::anyhow!("Event channel closed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    fn mouse(kind: MouseEventKind) -> CrosstermEvent {
        CrosstermEvent::Mouse(MouseEvent {
            kind,
            column: 4,
            row: 2,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn releases_are_dropped() {
        let mut key = KeyEvent::new(KeyCode::Down, KeyModifiers::NONE);
        assert!(matches!(translate(CrosstermEvent::Key(key)), Some(Event::Key(_))));

        key.kind = KeyEventKind::Repeat;
        key.state = KeyEventState::NONE;
        assert!(translate(CrosstermEvent::Key(key)).is_some());

        key.kind = KeyEventKind::Release;
        assert!(translate(CrosstermEvent::Key(key)).is_none());
    }

    #[test]
    fn pointer_kinds() {
        assert!(matches!(
            translate(mouse(MouseEventKind::Down(MouseButton::Left))),
            Some(Event::Pointer {
                kind: PointerKind::Primary,
                column: 4,
                row: 2
            })
        ));
        assert!(matches!(
            translate(mouse(MouseEventKind::Drag(MouseButton::Left))),
            Some(Event::Pointer {
                kind: PointerKind::Moved,
                ..
            })
        ));
        assert!(translate(mouse(MouseEventKind::ScrollDown)).is_none());
    }
}
