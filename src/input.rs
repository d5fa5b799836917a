// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

//! Remote control key normalisation.
//!
//! TV remotes report a mix of named keys and platform key codes. Both are
//! reduced to a small set of semantic commands; the named key wins when a
//! device reports both.

use crossterm::event::{KeyCode, KeyEvent, MediaKeyCode};

use crate::navigation::Direction;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawKey {
    pub key: Option<String>,
    pub key_code: Option<u32>,
}

impl RawKey {
    pub fn named(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            key_code: None,
        }
    }

    pub fn code(key_code: u32) -> Self {
        Self {
            key: None,
            key_code: Some(key_code),
        }
    }

    fn with_code(key: &str, key_code: u32) -> Self {
        Self {
            key: Some(key.to_string()),
            key_code: Some(key_code),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteCommand {
    Navigate(Direction),
    Activate,
    Back,
    PlayPause,
    ToggleMute,
}

fn from_name(key: &str) -> Option<RemoteCommand> {
    let command = match key {
        "ArrowUp" | "Up" => RemoteCommand::Navigate(Direction::Up),
        "ArrowDown" | "Down" => RemoteCommand::Navigate(Direction::Down),
        "ArrowLeft" | "Left" => RemoteCommand::Navigate(Direction::Left),
        "ArrowRight" | "Right" => RemoteCommand::Navigate(Direction::Right),
        "Enter" | "Select" | "OK" => RemoteCommand::Activate,
        "Escape" | "Esc" | "Backspace" | "Back" | "BrowserBack" | "GoBack" => RemoteCommand::Back,
        " " | "MediaPlayPause" => RemoteCommand::PlayPause,
        "m" | "AudioVolumeMute" => RemoteCommand::ToggleMute,
        _ => return None,
    };
    Some(command)
}

fn from_code(code: u32) -> Option<RemoteCommand> {
    let command = match code {
        19 | 38 => RemoteCommand::Navigate(Direction::Up),
        20 | 40 => RemoteCommand::Navigate(Direction::Down),
        21 | 37 => RemoteCommand::Navigate(Direction::Left),
        22 | 39 => RemoteCommand::Navigate(Direction::Right),
        23 | 66 | 13 => RemoteCommand::Activate,
        // 461 webOS, 10009 Tizen
        4 | 8 | 27 | 461 | 10009 => RemoteCommand::Back,
        179 | 85 => RemoteCommand::PlayPause,
        _ => return None,
    };
    Some(command)
}

pub fn normalize(raw: &RawKey) -> Option<RemoteCommand> {
    if let Some(command) = raw.key.as_deref().and_then(from_name) {
        return Some(command);
    }
    raw.key_code.and_then(from_code)
}

impl From<&KeyEvent> for RawKey {
    fn from(event: &KeyEvent) -> Self {
        match event.code {
            KeyCode::Up | KeyCode::Char('k') => RawKey::with_code("ArrowUp", 38),
            KeyCode::Down | KeyCode::Char('j') => RawKey::with_code("ArrowDown", 40),
            KeyCode::Left | KeyCode::Char('h') => RawKey::with_code("ArrowLeft", 37),
            KeyCode::Right | KeyCode::Char('l') => RawKey::with_code("ArrowRight", 39),
            KeyCode::Enter => RawKey::with_code("Enter", 13),
            KeyCode::Esc => RawKey::with_code("Escape", 27),
            KeyCode::Backspace => RawKey::with_code("Backspace", 8),
            KeyCode::Char(' ') => RawKey::with_code(" ", 32),
            KeyCode::Media(MediaKeyCode::PlayPause) => RawKey::with_code("MediaPlayPause", 179),
            KeyCode::Media(MediaKeyCode::MuteVolume) => RawKey::named("AudioVolumeMute"),
            KeyCode::Char(c) => RawKey::named(c.to_string()),
            _ => RawKey::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn named_keys() {
        assert_eq!(
            normalize(&RawKey::named("ArrowLeft")),
            Some(RemoteCommand::Navigate(Direction::Left))
        );
        assert_eq!(normalize(&RawKey::named("OK")), Some(RemoteCommand::Activate));
        assert_eq!(normalize(&RawKey::named("GoBack")), Some(RemoteCommand::Back));
        assert_eq!(normalize(&RawKey::named(" ")), Some(RemoteCommand::PlayPause));
        assert_eq!(normalize(&RawKey::named("m")), Some(RemoteCommand::ToggleMute));
    }

    #[test]
    fn platform_codes() {
        assert_eq!(normalize(&RawKey::code(461)), Some(RemoteCommand::Back));
        assert_eq!(normalize(&RawKey::code(10009)), Some(RemoteCommand::Back));
        assert_eq!(normalize(&RawKey::code(66)), Some(RemoteCommand::Activate));
        assert_eq!(
            normalize(&RawKey::code(22)),
            Some(RemoteCommand::Navigate(Direction::Right))
        );
        assert_eq!(normalize(&RawKey::code(85)), Some(RemoteCommand::PlayPause));
    }

    #[test]
    fn name_wins_over_code() {
        let raw = RawKey {
            key: Some("ArrowUp".to_string()),
            key_code: Some(40),
        };
        assert_eq!(normalize(&raw), Some(RemoteCommand::Navigate(Direction::Up)));
    }

    #[test]
    fn unknown_name_falls_back_to_code() {
        let raw = RawKey {
            key: Some("Unidentified".to_string()),
            key_code: Some(4),
        };
        assert_eq!(normalize(&raw), Some(RemoteCommand::Back));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        assert_eq!(normalize(&RawKey::default()), None);
        assert_eq!(normalize(&RawKey::named("F5")), None);
        assert_eq!(normalize(&RawKey::code(999)), None);
    }

    #[test]
    fn terminal_keys_map_like_a_remote() {
        let key = |code| RawKey::from(&KeyEvent::new(code, KeyModifiers::NONE));
        assert_eq!(
            normalize(&key(KeyCode::Char('j'))),
            Some(RemoteCommand::Navigate(Direction::Down))
        );
        assert_eq!(normalize(&key(KeyCode::Esc)), Some(RemoteCommand::Back));
        assert_eq!(normalize(&key(KeyCode::Backspace)), Some(RemoteCommand::Back));
        assert_eq!(normalize(&key(KeyCode::Enter)), Some(RemoteCommand::Activate));
        assert_eq!(normalize(&key(KeyCode::Char('m'))), Some(RemoteCommand::ToggleMute));
        assert_eq!(normalize(&key(KeyCode::Char('x'))), None);
    }
}
