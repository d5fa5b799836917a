// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

//! Property-based invariant tests for reference resolution, D-pad navigation
//! and the player controller timers.
//!
//! 1. Host URLs resolve to native references carrying exactly the token.
//! 2. Anything else resolves to an external reference with no playable id.
//! 3. Resolution is total and `is_native` agrees with `playable_id`.
//! 4. Horizontal catalog moves are locally invertible and never wrap.
//! 5. Down then Up from the hero lands back on the hero.
//! 6. Close -> first cell -> Close round trip in the expanded grid.
//! 7. Grid Down then Up returns to the starting cell.
//! 8. Relative seeks stay within [0, duration].
//! 9. Controls hide after exactly the idle interval while playing.
//! 10. Input restarts the idle countdown.
//! 11. Nothing fires after teardown.
//! 12. format_time never panics.

use proptest::prelude::*;
use std::time::{Duration, Instant};

use tvcatalog::catalog::{Catalog, CatalogEntry, Category, Hero};
use tvcatalog::focus::{FocusId, FocusRegistry};
use tvcatalog::navigation::{self, Direction, Topology};
use tvcatalog::player::controller::{
    ControlTiming, PlaybackSample, PlayerController, Tick, WidgetCommand,
};
use tvcatalog::player::{PlaybackState, format_time};
use tvcatalog::video_ref::{self, PLACEHOLDER_THUMBNAIL};

// ── Helpers ─────────────────────────────────────────────────────────────

fn token_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_-]{11}"
}

fn host_url_strategy() -> impl Strategy<Value = (String, String)> {
    let shapes = prop_oneof![
        Just("https://www.youtube.com/watch?v="),
        Just("https://youtube.com/embed/"),
        Just("https://youtu.be/"),
        Just("youtu.be/"),
    ];
    let suffixes = prop_oneof![
        Just(""),
        Just("?si=Ab3xYz_tracking"),
        Just("&t=42s"),
        Just("?feature=shared"),
    ];
    (shapes, token_strategy(), suffixes)
        .prop_map(|(shape, token, suffix)| (format!("{}{}{}", shape, token, suffix), token))
}

fn catalog_strategy() -> impl Strategy<Value = Catalog> {
    prop::collection::vec(0usize..16, 1..5).prop_map(|sizes| Catalog {
        hero: Hero {
            title: "Hero".to_string(),
            description: String::new(),
            source_url: String::new(),
        },
        categories: sizes
            .iter()
            .enumerate()
            .map(|(c, n)| Category {
                name: format!("cat{}", c),
                entries: (0..*n)
                    .map(|i| CatalogEntry::new(format!("v{}", i), ""))
                    .collect(),
            })
            .collect(),
    })
}

/// Resolver step with the caller's "keep focus on a miss" rule applied.
fn step(
    current: FocusId,
    direction: Direction,
    registry: &FocusRegistry,
    topology: Topology,
) -> FocusId {
    navigation::next(current, direction, registry, topology)
        .map(|t| t.id)
        .unwrap_or(current)
}

fn timing(timeout_ms: u64) -> ControlTiming {
    ControlTiming {
        controls_timeout: Duration::from_millis(timeout_ms),
        sample_interval: Duration::from_millis(250),
    }
}

fn playing(timeout_ms: u64, now: Instant) -> PlayerController {
    let mut controller = PlayerController::new(timing(timeout_ms));
    controller.on_state_change(PlaybackState::Playing, now);
    controller
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Host URLs resolve to the captured token
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn host_urls_are_native((url, token) in host_url_strategy()) {
        let reference = video_ref::resolve(&url);
        prop_assert!(reference.is_native, "{} should be native", url);
        prop_assert_eq!(
            reference.playable_id.as_deref(),
            Some(token.as_str()),
            "wrong token for {}",
            url
        );
        prop_assert!(reference.thumbnail_url.contains(&token));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Non-host strings are external
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn other_urls_are_external(raw in "[a-z0-9:/.?=&_-]{0,60}") {
        prop_assume!(!raw.contains("youtu"));
        let reference = video_ref::resolve(&raw);
        prop_assert!(!reference.is_native);
        prop_assert!(reference.playable_id.is_none());
        prop_assert_eq!(reference.thumbnail_url.as_str(), PLACEHOLDER_THUMBNAIL);
        prop_assert_eq!(reference.source_url, raw);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Resolution is total
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn resolve_is_total(raw in ".*") {
        let reference = video_ref::resolve(&raw);
        prop_assert_eq!(
            reference.is_native,
            reference.playable_id.is_some(),
            "native flag disagrees with id for {:?}",
            raw
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Horizontal moves are locally invertible
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn horizontal_moves_invert(catalog in catalog_strategy(), limit in 1usize..12) {
        let registry = FocusRegistry::for_catalog(&catalog, limit);
        let list = registry.list();
        let topology = Topology::RowOverride;

        for i in 0..list.len() {
            let id = list[i].id;
            if i + 1 < list.len() {
                let right = step(id, Direction::Right, &registry, topology);
                prop_assert_eq!(right, list[i + 1].id);
                prop_assert_eq!(step(right, Direction::Left, &registry, topology), id);
            } else {
                prop_assert!(
                    navigation::next(id, Direction::Right, &registry, topology).is_none(),
                    "Right must not wrap from the last element"
                );
            }
            if i > 0 {
                let left = step(id, Direction::Left, &registry, topology);
                prop_assert_eq!(step(left, Direction::Right, &registry, topology), id);
            } else {
                prop_assert!(navigation::next(id, Direction::Left, &registry, topology).is_none());
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Hero row round trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn hero_down_up_round_trip(catalog in catalog_strategy(), limit in 1usize..12) {
        let registry = FocusRegistry::for_catalog(&catalog, limit);
        let topology = Topology::RowOverride;

        let down = step(FocusId::HeroPlay, Direction::Down, &registry, topology);
        let back = step(down, Direction::Up, &registry, topology);
        prop_assert_eq!(back, FocusId::HeroPlay, "Down landed on {:?}", down);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Grid close round trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn grid_close_round_trip(cells in 1usize..60, columns in 1usize..10) {
        let registry = FocusRegistry::for_grid(cells, columns);
        let topology = Topology::ColumnGrid { columns };

        let down = step(FocusId::GridClose, Direction::Down, &registry, topology);
        prop_assert_eq!(down, FocusId::GridCard { index: 0 });
        let up = step(down, Direction::Up, &registry, topology);
        prop_assert_eq!(up, FocusId::GridClose);
        prop_assert!(navigation::next(FocusId::GridClose, Direction::Up, &registry, topology).is_none());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Grid vertical round trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn grid_down_up_round_trip(cells in 1usize..60, columns in 1usize..10, pick in any::<prop::sample::Index>()) {
        let registry = FocusRegistry::for_grid(cells, columns);
        let topology = Topology::ColumnGrid { columns };
        let start = FocusId::GridCard { index: pick.index(cells) };

        match navigation::next(start, Direction::Down, &registry, topology) {
            Some(down) => {
                prop_assert_eq!(step(down.id, Direction::Up, &registry, topology), start);
            }
            None => {
                prop_assert!(pick.index(cells) + columns >= cells, "Down missed an existing cell");
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 8. Seek clamping
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn relative_seek_stays_in_range(
        duration in 1.0f64..20_000.0,
        position in 0.0f64..1.0,
        delta in -40_000.0f64..40_000.0,
    ) {
        let now = Instant::now();
        let mut controller = playing(3000, now);
        controller.apply_sample(PlaybackSample {
            current_time: position * duration,
            duration,
            buffered_fraction: 0.0,
        });

        let command = controller.seek_relative(delta, now);
        let WidgetCommand::SeekTo { seconds, .. } = command else {
            return Err(TestCaseError::fail(format!("unexpected command {:?}", command)));
        };
        prop_assert!((0.0..=duration).contains(&seconds), "{} outside [0, {}]", seconds, duration);
        prop_assert_eq!(controller.runtime().current_time, seconds);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 9. Auto-hide after exactly the idle interval
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn controls_hide_on_deadline(timeout_ms in 1u64..10_000) {
        let t0 = Instant::now();
        let mut controller = playing(timeout_ms, t0);

        controller.tick(t0 + Duration::from_millis(timeout_ms - 1));
        prop_assert!(controller.runtime().controls_visible);

        let tick = controller.tick(t0 + Duration::from_millis(timeout_ms));
        prop_assert!(tick.controls_hidden);
        prop_assert!(!controller.runtime().controls_visible);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 10. Input restarts the countdown
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn activity_restarts_countdown(timeout_ms in 2u64..10_000, fraction in 0.0f64..1.0) {
        let t0 = Instant::now();
        let mut controller = playing(timeout_ms, t0);

        let activity_ms = ((timeout_ms - 1) as f64 * fraction) as u64;
        let activity = t0 + Duration::from_millis(activity_ms);
        controller.note_activity(activity);

        controller.tick(t0 + Duration::from_millis(timeout_ms));
        if activity_ms > 0 {
            prop_assert!(controller.runtime().controls_visible, "hid before the restarted deadline");
        }

        controller.tick(activity + Duration::from_millis(timeout_ms));
        prop_assert!(!controller.runtime().controls_visible);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 11. Nothing fires after teardown
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn teardown_silences_timers(offsets in prop::collection::vec(0u64..60_000, 1..20)) {
        let t0 = Instant::now();
        let mut controller = playing(1000, t0);
        controller.teardown();
        let before = *controller.runtime();

        for offset in offsets {
            let now = t0 + Duration::from_millis(offset);
            prop_assert_eq!(controller.tick(now), Tick::default());
            controller.on_state_change(PlaybackState::Playing, now);
            controller.note_activity(now);
        }

        prop_assert_eq!(*controller.runtime(), before);
        prop_assert!(controller.hide_deadline().is_none());
        prop_assert!(!controller.is_sampling());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 12. format_time never panics
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn format_time_total(seconds in any::<f64>()) {
        let text = format_time(seconds);
        prop_assert!(text.len() >= 5, "too short: {:?}", text);
        prop_assert!(text.chars().all(|c| c.is_ascii_digit() || c == ':'));
    }
}
