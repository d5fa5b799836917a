// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

//! Which view is active, which element holds focus and where Back leads.
//!
//! Entering a sub-view pushes a return point holding the view that was active
//! and the element focused at entry. Back pops it, focuses the view's anchor
//! at once and schedules the exact element for restore.

use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::catalog::CatalogEntry;
use crate::focus::{FocusId, FocusRegistry};
use crate::player::PlayerSession;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridView {
    pub category_index: usize,
    pub category: String,
    pub entries: Vec<CatalogEntry>,
}

pub struct PlayerView {
    pub source_url: String,
    pub session: PlayerSession,
}

pub enum ViewState {
    Catalog,
    ExpandedGrid(GridView),
    Player(PlayerView),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Catalog,
    ExpandedGrid,
    Player,
}

impl ViewState {
    pub fn kind(&self) -> ViewKind {
        match self {
            ViewState::Catalog => ViewKind::Catalog,
            ViewState::ExpandedGrid(_) => ViewKind::ExpandedGrid,
            ViewState::Player(_) => ViewKind::Player,
        }
    }

    /// Element focused right after the view mounts.
    pub fn anchor(&self) -> FocusId {
        match self {
            ViewState::Catalog => FocusId::HeroPlay,
            ViewState::ExpandedGrid(_) => FocusId::GridClose,
            ViewState::Player(_) => FocusId::PlayerBack,
        }
    }
}

enum ReturnView {
    Catalog,
    ExpandedGrid(GridView),
}

impl From<ReturnView> for ViewState {
    fn from(view: ReturnView) -> Self {
        match view {
            ReturnView::Catalog => ViewState::Catalog,
            ReturnView::ExpandedGrid(grid) => ViewState::ExpandedGrid(grid),
        }
    }
}

struct ReturnPoint {
    view: ReturnView,
    restore: Option<FocusId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRestore {
    pub target: FocusId,
    pub due: Instant,
    pub attempts_left: u32,
}

pub struct ViewStateMachine {
    current: ViewState,
    focus: Option<FocusId>,
    return_stack: Vec<ReturnPoint>,
    pending_restore: Option<PendingRestore>,
    restore_delay: Duration,
    restore_attempts: u32,
}

impl ViewStateMachine {
    pub fn new(restore_delay: Duration, restore_attempts: u32) -> Self {
        Self {
            current: ViewState::Catalog,
            focus: Some(FocusId::HeroPlay),
            return_stack: Vec::new(),
            pending_restore: None,
            restore_delay,
            restore_attempts: restore_attempts.max(1),
        }
    }

    pub fn current(&self) -> &ViewState {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut ViewState {
        &mut self.current
    }

    pub fn kind(&self) -> ViewKind {
        self.current.kind()
    }

    pub fn focus(&self) -> Option<FocusId> {
        self.focus
    }

    pub fn set_focus(&mut self, id: FocusId) {
        self.focus = Some(id);
    }

    pub fn pending_restore(&self) -> Option<PendingRestore> {
        self.pending_restore
    }

    pub fn depth(&self) -> usize {
        self.return_stack.len()
    }

    pub fn player(&self) -> Option<&PlayerView> {
        match &self.current {
            ViewState::Player(view) => Some(view),
            _ => None,
        }
    }

    pub fn player_mut(&mut self) -> Option<&mut PlayerView> {
        match &mut self.current {
            ViewState::Player(view) => Some(view),
            _ => None,
        }
    }

    pub fn grid(&self) -> Option<&GridView> {
        match &self.current {
            ViewState::ExpandedGrid(grid) => Some(grid),
            _ => None,
        }
    }

    /// Only reachable from the catalog.
    pub fn open_grid(&mut self, grid: GridView) -> bool {
        if !matches!(self.current, ViewState::Catalog) {
            return false;
        }
        debug!("Expanding category {}", grid.category);
        self.enter(ViewState::ExpandedGrid(grid));
        true
    }

    /// Reachable from the catalog and the grid. The caller creates the session
    /// only after checking [`ViewStateMachine::can_open_player`].
    pub fn open_player(&mut self, view: PlayerView) -> bool {
        if !self.can_open_player() {
            return false;
        }
        debug!("Opening player for {}", view.source_url);
        self.enter(ViewState::Player(view));
        true
    }

    pub fn can_open_player(&self) -> bool {
        !matches!(self.current, ViewState::Player(_))
    }

    fn enter(&mut self, next: ViewState) {
        let previous = std::mem::replace(&mut self.current, next);
        let view = match previous {
            ViewState::Catalog => ReturnView::Catalog,
            ViewState::ExpandedGrid(grid) => ReturnView::ExpandedGrid(grid),
            ViewState::Player(_) => return,
        };
        self.return_stack.push(ReturnPoint {
            view,
            restore: self.focus,
        });
        self.pending_restore = None;
        self.focus = Some(self.current.anchor());
    }

    /// Leave the current sub-view. The player session, if any, is dropped
    /// here before the previous view is reinstated.
    pub fn back(&mut self, now: Instant) -> bool {
        let Some(point) = self.return_stack.pop() else {
            return false;
        };

        let left = std::mem::replace(&mut self.current, point.view.into());
        drop(left);

        self.focus = Some(self.current.anchor());
        self.pending_restore = point.restore.map(|target| PendingRestore {
            target,
            due: now,
            attempts_left: self.restore_attempts,
        });
        true
    }

    /// Apply a due restore against what is mounted now. Returns true when
    /// focus moved.
    pub fn tick_restore(&mut self, registry: &FocusRegistry, now: Instant) -> bool {
        let Some(pending) = self.pending_restore else {
            return false;
        };
        if now < pending.due {
            return false;
        }

        if registry.contains(pending.target) {
            self.pending_restore = None;
            let moved = self.focus != Some(pending.target);
            self.focus = Some(pending.target);
            return moved;
        }

        let attempts_left = pending.attempts_left.saturating_sub(1);
        if attempts_left == 0 {
            warn!("Focus restore abandoned for {:?}", pending.target);
            self.pending_restore = None;
        } else {
            self.pending_restore = Some(PendingRestore {
                target: pending.target,
                due: now + self.restore_delay,
                attempts_left,
            });
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GridView {
        GridView {
            category_index: 0,
            category: "accion".to_string(),
            entries: vec![CatalogEntry::new("a", "u"), CatalogEntry::new("b", "u")],
        }
    }

    fn machine() -> ViewStateMachine {
        ViewStateMachine::new(Duration::from_millis(50), 3)
    }

    #[test]
    fn starts_on_hero() {
        let m = machine();
        assert_eq!(m.kind(), ViewKind::Catalog);
        assert_eq!(m.focus(), Some(FocusId::HeroPlay));
    }

    #[test]
    fn grid_round_trip_restores_show_more() {
        let t0 = Instant::now();
        let mut m = machine();
        m.set_focus(FocusId::ShowMore { category: 0 });
        assert!(m.open_grid(grid()));
        assert_eq!(m.focus(), Some(FocusId::GridClose));

        assert!(m.back(t0));
        assert_eq!(m.kind(), ViewKind::Catalog);
        assert_eq!(m.focus(), Some(FocusId::HeroPlay));

        let mut registry = FocusRegistry::new();
        registry.register(crate::focus::FocusTarget::new(FocusId::HeroPlay, 0, 0));
        registry.register(crate::focus::FocusTarget::new(
            FocusId::ShowMore { category: 0 },
            1,
            0,
        ));
        assert!(m.tick_restore(&registry, t0));
        assert_eq!(m.focus(), Some(FocusId::ShowMore { category: 0 }));
        assert_eq!(m.pending_restore(), None);
    }

    #[test]
    fn grid_only_from_catalog() {
        let mut m = machine();
        assert!(m.open_grid(grid()));
        assert!(!m.open_grid(grid()));
        assert_eq!(m.depth(), 1);
    }

    #[test]
    fn back_at_root_does_nothing() {
        let mut m = machine();
        assert!(!m.back(Instant::now()));
        assert_eq!(m.focus(), Some(FocusId::HeroPlay));
    }

    #[test]
    fn restore_retries_then_gives_up() {
        let t0 = Instant::now();
        let delay = Duration::from_millis(50);
        let mut m = machine();
        m.set_focus(FocusId::ShowMore { category: 4 });
        m.open_grid(grid());
        m.back(t0);

        let empty = FocusRegistry::new();
        assert!(!m.tick_restore(&empty, t0));
        let pending = m.pending_restore().unwrap();
        assert_eq!(pending.attempts_left, 2);
        assert_eq!(pending.due, t0 + delay);

        // not due yet
        assert!(!m.tick_restore(&empty, t0 + delay / 2));
        assert_eq!(m.pending_restore().unwrap().attempts_left, 2);

        m.tick_restore(&empty, t0 + delay);
        m.tick_restore(&empty, t0 + delay * 2);
        assert_eq!(m.pending_restore(), None);
        assert_eq!(m.focus(), Some(FocusId::HeroPlay));
    }
}
