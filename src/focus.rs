// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

//! Focus targets and the registry of what is currently focusable.
//!
//! The registry is rebuilt from the active view for every input step. Render
//! order is registration order; hidden targets stay registered but are left
//! out of [`FocusRegistry::list`], the same way an element under a
//! `display: none` ancestor would be skipped.

use crate::catalog::Catalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusId {
    HeroPlay,
    Card { category: usize, index: usize },
    ShowMore { category: usize },
    GridClose,
    GridCard { index: usize },
    PlayerBack,
    PlayerSeekBar,
    PlayerPlayPause,
    PlayerMute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusKind {
    Hero,
    Card,
    ShowMoreCard,
    CloseButton,
    BackButton,
    SeekBar,
    ControlButton,
}

impl FocusId {
    pub fn kind(self) -> FocusKind {
        match self {
            FocusId::HeroPlay => FocusKind::Hero,
            FocusId::Card { .. } | FocusId::GridCard { .. } => FocusKind::Card,
            FocusId::ShowMore { .. } => FocusKind::ShowMoreCard,
            FocusId::GridClose => FocusKind::CloseButton,
            FocusId::PlayerBack => FocusKind::BackButton,
            FocusId::PlayerSeekBar => FocusKind::SeekBar,
            FocusId::PlayerPlayPause | FocusId::PlayerMute => FocusKind::ControlButton,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusTarget {
    pub id: FocusId,
    pub row: usize,
    pub col: usize,
    pub visible: bool,
}

impl FocusTarget {
    pub fn new(id: FocusId, row: usize, col: usize) -> Self {
        Self {
            id,
            row,
            col,
            visible: true,
        }
    }

    pub fn kind(&self) -> FocusKind {
        self.id.kind()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FocusRegistry {
    targets: Vec<FocusTarget>,
}

impl FocusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hero play control on row 0, then one row per category: its carousel
    /// cards followed by the "show more" card when the category overflows.
    pub fn for_catalog(catalog: &Catalog, carousel_limit: usize) -> Self {
        let mut registry = Self::new();
        registry.register(FocusTarget::new(FocusId::HeroPlay, 0, 0));

        for (category_index, category) in catalog.categories.iter().enumerate() {
            let row = Catalog::row_of(category_index);
            let carousel = category.carousel(carousel_limit);

            for index in 0..carousel.cards.len() {
                registry.register(FocusTarget::new(
                    FocusId::Card {
                        category: category_index,
                        index,
                    },
                    row,
                    index,
                ));
            }

            if carousel.has_show_more() {
                registry.register(FocusTarget::new(
                    FocusId::ShowMore {
                        category: category_index,
                    },
                    row,
                    carousel.cards.len(),
                ));
            }
        }

        registry
    }

    /// Close button first, then the cells laid out `columns` per row.
    pub fn for_grid(entry_count: usize, columns: usize) -> Self {
        let columns = columns.max(1);
        let mut registry = Self::new();
        registry.register(FocusTarget::new(FocusId::GridClose, 0, 0));

        for index in 0..entry_count {
            registry.register(FocusTarget::new(
                FocusId::GridCard { index },
                1 + index / columns,
                index % columns,
            ));
        }

        registry
    }

    /// Player overlay. Without transport only the back control exists; with
    /// transport the controls are registered hidden while the overlay is.
    pub fn for_player(has_transport: bool, controls_visible: bool) -> Self {
        let mut registry = Self::new();

        if !has_transport {
            registry.register(FocusTarget::new(FocusId::PlayerBack, 0, 0));
            return registry;
        }

        for (id, row, col) in [
            (FocusId::PlayerBack, 0, 0),
            (FocusId::PlayerSeekBar, 1, 0),
            (FocusId::PlayerPlayPause, 2, 0),
            (FocusId::PlayerMute, 2, 1),
        ] {
            registry.register(FocusTarget {
                id,
                row,
                col,
                visible: controls_visible,
            });
        }

        registry
    }

    pub fn register(&mut self, target: FocusTarget) {
        if let Some(existing) = self.targets.iter_mut().find(|t| t.id == target.id) {
            *existing = target;
        } else {
            self.targets.push(target);
        }
    }

    pub fn set_visible(&mut self, id: FocusId, visible: bool) {
        if let Some(target) = self.targets.iter_mut().find(|t| t.id == id) {
            target.visible = visible;
        }
    }

    /// Visible targets in render order.
    pub fn list(&self) -> Vec<FocusTarget> {
        self.targets.iter().filter(|t| t.visible).copied().collect()
    }

    pub fn index_of(&self, id: FocusId) -> Option<usize> {
        self.targets
            .iter()
            .filter(|t| t.visible)
            .position(|t| t.id == id)
    }

    pub fn get(&self, id: FocusId) -> Option<FocusTarget> {
        self.targets
            .iter()
            .find(|t| t.id == id && t.visible)
            .copied()
    }

    pub fn contains(&self, id: FocusId) -> bool {
        self.get(id).is_some()
    }

    pub fn first_in_row(&self, row: usize) -> Option<FocusTarget> {
        self.targets
            .iter()
            .find(|t| t.visible && t.row == row)
            .copied()
    }

    pub fn len(&self) -> usize {
        self.targets.iter().filter(|t| t.visible).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogEntry, Category, Hero};

    fn catalog(sizes: &[usize]) -> Catalog {
        Catalog {
            hero: Hero {
                title: "Hero".to_string(),
                description: String::new(),
                source_url: "https://youtu.be/bd7PTHImmaI".to_string(),
            },
            categories: sizes
                .iter()
                .enumerate()
                .map(|(c, n)| Category {
                    name: format!("cat{}", c),
                    entries: (0..*n)
                        .map(|i| CatalogEntry::new(format!("v{}", i), "https://example.com"))
                        .collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn catalog_rows_and_columns() {
        let registry = FocusRegistry::for_catalog(&catalog(&[12, 2]), 10);
        let list = registry.list();
        // hero + 9 cards + show more + 2 cards
        assert_eq!(list.len(), 13);
        assert_eq!(list[0].id, FocusId::HeroPlay);
        assert_eq!(list[0].row, 0);
        assert_eq!(list[10].id, FocusId::ShowMore { category: 0 });
        assert_eq!(list[10].col, 9);
        assert_eq!(list[11].row, 2);
        assert_eq!(list[11].kind(), FocusKind::Card);
    }

    #[test]
    fn hidden_targets_are_filtered() {
        let mut registry = FocusRegistry::for_catalog(&catalog(&[3]), 10);
        registry.set_visible(FocusId::Card { category: 0, index: 1 }, false);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.index_of(FocusId::Card { category: 0, index: 1 }), None);
        assert_eq!(registry.index_of(FocusId::Card { category: 0, index: 2 }), Some(2));
    }

    #[test]
    fn grid_layout() {
        let registry = FocusRegistry::for_grid(8, 3);
        assert_eq!(registry.index_of(FocusId::GridClose), Some(0));
        let last = registry.get(FocusId::GridCard { index: 7 }).unwrap();
        assert_eq!((last.row, last.col), (3, 1));
    }

    #[test]
    fn player_controls_hidden_with_overlay() {
        let hidden = FocusRegistry::for_player(true, false);
        assert!(hidden.is_empty());
        let shown = FocusRegistry::for_player(true, true);
        assert_eq!(shown.len(), 4);
        let frame = FocusRegistry::for_player(false, false);
        assert_eq!(frame.list()[0].id, FocusId::PlayerBack);
    }

    #[test]
    fn register_replaces_same_id() {
        let mut registry = FocusRegistry::new();
        registry.register(FocusTarget::new(FocusId::HeroPlay, 0, 0));
        registry.register(FocusTarget::new(FocusId::HeroPlay, 0, 3));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(FocusId::HeroPlay).unwrap().col, 3);
    }
}
