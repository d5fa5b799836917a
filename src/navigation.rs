// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

//! D-pad focus resolution.
//!
//! Nothing here wraps around. When the computed destination does not exist
//! the resolver returns `None` and the caller keeps the current focus.

use crate::focus::{FocusId, FocusRegistry, FocusTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Flat order horizontally, declared rows vertically (catalog, player
    /// overlay).
    RowOverride,
    /// One linear sequence, element 0 is the close control and the cells
    /// follow `columns` per row.
    ColumnGrid { columns: usize },
}

pub fn next(
    current: FocusId,
    direction: Direction,
    registry: &FocusRegistry,
    topology: Topology,
) -> Option<FocusTarget> {
    let list = registry.list();
    let index = list.iter().position(|t| t.id == current)?;

    let destination = match topology {
        Topology::RowOverride => next_row_override(&list, index, direction),
        Topology::ColumnGrid { columns } => {
            next_column_grid(list.len(), index, direction, columns.max(1)).map(|i| list[i])
        }
    }?;

    (destination.id != current).then_some(destination)
}

fn next_row_override(
    list: &[FocusTarget],
    index: usize,
    direction: Direction,
) -> Option<FocusTarget> {
    let row = list[index].row;

    match direction {
        Direction::Right => list.get(index + 1).copied(),
        Direction::Left => index.checked_sub(1).map(|i| list[i]),
        Direction::Down => first_in_row(list, row + 1),
        Direction::Up => row.checked_sub(1).and_then(|r| first_in_row(list, r)),
    }
}

fn first_in_row(list: &[FocusTarget], row: usize) -> Option<FocusTarget> {
    list.iter().find(|t| t.row == row).copied()
}

fn next_column_grid(
    len: usize,
    index: usize,
    direction: Direction,
    columns: usize,
) -> Option<usize> {
    let candidate = match direction {
        Direction::Right => index + 1,
        Direction::Left => index.checked_sub(1)?,
        Direction::Down if index == 0 => 1,
        Direction::Down => index + columns,
        Direction::Up if index == 0 => return None,
        Direction::Up if index <= columns => 0,
        Direction::Up => index - columns,
    };

    (candidate < len).then_some(candidate)
}
