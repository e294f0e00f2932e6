use serde::{Deserialize, Serialize};

use crate::*;

/// Rectangle picked by the player, given by the cell where the drag started and the cell where it is now.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Coord2,
    pub end: Coord2,
}

impl Selection {
    pub const fn new(anchor: Coord2, end: Coord2) -> Self {
        Self { anchor, end }
    }

    pub const fn single(cell: Coord2) -> Self {
        Self::new(cell, cell)
    }

    pub fn range(&self) -> CellRange {
        CellRange::spanning(self.anchor, self.end)
    }
}

impl From<CellRange> for Selection {
    fn from(range: CellRange) -> Self {
        Self::new(range.top_left(), range.bottom_right())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedCell {
    pub coords: Coord2,
    pub value: u8,
}

/// Live cells inside the selection, row-major. Parts of the selection outside the grid are ignored.
pub fn selected_cells(grid: &Grid, selection: Selection) -> Vec<SelectedCell> {
    let Some(range) = selection.range().clip(grid.size()) else {
        return Vec::new();
    };
    range
        .iter()
        .map(|coords| SelectedCell {
            coords,
            value: grid[coords],
        })
        .filter(|cell| is_live(cell.value))
        .collect()
}

pub fn sum(cells: &[SelectedCell]) -> u32 {
    cells.iter().map(|cell| u32::from(cell.value)).sum()
}

/// Whether the selection covers at least one live tile and its live tiles add up to ten.
pub fn is_clearing(grid: &Grid, selection: Selection) -> bool {
    let cells = selected_cells(grid, selection);
    !cells.is_empty() && sum(&cells) == TARGET_SUM
}

/// Grid with every cell covered by the selection emptied. Nothing moves: no gravity, no compaction.
///
/// This does not check [`is_clearing`]; callers decide whether the move is allowed.
pub fn apply_clear(grid: &Grid, selection: Selection) -> Grid {
    let Some(range) = selection.range().clip(grid.size()) else {
        return grid.clone();
    };
    grid.with_edit(|cells| {
        for coords in range.iter() {
            cells[coords.to_nd_index()] = EMPTY;
        }
    })
}

/// True iff every cell is empty.
pub fn is_empty(grid: &Grid) -> bool {
    grid.is_empty()
}
