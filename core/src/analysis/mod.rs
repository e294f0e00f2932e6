//! Exhaustive queries over a grid: does any clearing rectangle remain, and which one to hint.
//!
//! Candidate rectangles are the ones whose opposite corners are two live cells. Every pair of live cells is tried,
//! so the search is `O(live²)` rectangle sums; with [`SumTable`] each sum is constant time, with the [`Grid`] itself
//! each sum walks the rectangle.

use core::ops::ControlFlow;

use crate::*;
pub use sum_table::*;

mod sum_table;

/// Whether some rectangle with live corners sums to ten.
pub fn has_any_move(grid: &Grid) -> bool {
    first_clearing(grid, &SumTable::new(grid)).is_some()
}

/// The clearing rectangle whose top-left corner comes first in row-major order, smaller area first on ties.
///
/// `None` exactly when [`has_any_move`] is false.
pub fn find_hint(grid: &Grid) -> Option<Selection> {
    best_clearing(grid, &SumTable::new(grid)).map(Selection::from)
}

/// [`has_any_move`] without the summed-area table.
pub fn has_any_move_by_scan(grid: &Grid) -> bool {
    first_clearing(grid, grid).is_some()
}

/// [`find_hint`] without the summed-area table.
pub fn find_hint_by_scan(grid: &Grid) -> Option<Selection> {
    best_clearing(grid, grid).map(Selection::from)
}

/// Calls `visit` with every candidate rectangle that sums to ten, pairs taken in row-major order.
fn for_each_clearing<S: RangeSum>(
    grid: &Grid,
    sums: &S,
    mut visit: impl FnMut(CellRange) -> ControlFlow<()>,
) {
    let live: Vec<Coord2> = grid.iter_live().map(|(coords, _)| coords).collect();
    // a lone tile is at most 9, so pairs of distinct cells are enough
    for (i, &first) in live.iter().enumerate() {
        for &second in &live[i + 1..] {
            let range = CellRange::spanning(first, second);
            if sums.range_sum(range) == TARGET_SUM && visit(range).is_break() {
                return;
            }
        }
    }
}

fn first_clearing<S: RangeSum>(grid: &Grid, sums: &S) -> Option<CellRange> {
    let mut found = None;
    for_each_clearing(grid, sums, |range| {
        found = Some(range);
        ControlFlow::Break(())
    });
    found
}

fn best_clearing<S: RangeSum>(grid: &Grid, sums: &S) -> Option<CellRange> {
    let key = |range: &CellRange| (range.top, range.left, range.area());
    let mut best: Option<CellRange> = None;
    for_each_clearing(grid, sums, |range| {
        if best.is_none_or(|current| key(&range) < key(&current)) {
            best = Some(range);
        }
        ControlFlow::Continue(())
    });
    log::trace!("Hint search settled on {:?}", best);
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid<const C: usize>(rows: &[[u8; C]]) -> Grid {
        Grid::from_rows(rows).unwrap()
    }

    #[test]
    fn all_ones_have_no_move() {
        let grid = grid(&[[1, 1], [1, 1]]);

        assert!(!has_any_move(&grid));
        assert_eq!(find_hint(&grid), None);
    }

    #[test]
    fn hint_prefers_earliest_top_left_corner() {
        let grid = grid(&[[0, 0, 0], [0, 3, 7], [6, 4, 0]]);

        // (1,1)-(1,2) and (2,0)-(2,1) both clear; row 1 comes first
        assert_eq!(find_hint(&grid), Some(Selection::new((1, 1), (1, 2))));
    }

    #[test]
    fn hint_breaks_ties_by_smaller_area() {
        // (0,0)-(0,2) and (0,0)-(1,0) share a top-left corner, the second is smaller
        let grid = grid(&[[5, 0, 5], [5, 0, 0]]);

        assert_eq!(find_hint(&grid), Some(Selection::new((0, 0), (1, 0))));
    }

    #[test]
    fn equal_hints_keep_search_order() {
        let grid = grid(&[[5, 5], [5, 0]]);

        assert_eq!(find_hint(&grid), Some(Selection::new((0, 0), (0, 1))));
    }

    #[test]
    fn rectangle_through_empty_cells_counts() {
        let grid = grid(&[[2, 0, 0], [0, 0, 8]]);

        assert!(has_any_move(&grid));
        assert_eq!(find_hint(&grid), Some(Selection::new((0, 0), (1, 2))));
    }

    #[test]
    fn anti_diagonal_corners_form_a_candidate() {
        let grid = grid(&[[0, 4], [6, 0]]);

        assert_eq!(find_hint(&grid), Some(Selection::new((0, 0), (1, 1))));
    }

    #[test]
    fn scan_and_table_agree() {
        let boards = [
            grid(&[[1, 9], [2, 8]]),
            grid(&[[1, 1], [1, 1]]),
            grid(&[[3, 4, 3], [9, 9, 9]]),
            grid(&[[0, 0], [0, 0]]),
        ];
        for board in &boards {
            assert_eq!(has_any_move(board), has_any_move_by_scan(board));
            assert_eq!(find_hint(board), find_hint_by_scan(board));
        }
    }
}
