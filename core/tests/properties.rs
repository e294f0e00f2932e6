use proptest::collection::vec;
use proptest::prelude::*;
use tenfold_core::*;

fn any_grid() -> impl Strategy<Value = Grid> {
    (1u8..=8, 1u8..=8).prop_flat_map(|(rows, cols)| {
        vec(0u8..=MAX_DIGIT, usize::from(rows) * usize::from(cols))
            .prop_map(move |cells| Grid::new(rows, cols, cells).unwrap())
    })
}

/// Corners may land past the grid edge; selections are clipped.
fn any_selection() -> impl Strategy<Value = Selection> {
    ((0u8..10, 0u8..10), (0u8..10, 0u8..10)).prop_map(|(anchor, end)| Selection::new(anchor, end))
}

fn any_difficulty() -> impl Strategy<Value = Difficulty> {
    prop_oneof![
        9 => (1u32..=200).prop_map(Difficulty::Level),
        1 => Just(Difficulty::Challenge),
    ]
}

fn overlaps(a: &PixelRect, b: &PixelRect) -> bool {
    a.left < b.right() && b.left < a.right() && a.top < b.bottom() && b.top < a.bottom()
}

proptest! {
    #[test]
    fn generated_boards_hold_digits_and_sum_to_tens(
        difficulty in any_difficulty(),
        seed in "[a-z0-9_]{1,24}",
    ) {
        let board = generate(difficulty, &Seed::new(seed));

        prop_assert!(board.to_vec().iter().all(|&value| value <= MAX_DIGIT));
        prop_assert_eq!(board.live_sum() % TARGET_SUM, 0);
    }

    #[test]
    fn generation_is_deterministic(difficulty in any_difficulty(), seed in "[a-z0-9_]{1,24}") {
        let seed = Seed::new(seed);

        prop_assert_eq!(generate(difficulty, &seed), generate(difficulty, &seed));
    }

    #[test]
    fn cleared_selection_sums_to_zero(grid in any_grid(), selection in any_selection()) {
        let cleared = apply_clear(&grid, selection);

        prop_assert_eq!(sum(&selected_cells(&cleared, selection)), 0);
    }

    #[test]
    fn clear_leaves_outside_cells_alone(grid in any_grid(), selection in any_selection()) {
        let cleared = apply_clear(&grid, selection);
        let range = selection.range();

        for (row, col) in CellRange::spanning((0, 0), (grid.height() - 1, grid.width() - 1)).iter() {
            if !range.contains((row, col)) {
                prop_assert_eq!(cleared[(row, col)], grid[(row, col)]);
            }
        }
    }

    #[test]
    fn clearing_moves_remove_tiles(grid in any_grid(), selection in any_selection()) {
        if is_clearing(&grid, selection) {
            prop_assert!(apply_clear(&grid, selection).live_count() < grid.live_count());
        }
    }

    #[test]
    fn hint_exists_exactly_when_a_move_does(grid in any_grid()) {
        let hint = find_hint(&grid);

        prop_assert_eq!(hint.is_none(), !has_any_move(&grid));
        if let Some(hint) = hint {
            prop_assert!(is_clearing(&grid, hint));
        }
    }

    #[test]
    fn table_and_scan_agree(grid in any_grid()) {
        prop_assert_eq!(has_any_move(&grid), has_any_move_by_scan(&grid));
        prop_assert_eq!(find_hint(&grid), find_hint_by_scan(&grid));
    }

    #[test]
    fn rescue_only_permutes_tiles(grid in any_grid()) {
        let mut session = GameSession::new(Difficulty::Level(1), Seed::for_level(1), grid.clone());

        session.rescue_if_stuck().unwrap();

        let after = session.current_grid();
        prop_assert_eq!(after.live_values(), grid.live_values());
        prop_assert_eq!(after.live_sum() % TARGET_SUM, grid.live_sum() % TARGET_SUM);
    }

    #[test]
    fn layout_cells_stay_inside_and_apart(
        left in -500.0f64..500.0,
        top in -500.0f64..500.0,
        width in 120.0f64..2000.0,
        height in 120.0f64..2000.0,
        rows in 1u8..=10,
        cols in 1u8..=10,
        lock_tile in any::<bool>(),
    ) {
        let options = LayoutOptions { lock_tile, ..LayoutOptions::default() };
        let viewport = Viewport::new(left, top, width, height);
        let layout = compute_layout(viewport, rows, cols, &options).unwrap();

        prop_assert_eq!(&layout, &compute_layout(viewport, rows, cols, &options).unwrap());

        let inset = f64::from(options.frame + options.pad);
        let inner = layout.inner;
        prop_assert!((f64::from(inner.left) - (left + inset)).abs() <= 0.5);
        prop_assert!((f64::from(inner.top) - (top + inset)).abs() <= 0.5);
        prop_assert!((f64::from(inner.right()) - (left + width - inset)).abs() <= 0.5);
        prop_assert!((f64::from(inner.bottom()) - (top + height - inset)).abs() <= 0.5);
        prop_assert_eq!(layout.cells.len(), usize::from(rows) * usize::from(cols));
        if !layout.overflowed() {
            for cell in &layout.cells {
                let rect = cell.rect();
                prop_assert!(rect.left >= inner.left && rect.right() <= inner.right());
                prop_assert!(rect.top >= inner.top && rect.bottom() <= inner.bottom());
            }
        }
        for (i, a) in layout.cells.iter().enumerate() {
            for b in &layout.cells[i + 1..] {
                prop_assert!(!overlaps(&a.rect(), &b.rect()), "{:?} overlaps {:?}", a, b);
            }
        }
    }
}
