use tenfold_core::*;

fn grid<const C: usize>(rows: &[[u8; C]]) -> Grid {
    Grid::from_rows(rows).unwrap()
}

fn session(grid: Grid) -> GameSession {
    GameSession::new(Difficulty::Level(1), Seed::for_level(1), grid)
}

#[test]
fn pair_of_fives_clears_for_ten_points() {
    let board = grid(&[[5, 5], [5, 5]]);
    let selection = Selection::new((0, 0), (0, 1));

    assert!(is_clearing(&board, selection));
    assert_eq!(apply_clear(&board, selection), grid(&[[0, 0], [5, 5]]));

    let mut session = session(board);
    session.begin_selection((0, 0)).unwrap();
    session.update_selection((0, 1)).unwrap();
    let events = session.end_selection().unwrap();
    assert!(matches!(
        events.as_slice(),
        [SessionEvent::Cleared { score_delta: 10, .. }]
    ));
}

#[test]
fn clearing_the_last_row_empties_the_board() {
    let board = grid(&[[3, 4, 3]]);
    let selection = Selection::new((0, 0), (0, 2));

    assert_eq!(sum(&selected_cells(&board, selection)), 10);
    let cleared = apply_clear(&board, selection);
    assert_eq!(cleared.to_vec(), vec![0, 0, 0]);
    assert!(is_empty(&cleared));

    let mut session = session(board);
    session.begin_selection((0, 2)).unwrap();
    session.update_selection((0, 0)).unwrap();
    let events = session.end_selection().unwrap();
    assert_eq!(events.last(), Some(&SessionEvent::Complete));
    assert!(session.is_complete());
}

#[test]
fn hint_moves_to_the_remaining_pair() {
    let mut session = session(grid(&[[1, 9], [2, 8]]));

    session.begin_selection((0, 0)).unwrap();
    session.update_selection((0, 1)).unwrap();
    session.end_selection().unwrap();

    assert_eq!(session.current_grid(), &grid(&[[0, 0], [2, 8]]));
    assert_eq!(session.find_hint(), Some(Selection::new((1, 0), (1, 1))));
}

#[test]
fn stuck_board_is_reshuffled_without_changing_its_tiles() {
    let board = grid(&[[1, 1], [1, 1]]);

    assert!(!has_any_move(&board));
    assert_eq!(find_hint(&board), None);

    let mut session = session(board);
    assert_eq!(
        session.ensure_playable().map_err(GameError::kind),
        Err(ErrorKind::StuckBoard)
    );
    let events = session.rescue_if_stuck().unwrap();
    assert_eq!(events.as_slice(), &[SessionEvent::Reshuffled]);
    assert_eq!(session.current_grid().live_values(), vec![1, 1, 1, 1]);
}

#[test]
fn first_level_has_an_adjacent_complementary_pair() {
    let board = generate(Difficulty::Level(1), &Seed::from("level_1"));

    assert_eq!(board.live_sum() % 10, 0);
    let has_pair = board.iter_live().any(|(cell, value)| {
        board
            .as_array()
            .iter_orthogonal(cell)
            .any(|other| u32::from(value) + u32::from(board[other]) == TARGET_SUM)
    });
    assert!(has_pair, "{board}");
}

#[test]
fn phone_viewport_fits_a_four_by_four_board() {
    let options = LayoutOptions {
        frame: 8,
        pad: 12,
        gap: 6,
        min_tile: 28,
        max_tile: 42,
        lock_tile: false,
    };
    let layout = compute_layout(Viewport::new(0.0, 0.0, 360.0, 480.0), 4, 4, &options).unwrap();

    assert_eq!(layout.cells.len(), 16);
    assert!(layout.ensure_fits().is_ok());
    assert!(4 * layout.tile_size + 3 * layout.gap <= layout.inner.width);
    assert!(4 * layout.tile_size + 3 * layout.gap <= layout.inner.height);
    assert!(
        layout.grid_width() * layout.grid_height() <= layout.inner.width * layout.inner.height
    );
}

#[test]
fn a_level_plays_out_by_following_hints() {
    let mut session = GameSession::start_level(2).unwrap();
    let start_total = session.current_grid().live_sum();
    let mut scored = 0;

    for _ in 0..200 {
        if session.is_complete() {
            break;
        }
        if !session.rescue_until_playable(16).unwrap() {
            break;
        }
        let hint = session.find_hint().unwrap();
        session.begin_selection(hint.anchor).unwrap();
        session.update_selection(hint.end).unwrap();
        for event in session.end_selection().unwrap() {
            if let SessionEvent::Cleared { score_delta, .. } = event {
                scored += score_delta;
            }
        }
    }

    assert_eq!(scored + session.current_grid().live_sum(), start_total);
}
