use std::collections::VecDeque;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Grids kept for undo.
const HISTORY_LIMIT: usize = 32;

/// Mixed into the revision to salt the reshuffle stream.
const RESHUFFLE_SALT: u32 = 0x5EED_CAFE;

/// Valid transitions:
/// - Idle -> Selecting
/// - Selecting -> Selecting (drag moves, or a new drag starts)
/// - Selecting -> Idle (cancel)
/// - Selecting -> Evaluating -> Cleared -> Idle
/// - Selecting -> Evaluating -> Rejected -> Idle
/// - Selecting -> Evaluating -> Cleared -> Complete
///
/// Evaluating, Cleared and Rejected are passed through inside a single [`GameSession::end_selection`] call and only
/// show up in the trace log. Between calls [`GameSession::state`] is Idle, Selecting or Complete; the outcome of a
/// drag reaches the caller as a [`SessionEvent`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Idle,
    Selecting,
    Evaluating,
    Cleared,
    Rejected,
    /// Board is empty, no new moves are accepted
    Complete,
}

impl SessionState {
    pub const fn is_selecting(self) -> bool {
        matches!(self, Self::Selecting)
    }

    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }

    /// States a session only passes through while evaluating a drag.
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::Evaluating | Self::Cleared | Self::Rejected)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Notifications produced by session operations, in the order they happened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    Cleared {
        cells: Vec<SelectedCell>,
        score_delta: u32,
    },
    Rejected,
    Reshuffled,
    Complete,
}

impl SessionEvent {
    /// Whether this event came with a new grid
    pub const fn has_update(&self) -> bool {
        match self {
            Self::Cleared { .. } => true,
            Self::Rejected => false,
            Self::Reshuffled => true,
            Self::Complete => false,
        }
    }
}

pub type Events = SmallVec<[SessionEvent; 2]>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    NoChange,
    Changed,
}

impl EditOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

/// What a host stores to resume a session later.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSession {
    pub difficulty: Difficulty,
    pub seed: Seed,
    pub grid: Grid,
    #[serde(default)]
    pub revision: u64,
}

impl SavedSession {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// A level or challenge from start to finish: owns the current grid and the selection being dragged.
#[derive(Clone, Debug, PartialEq)]
pub struct GameSession {
    difficulty: Difficulty,
    seed: Seed,
    grid: Grid,
    state: SessionState,
    selection: Option<Selection>,
    revision: u64,
    history: VecDeque<Grid>,
}

impl GameSession {
    pub fn new(difficulty: Difficulty, seed: Seed, grid: Grid) -> Self {
        let state = if grid.is_empty() {
            SessionState::Complete
        } else {
            SessionState::Idle
        };
        log::debug!(
            "Session {:?} with seed {} on a {:?} board",
            difficulty,
            seed,
            grid.size()
        );
        Self {
            difficulty,
            seed,
            grid,
            state,
            selection: None,
            revision: 0,
            history: VecDeque::new(),
        }
    }

    /// Generates the board for `difficulty` from `seed` and starts on it.
    pub fn start(difficulty: Difficulty, seed: Seed) -> Self {
        let grid = generate(difficulty, &seed);
        Self::new(difficulty, seed, grid)
    }

    pub fn start_level(level: u32) -> Result<Self> {
        let difficulty = Difficulty::level(level)?;
        Ok(Self::start(difficulty, Seed::for_level(level)))
    }

    pub fn start_challenge() -> Self {
        Self::start(Difficulty::Challenge, Seed::challenge_now())
    }

    /// Resumes a stored session. A `level_<n>` seed has to name the stored level.
    pub fn from_saved(saved: SavedSession) -> Result<Self> {
        let SavedSession {
            difficulty,
            seed,
            grid,
            revision,
        } = saved;
        if let Difficulty::Level(level) = difficulty {
            Difficulty::level(level)?;
            if seed.level_index().is_some_and(|seeded| seeded != level) {
                return Err(GameError::InvalidSeed);
            }
        }
        let mut session = Self::new(difficulty, seed, grid);
        session.revision = revision;
        Ok(session)
    }

    pub fn snapshot(&self) -> SavedSession {
        SavedSession {
            difficulty: self.difficulty,
            seed: self.seed.clone(),
            grid: self.grid.clone(),
            revision: self.revision,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn seed(&self) -> &Seed {
        &self.seed
    }

    pub fn current_grid(&self) -> &Grid {
        &self.grid
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Bumped every time the grid is replaced.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_complete(&self) -> bool {
        self.state.is_complete()
    }

    /// Rectangle currently being dragged.
    pub fn selection(&self) -> Option<CellRange> {
        self.selection.map(|selection| selection.range())
    }

    /// Live sum under the current drag.
    pub fn preview_sum(&self) -> Option<u32> {
        self.selection
            .map(|selection| sum(&selected_cells(&self.grid, selection)))
    }

    pub fn find_hint(&self) -> Option<Selection> {
        find_hint(&self.grid)
    }

    pub fn has_any_move(&self) -> bool {
        has_any_move(&self.grid)
    }

    /// Live tiles remain but no selection clears.
    pub fn is_stuck(&self) -> bool {
        !self.grid.is_empty() && !self.has_any_move()
    }

    /// Fails with [`GameError::StuckBoard`] when the host should call [`Self::rescue_if_stuck`].
    pub fn ensure_playable(&self) -> Result<()> {
        if self.is_stuck() {
            Err(GameError::StuckBoard)
        } else {
            Ok(())
        }
    }

    pub fn begin_selection(&mut self, cell: Coord2) -> Result<()> {
        self.check_not_complete()?;
        let cell = self.grid.validate_coords(cell)?;

        if self.state.is_selecting() {
            log::debug!("Selection restarted at {:?}", cell);
        }
        self.selection = Some(Selection::single(cell));
        self.state = SessionState::Selecting;
        Ok(())
    }

    pub fn update_selection(&mut self, cell: Coord2) -> Result<()> {
        self.check_not_complete()?;
        let cell = self.grid.validate_coords(cell)?;

        match (&mut self.selection, self.state) {
            (Some(selection), SessionState::Selecting) => {
                selection.end = cell;
                Ok(())
            }
            _ => Err(GameError::NoSelection),
        }
    }

    /// Drops the drag in progress without evaluating it. Returns whether there was one.
    pub fn cancel_selection(&mut self) -> bool {
        if !self.state.is_selecting() {
            return false;
        }
        self.selection = None;
        self.state = SessionState::Idle;
        true
    }

    /// Evaluates the drag: clears it when its live tiles sum to ten, rejects it otherwise.
    pub fn end_selection(&mut self) -> Result<Events> {
        self.check_not_complete()?;
        if !self.state.is_selecting() {
            return Err(GameError::NoSelection);
        }
        let selection = self.selection.take().ok_or(GameError::NoSelection)?;
        self.transition(SessionState::Evaluating);

        let mut events = Events::new();
        if !is_clearing(&self.grid, selection) {
            self.transition(SessionState::Rejected);
            log::trace!("Rejected selection {:?}", selection.range());
            events.push(SessionEvent::Rejected);
            self.transition(SessionState::Idle);
            return Ok(events);
        }

        let cells = selected_cells(&self.grid, selection);
        let score_delta = sum(&cells);
        self.replace_grid(apply_clear(&self.grid, selection));
        self.transition(SessionState::Cleared);
        log::debug!(
            "Cleared {} tiles at {:?}, revision {}",
            cells.len(),
            selection.range(),
            self.revision
        );
        events.push(SessionEvent::Cleared { cells, score_delta });

        if self.grid.is_empty() {
            self.transition(SessionState::Complete);
            log::debug!("Board complete at revision {}", self.revision);
            events.push(SessionEvent::Complete);
        } else {
            self.transition(SessionState::Idle);
        }
        debug_assert!(!self.state.is_transient());
        Ok(events)
    }

    /// Permutes the live values over the live cells when no selection clears. Positions of empty cells, the multiset
    /// of values, and so the total, are unchanged. The new board is not guaranteed to have a move either.
    pub fn rescue_if_stuck(&mut self) -> Result<Events> {
        let mut events = Events::new();
        if !self.is_stuck() {
            return Ok(events);
        }

        let (coords, mut values): (Vec<Coord2>, Vec<u8>) = self.grid.iter_live().unzip();
        let mut rng = self
            .seed
            .derive_rng((self.revision as u32) ^ RESHUFFLE_SALT);
        values.shuffle(&mut rng);

        let shuffled = self.grid.with_edit(|cells| {
            for (&cell, &value) in coords.iter().zip(&values) {
                cells[cell.to_nd_index()] = value;
            }
        });
        self.replace_grid(shuffled);
        log::debug!(
            "Reshuffled {} stuck tiles, revision {}",
            values.len(),
            self.revision
        );
        events.push(SessionEvent::Reshuffled);
        Ok(events)
    }

    /// Reshuffles up to `max_attempts` times until a move exists. Returns whether the board is playable.
    pub fn rescue_until_playable(&mut self, max_attempts: u32) -> Result<bool> {
        for _ in 0..max_attempts {
            if !self.is_stuck() {
                return Ok(true);
            }
            self.rescue_if_stuck()?;
        }
        let playable = !self.is_stuck();
        if !playable {
            log::warn!(
                "Board still stuck after {} reshuffles at revision {}",
                max_attempts,
                self.revision
            );
        }
        Ok(playable)
    }

    /// Exchanges the values of two cells.
    pub fn swap(&mut self, a: Coord2, b: Coord2) -> Result<EditOutcome> {
        self.check_not_complete()?;
        let a = self.grid.validate_coords(a)?;
        let b = self.grid.validate_coords(b)?;

        if self.grid[a] == self.grid[b] {
            return Ok(EditOutcome::NoChange);
        }
        let swapped = self
            .grid
            .with_edit(|cells| cells.swap(a.to_nd_index(), b.to_nd_index()));
        self.replace_grid(swapped);
        Ok(EditOutcome::Changed)
    }

    /// Breaks the tile at `cell` into up to `parts` tiles with the same total, spilling into empty surrounding cells.
    ///
    /// Best effort: a tile of value `v` yields at most `v` parts and at most one per empty neighbour plus itself.
    /// Returns the resulting tiles, origin first, or nothing when the tile could not be split.
    pub fn split(&mut self, cell: Coord2, parts: u8) -> Result<Vec<SelectedCell>> {
        self.check_not_complete()?;
        let cell = self.grid.validate_coords(cell)?;

        let value = self.grid[cell];
        let targets: Vec<Coord2> = self
            .grid
            .as_array()
            .iter_neighbors(cell)
            .filter(|&neighbor| !is_live(self.grid[neighbor]))
            .collect();
        let count = parts.min(value).min((targets.len() + 1) as u8);
        if count < 2 {
            return Ok(Vec::new());
        }

        let (base, remainder) = (value / count, value % count);
        let pieces: Vec<SelectedCell> = core::iter::once(cell)
            .chain(targets)
            .take(usize::from(count))
            .enumerate()
            .map(|(i, coords)| SelectedCell {
                coords,
                value: base + u8::from((i as u8) < remainder),
            })
            .collect();

        let split = self.grid.with_edit(|cells| {
            for piece in &pieces {
                cells[piece.coords.to_nd_index()] = piece.value;
            }
        });
        self.replace_grid(split);
        Ok(pieces)
    }

    /// Restores the grid before the last change.
    pub fn undo(&mut self) -> Result<()> {
        let previous = self.history.pop_back().ok_or(GameError::NothingToUndo)?;
        self.grid = previous;
        self.revision += 1;
        self.selection = None;
        self.state = if self.grid.is_empty() {
            SessionState::Complete
        } else {
            SessionState::Idle
        };
        Ok(())
    }

    fn transition(&mut self, next: SessionState) {
        log::trace!("Session {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn replace_grid(&mut self, grid: Grid) {
        let previous = core::mem::replace(&mut self.grid, grid);
        self.history.push_back(previous);
        if self.history.len() > HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.revision += 1;
    }

    fn check_not_complete(&self) -> Result<()> {
        if self.state.is_complete() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}
