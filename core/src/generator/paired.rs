use ndarray::Array2;
use rand::Rng;
use rand::seq::SliceRandom;
use smallvec::SmallVec;

use super::*;

/// Attempt budget of the adjacent-pair phase, per requested pair.
const ATTEMPTS_PER_PAIR: u32 = 100;
const MAX_ADJUST_ITERATIONS: u16 = 100;
/// Swap partners tried per clashing large digit.
const DISPERSION_TRIES: u32 = 3;

/// Generation strategy that seeds the board with complementary pairs, adjacent ones first, then fills the rest of
/// the live region from the profile's digit distribution and balances the total to a multiple of ten.
#[derive(Clone, Debug, PartialEq)]
pub struct PairedBoardGenerator {
    seed: Seed,
}

impl PairedBoardGenerator {
    pub fn new(seed: Seed) -> Self {
        Self { seed }
    }
}

impl BoardGenerator for PairedBoardGenerator {
    fn generate(self, profile: &LevelProfile) -> GeneratedBoard {
        let mut rng = self.seed.rng();
        let region = profile.live_region();
        let mut placement = Placement::new(profile.board, region);

        let half = f64::from(region.area()) / 2.0;
        let mut stats = GenerationStats {
            live_cells: region.area(),
            pairs_requested: (half * profile.pair_fraction).floor() as CellCount,
            adjacent_requested: (half * profile.pair_fraction * profile.adjacency_fraction).floor()
                as CellCount,
            ..Default::default()
        };

        stats.adjacent_placed = placement.place_adjacent_pairs(&mut rng, stats.adjacent_requested);
        let free_target = stats.pairs_requested.saturating_sub(stats.adjacent_placed);
        stats.free_placed = placement.place_free_pairs(&mut rng, free_target);

        let filler = placement.fill(&mut rng, &profile.distribution);
        stats.filler_cells = filler.len() as CellCount;
        let (iterations, used_fallback) = placement.balance(&mut rng, &filler);
        stats.adjust_iterations = iterations;
        stats.used_fallback = used_fallback;
        stats.dispersion_swaps = placement.disperse_large(&mut rng, &filler);

        let grid = Grid::from_array_unchecked(placement.cells);
        debug_assert_eq!(
            grid.live_sum() % TARGET_SUM,
            0,
            "generated board does not sum to a multiple of ten:\n{grid}"
        );

        if stats.underfilled() {
            log::warn!(
                "Seed {} placed {} of {} pairs ({} of {} adjacent)",
                self.seed,
                stats.pairs_placed(),
                stats.pairs_requested,
                stats.adjacent_placed,
                stats.adjacent_requested
            );
        }
        log::debug!("Generated board for seed {}: {:?}", self.seed, stats);

        GeneratedBoard { grid, stats }
    }
}

/// Board under construction.
struct Placement {
    cells: Array2<u8>,
    /// Cells holding a placed pair, never touched after placement.
    locked: Array2<bool>,
    region: CellRange,
    /// Empty cells of the live region.
    open: Vec<Coord2>,
}

impl Placement {
    fn new(board: Coord2, region: CellRange) -> Self {
        Self {
            cells: Array2::zeros(board.to_nd_index()),
            locked: Array2::default(board.to_nd_index()),
            region,
            open: region.iter().collect(),
        }
    }

    fn at(&self, coords: Coord2) -> u8 {
        self.cells[coords.to_nd_index()]
    }

    /// A pair must not leave exactly one open cell, a single filler digit cannot balance the total.
    fn may_place_pair(&self) -> bool {
        self.open.len() >= 2 && self.open.len() != 3
    }

    fn close(&mut self, coords: Coord2) {
        if let Some(index) = self.open.iter().position(|&open| open == coords) {
            self.open.swap_remove(index);
        }
    }

    fn put_pair<R: Rng + ?Sized>(&mut self, rng: &mut R, first: Coord2, second: Coord2) {
        let low = rng.random_range(1..=5u8);
        let high = complement(low).unwrap_or(low);
        let (a, b) = if rng.random_bool(0.5) {
            (low, high)
        } else {
            (high, low)
        };
        self.cells[first.to_nd_index()] = a;
        self.cells[second.to_nd_index()] = b;
        self.locked[first.to_nd_index()] = true;
        self.locked[second.to_nd_index()] = true;
        log::trace!("Pair {}+{} at {:?} and {:?}", a, b, first, second);
    }

    fn place_adjacent_pairs<R: Rng + ?Sized>(&mut self, rng: &mut R, target: CellCount) -> CellCount {
        let budget = ATTEMPTS_PER_PAIR * u32::from(target);
        let mut attempts = 0;
        let mut placed = 0;

        while placed < target && attempts < budget && self.may_place_pair() {
            attempts += 1;
            let first = self.open[rng.random_range(0..self.open.len())];
            let mut neighbors: SmallVec<[Coord2; 4]> = self.cells.iter_orthogonal(first).collect();
            neighbors.shuffle(rng);

            let Some(second) = neighbors
                .into_iter()
                .find(|&coords| self.region.contains(coords) && !is_live(self.at(coords)))
            else {
                continue;
            };

            self.close(first);
            self.close(second);
            self.put_pair(rng, first, second);
            placed += 1;
        }

        log::trace!(
            "Adjacent pairs: {} of {} in {} attempts",
            placed,
            target,
            attempts
        );
        placed
    }

    fn place_free_pairs<R: Rng + ?Sized>(&mut self, rng: &mut R, target: CellCount) -> CellCount {
        let mut placed = 0;
        while placed < target && self.may_place_pair() {
            let first = self.open.swap_remove(rng.random_range(0..self.open.len()));
            let second = self.open.swap_remove(rng.random_range(0..self.open.len()));
            self.put_pair(rng, first, second);
            placed += 1;
        }
        placed
    }

    /// Fills every open cell with a digit from `distribution`, returning the filled cells row-major.
    fn fill<R: Rng + ?Sized>(&mut self, rng: &mut R, distribution: &DigitDistribution) -> Vec<Coord2> {
        let mut filler = core::mem::take(&mut self.open);
        filler.sort_unstable();
        for &coords in &filler {
            let band = distribution.band_for(rng.random::<f64>());
            self.cells[coords.to_nd_index()] = rng.random_range(band.digits());
        }
        filler
    }

    fn total(&self) -> u32 {
        self.cells.iter().map(|&value| u32::from(value)).sum()
    }

    /// Nudges filler digits until the board total is a multiple of ten. Returns the iterations spent and whether the
    /// fallback pattern had to be used.
    fn balance<R: Rng + ?Sized>(&mut self, rng: &mut R, filler: &[Coord2]) -> (u16, bool) {
        // pairs sum to ten each, so without filler the total is already right
        if filler.is_empty() {
            return (0, false);
        }
        debug_assert_ne!(filler.len(), 1, "a single filler cell cannot balance the board");

        let max = u32::from(MAX_DIGIT);
        let mut total = self.total();
        let mut iterations = 0;
        while total % TARGET_SUM != 0 && iterations < MAX_ADJUST_ITERATIONS {
            iterations += 1;
            let up = TARGET_SUM - total % TARGET_SUM;
            let down = total % TARGET_SUM;
            let coords = filler[rng.random_range(0..filler.len())];
            let value = u32::from(self.at(coords));

            // take the shorter way to a multiple of ten when this cell has room for it
            let next = if (up <= down && value < max) || value <= 1 {
                value + up.min(max - value)
            } else {
                value - down.min(value - 1)
            };
            self.cells[coords.to_nd_index()] = next as u8;
            total = total + next - value;
        }

        if total % TARGET_SUM == 0 {
            return (iterations, false);
        }

        log::warn!(
            "Filler did not balance in {} iterations, using the fallback pattern",
            iterations
        );
        self.fill_fallback(filler);
        (iterations, true)
    }

    /// All filler cells to 1, then the shortfall spread from the first cell on. Always balances two or more cells.
    fn fill_fallback(&mut self, filler: &[Coord2]) {
        for &coords in filler {
            self.cells[coords.to_nd_index()] = 1;
        }
        let mut missing = (TARGET_SUM - self.total() % TARGET_SUM) % TARGET_SUM;
        for &coords in filler {
            if missing == 0 {
                break;
            }
            let add = missing.min(u32::from(MAX_DIGIT) - 1);
            self.cells[coords.to_nd_index()] += add as u8;
            missing -= add;
        }
    }

    /// Orthogonal neighbours holding the same large digit.
    fn clashes(&self, coords: Coord2) -> u32 {
        let value = self.at(coords);
        if DigitBand::of(value) != Some(DigitBand::Large) {
            return 0;
        }
        self.cells
            .iter_orthogonal(coords)
            .filter(|&neighbor| self.at(neighbor) == value)
            .count() as u32
    }

    fn swap(&mut self, a: Coord2, b: Coord2) {
        self.cells.swap(a.to_nd_index(), b.to_nd_index());
    }

    /// One pass over large filler digits, swapping clashing ones with other large filler digits when that lowers the
    /// number of equal large neighbours. Pair cells are left alone.
    fn disperse_large<R: Rng + ?Sized>(&mut self, rng: &mut R, filler: &[Coord2]) -> CellCount {
        let large: Vec<Coord2> = filler
            .iter()
            .copied()
            .filter(|&coords| {
                !self.locked[coords.to_nd_index()]
                    && DigitBand::of(self.at(coords)) == Some(DigitBand::Large)
            })
            .collect();
        if large.len() < 2 {
            return 0;
        }

        let mut swaps = 0;
        for &coords in &large {
            if self.clashes(coords) == 0 {
                continue;
            }
            for _ in 0..DISPERSION_TRIES {
                let other = large[rng.random_range(0..large.len())];
                if self.at(other) == self.at(coords) {
                    continue;
                }
                let before = self.clashes(coords) + self.clashes(other);
                self.swap(coords, other);
                if self.clashes(coords) + self.clashes(other) < before {
                    swaps += 1;
                    break;
                }
                self.swap(coords, other);
            }
        }
        swaps
    }
}
