use serde::{Deserialize, Serialize};

use crate::*;
pub use paired::*;
pub use seed::*;

mod paired;
mod seed;

/// Default host aspect, columns over rows, of a portrait phone.
pub const DEFAULT_ASPECT: f64 = 0.75;

/// Tiles on a full board: challenge mode and every level from 51 on.
pub const FULL_BOARD_TILES: CellCount = 120;

pub trait BoardGenerator {
    fn generate(self, profile: &LevelProfile) -> GeneratedBoard;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    /// Campaign level, starting at 1.
    Level(u32),
    /// Timed mode on a full board with a harder digit mix.
    Challenge,
}

impl Difficulty {
    pub fn level(level: u32) -> Result<Self> {
        if level == 0 {
            Err(GameError::InvalidLevel)
        } else {
            Ok(Self::Level(level))
        }
    }

    pub const fn is_challenge(self) -> bool {
        matches!(self, Self::Challenge)
    }

    /// Canonical seed: `level_<n>` for levels, a fresh time-based seed for challenges.
    pub fn default_seed(self) -> Seed {
        match self {
            Self::Level(level) => Seed::for_level(level.max(1)),
            Self::Challenge => Seed::challenge_now(),
        }
    }
}

/// Fractions of filler digits drawn from `1..=3`, `4..=6` and `7..=9`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DigitDistribution {
    pub small: f64,
    pub medium: f64,
    pub large: f64,
}

impl DigitDistribution {
    /// Normalizes the weights to sum to 1; negative weights count as 0 and all-zero weights fall back to small digits.
    pub fn new(small: f64, medium: f64, large: f64) -> Self {
        let weights = [small, medium, large].map(|w| if w.is_finite() { w.max(0.0) } else { 0.0 });
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Self {
                small: 1.0,
                medium: 0.0,
                large: 0.0,
            };
        }
        Self {
            small: weights[0] / total,
            medium: weights[1] / total,
            large: weights[2] / total,
        }
    }

    /// Splits what the large share leaves evenly between small and medium.
    pub fn with_large_share(large: f64) -> Self {
        let large = large.clamp(0.0, 1.0);
        let rest = (1.0 - large) / 2.0;
        Self::new(rest, rest, large)
    }

    /// Band for a uniform draw `roll` in `[0, 1)`.
    pub fn band_for(&self, roll: f64) -> DigitBand {
        if roll < self.small {
            DigitBand::Small
        } else if roll < self.small + self.medium {
            DigitBand::Medium
        } else {
            DigitBand::Large
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Preferred board aspect, columns over rows.
    pub aspect: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            aspect: DEFAULT_ASPECT,
        }
    }
}

impl GeneratorConfig {
    pub fn new(aspect: f64) -> Self {
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            log::warn!("Ignoring invalid board aspect {aspect}, using {DEFAULT_ASPECT}");
            DEFAULT_ASPECT
        };
        Self { aspect }
    }
}

/// Everything the generator needs to know about a difficulty.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelProfile {
    /// Requested live tiles. The live region rounds this up to a full rectangle.
    pub tile_count: CellCount,
    /// Full board `(rows, cols)`, the live region is centered inside it.
    pub board: Coord2,
    pub distribution: DigitDistribution,
    /// Share of live tiles pre-placed as complementary pairs.
    pub pair_fraction: f64,
    /// Share of those pairs placed orthogonally adjacent.
    pub adjacency_fraction: f64,
}

struct Band {
    tile_count: CellCount,
    capacity: CellCount,
    pair_fraction: f64,
    adjacency_fraction: f64,
    distribution: DigitDistribution,
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t.clamp(0.0, 1.0)
}

/// Fraction of the way `level` is through `first..=last`.
fn progress(level: u32, first: u32, last: u32) -> f64 {
    f64::from(level.saturating_sub(first)) / f64::from(last - first)
}

fn band_for(difficulty: Difficulty) -> Band {
    let level = match difficulty {
        Difficulty::Challenge => {
            return Band {
                tile_count: FULL_BOARD_TILES,
                capacity: FULL_BOARD_TILES,
                pair_fraction: 0.30,
                adjacency_fraction: 0.25,
                distribution: DigitDistribution::new(0.3, 0.3, 0.4),
            };
        }
        Difficulty::Level(level) => level.max(1),
    };
    // ramps are integer so tile counts do not depend on float rounding
    let ramp = |first: u32, from: u32, span: u32, steps: u32| {
        (from + (level - first) * span / steps) as CellCount
    };

    match level {
        1..=5 => Band {
            tile_count: ramp(1, 10, 3, 2),
            capacity: 20,
            pair_fraction: 0.95,
            adjacency_fraction: 0.90,
            distribution: DigitDistribution::new(0.6, 0.4, 0.0),
        },
        6..=10 => Band {
            tile_count: ramp(6, 17, 3, 2),
            capacity: 30,
            pair_fraction: 0.85,
            adjacency_fraction: 0.80,
            distribution: DigitDistribution::new(0.55, 0.40, 0.05),
        },
        11..=20 => Band {
            tile_count: ramp(11, 28, 22, 9),
            capacity: 56,
            pair_fraction: 0.75,
            adjacency_fraction: 0.70,
            distribution: DigitDistribution::new(0.50, 0.45, 0.05),
        },
        21..=50 => {
            let t = progress(level, 21, 50);
            Band {
                tile_count: ramp(21, 53, 67, 29),
                capacity: FULL_BOARD_TILES,
                pair_fraction: lerp(0.65, 0.55, t),
                adjacency_fraction: lerp(0.60, 0.50, t),
                distribution: DigitDistribution::new(0.45, 0.45, 0.10),
            }
        }
        51..=150 => {
            let t = progress(level, 51, 150);
            Band {
                tile_count: FULL_BOARD_TILES,
                capacity: FULL_BOARD_TILES,
                pair_fraction: lerp(0.45, 0.35, t),
                adjacency_fraction: lerp(0.40, 0.30, t),
                distribution: DigitDistribution::with_large_share(lerp(0.30, 0.40, t)),
            }
        }
        _ => Band {
            tile_count: FULL_BOARD_TILES,
            capacity: FULL_BOARD_TILES,
            pair_fraction: 0.30,
            adjacency_fraction: 0.25,
            distribution: DigitDistribution::with_large_share(0.60),
        },
    }
}

impl LevelProfile {
    pub fn new(difficulty: Difficulty, config: &GeneratorConfig) -> Self {
        let band = band_for(difficulty);
        let profile = Self {
            tile_count: band.tile_count,
            board: board_shape(band.capacity, config.aspect),
            distribution: band.distribution,
            pair_fraction: band.pair_fraction,
            adjacency_fraction: band.adjacency_fraction,
        };
        log::debug!("Profile for {:?}: {:?}", difficulty, profile);
        profile
    }

    /// Centered rectangle holding the live tiles: as square as the board allows, at least `tile_count` cells.
    pub fn live_region(&self) -> CellRange {
        let (rows, cols) = self.board;
        let (rows, cols) = (rows.max(1), cols.max(1));
        // one lone filler tile could never bring the total to a multiple of ten
        let tiles = self.tile_count.clamp(2.min(mult(rows, cols)), mult(rows, cols));

        let mut live_cols = ceil_sqrt(tiles).min(CellCount::from(cols));
        let mut live_rows = tiles.div_ceil(live_cols);
        if live_rows > CellCount::from(rows) {
            live_rows = CellCount::from(rows);
            live_cols = tiles.div_ceil(live_rows);
        }
        // both fit in a Coord: they are bounded by rows and cols
        let (live_rows, live_cols) = (live_rows as Coord, live_cols as Coord);

        let top = (rows - live_rows) / 2;
        let left = (cols - live_cols) / 2;
        CellRange {
            top,
            left,
            bottom: top + live_rows - 1,
            right: left + live_cols - 1,
        }
    }
}

fn ceil_sqrt(value: CellCount) -> CellCount {
    let root = value.isqrt();
    if root * root < value { root + 1 } else { root }
}

/// Picks `(rows, cols)` with room for `capacity` cells, scoring wasted cells and distance from `aspect`.
pub fn board_shape(capacity: CellCount, aspect: f64) -> Coord2 {
    let capacity = capacity.max(1);
    let aspect = if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        DEFAULT_ASPECT
    };

    let mut best: Option<(Coord2, f64)> = None;
    for cols in 1..=capacity.min(Coord::MAX.into()) {
        let rows = capacity.div_ceil(cols);
        if rows > Coord::MAX.into() {
            continue;
        }
        let waste = f64::from(rows * cols - capacity) / f64::from(capacity);
        let shape = f64::from(cols) / f64::from(rows);
        let score = waste + (shape / aspect).ln().abs();
        match best {
            Some((_, best_score)) if score >= best_score => {}
            _ => best = Some(((rows as Coord, cols as Coord), score)),
        }
    }
    best.map(|(shape, _)| shape).unwrap_or((1, 1))
}

/// What the generator managed to place, for diagnostics.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub live_cells: CellCount,
    pub pairs_requested: CellCount,
    pub adjacent_requested: CellCount,
    pub adjacent_placed: CellCount,
    pub free_placed: CellCount,
    pub filler_cells: CellCount,
    pub adjust_iterations: u16,
    pub used_fallback: bool,
    pub dispersion_swaps: CellCount,
}

impl GenerationStats {
    pub const fn pairs_placed(&self) -> CellCount {
        self.adjacent_placed + self.free_placed
    }

    pub const fn underfilled(&self) -> bool {
        self.adjacent_placed < self.adjacent_requested || self.pairs_placed() < self.pairs_requested
    }

    /// Fails with [`GameError::GenerationUnderfilled`] when any pair target was missed.
    pub fn ensure_filled(&self) -> Result<()> {
        if self.underfilled() {
            Err(GameError::GenerationUnderfilled {
                requested: self.pairs_requested,
                placed: self.pairs_placed(),
            })
        } else {
            Ok(())
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedBoard {
    pub grid: Grid,
    pub stats: GenerationStats,
}

/// Board for `difficulty`, fully determined by `seed`.
pub fn generate(difficulty: Difficulty, seed: &Seed) -> Grid {
    generate_with_stats(difficulty, seed, &GeneratorConfig::default()).grid
}

pub fn generate_with_stats(
    difficulty: Difficulty,
    seed: &Seed,
    config: &GeneratorConfig,
) -> GeneratedBoard {
    let profile = LevelProfile::new(difficulty, config);
    PairedBoardGenerator::new(seed.clone()).generate(&profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(level: u32) -> LevelProfile {
        LevelProfile::new(Difficulty::Level(level), &GeneratorConfig::default())
    }

    #[test]
    fn ceil_sqrt_rounds_up() {
        assert_eq!(ceil_sqrt(0), 0);
        assert_eq!(ceil_sqrt(1), 1);
        assert_eq!(ceil_sqrt(10), 4);
        assert_eq!(ceil_sqrt(16), 4);
        assert_eq!(ceil_sqrt(17), 5);
        assert_eq!(ceil_sqrt(CellCount::MAX), 256);
    }

    #[test]
    fn level_zero_is_rejected() {
        assert_eq!(Difficulty::level(0), Err(GameError::InvalidLevel));
        assert_eq!(Difficulty::level(3), Ok(Difficulty::Level(3)));
    }

    #[test]
    fn tile_counts_follow_the_bands() {
        assert_eq!(profile(1).tile_count, 10);
        assert_eq!(profile(5).tile_count, 16);
        assert_eq!(profile(6).tile_count, 17);
        assert_eq!(profile(10).tile_count, 23);
        assert_eq!(profile(11).tile_count, 28);
        assert_eq!(profile(20).tile_count, 50);
        assert_eq!(profile(21).tile_count, 53);
        assert_eq!(profile(50).tile_count, 120);
        assert_eq!(profile(51).tile_count, FULL_BOARD_TILES);
        assert_eq!(profile(400).tile_count, FULL_BOARD_TILES);
    }

    #[test]
    fn later_levels_have_fewer_pairs_and_bigger_digits() {
        let early = profile(1);
        let middle = profile(100);
        let late = profile(200);

        assert!(early.pair_fraction > middle.pair_fraction);
        assert!(middle.pair_fraction > late.pair_fraction);
        assert_eq!(early.distribution.large, 0.0);
        assert!(late.distribution.large > middle.distribution.large);
        assert!((late.distribution.large - 0.6).abs() < 1e-9);
    }

    #[test]
    fn challenge_uses_a_full_board() {
        let profile = LevelProfile::new(Difficulty::Challenge, &GeneratorConfig::default());

        assert_eq!(profile.tile_count, 120);
        assert_eq!(profile.board, (12, 10));
        assert_eq!(profile.live_region().area(), 120);
    }

    #[test]
    fn board_shape_follows_aspect() {
        assert_eq!(board_shape(120, 0.75), (12, 10));
        assert_eq!(board_shape(20, 0.75), (5, 4));
        assert_eq!(board_shape(120, 4.0 / 3.0), (10, 12));
        assert_eq!(board_shape(1, 0.75), (1, 1));
    }

    #[test]
    fn early_live_region_is_centered_with_empty_border() {
        let profile = profile(1);
        let region = profile.live_region();

        assert_eq!(profile.board, (5, 4));
        assert_eq!(region, CellRange::spanning((1, 0), (3, 3)));
        assert!(region.area() >= profile.tile_count);
    }

    #[test]
    fn live_region_never_exceeds_the_board() {
        for level in 1..=60 {
            let profile = profile(level);
            let region = profile.live_region();
            assert!(region.bottom < profile.board.0, "level {level}");
            assert!(region.right < profile.board.1, "level {level}");
            assert!(region.area() >= profile.tile_count, "level {level}");
        }
    }

    #[test]
    fn distribution_is_normalized() {
        let distribution = DigitDistribution::new(2.0, 1.0, 1.0);

        assert!((distribution.small - 0.5).abs() < 1e-9);
        assert_eq!(distribution.band_for(0.49), DigitBand::Small);
        assert_eq!(distribution.band_for(0.6), DigitBand::Medium);
        assert_eq!(distribution.band_for(0.99), DigitBand::Large);
        assert_eq!(DigitDistribution::new(0.0, 0.0, 0.0).band_for(0.7), DigitBand::Small);
    }
}
