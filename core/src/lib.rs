use core::fmt;
use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use analysis::*;
pub use error::*;
pub use generator::*;
pub use layout::*;
pub use moves::*;
pub use session::*;
pub use tile::*;
pub use types::*;

mod analysis;
mod error;
mod generator;
mod layout;
mod moves;
mod session;
mod tile;
mod types;

/// Immutable grid of digit tiles, stored row-major with shape `(rows, cols)`.
///
/// A value of `0` is an empty cell, `1..=9` a live tile. Every operation that changes tiles returns a new grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Array2<u8>", into = "Array2<u8>")]
pub struct Grid {
    cells: Array2<u8>,
}

impl Grid {
    /// Builds a grid from row-major `cells`, `rows * cols` of them.
    pub fn new(rows: Coord, cols: Coord, cells: Vec<u8>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(GameError::InvalidDimensions);
        }
        let cells = Array2::from_shape_vec((rows, cols).to_nd_index(), cells)
            .map_err(|_| GameError::InvalidDimensions)?;
        Self::try_from(cells)
    }

    pub fn from_rows<const C: usize>(rows: &[[u8; C]]) -> Result<Self> {
        let row_count = rows.len().try_into().map_err(|_| GameError::InvalidDimensions)?;
        let col_count = C.try_into().map_err(|_| GameError::InvalidDimensions)?;
        Self::new(row_count, col_count, rows.concat())
    }

    pub fn empty(rows: Coord, cols: Coord) -> Result<Self> {
        Self::new(rows, cols, vec![EMPTY; usize::from(mult(rows, cols))])
    }

    pub(crate) fn from_array_unchecked(cells: Array2<u8>) -> Self {
        debug_assert!(cells.iter().all(|&value| value <= MAX_DIGIT));
        Self { cells }
    }

    /// `(rows, cols)`.
    pub fn size(&self) -> Coord2 {
        array_size(&self.cells)
    }

    /// Number of columns.
    pub fn width(&self) -> Coord {
        self.size().1
    }

    /// Number of rows.
    pub fn height(&self) -> Coord {
        self.size().0
    }

    pub fn total_cells(&self) -> CellCount {
        let (rows, cols) = self.size();
        mult(rows, cols)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn get(&self, coords: Coord2) -> Option<u8> {
        self.cells.get(coords.to_nd_index()).copied()
    }

    /// Row-major copy of every cell value.
    pub fn to_vec(&self) -> Vec<u8> {
        self.cells.iter().copied().collect()
    }

    pub fn as_array(&self) -> &Array2<u8> {
        &self.cells
    }

    pub fn iter_live(&self) -> impl Iterator<Item = (Coord2, u8)> + '_ {
        self.cells
            .indexed_iter()
            .filter(|&(_, &value)| is_live(value))
            .map(|((row, col), &value)| ((row as Coord, col as Coord), value))
    }

    pub fn live_count(&self) -> CellCount {
        self.cells.iter().filter(|&&value| is_live(value)).count() as CellCount
    }

    pub fn live_sum(&self) -> u32 {
        self.cells.iter().map(|&value| u32::from(value)).sum()
    }

    /// Live values in ascending order, the grid's multiset of tiles.
    pub fn live_values(&self) -> Vec<u8> {
        let mut values: Vec<u8> = self.iter_live().map(|(_, value)| value).collect();
        values.sort_unstable();
        values
    }

    /// True iff every cell is empty.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&value| !is_live(value))
    }

    /// Copy of this grid with `edit` applied to the cells.
    pub(crate) fn with_edit(&self, edit: impl FnOnce(&mut Array2<u8>)) -> Self {
        let mut cells = self.cells.clone();
        edit(&mut cells);
        Self::from_array_unchecked(cells)
    }
}

impl Index<Coord2> for Grid {
    type Output = u8;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

impl TryFrom<Array2<u8>> for Grid {
    type Error = GameError;

    fn try_from(cells: Array2<u8>) -> Result<Self> {
        let (rows, cols) = cells.dim();
        if rows == 0 || cols == 0 || rows > Coord::MAX.into() || cols > Coord::MAX.into() {
            return Err(GameError::InvalidDimensions);
        }
        if let Some(&value) = cells.iter().find(|&&value| value > MAX_DIGIT) {
            return Err(GameError::InvalidCellValue(value));
        }
        // keep the standard (row-major) layout whatever the source was
        let cells = cells.as_standard_layout().into_owned();
        Ok(Self { cells })
    }
}

impl From<Grid> for Array2<u8> {
    fn from(grid: Grid) -> Self {
        grid.cells
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.rows() {
            for &value in row {
                if is_live(value) {
                    write!(f, "{value}")?;
                } else {
                    f.write_str(".")?;
                }
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}
