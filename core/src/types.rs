use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Single coordinate axis used for grid rows, columns, and their counts.
pub type Coord = u8;

/// Count type used for tile counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(row, col)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Inclusive, normalized rectangle of cells: `top <= bottom` and `left <= right`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRange {
    pub top: Coord,
    pub left: Coord,
    pub bottom: Coord,
    pub right: Coord,
}

impl CellRange {
    /// Bounding rectangle of two corner cells given in any order.
    pub fn spanning(a: Coord2, b: Coord2) -> Self {
        Self {
            top: a.0.min(b.0),
            left: a.1.min(b.1),
            bottom: a.0.max(b.0),
            right: a.1.max(b.1),
        }
    }

    pub const fn rows(&self) -> CellCount {
        (self.bottom - self.top) as CellCount + 1
    }

    pub const fn cols(&self) -> CellCount {
        (self.right - self.left) as CellCount + 1
    }

    pub const fn area(&self) -> CellCount {
        self.rows() * self.cols()
    }

    pub const fn top_left(&self) -> Coord2 {
        (self.top, self.left)
    }

    pub const fn bottom_right(&self) -> Coord2 {
        (self.bottom, self.right)
    }

    pub const fn contains(&self, (row, col): Coord2) -> bool {
        row >= self.top && row <= self.bottom && col >= self.left && col <= self.right
    }

    /// Intersects with a `(rows, cols)` grid, `None` when nothing of the range lies inside.
    pub fn clip(&self, (rows, cols): Coord2) -> Option<Self> {
        if rows == 0 || cols == 0 || self.top >= rows || self.left >= cols {
            return None;
        }
        Some(Self {
            top: self.top,
            left: self.left,
            bottom: self.bottom.min(rows - 1),
            right: self.right.min(cols - 1),
        })
    }

    /// Row-major iteration over every cell of the range.
    pub fn iter(&self) -> impl Iterator<Item = Coord2> + use<> {
        let range = *self;
        (range.top..=range.bottom)
            .flat_map(move |row| (range.left..=range.right).map(move |col| (row, col)))
    }
}

pub trait NeighborIterExt {
    /// All eight surrounding cells that lie in bounds.
    fn iter_neighbors(&self, index: Coord2) -> NeighborIter;

    /// The four edge-sharing cells that lie in bounds.
    fn iter_orthogonal(&self, index: Coord2) -> NeighborIter;
}

impl<T> NeighborIterExt for Array2<T> {
    fn iter_neighbors(&self, index: Coord2) -> NeighborIter {
        NeighborIter::new(index, array_size(self), &DISPLACEMENTS)
    }

    fn iter_orthogonal(&self, index: Coord2) -> NeighborIter {
        NeighborIter::new(index, array_size(self), &ORTHOGONAL)
    }
}

/// `(rows, cols)` of an array, saturating at the coordinate range.
pub(crate) fn array_size<T>(array: &Array2<T>) -> Coord2 {
    let (rows, cols) = array.dim();
    (
        rows.try_into().unwrap_or(Coord::MAX),
        cols.try_into().unwrap_or(Coord::MAX),
    )
}

const DISPLACEMENTS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

pub(crate) const ORTHOGONAL: [(isize, isize); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
pub(crate) fn apply_delta(coords: Coord2, delta: (isize, isize), bounds: Coord2) -> Option<Coord2> {
    let (row, col) = coords;
    let (d_row, d_col) = delta;
    let (max_row, max_col) = bounds;

    let next_row = row.checked_add_signed(d_row.try_into().ok()?)?;
    if next_row >= max_row {
        return None;
    }

    let next_col = col.checked_add_signed(d_col.try_into().ok()?)?;
    if next_col >= max_col {
        return None;
    }

    Some((next_row, next_col))
}

#[derive(Debug)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    deltas: &'static [(isize, isize)],
    index: u8,
}

impl NeighborIter {
    pub(crate) fn new(center: Coord2, bounds: Coord2, deltas: &'static [(isize, isize)]) -> Self {
        Self {
            center,
            bounds,
            deltas,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let delta = self.deltas.get(usize::from(self.index))?;
            let next_item = apply_delta(self.center, *delta, self.bounds);
            self.index += 1;

            if next_item.is_some() {
                return next_item;
            }
        }
    }
}
