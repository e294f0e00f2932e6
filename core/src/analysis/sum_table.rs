use ndarray::Array2;

use crate::*;

/// Source of rectangle sums over a grid's live values.
pub trait RangeSum {
    fn range_sum(&self, range: CellRange) -> u32;
}

/// Summed-area table: `prefix[(r, c)]` holds the sum of every cell above and left of `(r, c)`, exclusive.
///
/// Built once in `O(rows * cols)`, then answers any rectangle sum in constant time.
#[derive(Clone, Debug, PartialEq)]
pub struct SumTable {
    prefix: Array2<u32>,
}

impl SumTable {
    pub fn new(grid: &Grid) -> Self {
        let (rows, cols) = grid.as_array().dim();
        let mut prefix = Array2::zeros((rows + 1, cols + 1));
        for row in 0..rows {
            let mut row_sum = 0;
            for col in 0..cols {
                row_sum += u32::from(grid.as_array()[(row, col)]);
                prefix[(row + 1, col + 1)] = prefix[(row, col + 1)] + row_sum;
            }
        }
        Self { prefix }
    }
}

impl RangeSum for SumTable {
    fn range_sum(&self, range: CellRange) -> u32 {
        let (top, left) = (usize::from(range.top), usize::from(range.left));
        let (bottom, right) = (usize::from(range.bottom) + 1, usize::from(range.right) + 1);
        self.prefix[(bottom, right)] + self.prefix[(top, left)]
            - self.prefix[(top, right)]
            - self.prefix[(bottom, left)]
    }
}

/// Sums by walking every cell of the range, the reference the table must agree with.
impl RangeSum for Grid {
    fn range_sum(&self, range: CellRange) -> u32 {
        match range.clip(self.size()) {
            Some(range) => range.iter().map(|coords| u32::from(self[coords])).sum(),
            None => 0,
        }
    }
}
