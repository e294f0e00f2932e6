//! Pixel geometry of the board.
//!
//! Maps the container the host reserves for the board, plus the grid's `(rows, cols)`, to integer pixel rectangles for
//! every cell. The computation is pure: the same inputs always produce the same [`Layout`].

use serde::{Deserialize, Serialize};

use crate::*;

/// Smallest gap the lock-tile mode shrinks down to.
pub const MIN_GAP: i32 = 2;

/// Upper bound for tile size, gap, frame and padding, so a full row of `Coord::MAX` cells stays within `i32`.
pub const MAX_OPTION_PX: i32 = 1 << 16;

/// Largest viewport coordinate or size accepted, in pixels.
pub const MAX_VIEWPORT_PX: f64 = 16_777_216.0;

/// Container rectangle reported by the host, in (possibly fractional) device pixels.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    fn validate(&self) -> Result<()> {
        let finite = [self.left, self.top, self.width, self.height]
            .iter()
            .all(|value| value.is_finite() && value.abs() <= MAX_VIEWPORT_PX);
        if finite && self.width > 0.0 && self.height > 0.0 {
            Ok(())
        } else {
            Err(GameError::InvalidViewport)
        }
    }
}

/// Integer pixel rectangle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    pub const fn right(&self) -> i32 {
        self.left + self.width
    }

    pub const fn bottom(&self) -> i32 {
        self.top + self.height
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= f64::from(self.left)
            && x < f64::from(self.right())
            && y >= f64::from(self.top)
            && y < f64::from(self.bottom())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutOptions {
    /// Thickness of the frame drawn around the board.
    pub frame: i32,
    /// Padding between the frame and the tiles.
    pub pad: i32,
    /// Preferred gap between tiles.
    pub gap: i32,
    pub min_tile: i32,
    pub max_tile: i32,
    /// Keep tiles at `max_tile` and shrink the gap instead of shrinking tiles.
    pub lock_tile: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            frame: 8,
            pad: 12,
            gap: 6,
            min_tile: 28,
            max_tile: 42,
            lock_tile: false,
        }
    }
}

impl LayoutOptions {
    fn validate(&self) -> Result<()> {
        let in_range = |value: i32| (0..=MAX_OPTION_PX).contains(&value);
        if self.min_tile < 1
            || self.min_tile > self.max_tile
            || !in_range(self.max_tile)
            || !in_range(self.gap)
            || !in_range(self.frame)
            || !in_range(self.pad)
        {
            Err(GameError::InvalidTileRange)
        } else {
            Ok(())
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRect {
    pub row: Coord,
    pub col: Coord,
    pub left: i32,
    pub top: i32,
    pub size: i32,
}

impl CellRect {
    pub const fn coords(&self) -> Coord2 {
        (self.row, self.col)
    }

    pub const fn rect(&self) -> PixelRect {
        PixelRect {
            left: self.left,
            top: self.top,
            width: self.size,
            height: self.size,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub rows: Coord,
    pub cols: Coord,
    pub tile_size: i32,
    pub gap: i32,
    pub padding: i32,
    /// Tile block plus padding and frame on both sides.
    pub board_width: i32,
    pub board_height: i32,
    /// Area available to the tiles once frame and padding are taken off the viewport.
    pub inner: PixelRect,
    /// One rectangle per cell, row-major.
    pub cells: Vec<CellRect>,
    /// `inner` size minus tile block size, negative when the tiles do not fit.
    pub slack: (i32, i32),
}

impl Layout {
    /// Tile block width for `cols` columns.
    pub const fn grid_width(&self) -> i32 {
        span(self.cols as i32, self.tile_size, self.gap)
    }

    pub const fn grid_height(&self) -> i32 {
        span(self.rows as i32, self.tile_size, self.gap)
    }

    pub const fn overflowed(&self) -> bool {
        self.slack.0 < 0 || self.slack.1 < 0
    }

    /// Fails with [`GameError::LayoutOverflow`] when the tiles spill out of `inner`.
    pub fn ensure_fits(&self) -> Result<&Self> {
        if self.overflowed() {
            Err(GameError::LayoutOverflow {
                horizontal: (-self.slack.0).max(0),
                vertical: (-self.slack.1).max(0),
            })
        } else {
            Ok(self)
        }
    }

    pub fn cell_rect(&self, (row, col): Coord2) -> Option<&CellRect> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells
            .get(usize::from(row) * usize::from(self.cols) + usize::from(col))
    }

    /// Pixel bounds of a cell range, from the first cell's corner to the last cell's far edge.
    pub fn range_rect(&self, range: CellRange) -> Option<PixelRect> {
        let first = self.cell_rect(range.top_left())?;
        let last = self.cell_rect(range.bottom_right())?;
        Some(PixelRect {
            left: first.left,
            top: first.top,
            width: last.left + last.size - first.left,
            height: last.top + last.size - first.top,
        })
    }

    /// Cell containing the point, if any. Points in gaps hit nothing.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<Coord2> {
        self.cells
            .iter()
            .find(|cell| cell.rect().contains_point(x, y))
            .map(CellRect::coords)
    }
}

/// Length of `count` tiles of `tile` pixels separated by `gap`.
const fn span(count: i32, tile: i32, gap: i32) -> i32 {
    count * tile + (count - 1) * gap
}

/// Widest gap that lets `count` tiles of size `tile` fit in `room`.
const fn widest_gap(count: i32, tile: i32, room: i32) -> i32 {
    if count <= 1 {
        i32::MAX
    } else {
        (room - count * tile).div_euclid(count - 1)
    }
}

fn round_px(value: f64) -> i32 {
    value.round() as i32
}

/// Lays out a `rows` by `cols` grid inside `viewport`.
///
/// Without `lock_tile` the gap stays fixed and tiles take the largest size that fits, clamped to
/// `[min_tile, max_tile]`. With `lock_tile` tiles stay at `max_tile` and the gap shrinks toward [`MIN_GAP`]. The tile
/// block is centered in the inner area. A block that cannot fit is still laid out, with negative
/// [`Layout::slack`] and a warning.
pub fn compute_layout(
    viewport: Viewport,
    rows: Coord,
    cols: Coord,
    options: &LayoutOptions,
) -> Result<Layout> {
    viewport.validate()?;
    options.validate()?;
    if rows == 0 || cols == 0 {
        return Err(GameError::InvalidDimensions);
    }

    let inset = f64::from(options.frame + options.pad);
    // round each edge, so every side of `inner` is within half a pixel of the exact one
    let (left, top) = (round_px(viewport.left + inset), round_px(viewport.top + inset));
    let inner = PixelRect {
        left,
        top,
        width: round_px(viewport.left + viewport.width - inset) - left,
        height: round_px(viewport.top + viewport.height - inset) - top,
    };

    let (rows_i, cols_i) = (i32::from(rows), i32::from(cols));
    let (tile, gap) = if options.lock_tile {
        let tile = options.max_tile;
        let gap = widest_gap(cols_i, tile, inner.width)
            .min(widest_gap(rows_i, tile, inner.height))
            .min(options.gap)
            .max(MIN_GAP.min(options.gap));
        (tile, gap)
    } else {
        let gap = options.gap;
        let tile_w = (inner.width - (cols_i - 1) * gap).div_euclid(cols_i);
        let tile_h = (inner.height - (rows_i - 1) * gap).div_euclid(rows_i);
        let tile = tile_w.min(tile_h).clamp(options.min_tile, options.max_tile);
        (tile, gap)
    };

    let grid_w = span(cols_i, tile, gap);
    let grid_h = span(rows_i, tile, gap);
    let start_x = round_px(f64::from(inner.left) + f64::from(inner.width - grid_w) / 2.0);
    let start_y = round_px(f64::from(inner.top) + f64::from(inner.height - grid_h) / 2.0);

    let cells = CellRange::spanning((0, 0), (rows - 1, cols - 1))
        .iter()
        .map(|(row, col)| CellRect {
            row,
            col,
            left: start_x + i32::from(col) * (tile + gap),
            top: start_y + i32::from(row) * (tile + gap),
            size: tile,
        })
        .collect();

    let layout = Layout {
        rows,
        cols,
        tile_size: tile,
        gap,
        padding: options.pad,
        board_width: grid_w + 2 * (options.pad + options.frame),
        board_height: grid_h + 2 * (options.pad + options.frame),
        inner,
        cells,
        slack: (inner.width - grid_w, inner.height - grid_h),
    };

    if layout.overflowed() {
        log::warn!(
            "Board of {}x{} tiles overflows its viewport: tile {}, gap {}, slack {:?}",
            rows,
            cols,
            tile,
            gap,
            layout.slack
        );
    } else {
        log::trace!(
            "Board of {}x{} tiles laid out: tile {}, gap {}, slack {:?}",
            rows,
            cols,
            tile,
            gap,
            layout.slack
        );
    }

    Ok(layout)
}
