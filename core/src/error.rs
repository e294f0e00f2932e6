use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Grid needs at least one row and one column, and one value per cell")]
    InvalidDimensions,
    #[error("Invalid cell value {0}, cells hold digits 0 to 9")]
    InvalidCellValue(u8),
    #[error("Viewport must have a positive, finite size")]
    InvalidViewport,
    #[error("Tile size range is empty or a tile option is out of range")]
    InvalidTileRange,
    #[error("Levels start at 1")]
    InvalidLevel,
    #[error("Seed does not match the requested level")]
    InvalidSeed,
    #[error("No selection in progress")]
    NoSelection,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
    #[error("Nothing to undo")]
    NothingToUndo,
    #[error("Board does not fit the viewport, overflowing by {horizontal}x{vertical} pixels")]
    LayoutOverflow { horizontal: i32, vertical: i32 },
    #[error("Generator placed {placed} of {requested} requested pairs")]
    GenerationUnderfilled { requested: u16, placed: u16 },
    #[error("No clearing selection remains on the board")]
    StuckBoard,
}

/// Coarse classification hosts switch on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    State,
    LayoutOverflow,
    GenerationUnderfilled,
    StuckBoard,
}

impl GameError {
    pub const fn kind(self) -> ErrorKind {
        use GameError::*;
        match self {
            InvalidCoords | InvalidDimensions | InvalidCellValue(_) | InvalidViewport
            | InvalidTileRange | InvalidLevel | InvalidSeed => ErrorKind::InvalidArgument,
            NoSelection | AlreadyEnded | NothingToUndo => ErrorKind::State,
            LayoutOverflow { .. } => ErrorKind::LayoutOverflow,
            GenerationUnderfilled { .. } => ErrorKind::GenerationUnderfilled,
            StuckBoard => ErrorKind::StuckBoard,
        }
    }
}

pub type Result<T> = core::result::Result<T, GameError>;
