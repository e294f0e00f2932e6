use core::ops::RangeInclusive;
use serde::{Deserialize, Serialize};

/// Value stored in an empty cell.
pub const EMPTY: u8 = 0;

/// Largest digit a live tile can carry.
pub const MAX_DIGIT: u8 = 9;

/// Sum a selection's live tiles must reach to clear.
pub const TARGET_SUM: u32 = 10;

pub const fn is_live(value: u8) -> bool {
    value != EMPTY
}

/// The value that completes `value` to ten, for live digits.
pub const fn complement(value: u8) -> Option<u8> {
    match value {
        1..=9 => Some(TARGET_SUM as u8 - value),
        _ => None,
    }
}

/// Size class of a digit, used to shape the generator's filler distribution.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DigitBand {
    Small,
    Medium,
    Large,
}

impl DigitBand {
    pub const fn digits(self) -> RangeInclusive<u8> {
        match self {
            Self::Small => 1..=3,
            Self::Medium => 4..=6,
            Self::Large => 7..=9,
        }
    }

    pub const fn of(value: u8) -> Option<Self> {
        match value {
            1..=3 => Some(Self::Small),
            4..=6 => Some(Self::Medium),
            7..=9 => Some(Self::Large),
            _ => None,
        }
    }
}
