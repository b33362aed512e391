//! Chip denominations and the per-session chip inventory.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single chip denomination from the fixed table set.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Denomination {
    One,
    Five,
    TwentyFive,
    Hundred,
}

impl Denomination {
    /// All denominations, ascending by value.
    pub const ALL: [Denomination; 4] = [
        Denomination::One,
        Denomination::Five,
        Denomination::TwentyFive,
        Denomination::Hundred,
    ];

    /// Face value of one chip of this denomination.
    pub fn value(self) -> u64 {
        match self {
            Denomination::One => 1,
            Denomination::Five => 5,
            Denomination::TwentyFive => 25,
            Denomination::Hundred => 100,
        }
    }

    fn index(self) -> usize {
        match self {
            Denomination::One => 0,
            Denomination::Five => 1,
            Denomination::TwentyFive => 2,
            Denomination::Hundred => 3,
        }
    }
}

impl TryFrom<u64> for Denomination {
    type Error = ();

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Denomination::One),
            5 => Ok(Denomination::Five),
            25 => Ok(Denomination::TwentyFive),
            100 => Ok(Denomination::Hundred),
            _ => Err(()),
        }
    }
}

/// Removal was requested for more chips than the inventory holds.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("insufficient {denomination:?} chips (need {needed}, have {available})")]
pub struct ChipShortfall {
    pub denomination: Denomination,
    pub needed: u32,
    pub available: u32,
}

/// Counts of chips held per denomination. Counts are never negative by
/// construction; removal is precondition-checked and fails rather than
/// clamping.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipInventory {
    counts: [u32; 4],
}

impl ChipInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of chips held of `denomination`.
    pub fn count(&self, denomination: Denomination) -> u32 {
        self.counts[denomination.index()]
    }

    /// Add `count` chips of `denomination`. Saturates at `u32::MAX`.
    pub fn add(&mut self, denomination: Denomination, count: u32) {
        let slot = &mut self.counts[denomination.index()];
        *slot = slot.saturating_add(count);
    }

    /// Remove `count` chips of `denomination`, failing without mutation when
    /// the inventory holds fewer.
    pub fn remove(&mut self, denomination: Denomination, count: u32) -> Result<(), ChipShortfall> {
        let slot = &mut self.counts[denomination.index()];
        if *slot < count {
            return Err(ChipShortfall {
                denomination,
                needed: count,
                available: *slot,
            });
        }
        *slot -= count;
        Ok(())
    }

    /// Total face value of all chips held.
    pub fn total_value(&self) -> u64 {
        Denomination::ALL
            .iter()
            .map(|d| d.value().saturating_mul(u64::from(self.count(*d))))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// Remove every chip, returning the face value removed.
    pub fn drain(&mut self) -> u64 {
        let value = self.total_value();
        self.counts = [0; 4];
        value
    }
}
