//! Persisted per-table session state.

use crate::ChipInventory;
use serde::{Deserialize, Serialize};

/// The state a storage collaborator keeps per table: cash balance plus chip
/// counts. Read on session start, written after every ledger mutation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub balance: u64,
    pub chips: ChipInventory,
}

impl SessionSnapshot {
    pub fn new(balance: u64, chips: ChipInventory) -> Self {
        Self { balance, chips }
    }

    /// Combined worth of the session: cash balance plus chip value.
    pub fn total_value(&self) -> u64 {
        self.balance.saturating_add(self.chips.total_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Denomination;

    #[test]
    fn test_snapshot_roundtrip() {
        let mut chips = ChipInventory::new();
        chips.add(Denomination::TwentyFive, 4);
        let snapshot = SessionSnapshot::new(500, chips);

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: SessionSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
        assert_eq!(back.total_value(), 600);
    }
}
