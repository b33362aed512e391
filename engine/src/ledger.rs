//! The chip-economy ledger.
//!
//! Owns the denomination inventory and the cash balance for one table. All
//! value movement inside a session passes through here; nothing in this
//! module ever talks to the wallet. Every mutation publishes a fresh
//! [`SessionSnapshot`] on a watch channel so presentation can refresh
//! on-screen counts.

use crate::error::SessionError;
use baize_types::{ChipInventory, Denomination, SessionSnapshot};
use tokio::sync::watch;

pub struct ChipEconomyLedger {
    chips: ChipInventory,
    balance: u64,
    notify: watch::Sender<SessionSnapshot>,
}

impl Default for ChipEconomyLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl ChipEconomyLedger {
    pub fn new() -> Self {
        Self::from_snapshot(SessionSnapshot::default())
    }

    /// Restore a ledger from persisted state.
    pub fn from_snapshot(snapshot: SessionSnapshot) -> Self {
        let (notify, _) = watch::channel(snapshot.clone());
        Self {
            chips: snapshot.chips,
            balance: snapshot.balance,
            notify,
        }
    }

    /// Observe every ledger mutation.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.notify.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::new(self.balance, self.chips.clone())
    }

    fn publish(&self) {
        self.notify.send_replace(self.snapshot());
    }

    pub fn chip_count(&self, denomination: Denomination) -> u32 {
        self.chips.count(denomination)
    }

    pub fn total_chip_value(&self) -> u64 {
        self.chips.total_value()
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    /// Set the cash balance from a wallet response.
    pub fn set_balance(&mut self, balance: u64) {
        self.balance = balance;
        self.publish();
    }

    pub fn add_chips(&mut self, denomination: Denomination, count: u32) {
        self.chips.add(denomination, count);
        self.publish();
    }

    /// Remove chips of one denomination. Fails without mutation when the
    /// inventory holds fewer; there is no silent clamping.
    pub fn remove_chips(
        &mut self,
        denomination: Denomination,
        count: u32,
    ) -> Result<(), SessionError> {
        self.chips.remove(denomination, count)?;
        self.publish();
        Ok(())
    }

    /// Remove every chip, returning the face value removed.
    pub fn drain_chips(&mut self) -> u64 {
        let value = self.chips.drain();
        self.publish();
        value
    }

    /// Credit `amount` of value as chips, largest denomination first. Always
    /// exact because the set contains a unit chip.
    pub fn credit_value(&mut self, amount: u64) -> Result<(), SessionError> {
        if amount == 0 {
            return Ok(());
        }
        let mut remaining = amount;
        let mut staged = ChipInventory::new();
        for denomination in Denomination::ALL.iter().rev() {
            let value = denomination.value();
            let count = remaining / value;
            if count == 0 {
                continue;
            }
            let count = u32::try_from(count).map_err(|_| SessionError::IllegalAction {
                action: "credit_value",
                detail: format!("credit of {amount} overflows the inventory"),
            })?;
            staged.add(*denomination, count);
            remaining -= value * u64::from(count);
        }
        debug_assert_eq!(remaining, 0);
        for denomination in Denomination::ALL {
            let count = staged.count(denomination);
            if count > 0 {
                self.chips.add(denomination, count);
            }
        }
        self.publish();
        Ok(())
    }

    /// Debit `amount` of value in chips, making change when no exact
    /// combination exists: chips worth at least `amount` are removed and the
    /// overshoot is credited back. Fails without mutation when the total chip
    /// value is insufficient.
    pub fn debit_value(&mut self, amount: u64) -> Result<(), SessionError> {
        let total = self.chips.total_value();
        if total < amount {
            return Err(SessionError::InsufficientChips {
                needed: amount,
                available: total,
            });
        }
        if amount == 0 {
            return Ok(());
        }

        // Floor pass, largest denomination first.
        let mut remaining = amount;
        for denomination in Denomination::ALL.iter().rev() {
            if remaining == 0 {
                break;
            }
            let value = denomination.value();
            let take = (remaining / value).min(u64::from(self.chips.count(*denomination)));
            if take == 0 {
                continue;
            }
            // take <= current count, so removal cannot fail.
            self.chips.remove(*denomination, take as u32)?;
            remaining -= value * take;
        }

        // One extra chip covers any remainder: every denomination that still
        // has chips is strictly larger than `remaining` after its floor pass.
        if remaining > 0 {
            let smallest = Denomination::ALL
                .into_iter()
                .find(|d| self.chips.count(*d) > 0);
            let Some(denomination) = smallest else {
                // total >= amount was checked above; restore and report.
                self.credit_value(amount - remaining)?;
                return Err(SessionError::InsufficientChips {
                    needed: amount,
                    available: self.chips.total_value(),
                });
            };
            self.chips.remove(denomination, 1)?;
            let change = denomination.value() - remaining;
            if change > 0 {
                // Re-stage the change without an extra publish.
                let mut rest = change;
                for d in Denomination::ALL.iter().rev() {
                    let count = rest / d.value();
                    if count > 0 {
                        self.chips.add(*d, count as u32);
                        rest -= d.value() * count;
                    }
                }
            }
        }

        self.publish();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove() {
        let mut ledger = ChipEconomyLedger::new();
        ledger.add_chips(Denomination::Five, 4);
        assert_eq!(ledger.total_chip_value(), 20);

        ledger.remove_chips(Denomination::Five, 1).unwrap();
        assert_eq!(ledger.chip_count(Denomination::Five), 3);
    }

    #[test]
    fn test_remove_insufficient_is_error_not_clamp() {
        let mut ledger = ChipEconomyLedger::new();
        ledger.add_chips(Denomination::One, 2);

        let err = ledger.remove_chips(Denomination::One, 5).unwrap_err();
        assert!(matches!(err, SessionError::InsufficientChips { .. }));
        assert_eq!(ledger.chip_count(Denomination::One), 2);
    }

    #[test]
    fn test_credit_value_greedy() {
        let mut ledger = ChipEconomyLedger::new();
        ledger.credit_value(182).unwrap();
        assert_eq!(ledger.chip_count(Denomination::Hundred), 1);
        assert_eq!(ledger.chip_count(Denomination::TwentyFive), 3);
        assert_eq!(ledger.chip_count(Denomination::Five), 1);
        assert_eq!(ledger.chip_count(Denomination::One), 2);
        assert_eq!(ledger.total_chip_value(), 182);
    }

    #[test]
    fn test_debit_value_exact() {
        let mut ledger = ChipEconomyLedger::new();
        ledger.credit_value(130).unwrap();
        ledger.debit_value(30).unwrap();
        assert_eq!(ledger.total_chip_value(), 100);
    }

    #[test]
    fn test_debit_value_makes_change() {
        let mut ledger = ChipEconomyLedger::new();
        ledger.add_chips(Denomination::Hundred, 1);
        // Only a 100 chip; paying 30 breaks it and returns 70 in change.
        ledger.debit_value(30).unwrap();
        assert_eq!(ledger.total_chip_value(), 70);
        assert_eq!(ledger.chip_count(Denomination::Hundred), 0);
    }

    #[test]
    fn test_debit_value_insufficient() {
        let mut ledger = ChipEconomyLedger::new();
        ledger.add_chips(Denomination::Five, 2);

        let err = ledger.debit_value(11).unwrap_err();
        assert_eq!(
            err,
            SessionError::InsufficientChips {
                needed: 11,
                available: 10
            }
        );
        assert_eq!(ledger.total_chip_value(), 10);
    }

    #[test]
    fn test_subscribers_see_mutations() {
        let mut ledger = ChipEconomyLedger::new();
        let rx = ledger.subscribe();

        ledger.add_chips(Denomination::TwentyFive, 2);
        assert_eq!(rx.borrow().chips.count(Denomination::TwentyFive), 2);

        ledger.set_balance(900);
        assert_eq!(rx.borrow().balance, 900);
    }

    #[test]
    fn test_conservation_across_value_moves() {
        let mut ledger = ChipEconomyLedger::new();
        ledger.set_balance(1_000);
        ledger.credit_value(250).unwrap();

        let before = ledger.total_chip_value() + ledger.balance();
        ledger.debit_value(77).unwrap();
        ledger.credit_value(77).unwrap();
        let after = ledger.total_chip_value() + ledger.balance();
        assert_eq!(before, after);
    }
}
