use crate::core::error::SettlementError;
use crate::core::participant::ParticipantId;
use crate::core::transfer::{checked_total, Transfer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tracks the net position of each participant.
///
/// A positive balance means the participant is owed (creditor).
/// A negative balance means the participant owes (debtor).
///
/// The ledger accepts negative amounts without validation, which is what
/// the validator needs: it must compare lists that may be malformed. A
/// position that leaves the `i64` range is reported as
/// [`SettlementError::AmountOverflow`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    positions: BTreeMap<ParticipantId, i64>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from a transfer list. Both endpoints of every
    /// transfer get an entry, even when the amount is zero.
    pub fn from_transfers(transfers: &[Transfer]) -> Result<Self, SettlementError> {
        let mut ledger = Self::new();
        for transfer in transfers {
            ledger.apply_transfer(transfer)?;
        }
        Ok(ledger)
    }

    /// Apply a transfer: payer loses, payee gains.
    ///
    /// On overflow the ledger is left unchanged.
    pub fn apply_transfer(&mut self, transfer: &Transfer) -> Result<(), SettlementError> {
        let (from, to) = (transfer.from(), transfer.to());
        let amount = transfer.amount();

        if from == to {
            // self-transfer: the two legs cancel
            self.positions.entry(from.clone()).or_insert(0);
            return Ok(());
        }

        let payer = self
            .position(from)
            .checked_sub(amount)
            .ok_or_else(|| SettlementError::AmountOverflow {
                participant: from.clone(),
            })?;
        let payee = checked_total(self.position(to), amount, to)?;

        self.positions.insert(from.clone(), payer);
        self.positions.insert(to.clone(), payee);
        Ok(())
    }

    /// Net position of a participant; unknown participants are flat.
    pub fn position(&self, participant: &ParticipantId) -> i64 {
        self.positions.get(participant).copied().unwrap_or(0)
    }

    pub fn positions(&self) -> &BTreeMap<ParticipantId, i64> {
        &self.positions
    }

    pub fn into_positions(self) -> BTreeMap<ParticipantId, i64> {
        self.positions
    }

    /// Sum of all positions is zero.
    pub fn is_balanced(&self) -> bool {
        self.positions.values().map(|v| i128::from(*v)).sum::<i128>() == 0
    }

    /// Sum of positive positions: the amount that actually has to move.
    pub fn total_net_settlement(&self) -> Result<i64, SettlementError> {
        self.positions
            .iter()
            .filter(|(_, v)| **v > 0)
            .try_fold(0i64, |total, (participant, v)| {
                checked_total(total, *v, participant)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_basic() {
        let ledger = Ledger::from_transfers(&[Transfer::new("a", "b", 100)]).unwrap();
        assert_eq!(ledger.position(&ParticipantId::new("a")), -100);
        assert_eq!(ledger.position(&ParticipantId::new("b")), 100);
        assert_eq!(ledger.position(&ParticipantId::new("zed")), 0);
    }

    #[test]
    fn test_ledger_circular_cancels() {
        let ledger = Ledger::from_transfers(&[
            Transfer::new("a", "b", 100),
            Transfer::new("b", "c", 100),
            Transfer::new("c", "a", 100),
        ])
        .unwrap();
        assert!(ledger.is_balanced());
        assert_eq!(ledger.total_net_settlement(), Ok(0));
        assert_eq!(ledger.positions().len(), 3);
    }

    #[test]
    fn test_ledger_keeps_zero_amount_participants() {
        let ledger = Ledger::from_transfers(&[Transfer::new("a", "b", 0)]).unwrap();
        assert_eq!(ledger.positions().len(), 2);
        assert_eq!(ledger.total_net_settlement(), Ok(0));
    }

    #[test]
    fn test_ledger_overflow_is_reported() {
        let mut ledger = Ledger::new();
        ledger.apply_transfer(&Transfer::new("a", "b", i64::MAX)).unwrap();

        let err = ledger
            .apply_transfer(&Transfer::new("c", "b", 1))
            .unwrap_err();
        assert_eq!(
            err,
            SettlementError::AmountOverflow {
                participant: ParticipantId::new("b")
            }
        );
        // the failed transfer left no trace
        assert_eq!(ledger.position(&ParticipantId::new("b")), i64::MAX);
        assert_eq!(ledger.position(&ParticipantId::new("c")), 0);
        assert_eq!(ledger.positions().len(), 2);
    }

    #[test]
    fn test_ledger_negative_amount_overflow() {
        let mut ledger = Ledger::new();
        ledger.apply_transfer(&Transfer::new("b", "a", i64::MAX)).unwrap();
        // a negative amount credits the payer
        let err = ledger
            .apply_transfer(&Transfer::new("a", "c", -1))
            .unwrap_err();
        assert_eq!(
            err,
            SettlementError::AmountOverflow {
                participant: ParticipantId::new("a")
            }
        );
    }

    #[test]
    fn test_self_transfer_is_flat() {
        let ledger = Ledger::from_transfers(&[Transfer::new("a", "a", 5)]).unwrap();
        assert_eq!(ledger.position(&ParticipantId::new("a")), 0);
        assert_eq!(ledger.positions().len(), 1);
    }
}
