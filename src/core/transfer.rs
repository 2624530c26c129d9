use crate::core::error::SettlementError;
use crate::core::participant::ParticipantId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A directed debt between two participants.
///
/// `from` owes `to` the given `amount`, expressed in whole minor units.
/// Both the solvers' input (existing debts) and their output (settlement
/// transfers) use this type.
///
/// Construction never fails; negative amounts are rejected by the helpers
/// and solvers that consume transfers, so a malformed list is reported
/// as a [`SettlementError::NegativeAmount`] instead of a panic.
///
/// # Examples
///
/// ```
/// use settlement_optimizer::core::transfer::Transfer;
///
/// let debt = Transfer::new("alice", "bob", 1_250);
/// assert_eq!(debt.from().as_str(), "alice");
/// assert_eq!(debt.amount(), 1_250);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transfer {
    /// The participant that pays.
    from: ParticipantId,
    /// The participant that is paid.
    to: ParticipantId,
    amount: i64,
}

impl Transfer {
    pub fn new(from: impl Into<ParticipantId>, to: impl Into<ParticipantId>, amount: i64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
        }
    }

    pub fn from(&self) -> &ParticipantId {
        &self.from
    }

    pub fn to(&self) -> &ParticipantId {
        &self.to
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// Zero-amount transfers carry no debt and are skipped by aggregations.
    pub fn is_inert(&self) -> bool {
        self.amount == 0
    }

    /// Reject negative amounts.
    pub fn validate(&self) -> Result<(), SettlementError> {
        if self.amount < 0 {
            return Err(SettlementError::NegativeAmount {
                from: self.from.clone(),
                to: self.to.clone(),
                amount: self.amount,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {}", self.from, self.to, self.amount)
    }
}

/// Validate every transfer in a list, failing on the first negative amount.
pub fn validate_all(transfers: &[Transfer]) -> Result<(), SettlementError> {
    transfers.iter().try_for_each(Transfer::validate)
}

/// Add `amount` to a running total kept for `participant`.
pub(crate) fn checked_total(
    total: i64,
    amount: i64,
    participant: &ParticipantId,
) -> Result<i64, SettlementError> {
    total
        .checked_add(amount)
        .ok_or_else(|| SettlementError::AmountOverflow {
            participant: participant.clone(),
        })
}

/// Sum of all positive amounts in a list.
pub fn gross_total(transfers: &[Transfer]) -> Result<i64, SettlementError> {
    transfers
        .iter()
        .filter(|t| t.amount() > 0)
        .try_fold(0i64, |total, t| checked_total(total, t.amount(), t.from()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_creation() {
        let t = Transfer::new("a", "b", 10);
        assert_eq!(t.from().as_str(), "a");
        assert_eq!(t.to().as_str(), "b");
        assert_eq!(t.amount(), 10);
        assert!(!t.is_inert());
        assert!(Transfer::new("a", "b", 0).is_inert());
    }

    #[test]
    fn test_negative_amount_rejected() {
        let result = Transfer::new("a", "b", -5).validate();
        assert_eq!(
            result,
            Err(SettlementError::NegativeAmount {
                from: ParticipantId::new("a"),
                to: ParticipantId::new("b"),
                amount: -5,
            })
        );
    }

    #[test]
    fn test_validate_all_stops_at_negative() {
        let transfers = vec![
            Transfer::new("a", "b", 1),
            Transfer::new("b", "c", -2),
            Transfer::new("c", "a", 3),
        ];
        let err = validate_all(&transfers).unwrap_err();
        assert!(err.to_string().contains("b -> c"));
    }

    #[test]
    fn test_gross_total_ignores_zero() {
        let transfers = vec![
            Transfer::new("a", "b", 10),
            Transfer::new("b", "c", 0),
            Transfer::new("c", "a", 5),
        ];
        assert_eq!(gross_total(&transfers), Ok(15));
    }

    #[test]
    fn test_gross_total_overflow() {
        let transfers = vec![
            Transfer::new("a", "b", i64::MAX),
            Transfer::new("c", "d", 1),
        ];
        assert_eq!(
            gross_total(&transfers),
            Err(SettlementError::AmountOverflow {
                participant: ParticipantId::new("c")
            })
        );
    }

    #[test]
    fn test_transfer_json_shape() {
        let json = serde_json::to_value(Transfer::new("a", "b", 7)).unwrap();
        assert_eq!(json["from"], "a");
        assert_eq!(json["to"], "b");
        assert_eq!(json["amount"], 7);
    }
}
