use crate::core::participant::ParticipantId;
use thiserror::Error;

/// Errors returned by the settlement helpers and solvers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    /// A transfer carried a negative amount.
    #[error("invalid transfer {from} -> {to}: negative amount {amount}")]
    NegativeAmount {
        from: ParticipantId,
        to: ParticipantId,
        amount: i64,
    },
    /// A balance or aggregated total does not fit in an `i64`.
    #[error("amount overflow: totals for {participant} exceed the supported range")]
    AmountOverflow { participant: ParticipantId },
    /// The flow network could not route the full demand.
    #[error("insufficient max flow: {found} of {needed}")]
    InsufficientMaxFlow { found: i64, needed: i64 },
    /// The greedy solver ran out of augmenting paths with balances outstanding.
    #[error("unable to settle: no path for remaining balances")]
    UnableToSettle,
    #[error("unknown algorithm '{0}' (expected dinic, edmonds-karp or greedy)")]
    UnknownAlgorithm(String),
}

impl SettlementError {
    /// True for errors caused by malformed input rather than infeasibility.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SettlementError::NegativeAmount { .. }
                | SettlementError::AmountOverflow { .. }
                | SettlementError::UnknownAlgorithm(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SettlementError::InsufficientMaxFlow { found: 3, needed: 5 };
        assert_eq!(err.to_string(), "insufficient max flow: 3 of 5");

        assert_eq!(
            SettlementError::UnableToSettle.to_string(),
            "unable to settle: no path for remaining balances"
        );
    }

    #[test]
    fn test_validation_classification() {
        let err = SettlementError::NegativeAmount {
            from: ParticipantId::new("a"),
            to: ParticipantId::new("b"),
            amount: -1,
        };
        assert!(err.is_validation());
        assert!(!SettlementError::UnableToSettle.is_validation());
        assert!(SettlementError::AmountOverflow {
            participant: ParticipantId::new("b")
        }
        .is_validation());
    }
}
