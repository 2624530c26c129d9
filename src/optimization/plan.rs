use crate::core::error::SettlementError;
use crate::core::transfer::{gross_total, Transfer};
use crate::optimization::Algorithm;
use crate::validation::validator::{ValidationReport, Validator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The outcome of one optimisation run, ready to be stored as settlement rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementPlan {
    id: Uuid,
    algorithm: Algorithm,
    created_at: DateTime<Utc>,
    settlements: Vec<Transfer>,
    /// Sum of the input debts.
    gross_total: i64,
    /// Sum of the settlement transfers.
    settled_total: i64,
}

impl SettlementPlan {
    /// Optimise `debts` with the chosen solver.
    ///
    /// Fails with [`SettlementError::AmountOverflow`] when the debts are
    /// solvable but their gross total does not fit in an `i64`.
    pub fn compute(algorithm: Algorithm, debts: &[Transfer]) -> Result<Self, SettlementError> {
        let settlements = algorithm.optimizer().optimize(debts)?;
        let settled_total = gross_total(&settlements)?;
        Ok(Self {
            id: Uuid::new_v4(),
            algorithm,
            created_at: Utc::now(),
            settlements,
            gross_total: gross_total(debts)?,
            settled_total,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn settlements(&self) -> &[Transfer] {
        &self.settlements
    }

    pub fn into_settlements(self) -> Vec<Transfer> {
        self.settlements
    }

    pub fn gross_total(&self) -> i64 {
        self.gross_total
    }

    pub fn settled_total(&self) -> i64 {
        self.settled_total
    }

    pub fn transfer_count(&self) -> usize {
        self.settlements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settlements.is_empty()
    }

    /// Amount no longer moving compared to paying every debt as recorded.
    pub fn savings(&self) -> i64 {
        self.gross_total - self.settled_total
    }

    pub fn savings_percent(&self) -> f64 {
        if self.gross_total == 0 {
            return 0.0;
        }
        self.savings() as f64 * 100.0 / self.gross_total as f64
    }

    /// Check this plan against the debts it was computed from.
    pub fn validate(&self, original: &[Transfer], validator: &Validator) -> ValidationReport {
        validator.validate(original, &self.settlements)
    }
}

impl std::fmt::Display for SettlementPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Settlement Plan ===")?;
        writeln!(f, "Id:             {}", self.id)?;
        writeln!(f, "Algorithm:      {}", self.algorithm)?;
        writeln!(f, "Gross Total:    {}", self.gross_total)?;
        writeln!(f, "Settled Total:  {}", self.settled_total)?;
        writeln!(f, "Savings:        {}", self.savings())?;
        writeln!(f, "Savings %:      {:.1}%", self.savings_percent())?;
        writeln!(f, "Transfers:      {}", self.transfer_count())?;
        for t in &self.settlements {
            writeln!(f, "  {}", t)?;
        }
        Ok(())
    }
}
