//! Post-hoc checks of an optimised settlement against the original debts.
//!
//! The validator never fails: it accumulates every violation it finds into
//! a [`ValidationReport`], so it can also be run on the output of a call
//! that has already been logged as failed. Aggregates that leave the `i64`
//! range are reported as violations of the check that needed them.

use crate::core::error::SettlementError;
use crate::core::ledger::Ledger;
use crate::core::participant::ParticipantId;
use crate::core::transfer::Transfer;
use crate::graph::helpers::{outflows, transfer_matrix};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Which checks to run. Fields missing from a serialised config are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Every participant keeps the same net balance.
    pub balances: bool,
    /// Every settlement pair already existed as a debt.
    pub no_new_debts: bool,
    /// Nobody pays out more in total than they originally owed.
    pub total_not_more: bool,
}

impl ValidationConfig {
    pub fn all() -> Self {
        Self {
            balances: true,
            no_new_debts: true,
            total_not_more: true,
        }
    }

    pub fn none() -> Self {
        Self {
            balances: false,
            no_new_debts: false,
            total_not_more: false,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Balances,
    NoNewDebts,
    TotalNotMore,
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Criterion::Balances => "balances",
            Criterion::NoNewDebts => "no_new_debts",
            Criterion::TotalNotMore => "total_not_more",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub criterion: Criterion,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.criterion, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            valid: violations.is_empty(),
            violations,
        }
    }

    pub fn violations_for(&self, criterion: Criterion) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(move |v| v.criterion == criterion)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Validation Report ===")?;
        writeln!(f, "Valid:       {}", self.valid)?;
        writeln!(f, "Violations:  {}", self.violations.len())?;
        for v in &self.violations {
            writeln!(f, "  {}", v)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// A validator with every check enabled.
    pub fn all() -> Self {
        Self::new(ValidationConfig::all())
    }

    pub fn config(&self) -> ValidationConfig {
        self.config
    }

    /// Compare `optimized` against `original` and report all violations.
    pub fn validate(&self, original: &[Transfer], optimized: &[Transfer]) -> ValidationReport {
        let mut violations = Vec::new();
        if self.config.balances {
            check_balances(original, optimized, &mut violations);
        }
        if self.config.no_new_debts {
            check_no_new_debts(original, optimized, &mut violations);
        }
        if self.config.total_not_more {
            check_total_not_more(original, optimized, &mut violations);
        }
        ValidationReport::from_violations(violations)
    }
}

/// Unwrap an aggregate of one side, or record why it cannot be compared.
fn aggregate<T>(
    result: Result<T, SettlementError>,
    criterion: Criterion,
    side: &str,
    violations: &mut Vec<Violation>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            violations.push(Violation {
                criterion,
                message: format!("cannot compare the {} transfers: {}", side, err),
            });
            None
        }
    }
}

fn check_balances(original: &[Transfer], optimized: &[Transfer], violations: &mut Vec<Violation>) {
    let before = aggregate(
        Ledger::from_transfers(original),
        Criterion::Balances,
        "original",
        violations,
    );
    let after = aggregate(
        Ledger::from_transfers(optimized),
        Criterion::Balances,
        "optimized",
        violations,
    );
    let (Some(before), Some(after)) = (before, after) else {
        return;
    };
    let participants: BTreeSet<&ParticipantId> = before
        .positions()
        .keys()
        .chain(after.positions().keys())
        .collect();

    for participant in participants {
        let (was, now) = (before.position(participant), after.position(participant));
        if was != now {
            violations.push(Violation {
                criterion: Criterion::Balances,
                message: format!(
                    "balance of {} changed: original {}, optimized {}",
                    participant, was, now
                ),
            });
        }
    }
}

fn check_no_new_debts(original: &[Transfer], optimized: &[Transfer], violations: &mut Vec<Violation>) {
    let allowed = aggregate(
        transfer_matrix(original),
        Criterion::NoNewDebts,
        "original",
        violations,
    );
    let used = aggregate(
        transfer_matrix(optimized),
        Criterion::NoNewDebts,
        "optimized",
        violations,
    );
    let (Some(allowed), Some(used)) = (allowed, used) else {
        return;
    };
    for (from, row) in used {
        for (to, amount) in row {
            let known = allowed
                .get(&from)
                .and_then(|r| r.get(&to))
                .is_some_and(|a| *a > 0);
            if !known {
                violations.push(Violation {
                    criterion: Criterion::NoNewDebts,
                    message: format!(
                        "new debt {} -> {} ({}) has no counterpart in the original",
                        from, to, amount
                    ),
                });
            }
        }
    }
}

fn check_total_not_more(
    original: &[Transfer],
    optimized: &[Transfer],
    violations: &mut Vec<Violation>,
) {
    let before = aggregate(
        outflows(original),
        Criterion::TotalNotMore,
        "original",
        violations,
    );
    let after = aggregate(
        outflows(optimized),
        Criterion::TotalNotMore,
        "optimized",
        violations,
    );
    let (Some(before), Some(after)) = (before, after) else {
        return;
    };
    for (participant, paid) in after {
        let owed = before.get(&participant).copied().unwrap_or(0);
        if paid > owed {
            violations.push(Violation {
                criterion: Criterion::TotalNotMore,
                message: format!(
                    "{} pays {} in total, more than the original {}",
                    participant, paid, owed
                ),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn debts() -> Vec<Transfer> {
        vec![Transfer::new("a", "b", 5), Transfer::new("b", "c", 5)]
    }

    #[test]
    fn test_identity_is_valid() {
        let report = Validator::all().validate(&debts(), &debts());
        assert!(report.valid);
        assert!(report.violations.is_empty());
    }

    #[test]
    fn test_new_debt_detected() {
        let report = Validator::all().validate(&debts(), &[Transfer::new("a", "c", 5)]);
        assert!(!report.valid);
        assert_eq!(report.violations_for(Criterion::NoNewDebts).count(), 1);
        assert_eq!(report.violations_for(Criterion::Balances).count(), 0);
    }

    #[test]
    fn test_balance_mismatch_reported_per_participant() {
        let report = Validator::all().validate(&debts(), &[Transfer::new("a", "b", 5)]);
        let messages: Vec<&str> = report
            .violations_for(Criterion::Balances)
            .map(|v| v.message.as_str())
            .collect();
        // b goes from 0 to +5, c from +5 to 0
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("of b"));
        assert!(messages[1].contains("of c"));
    }

    #[test]
    fn test_overpayment_detected() {
        let original = vec![
            Transfer::new("a", "b", 5),
            Transfer::new("b", "a", 5),
        ];
        let optimized = vec![
            Transfer::new("a", "b", 8),
            Transfer::new("b", "a", 8),
        ];
        let report = Validator::all().validate(&original, &optimized);
        assert_eq!(report.violations_for(Criterion::TotalNotMore).count(), 2);
        assert_eq!(report.violations.len(), 2);
    }

    #[test]
    fn test_reports_all_criteria_at_once() {
        let report = Validator::all().validate(&debts(), &[Transfer::new("c", "a", 20)]);
        assert!(report.violations_for(Criterion::Balances).count() > 0);
        assert_eq!(report.violations_for(Criterion::NoNewDebts).count(), 1);
        assert_eq!(report.violations_for(Criterion::TotalNotMore).count(), 1);
    }

    #[test]
    fn test_disabled_checks_are_skipped() {
        let config = ValidationConfig {
            no_new_debts: false,
            ..ValidationConfig::all()
        };
        let report = Validator::new(config).validate(&debts(), &[Transfer::new("a", "c", 5)]);
        assert!(report.violations_for(Criterion::NoNewDebts).next().is_none());

        let report = Validator::new(ValidationConfig::none())
            .validate(&debts(), &[Transfer::new("z", "y", 1)]);
        assert!(report.valid);
    }

    #[test]
    fn test_config_fields_default_to_enabled() {
        let config: ValidationConfig = serde_json::from_str(r#"{"balances": false}"#).unwrap();
        assert!(!config.balances);
        assert!(config.no_new_debts);
        assert!(config.total_not_more);
    }

    #[test]
    fn test_validator_does_not_error_on_negative_amounts() {
        let report = Validator::all().validate(&debts(), &[Transfer::new("a", "b", -5)]);
        assert!(!report.valid);
    }

    #[test]
    fn test_overflowing_balances_reported_not_panicking() {
        let transfers = vec![
            Transfer::new("a", "b", i64::MAX),
            Transfer::new("c", "b", 1),
        ];
        let report = Validator::all().validate(&transfers, &transfers);
        assert!(!report.valid);

        let messages: Vec<&str> = report
            .violations_for(Criterion::Balances)
            .map(|v| v.message.as_str())
            .collect();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("original"));
        assert!(messages[1].contains("optimized"));
        assert!(messages.iter().all(|m| m.contains("amount overflow")));
        // pair and outflow totals still fit
        assert_eq!(report.violations.len(), 2);
    }

    #[test]
    fn test_overflowing_aggregates_reported_per_check() {
        let optimized = vec![
            Transfer::new("a", "b", i64::MAX),
            Transfer::new("a", "b", 1),
        ];
        let report = Validator::all().validate(&[Transfer::new("a", "b", 1)], &optimized);
        assert_eq!(report.violations_for(Criterion::Balances).count(), 1);
        assert_eq!(report.violations_for(Criterion::NoNewDebts).count(), 1);
        assert_eq!(report.violations_for(Criterion::TotalNotMore).count(), 1);
    }
}
