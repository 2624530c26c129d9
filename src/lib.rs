//! # settlement-optimizer
//!
//! Debt simplification for shared events.
//!
//! Given the debts recorded between participants, the engine produces an
//! equivalent set of settlement transfers: every participant's net balance
//! is unchanged, no transfer is created between two participants who did
//! not already owe each other, and nobody pays out more than they owed.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: participants, transfers, ledger, errors
//! - **graph** — Balance/matrix helpers, the split flow network, debt cycles
//! - **optimization** — Dinic, Edmonds–Karp and greedy solvers, settlement plans
//! - **validation** — Post-hoc checks of a settlement against the original debts
//! - **simulation** — Random debt networks for stress testing

pub mod core;
pub mod graph;
pub mod optimization;
pub mod validation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::error::SettlementError;
    pub use crate::core::participant::ParticipantId;
    pub use crate::core::transfer::Transfer;
    pub use crate::graph::helpers::{balances, collapse_transfers, transfer_matrix, users};
    pub use crate::optimization::plan::SettlementPlan;
    pub use crate::optimization::{Algorithm, Dinic, EdmondsKarp, Greedy, Optimizer};
    pub use crate::validation::validator::{ValidationConfig, ValidationReport, Validator};
}
