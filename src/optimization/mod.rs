//! Settlement solvers.
//!
//! Three interchangeable strategies sit behind [`Optimizer`]:
//!
//! - [`Dinic`]: blocking-flow max flow on the split network (production path)
//! - [`EdmondsKarp`]: shortest augmenting paths on the same network
//! - [`Greedy`]: path pushing over netted balances; may emit multi-hop chains
//!
//! Every solver returns settlements that keep each participant's balance,
//! only use debt relationships present in the input, and never make anyone
//! pay out more than they originally owed.

pub mod dinic;
pub mod edmonds_karp;
pub mod greedy;
pub mod plan;

pub use dinic::Dinic;
pub use edmonds_karp::EdmondsKarp;
pub use greedy::Greedy;

use crate::core::error::SettlementError;
use crate::core::transfer::Transfer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A debt simplification strategy.
pub trait Optimizer {
    fn name(&self) -> &'static str;

    /// Replace `debts` with an equivalent list of settlement transfers.
    fn optimize(&self, debts: &[Transfer]) -> Result<Vec<Transfer>, SettlementError>;
}

/// Selector for the built-in solvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    #[default]
    Dinic,
    EdmondsKarp,
    Greedy,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Dinic, Algorithm::EdmondsKarp, Algorithm::Greedy];

    pub fn optimizer(self) -> Box<dyn Optimizer + Send + Sync> {
        match self {
            Algorithm::Dinic => Box::new(Dinic),
            Algorithm::EdmondsKarp => Box::new(EdmondsKarp),
            Algorithm::Greedy => Box::new(Greedy),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Dinic => "dinic",
            Algorithm::EdmondsKarp => "edmonds-karp",
            Algorithm::Greedy => "greedy",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = SettlementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dinic" => Ok(Algorithm::Dinic),
            "edmonds-karp" | "edmonds_karp" | "edmondskarp" => Ok(Algorithm::EdmondsKarp),
            "greedy" => Ok(Algorithm::Greedy),
            _ => Err(SettlementError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Run the selected solver.
pub fn optimize(algorithm: Algorithm, debts: &[Transfer]) -> Result<Vec<Transfer>, SettlementError> {
    algorithm.optimizer().optimize(debts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_round_trips_through_str() {
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.to_string().parse::<Algorithm>().unwrap(), algorithm);
            assert_eq!(algorithm.optimizer().name(), algorithm.as_str());
        }
    }

    #[test]
    fn test_unknown_algorithm() {
        let err = "simplex".parse::<Algorithm>().unwrap_err();
        assert_eq!(err, SettlementError::UnknownAlgorithm("simplex".to_string()));
    }

    #[test]
    fn test_default_is_dinic() {
        assert_eq!(Algorithm::default(), Algorithm::Dinic);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Algorithm::EdmondsKarp).unwrap();
        assert_eq!(json, "\"edmonds-karp\"");
    }
}
