//! Settle a weekend trip's debts with each solver.
//!
//! Shows how the three solvers reduce the recorded debts while keeping
//! every participant's balance.

use settlement_optimizer::core::transfer::Transfer;
use settlement_optimizer::graph::helpers::balances;
use settlement_optimizer::optimization::plan::SettlementPlan;
use settlement_optimizer::optimization::Algorithm;
use settlement_optimizer::validation::validator::Validator;

fn main() {
    println!("╔══════════════════════════════════════════════╗");
    println!("║  settlement-optimizer: Basic Settlement Demo ║");
    println!("╚══════════════════════════════════════════════╝\n");

    let debts = vec![
        Transfer::new("alice", "bob", 4_000),
        Transfer::new("bob", "carol", 2_500),
        Transfer::new("carol", "alice", 1_500),
        Transfer::new("dave", "alice", 3_000),
        Transfer::new("dave", "bob", 1_000),
        Transfer::new("carol", "dave", 500),
    ];

    println!("━━━ Recorded debts ━━━\n");
    for debt in &debts {
        println!("  {}", debt);
    }

    println!("\n━━━ Net balances ━━━\n");
    match balances(&debts) {
        Ok(balances) => {
            for (participant, balance) in &balances {
                let status = match balance.signum() {
                    1 => "OWED",
                    -1 => "OWES",
                    _ => "FLAT",
                };
                println!("  {:<8} {:>8}  [{}]", participant, balance, status);
            }
        }
        Err(e) => {
            eprintln!("invalid debts: {}", e);
            return;
        }
    }

    for algorithm in Algorithm::ALL {
        println!("\n━━━ {} ━━━\n", algorithm);
        match SettlementPlan::compute(algorithm, &debts) {
            Ok(plan) => {
                println!("{}", plan);
                let report = plan.validate(&debts, &Validator::all());
                println!("Valid: {}", report.valid);
            }
            Err(e) => println!("failed: {}", e),
        }
    }
}
