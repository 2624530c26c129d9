//! Two-hop chain: alice owes bob, bob owes carol.
//!
//! There is no alice -> carol debt, so no solver may create one. The flow
//! solvers keep both hops; the greedy solver emits the chain explicitly.

use settlement_optimizer::core::transfer::Transfer;
use settlement_optimizer::optimization::{optimize, Algorithm};
use settlement_optimizer::validation::validator::Validator;

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║  settlement-optimizer: Two-Hop Chain     ║");
    println!("╚══════════════════════════════════════════╝\n");

    let debts = vec![
        Transfer::new("alice", "bob", 500),
        Transfer::new("bob", "carol", 500),
    ];

    println!("Debts:");
    for debt in &debts {
        println!("  {}", debt);
    }

    for algorithm in Algorithm::ALL {
        println!("\n--- {} ---", algorithm);
        match optimize(algorithm, &debts) {
            Ok(settlements) => {
                for s in &settlements {
                    println!("  {}", s);
                }
                let report = Validator::all().validate(&debts, &settlements);
                println!("  valid: {}", report.valid);
                for v in &report.violations {
                    println!("  {}", v);
                }
            }
            Err(e) => println!("  failed: {}", e),
        }
    }
}
