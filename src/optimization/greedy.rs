use crate::core::error::SettlementError;
use crate::core::participant::ParticipantId;
use crate::core::transfer::Transfer;
use crate::graph::helpers::{
    balances, collapse_transfers, total_demand, transfer_matrix, BalanceMap, TransferMatrix,
};
use crate::optimization::Optimizer;
use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Greedy path pushing over netted debts.
///
/// Works on the collapsed transfer list: repeatedly takes the first
/// participant that still owes money, finds the nearest participant still
/// owed money along edges with spare capacity, and pushes as much as the
/// path allows. Every edge of the path becomes a settlement transfer, so
/// the result may contain multi-hop chains and repeated pairs.
///
/// The spare capacities always form a non-negative flow whose balances
/// equal the remaining ones, so a debtor can always reach a creditor and
/// [`SettlementError::UnableToSettle`] only signals a broken invariant.
#[derive(Debug, Clone, Copy, Default)]
pub struct Greedy;

impl Optimizer for Greedy {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn optimize(&self, debts: &[Transfer]) -> Result<Vec<Transfer>, SettlementError> {
        let netted = collapse_transfers(debts)?;
        let mut remaining = balances(&netted)?;
        // bounds every debtor's deficit, so negating a balance cannot overflow
        let demand = total_demand(&remaining)?;
        let mut capacity = transfer_matrix(&netted)?;
        let mut settlements = Vec::new();

        while let Some(deficit) = first_debtor(&remaining) {
            let Some(path) = nearest_creditor_path(&capacity, &remaining, &deficit) else {
                warn!("greedy: no path out of {} with balances outstanding", deficit);
                return Err(SettlementError::UnableToSettle);
            };

            let surplus = &path[path.len() - 1];
            let bottleneck = path
                .windows(2)
                .map(|hop| capacity[&hop[0]][&hop[1]])
                .min()
                .unwrap_or(0);
            let flow = (-remaining[&deficit]).min(remaining[surplus]).min(bottleneck);
            debug!(
                "greedy: {} -> {} over {} hops, pushed {}",
                deficit,
                surplus,
                path.len() - 1,
                flow
            );

            for hop in path.windows(2) {
                if let Some(cap) = capacity.get_mut(&hop[0]).and_then(|row| row.get_mut(&hop[1])) {
                    *cap -= flow;
                }
                settlements.push(Transfer::new(hop[0].clone(), hop[1].clone(), flow));
            }
            if let Some(b) = remaining.get_mut(&deficit) {
                *b += flow;
            }
            if let Some(b) = remaining.get_mut(surplus) {
                *b -= flow;
            }
        }

        info!(
            "greedy: {} debts settled with {} transfers moving {}",
            debts.len(),
            settlements.len(),
            demand
        );
        Ok(settlements)
    }
}

fn first_debtor(remaining: &BalanceMap) -> Option<ParticipantId> {
    remaining
        .iter()
        .find(|(_, balance)| **balance < 0)
        .map(|(participant, _)| participant.clone())
}

/// BFS from `start` over edges with positive capacity, stopping at the
/// first participant with a positive remaining balance. Returns the
/// participants along the path, `start` first.
fn nearest_creditor_path(
    capacity: &TransferMatrix,
    remaining: &BalanceMap,
    start: &ParticipantId,
) -> Option<Vec<ParticipantId>> {
    let mut parent: BTreeMap<ParticipantId, ParticipantId> = BTreeMap::new();
    let mut visited: BTreeSet<ParticipantId> = BTreeSet::from([start.clone()]);
    let mut queue = VecDeque::from([start.clone()]);

    while let Some(u) = queue.pop_front() {
        if &u != start && remaining.get(&u).copied().unwrap_or(0) > 0 {
            let mut path = vec![u.clone()];
            let mut v = u;
            while let Some(p) = parent.get(&v) {
                path.push(p.clone());
                v = p.clone();
            }
            path.reverse();
            return Some(path);
        }

        let Some(row) = capacity.get(&u) else {
            continue;
        };
        for (next, cap) in row {
            if *cap > 0 && visited.insert(next.clone()) {
                parent.insert(next.clone(), u.clone());
                queue.push_back(next.clone());
            }
        }
    }
    None
}
