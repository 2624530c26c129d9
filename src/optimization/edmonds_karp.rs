use crate::core::error::SettlementError;
use crate::core::transfer::Transfer;
use crate::graph::flow_network::FlowNetwork;
use crate::optimization::Optimizer;
use log::{debug, info, warn};
use std::collections::VecDeque;

/// Edmonds–Karp max flow over the split network.
///
/// Same construction and read-back as [`Dinic`](super::Dinic); only the
/// search differs. With several max flows of equal value the two may pick
/// different (equally valid) settlements.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdmondsKarp;

impl Optimizer for EdmondsKarp {
    fn name(&self) -> &'static str {
        "edmonds-karp"
    }

    fn optimize(&self, debts: &[Transfer]) -> Result<Vec<Transfer>, SettlementError> {
        let mut network = FlowNetwork::build(debts)?;
        if network.demand() == 0 {
            return Ok(Vec::new());
        }

        let found = max_flow(&mut network);
        if found != network.demand() {
            warn!("edmonds-karp: routed {} of {}", found, network.demand());
        }
        let settlements = network.into_settlements(found)?;
        info!(
            "edmonds-karp: {} debts settled with {} transfers",
            debts.len(),
            settlements.len()
        );
        Ok(settlements)
    }
}

/// Augment along shortest residual paths until none is left.
pub fn max_flow(network: &mut FlowNetwork) -> i64 {
    let mut total = 0;
    let mut augmentations = 0usize;
    while let Some(path) = shortest_path(network) {
        let pushed = network.augment(&path);
        if pushed == 0 {
            break;
        }
        augmentations += 1;
        debug!(
            "edmonds-karp augmentation {}: {} hops, pushed {}",
            augmentations,
            path.len(),
            pushed
        );
        total += pushed;
    }
    total
}

/// BFS from source to sink over residual edges.
/// Returns the arena indices of the path's edges, source first.
fn shortest_path(network: &FlowNetwork) -> Option<Vec<usize>> {
    let (source, sink) = (network.source(), network.sink());
    let mut parent: Vec<Option<usize>> = vec![None; network.vertex_count()];
    let mut visited = vec![false; network.vertex_count()];
    visited[source] = true;
    let mut queue = VecDeque::from([source]);

    'search: while let Some(u) = queue.pop_front() {
        for &id in network.outgoing(u) {
            let edge = network.edge(id);
            if edge.residual() > 0 && !visited[edge.to] {
                visited[edge.to] = true;
                parent[edge.to] = Some(id);
                if edge.to == sink {
                    break 'search;
                }
                queue.push_back(edge.to);
            }
        }
    }

    if !visited[sink] {
        return None;
    }

    let mut path = Vec::new();
    let mut v = sink;
    while let Some(id) = parent[v] {
        path.push(id);
        v = network.edge(id).from;
    }
    path.reverse();
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::Dinic;
    use crate::validation::validator::Validator;

    #[test]
    fn test_empty_input() {
        assert!(EdmondsKarp.optimize(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_direct_pair() {
        let debts = vec![Transfer::new("a", "b", 10)];
        assert_eq!(EdmondsKarp.optimize(&debts).unwrap(), debts);
    }

    #[test]
    fn test_perfectly_netting_pair() {
        let debts = vec![Transfer::new("a", "b", 10), Transfer::new("b", "a", 10)];
        assert!(EdmondsKarp.optimize(&debts).unwrap().is_empty());
    }

    #[test]
    fn test_two_hop_chain() {
        let debts = vec![Transfer::new("a", "b", 5), Transfer::new("b", "c", 5)];
        let settlements = EdmondsKarp.optimize(&debts).unwrap();
        assert!(!settlements
            .iter()
            .any(|t| t.from().as_str() == "a" && t.to().as_str() == "c"));
        assert!(Validator::all().validate(&debts, &settlements).valid);
    }

    #[test]
    fn test_same_flow_value_as_dinic() {
        let debts = vec![
            Transfer::new("a", "b", 12),
            Transfer::new("b", "c", 9),
            Transfer::new("c", "d", 4),
            Transfer::new("d", "a", 3),
            Transfer::new("b", "d", 6),
        ];
        let mut ek = FlowNetwork::build(&debts).unwrap();
        let mut dinic = FlowNetwork::build(&debts).unwrap();
        assert_eq!(
            max_flow(&mut ek),
            crate::optimization::dinic::max_flow(&mut dinic)
        );

        let settlements = EdmondsKarp.optimize(&debts).unwrap();
        assert!(Validator::all().validate(&debts, &settlements).valid);
        assert!(Validator::all()
            .validate(&debts, &Dinic.optimize(&debts).unwrap())
            .valid);
    }
}
