use crate::core::error::SettlementError;
use crate::core::transfer::Transfer;
use crate::graph::flow_network::FlowNetwork;
use crate::optimization::Optimizer;
use log::{debug, info, warn};
use std::collections::VecDeque;

/// Dinic's blocking-flow max flow over the split network.
///
/// Each phase builds a BFS level graph from the source and then saturates
/// it with a blocking flow. The augmenting search is an explicit-stack DFS,
/// so its depth is not bounded by the call stack.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dinic;

impl Optimizer for Dinic {
    fn name(&self) -> &'static str {
        "dinic"
    }

    fn optimize(&self, debts: &[Transfer]) -> Result<Vec<Transfer>, SettlementError> {
        let mut network = FlowNetwork::build(debts)?;
        if network.demand() == 0 {
            return Ok(Vec::new());
        }

        let found = max_flow(&mut network);
        if found != network.demand() {
            warn!("dinic: routed {} of {}", found, network.demand());
        }
        let settlements = network.into_settlements(found)?;
        info!(
            "dinic: {} debts settled with {} transfers",
            debts.len(),
            settlements.len()
        );
        Ok(settlements)
    }
}

/// Run Dinic to completion and return the total flow.
pub fn max_flow(network: &mut FlowNetwork) -> i64 {
    let mut total = 0;
    let mut phase = 0;
    while let Some(level) = build_levels(network) {
        phase += 1;
        let pushed = blocking_flow(network, &level);
        debug!("dinic phase {}: pushed {}", phase, pushed);
        if pushed == 0 {
            break;
        }
        total += pushed;
    }
    total
}

/// BFS distances from the source over edges with residual capacity.
/// `None` once the sink is unreachable.
fn build_levels(network: &FlowNetwork) -> Option<Vec<Option<usize>>> {
    let mut level = vec![None; network.vertex_count()];
    let source = network.source();
    level[source] = Some(0);
    let mut queue = VecDeque::from([source]);

    while let Some(u) = queue.pop_front() {
        let next = level[u].map(|l| l + 1);
        for &id in network.outgoing(u) {
            let edge = network.edge(id);
            if edge.residual() > 0 && level[edge.to].is_none() {
                level[edge.to] = next;
                queue.push_back(edge.to);
            }
        }
    }

    if level[network.sink()].is_some() {
        Some(level)
    } else {
        None
    }
}

fn is_admissible(network: &FlowNetwork, level: &[Option<usize>], id: usize) -> bool {
    let edge = network.edge(id);
    edge.residual() > 0
        && matches!((level[edge.from], level[edge.to]), (Some(a), Some(b)) if b == a + 1)
}

/// Saturate the level graph. `cursor[v]` is the next outgoing edge of `v`
/// still worth trying in this phase.
fn blocking_flow(network: &mut FlowNetwork, level: &[Option<usize>]) -> i64 {
    let (source, sink) = (network.source(), network.sink());
    let mut cursor = vec![0usize; network.vertex_count()];
    let mut path: Vec<usize> = Vec::new();
    let mut total = 0;

    loop {
        let u = path.last().map_or(source, |&id| network.edge(id).to);

        if u == sink {
            let pushed = network.augment(&path);
            total += pushed;
            // retreat to the tail of the first saturated edge
            let saturated = path
                .iter()
                .position(|&id| network.edge(id).residual() == 0)
                .unwrap_or(0);
            path.truncate(saturated);
            continue;
        }

        let mut advanced = false;
        while cursor[u] < network.outgoing(u).len() {
            let id = network.outgoing(u)[cursor[u]];
            if is_admissible(network, level, id) {
                path.push(id);
                advanced = true;
                break;
            }
            cursor[u] += 1;
        }

        if !advanced {
            // dead end: drop the edge into `u` for the rest of the phase
            match path.pop() {
                Some(id) => cursor[network.edge(id).from] += 1,
                None => break,
            }
        }
    }

    total
}
