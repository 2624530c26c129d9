use crate::core::participant::ParticipantId;
use crate::core::transfer::Transfer;
use crate::graph::helpers::users;
use petgraph::algo::kosaraju_scc;
use petgraph::graphmap::DiGraphMap;

/// A strongly connected group of participants in the debt graph.
///
/// Everyone in the group can reach everyone else through a chain of
/// debts, so part of what they owe each other circulates and can be
/// cancelled by the solvers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebtCycleGroup {
    pub participants: Vec<ParticipantId>,
}

impl DebtCycleGroup {
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// More than one participant means there is a cycle to cancel.
    pub fn is_nettable(&self) -> bool {
        self.participants.len() > 1
    }
}

/// Find the strongly connected components of the positive-amount debt graph.
///
/// Each group is sorted, and groups are ordered by their first participant.
pub fn find_debt_cycles(transfers: &[Transfer]) -> Vec<DebtCycleGroup> {
    let participants = users(transfers);

    let mut graph: DiGraphMap<usize, ()> = DiGraphMap::new();
    for i in 0..participants.len() {
        graph.add_node(i);
    }
    // only the presence of a positive debt matters, never its size
    for t in transfers.iter().filter(|t| t.amount() > 0) {
        if let (Ok(u), Ok(v)) = (
            participants.binary_search(t.from()),
            participants.binary_search(t.to()),
        ) {
            graph.add_edge(u, v, ());
        }
    }

    let mut groups: Vec<DebtCycleGroup> = kosaraju_scc(&graph)
        .into_iter()
        .map(|mut component| {
            component.sort_unstable();
            DebtCycleGroup {
                participants: component
                    .into_iter()
                    .map(|i| participants[i].clone())
                    .collect(),
            }
        })
        .collect();
    groups.sort_by(|a, b| a.participants.cmp(&b.participants));
    groups
}
