//! Capacitated flow network with vertex splitting.
//!
//! Each of the `n` participants becomes two vertices: `in(i) = i` and
//! `out(i) = n + i`, joined by one edge whose capacity is the participant's
//! original outflow. That turns "never pay out more than you owed" into an
//! ordinary edge capacity. Vertex `2n` is the source, `2n + 1` the sink:
//!
//! - `source -> in(i)` with capacity `-balance` for every debtor,
//! - `in(i) -> sink` with capacity `balance` for every creditor,
//! - `out(u) -> in(v)` for every pair `u -> v` present in the original
//!   transfer matrix, with capacity equal to the total demand.
//!
//! Only the `out -> in` edges are read back as settlements, so a solver
//! can never introduce a debt relationship that did not exist before.
//!
//! Edges live in a flat arena. Every forward edge is immediately followed
//! by its residual twin and both store the other's index in `rev`.

use crate::core::error::SettlementError;
use crate::core::participant::ParticipantId;
use crate::core::transfer::Transfer;
use crate::graph::helpers::{balances, outflows, total_demand, transfer_matrix, users};
use std::collections::BTreeMap;

/// One directed arc of the residual graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowEdge {
    pub from: usize,
    pub to: usize,
    pub capacity: i64,
    pub flow: i64,
    /// Arena index of the paired residual edge.
    pub rev: usize,
}

impl FlowEdge {
    pub fn residual(&self) -> i64 {
        self.capacity - self.flow
    }
}

#[derive(Debug, Clone)]
pub struct FlowNetwork {
    participants: Vec<ParticipantId>,
    edges: Vec<FlowEdge>,
    /// vertex -> arena indices of edges leaving it, in insertion order
    adjacency: Vec<Vec<usize>>,
    demand: i64,
}

impl FlowNetwork {
    /// Build the split network for a list of debts.
    ///
    /// Fails if any transfer has a negative amount, or if a balance, an
    /// outflow or the total demand does not fit in an `i64`. Once built,
    /// every flow value is bounded by an edge capacity.
    pub fn build(transfers: &[Transfer]) -> Result<Self, SettlementError> {
        let balances = balances(transfers)?;
        let participants = users(transfers);
        let caps = outflows(transfers)?;
        let matrix = transfer_matrix(transfers)?;
        let demand = total_demand(&balances)?;

        let n = participants.len();
        let index: BTreeMap<&ParticipantId, usize> =
            participants.iter().enumerate().map(|(i, p)| (p, i)).collect();

        let mut network = Self {
            participants: participants.clone(),
            edges: Vec::new(),
            adjacency: vec![Vec::new(); 2 * n + 2],
            demand,
        };
        let (source, sink) = (network.source(), network.sink());

        for (i, participant) in participants.iter().enumerate() {
            let cap = caps.get(participant).copied().unwrap_or(0);
            if cap > 0 {
                network.add_edge(i, n + i, cap);
            }

            let balance = balances.get(participant).copied().unwrap_or(0);
            if balance < 0 {
                network.add_edge(source, i, -balance);
            } else if balance > 0 {
                network.add_edge(i, sink, balance);
            }
        }

        for (from, row) in &matrix {
            let u = index[from];
            for to in row.keys() {
                if to == from {
                    continue;
                }
                network.add_edge(n + u, index[to], demand);
            }
        }

        Ok(network)
    }

    fn add_edge(&mut self, from: usize, to: usize, capacity: i64) {
        let forward = self.edges.len();
        let backward = forward + 1;
        self.edges.push(FlowEdge {
            from,
            to,
            capacity,
            flow: 0,
            rev: backward,
        });
        self.edges.push(FlowEdge {
            from: to,
            to: from,
            capacity: 0,
            flow: 0,
            rev: forward,
        });
        self.adjacency[from].push(forward);
        self.adjacency[to].push(backward);
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn source(&self) -> usize {
        2 * self.participants.len()
    }

    pub fn sink(&self) -> usize {
        2 * self.participants.len() + 1
    }

    /// Sum of positive balances; a complete settlement routes exactly this much.
    pub fn demand(&self) -> i64 {
        self.demand
    }

    pub fn edge(&self, id: usize) -> &FlowEdge {
        &self.edges[id]
    }

    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    /// Arena indices of the edges leaving `vertex`.
    pub fn outgoing(&self, vertex: usize) -> &[usize] {
        &self.adjacency[vertex]
    }

    /// Push `amount` along edge `id`, updating its residual twin.
    pub fn push(&mut self, id: usize, amount: i64) {
        let rev = self.edges[id].rev;
        self.edges[id].flow += amount;
        self.edges[rev].flow -= amount;
    }

    /// Augment every edge of a source-to-sink path by its bottleneck.
    ///
    /// Returns the amount pushed.
    pub fn augment(&mut self, path: &[usize]) -> i64 {
        let bottleneck = path
            .iter()
            .map(|&e| self.edges[e].residual())
            .min()
            .unwrap_or(0);
        if bottleneck > 0 {
            for &e in path {
                self.push(e, bottleneck);
            }
        }
        bottleneck
    }

    fn is_settlement_edge(&self, edge: &FlowEdge) -> bool {
        let n = self.participants.len();
        edge.capacity > 0 && (n..2 * n).contains(&edge.from) && edge.to < n
    }

    /// Read settlements back from the `out -> in` edges carrying flow.
    ///
    /// `found` is the total flow the solver reached; anything short of the
    /// demand means the debts cannot be fully settled on the allowed edges.
    pub fn into_settlements(self, found: i64) -> Result<Vec<Transfer>, SettlementError> {
        if found != self.demand {
            return Err(SettlementError::InsufficientMaxFlow {
                found,
                needed: self.demand,
            });
        }

        let n = self.participants.len();
        Ok(self
            .edges
            .iter()
            .filter(|e| self.is_settlement_edge(e) && e.flow > 0)
            .map(|e| {
                Transfer::new(
                    self.participants[e.from - n].clone(),
                    self.participants[e.to].clone(),
                    e.flow,
                )
            })
            .collect())
    }
}
