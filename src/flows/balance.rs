// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! A graph view of reconciled flows, used to check that they balance.

use std::collections::HashMap;

use petgraph::{
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
    Direction,
};

use super::ReconciledFlows;
use crate::{Error, Participant};

/// Relative tolerance for balance checks.
pub const BALANCE_TOLERANCE: f64 = 1e-6;

/// The reconciled flows as a directed graph with one node per participant
/// and one edge per valid direction, weighted by its rate.
pub struct FlowGraph {
    graph: DiGraph<Participant, f64>,
    node_indices: HashMap<Participant, NodeIndex>,
}

impl FlowGraph {
    pub fn new(flows: &ReconciledFlows) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();
        for participant in Participant::ALL {
            node_indices.insert(participant, graph.add_node(participant));
        }
        for from in Participant::ALL {
            for to in Participant::ALL {
                if from.can_feed(to) {
                    graph.add_edge(node_indices[&from], node_indices[&to], flows.rate(from, to));
                }
            }
        }
        Self {
            graph,
            node_indices,
        }
    }

    /// The rate of the flow from `from` to `to`, 0 if there is no such flow.
    pub fn rate(&self, from: Participant, to: Participant) -> f64 {
        self.graph
            .find_edge(self.node_indices[&from], self.node_indices[&to])
            .map(|e| self.graph[e])
            .unwrap_or(0.0)
    }

    /// The sum of all flows into `participant`.
    pub fn inflow(&self, participant: Participant) -> f64 {
        self.sum_edges(participant, Direction::Incoming)
    }

    /// The sum of all flows out of `participant`.
    pub fn outflow(&self, participant: Participant) -> f64 {
        self.sum_edges(participant, Direction::Outgoing)
    }

    fn sum_edges(&self, participant: Participant, direction: Direction) -> f64 {
        self.graph
            .edges_directed(self.node_indices[&participant], direction)
            .map(|e| *e.weight())
            .sum()
    }

    /// Returns an iterator over all `(from, to, rate)` flows.
    pub fn flows(&self) -> Flows<'_> {
        Flows {
            graph: &self.graph,
            iter: self.graph.raw_edges().iter(),
        }
    }
}

/// An iterator over the flows in a `FlowGraph`.
pub struct Flows<'a> {
    graph: &'a DiGraph<Participant, f64>,
    iter: std::slice::Iter<'a, petgraph::graph::Edge<f64>>,
}

impl Iterator for Flows<'_> {
    type Item = (Participant, Participant, f64);

    fn next(&mut self) -> Option<Self::Item> {
        self.iter
            .next()
            .map(|e| (self.graph[e.source()], self.graph[e.target()], e.weight))
    }
}

fn close_enough(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() <= BALANCE_TOLERANCE * expected.abs().max(1.0)
}

impl ReconciledFlows {
    /// Returns a graph view of the flows.
    pub fn flow_graph(&self) -> FlowGraph {
        FlowGraph::new(self)
    }

    /// Checks that no flow is negative and that every participant's trunk
    /// matches the flows into or out of it.
    pub fn check_balance(&self) -> Result<(), Error> {
        let graph = self.flow_graph();

        if let Some((from, to, rate)) = graph.flows().find(|(_, _, rate)| rate.is_nan() || *rate < 0.0) {
            return Err(Error::unbalanced(format!(
                "Flow from {from} to {to} is negative: {rate}."
            )));
        }

        let checks = [
            (Participant::Generation, "outflow", graph.outflow(Participant::Generation), self.generation_total()),
            (Participant::Grid, "outflow", graph.outflow(Participant::Grid), self.grid_in_total()),
            (Participant::Grid, "inflow", graph.inflow(Participant::Grid), self.grid_export),
            (Participant::Batteries, "outflow", graph.outflow(Participant::Batteries), self.battery_discharge),
            (Participant::Batteries, "inflow", graph.inflow(Participant::Batteries), self.battery_charge),
            (Participant::Consumers, "inflow", graph.inflow(Participant::Consumers), self.consumer_total()),
        ];
        for (participant, direction, actual, expected) in checks {
            if !close_enough(actual, expected) {
                return Err(Error::unbalanced(format!(
                    "{participant} {direction} is {actual}, expected {expected}."
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{reconcile, test_utils::SnapshotBuilder};

    #[test]
    fn test_flow_graph() {
        let snapshot = SnapshotBuilder::new()
            .generation(300.0)
            .grid_in(200.0)
            .battery(100.0, 0.0)
            .consumer("a", 600.0)
            .build();
        let flows = reconcile(&snapshot);
        let graph = flows.flow_graph();

        assert_eq!(graph.flows().count(), 7);
        assert_eq!(graph.rate(Participant::Grid, Participant::Consumers), 200.0);
        assert_eq!(graph.rate(Participant::Consumers, Participant::Grid), 0.0);
        assert_eq!(graph.outflow(Participant::Generation), 300.0);
        assert_eq!(graph.inflow(Participant::Consumers), 600.0);
        assert_eq!(graph.outflow(Participant::Consumers), 0.0);
    }

    #[test]
    fn test_check_balance() {
        let snapshot = SnapshotBuilder::new()
            .generation(300.0)
            .grid_in(200.0)
            .consumer("a", 500.0)
            .build();
        let mut flows = reconcile(&snapshot);
        assert!(flows.check_balance().is_ok());

        flows.grid_to_consumers += 1.0;
        assert_eq!(
            flows.check_balance(),
            Err(Error::unbalanced("Grid outflow is 201, expected 200."))
        );

        flows.grid_to_consumers = -1.0;
        assert_eq!(
            flows.check_balance(),
            Err(Error::unbalanced(
                "Flow from Grid to Consumers is negative: -1."
            ))
        );
    }
}
